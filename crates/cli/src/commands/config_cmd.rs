//! `planloop config`: show or initialise the configuration.

use std::path::Path;

use planloop_config::AppConfig;

pub fn run(config: &AppConfig, path: &Path, init: bool) -> Result<(), Box<dyn std::error::Error>> {
    if init {
        if path.exists() {
            println!("Config already exists at {}", path.display());
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, AppConfig::default_toml())?;
            println!("✅ Wrote default config to {}", path.display());
            return Ok(());
        }
    }

    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
