//! `planloop tools`: list the enabled tools.

use planloop_config::AppConfig;

pub fn run(config: &AppConfig) {
    let registry = planloop_tools::default_registry(&config.tools);
    if registry.is_empty() {
        println!("No tools enabled (see [tools] enabled in config.toml)");
        return;
    }

    println!("🔧 {} tool(s) enabled", registry.len());
    for (name, description) in registry.descriptions() {
        println!("  {name:<12} {description}");
    }
}
