//! Get page tool: fetch a web page and return its visible text.
//!
//! Input is a bare `http://` or `https://` URL. Script, style, head and
//! noscript elements are dropped; every remaining text run becomes one line.

use async_trait::async_trait;
use planloop_core::error::ToolError;
use planloop_core::run::RunContext;
use planloop_core::tool::Tool;
use std::time::Duration;
use tracing::debug;

const TOOL_NAME: &str = "get_page";

/// Per-request ceiling; the run deadline still applies on top.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Elements whose content is never shown to the reader.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "head", "noscript"];

pub struct GetPageTool {
    client: reqwest::Client,
}

impl GetPageTool {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for GetPageTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetPageTool {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Fetch the content of a web page. Input is the page URL (http or https). \
         Returns the page's visible text."
    }

    async fn call(&self, _ctx: &RunContext, input: &str) -> Result<String, ToolError> {
        let url = input.trim().trim_matches(|c| c == '"' || c == '\'');
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::InvalidInput(
                "URL must start with http:// or https://".into(),
            ));
        }

        debug!(url = %url, "Fetching page");
        let failed = |reason: String| ToolError::ExecutionFailed {
            tool_name: TOOL_NAME.into(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| failed(format!("Error fetching {url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("Error fetching {url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| failed(format!("Error reading {url}: {e}")))?;
        Ok(extract_text(&body))
    }
}

/// Visible text of an HTML document, one trimmed text run per line.
pub fn extract_text(html: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let mut lines = Vec::new();
    let mut pos = 0;

    while let Some(offset) = html[pos..].find('<') {
        let start = pos + offset;
        push_text(&mut lines, &html[pos..start]);

        if lower[start..].starts_with("<!--") {
            pos = lower[start..]
                .find("-->")
                .map_or(html.len(), |end| start + end + 3);
            continue;
        }

        let Some(close) = html[start..].find('>') else {
            // A stray '<' with no tag after it is plain text.
            pos = start;
            break;
        };
        let end = start + close + 1;
        let inner = &lower[start + 1..end - 1];
        pos = end;

        let is_closing = inner.starts_with('/');
        let name: String = inner
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();

        if !is_closing && !inner.ends_with('/') && HIDDEN_ELEMENTS.contains(&name.as_str()) {
            let closing_tag = format!("</{name}");
            pos = match lower[end..].find(&closing_tag) {
                Some(at) => {
                    let after = end + at;
                    lower[after..].find('>').map_or(html.len(), |gt| after + gt + 1)
                }
                None => html.len(),
            };
        }
    }

    push_text(&mut lines, &html[pos..]);
    lines.join("\n")
}

fn push_text(lines: &mut Vec<String>, raw: &str) {
    let decoded = decode_entities(raw);
    lines.extend(
        decoded
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from),
    );
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
