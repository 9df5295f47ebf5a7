use crate::error::{RenderError, Result};
use cinescrape_core::BrowserConfig;
use std::collections::BTreeMap;
use std::time::Duration;

/// Something that can turn a URL into fully rendered HTML.
#[async_trait::async_trait]
pub trait PageRenderer: Send + Sync {
    /// Render `url` and return the document HTML.
    async fn render(&self, url: &str) -> Result<String>;
}

/// Fixed per-render settings: headers, viewport and timing.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub headless: bool,
    pub user_agent: String,
    pub headers: BTreeMap<String, String>,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub navigation_timeout: Duration,
    /// Wait after navigation so client-side scripts can finish rendering
    pub settle_delay: Duration,
}

impl From<&BrowserConfig> for RenderOptions {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            headless: config.headless,
            user_agent: config.user_agent.clone(),
            headers: config.extra_headers.clone(),
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&BrowserConfig::default())
    }
}

/// Reject anything that is not an absolute http(s) URL before launching a browser.
pub fn validate_url(url: &str) -> Result<url::Url> {
    let parsed =
        url::Url::parse(url).map_err(|e| RenderError::InvalidUrl(format!("{url}: {e}")))?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
        _ => Err(RenderError::InvalidUrl(format!(
            "{url}: expected an http(s) URL with a host"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        let url = validate_url("https://www.imdb.com/title/tt0000001/").unwrap();
        assert_eq!(url.host_str(), Some("www.imdb.com"));
    }

    #[test]
    fn test_validate_url_invalid() {
        assert!(validate_url("not-a-url").is_err());
        assert!(validate_url("file:///etc/passwd").is_err());
    }

    #[test]
    fn test_options_from_config() {
        let options = RenderOptions::default();
        assert_eq!(options.navigation_timeout, Duration::from_secs(30));
        assert_eq!(options.settle_delay, Duration::from_millis(2000));
        assert_eq!((options.viewport_width, options.viewport_height), (1280, 800));
        assert!(options.headers.contains_key("Accept-Language"));
    }
}
