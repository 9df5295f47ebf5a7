use crate::error::{RenderError, Result};
use crate::renderer::{validate_url, PageRenderer, RenderOptions};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::Page;
use futures::stream::StreamExt;
use std::time::Instant;

/// Chromium-backed renderer.
///
/// Every call launches its own browser and tears it down afterwards. No
/// session state is shared between renders, so a stuck page can never
/// poison the next request.
#[derive(Debug, Clone, Default)]
pub struct ChromiumRenderer {
    options: RenderOptions,
}

impl ChromiumRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn browser_config(&self) -> Result<BrowserConfig> {
        let options = &self.options;
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg(format!("--user-agent={}", options.user_agent))
            .window_size(options.viewport_width, options.viewport_height)
            .viewport(Viewport {
                width: options.viewport_width,
                height: options.viewport_height,
                ..Viewport::default()
            })
            .request_timeout(options.navigation_timeout);

        if !options.headless {
            builder = builder.with_head();
        }

        builder.build().map_err(RenderError::Launch)
    }

    async fn capture(&self, browser: &Browser, url: &str) -> Result<String> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let result = self.navigate_and_read(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::debug!("Failed to close page for {}: {}", url, e);
        }

        result
    }

    async fn navigate_and_read(&self, page: &Page, url: &str) -> Result<String> {
        let headers = serde_json::to_value(&self.options.headers)
            .map_err(|e| RenderError::Navigation(format!("invalid headers: {e}")))?;
        page.execute(SetExtraHttpHeadersParams::new(Headers::new(headers)))
            .await
            .map_err(|e| RenderError::Navigation(format!("failed to set headers: {e}")))?;

        page.execute(SetLifecycleEventsEnabledParams::new(true))
            .await
            .map_err(|e| RenderError::Navigation(format!("failed to enable lifecycle events: {e}")))?;
        let mut lifecycle = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| RenderError::Navigation(format!("failed to watch lifecycle: {e}")))?;
        let main_frame = page
            .mainframe()
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let timeout = self.options.navigation_timeout;
        let navigation = async {
            page.goto(url)
                .await
                .map_err(|e| RenderError::Navigation(e.to_string()))?;

            let mut idle = IdleWatch::new(main_frame.as_ref().map(|id| id.inner().clone()));
            while let Some(event) = lifecycle.next().await {
                if idle.observe(event.frame_id.inner(), &event.name) {
                    return Ok(());
                }
            }
            Err(RenderError::Navigation(
                "page closed before the network went idle".to_string(),
            ))
        };

        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| RenderError::Timeout {
                url: url.to_string(),
                secs: timeout.as_secs(),
            })??;

        tokio::time::sleep(self.options.settle_delay).await;

        page.content()
            .await
            .map_err(|e| RenderError::Content(e.to_string()))
    }
}

/// Tracks main-frame lifecycle events until the network is almost idle.
///
/// Only events after the navigation's `init` count, so a stale idle signal
/// from the blank page is ignored. "Almost idle" means at most two requests
/// in flight for 500ms.
#[derive(Debug)]
struct IdleWatch {
    main_frame: Option<String>,
    navigation_started: bool,
}

impl IdleWatch {
    fn new(main_frame: Option<String>) -> Self {
        Self {
            main_frame,
            navigation_started: false,
        }
    }

    /// Feed one lifecycle event; returns `true` once the page is idle.
    fn observe(&mut self, frame_id: &str, name: &str) -> bool {
        if self.main_frame.as_deref().is_some_and(|main| main != frame_id) {
            return false;
        }
        match name {
            "init" => {
                self.navigation_started = true;
                false
            }
            "networkAlmostIdle" => self.navigation_started,
            _ => false,
        }
    }
}

#[async_trait::async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        validate_url(url)?;
        let started = Instant::now();

        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        // The handler drives the CDP connection and must be polled until the browser exits.
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let result = self.capture(&browser, url).await;

        if let Err(e) = browser.close().await {
            tracing::debug!("Failed to close browser after rendering {}: {}", url, e);
        }
        if let Err(e) = browser.wait().await {
            tracing::debug!("Browser process did not exit cleanly after {}: {}", url, e);
        }
        handler_task.abort();

        match &result {
            Ok(html) => tracing::debug!(
                "Rendered {} ({} bytes) in {:?}",
                url,
                html.len(),
                started.elapsed()
            ),
            Err(e) => tracing::error!("Failed to render {}: {}", url, e),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_config_builds() {
        let renderer = ChromiumRenderer::default();
        // Building the config looks up a local Chrome executable.
        if let Err(e) = renderer.browser_config() {
            assert!(matches!(e, RenderError::Launch(_)));
        }
    }

    #[test]
    fn test_idle_watch_waits_for_navigation_init() {
        let mut idle = IdleWatch::new(Some("MAIN".to_string()));

        // Leftover signal from about:blank
        assert!(!idle.observe("MAIN", "networkAlmostIdle"));
        assert!(!idle.observe("MAIN", "init"));
        assert!(!idle.observe("MAIN", "load"));
        assert!(idle.observe("MAIN", "networkAlmostIdle"));
    }

    #[test]
    fn test_idle_watch_ignores_subframes() {
        let mut idle = IdleWatch::new(Some("MAIN".to_string()));

        assert!(!idle.observe("MAIN", "init"));
        assert!(!idle.observe("AD_IFRAME", "networkAlmostIdle"));
        assert!(idle.observe("MAIN", "networkAlmostIdle"));
    }

    #[test]
    fn test_idle_watch_without_known_frame() {
        let mut idle = IdleWatch::new(None);
        assert!(!idle.observe("ANY", "load"));
        assert!(!idle.observe("ANY", "init"));
        assert!(idle.observe("ANY", "networkAlmostIdle"));
    }

    #[tokio::test]
    async fn test_render_rejects_invalid_url_without_launching() {
        let renderer = ChromiumRenderer::default();
        let err = renderer.render("not-a-url").await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidUrl(_)));
    }

    #[tokio::test]
    #[ignore = "Requires Chrome browser to be installed"]
    async fn test_render_real_page() {
        let mut options = RenderOptions::default();
        options.settle_delay = std::time::Duration::from_millis(100);
        let renderer = ChromiumRenderer::new(options);

        let html = renderer
            .render("https://example.com/")
            .await
            .expect("render example.com");
        assert!(html.contains("Example Domain"));
    }
}
