use thiserror::Error;

pub type Result<T> = std::result::Result<T, RenderError>;

/// Failure to obtain a rendered document.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timeout after {secs}s rendering {url}")]
    Timeout { url: String, secs: u64 },

    #[error("failed to capture page content: {0}")]
    Content(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}
