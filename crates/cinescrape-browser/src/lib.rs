//! Headless rendering for JavaScript-heavy sites.
//!
//! Each render launches an isolated Chromium session, applies the configured
//! headers and viewport, waits for navigation plus a settle delay and returns
//! the fully rendered document.

pub mod engine;
pub mod error;
pub mod renderer;

pub use engine::ChromiumRenderer;
pub use error::{RenderError, Result};
pub use renderer::{PageRenderer, RenderOptions};
