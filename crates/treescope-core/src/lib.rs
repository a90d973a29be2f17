#![forbid(unsafe_code)]

//! Core: logging macros, render configuration, and memo cells shared by the
//! treescope crates.

pub mod config;
pub mod logging;
pub mod memo;

pub use config::{ConfigError, RenderConfig};
pub use memo::Memo;

// With tracing off the macros are already at the root via `#[macro_export]`.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};
