#![forbid(unsafe_code)]

//! Logging hooks for the render pipeline.
//!
//! The pipeline logs at three levels and opens one kind of span:
//!
//! | macro | used for |
//! |---|---|
//! | `trace!` | deferred parts being evaluated |
//! | `debug!` | layout decisions, registry setup, streamed output |
//! | `warn!` | handlers that failed and fell back |
//! | `debug_span!` | one top-level render |
//!
//! With the `tracing` feature these are the `tracing` macros. Without it they
//! swallow their arguments, and `debug_span!` yields a [`DisabledSpan`], so
//! call sites never need their own `cfg`.

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, trace, warn};

/// Environment variable holding the filter directives for [`init_json_logging`].
pub const ENV_LOG_FILTER: &str = "TREESCOPE_LOG";

#[cfg(not(feature = "tracing"))]
mod disabled {
    /// Discards a trace event.
    #[macro_export]
    macro_rules! trace {
        ($($event:tt)*) => {};
    }

    /// Discards a debug event.
    #[macro_export]
    macro_rules! debug {
        ($($event:tt)*) => {};
    }

    /// Discards a warning.
    #[macro_export]
    macro_rules! warn {
        ($($event:tt)*) => {};
    }

    /// A span that records nothing.
    #[macro_export]
    macro_rules! debug_span {
        ($($span:tt)*) => {
            $crate::logging::DisabledSpan
        };
    }
}

/// Stand-in for a span when logging is compiled out.
#[cfg(not(feature = "tracing"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSpan;

#[cfg(not(feature = "tracing"))]
impl DisabledSpan {
    /// Mirrors `tracing::Span::enter`; the guard does nothing on drop.
    #[must_use]
    pub fn enter(&self) -> DisabledSpan {
        *self
    }
}

/// Install a global JSON subscriber filtered by [`ENV_LOG_FILTER`].
///
/// Falls back to `warn` when the variable is unset or unparsable. Returns an
/// error if a global subscriber is already installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_env(ENV_LOG_FILTER).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
}
