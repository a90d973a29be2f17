#![forbid(unsafe_code)]

//! Treescope public facade crate.
//!
//! This crate re-exports the types most programs need from the internal
//! crates and offers a prelude plus one-call helpers.
//!
//! ```
//! use treescope::prelude::*;
//!
//! let value = Value::list([Value::int(1), Value::int(2), Value::str("three")]);
//! let renderer = Renderer::new(RenderConfig::default());
//! assert_eq!(renderer.render_to_text(&value).unwrap(), r#"[1, 2, "three"]"#);
//! ```

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use treescope_core::{ConfigError, Memo, RenderConfig};

// --- Part re-exports -------------------------------------------------------

pub use treescope_parts::{
    DocumentOptions, ExpandState, Foldable, LineItem, Part, PartError, RenderContext, TextOptions,
};

// --- Layout re-exports -----------------------------------------------------

pub use treescope_layout::{BalancedLayout, LayoutPolicy, LayoutReport};

// --- Render re-exports -----------------------------------------------------

pub use treescope_render::{
    ArrayAdapter, HandlerError, HandlerResult, Integration, NodeHandler, Registry, Renderer,
    SubtreeRenderer, TypeKey, Value, handler_fn,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for treescope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The part tree violated a layout contract.
    Part(PartError),
    /// Configuration could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Part(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Part(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<PartError> for Error {
    fn from(err: PartError) -> Self {
        Self::Part(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for treescope APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Helpers --------------------------------------------------------------

/// Render `value` as text with the default configuration.
pub fn render_to_text(value: &Value) -> Result<String> {
    Ok(Renderer::default().render_to_text(value)?)
}

/// Render `value` as text, configured from `TREESCOPE_*` variables.
pub fn render_to_text_from_env(value: &Value) -> Result<String> {
    Ok(Renderer::from_env()?.render_to_text(value)?)
}

/// Render `value` as an HTML fragment with the default configuration.
#[must_use]
pub fn render_to_html(value: &Value) -> String {
    Renderer::default().render_to_html(value)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Error, ExpandState, LayoutPolicy, Part, RenderConfig, Renderer, Result, Value,
    };

    pub use crate::{core, layout, parts, render, text};
}

pub use treescope_core as core;
pub use treescope_layout as layout;
pub use treescope_parts as parts;
pub use treescope_render as render;
pub use treescope_text as text;
