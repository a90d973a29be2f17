#![forbid(unsafe_code)]

//! Node handlers and the subtree renderer they recurse through.

use std::fmt;

use treescope_core::RenderConfig;
use treescope_parts::builders::{
    abbreviation_color, build_one_line_tree_node, comment_color, error_color,
    siblings_with_annotations, text,
};
use treescope_parts::{LineItem, Occurrence, PartError, RenderContext};

use crate::registry::{Registry, TypeKey};
use crate::value::Value;

/// Outcome of a handler that did not fail.
#[derive(Debug, Clone)]
pub enum HandlerResult {
    Handled(LineItem),
    /// The handler does not apply; the next one is tried.
    NotHandled,
}

/// A handler rejected a value it claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The value is structurally invalid for this handler.
    InvalidValue { type_name: String, reason: String },
    /// A part could not be built.
    Part(PartError),
    /// A literal could not be formatted.
    Format(String),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { type_name, reason } => {
                write!(f, "invalid {}: {}", type_name, reason)
            }
            Self::Part(err) => write!(f, "{}", err),
            Self::Format(msg) => write!(f, "cannot format literal: {}", msg),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Part(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PartError> for HandlerError {
    fn from(err: PartError) -> Self {
        Self::Part(err)
    }
}

/// Lowers values of some type into parts.
pub trait NodeHandler {
    /// Name used in log events.
    fn name(&self) -> &str;

    /// Render `value`, recursing into children through `subtree`.
    ///
    /// # Errors
    ///
    /// A [`HandlerError`] makes the renderer log it and fall back to the next
    /// handler.
    fn handle(
        &self,
        value: &Value,
        path: Option<&str>,
        subtree: &mut SubtreeRenderer<'_>,
    ) -> Result<HandlerResult, HandlerError>;
}

/// A handler built from a closure.
pub struct FnHandler<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a [`NodeHandler`].
pub fn handler_fn<F>(name: impl Into<String>, f: F) -> FnHandler<F>
where
    F: Fn(&Value, Option<&str>, &mut SubtreeRenderer<'_>) -> Result<HandlerResult, HandlerError>,
{
    FnHandler {
        name: name.into(),
        f,
    }
}

impl<F> NodeHandler for FnHandler<F>
where
    F: Fn(&Value, Option<&str>, &mut SubtreeRenderer<'_>) -> Result<HandlerResult, HandlerError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(
        &self,
        value: &Value,
        path: Option<&str>,
        subtree: &mut SubtreeRenderer<'_>,
    ) -> Result<HandlerResult, HandlerError> {
        (self.f)(value, path, subtree)
    }
}

/// Renders values through the registry while building one tree.
pub struct SubtreeRenderer<'a> {
    registry: &'a Registry,
    config: &'a RenderConfig,
    ctx: &'a mut RenderContext,
}

impl<'a> SubtreeRenderer<'a> {
    pub fn new(registry: &'a Registry, config: &'a RenderConfig, ctx: &'a mut RenderContext) -> Self {
        Self {
            registry,
            config,
            ctx,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        self.config
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        self.registry
    }

    pub fn context(&mut self) -> &mut RenderContext {
        self.ctx
    }

    /// Render `value` at `path`.
    ///
    /// Containers already being rendered become cycle markers. Mutable
    /// containers seen earlier in the tree are rendered again with a note.
    pub fn render(&mut self, value: &Value, path: Option<&str>) -> LineItem {
        let Some(id) = value.identity() else {
            return self.dispatch(value, path);
        };
        let key = value.type_key();
        if !self.ctx.enter(id) {
            treescope_core::debug!(type_name = key.name(), "cyclic reference");
            return build_one_line_tree_node(
                error_color(text(format!("<cyclic reference to {}>", key))),
                path,
            );
        }
        let occurrence = self.ctx.observe(id);
        let item = self.dispatch(value, path);
        self.ctx.exit(id);

        match occurrence {
            Occurrence::Repeat(count) if !self.is_immutable(value) => {
                let note = comment_color(text(format!(
                    "  # Repeated {} (seen {} times in this tree)",
                    key, count
                )));
                siblings_with_annotations([item], vec![note])
            }
            _ => item,
        }
    }

    fn is_immutable(&self, value: &Value) -> bool {
        value
            .type_keys()
            .iter()
            .any(|key| self.registry.is_immutable(key))
    }

    fn dispatch(&mut self, value: &Value, path: Option<&str>) -> LineItem {
        let registry = self.registry;
        for handler in registry.resolve(&value.type_keys()) {
            match handler.handle(value, path, self) {
                Ok(HandlerResult::Handled(item)) => return item,
                Ok(HandlerResult::NotHandled) => {}
                Err(err) => {
                    treescope_core::warn!(
                        handler = handler.name(),
                        error = %err,
                        "handler failed, falling back"
                    );
                }
            }
        }
        generic_repr(&value.type_key(), path)
    }
}

/// The representation used when no handler applies.
#[must_use]
pub fn generic_repr(key: &TypeKey, path: Option<&str>) -> LineItem {
    build_one_line_tree_node(abbreviation_color(text(format!("<{} object>", key))), path)
}
