#![forbid(unsafe_code)]

//! Top-level rendering.
//!
//! A [`Renderer`] owns a configuration, a registry, and a layout policy. Each
//! render call lowers the value into parts with a fresh [`RenderContext`],
//! resolves automatic foldables, and emits text or an HTML document.

use treescope_core::{ConfigError, RenderConfig};
use treescope_layout::{LayoutPolicy, LayoutReport};
use treescope_parts::builders::build_full_line_with_annotations;
use treescope_parts::{
    DocumentOptions, Part, PartError, RenderContext, TextOptions, render_document, render_to_text,
};

use crate::builtins::DEFAULT_INTEGRATIONS;
use crate::handler::SubtreeRenderer;
use crate::registry::Registry;
use crate::value::Value;

/// Renders values to text or HTML.
#[derive(Debug)]
pub struct Renderer {
    config: RenderConfig,
    registry: Registry,
    layout: LayoutPolicy,
    root_path: Option<String>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl Renderer {
    /// A renderer with the built-in handlers and a balanced layout.
    #[must_use]
    pub fn new(config: RenderConfig) -> Self {
        let mut registry = Registry::new();
        registry.ensure_initialized(&DEFAULT_INTEGRATIONS);
        Self::with_registry(config, registry)
    }

    /// A renderer over a caller-built registry.
    #[must_use]
    pub fn with_registry(config: RenderConfig, registry: Registry) -> Self {
        Self {
            layout: LayoutPolicy::from_config(&config),
            config,
            registry,
            root_path: None,
        }
    }

    /// A renderer configured from `TREESCOPE_*` environment variables.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if a variable is malformed or a size is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(RenderConfig::from_env()?))
    }

    /// Replace the layout policy.
    #[must_use]
    pub fn with_layout(mut self, layout: LayoutPolicy) -> Self {
        self.layout = layout;
        self
    }

    /// Accessor expression for the root value; enables copy buttons.
    #[must_use]
    pub fn with_root_path(mut self, path: impl Into<String>) -> Self {
        self.root_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[must_use]
    pub fn layout(&self) -> LayoutPolicy {
        self.layout
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Lower `value` into parts and apply the layout policy.
    pub fn render_parts(&self, value: &Value, ctx: &mut RenderContext) -> (Part, LayoutReport) {
        let span = treescope_core::debug_span!("render_parts");
        let _guard = span.enter();

        let item = SubtreeRenderer::new(&self.registry, &self.config, ctx)
            .render(value, self.root_path.as_deref());
        let root = build_full_line_with_annotations([item]);
        let report = self.layout.apply(&root);
        treescope_core::debug!(
            expanded = report.expanded,
            height = report.height,
            "layout applied"
        );
        (root, report)
    }

    /// Render `value` as plain text.
    ///
    /// # Errors
    ///
    /// [`PartError`] if a handler produced a multi-line literal where the
    /// layout keeps it on one line.
    pub fn render_to_text(&self, value: &Value) -> Result<String, PartError> {
        let mut ctx = RenderContext::new();
        let (root, _) = self.render_parts(value, &mut ctx);
        let opts = TextOptions {
            roundtrip: self.config.roundtrip,
            ..TextOptions::default()
        };
        render_to_text(&root, opts, &mut ctx)
    }

    /// Render `value` as a self-contained HTML fragment.
    #[must_use]
    pub fn render_to_html(&self, value: &Value) -> String {
        let mut ctx = if self.config.stream_deferred {
            RenderContext::streaming()
        } else {
            RenderContext::new()
        };
        let (root, _) = self.render_parts(value, &mut ctx);
        let opts = DocumentOptions {
            roundtrip: self.config.roundtrip,
            compress: self.config.compress_css,
        };
        render_document(&root, opts, &mut ctx)
    }
}
