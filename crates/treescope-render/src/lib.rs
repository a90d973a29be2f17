#![forbid(unsafe_code)]

//! Lowering values into treescope parts.
//!
//! - [`value`] - the dynamic object graph ([`Value`])
//! - [`registry`] - type-keyed handler lookup with declared supertypes
//! - [`handler`] - the [`NodeHandler`] trait and recursive [`SubtreeRenderer`]
//! - [`builtins`] - handlers for literals, strings, containers, records
//! - [`array`] - [`ArrayAdapter`] summaries and the named-array handler
//! - [`deferral`] - lazily built labels
//! - [`renderer`] - [`Renderer`], the entry point
//!
//! # Example
//! ```
//! use treescope_core::RenderConfig;
//! use treescope_render::{Renderer, Value};
//!
//! let value = Value::dict([(Value::str("xs"), Value::list([Value::int(1), Value::int(2)]))]);
//! let renderer = Renderer::new(RenderConfig::default());
//! assert_eq!(renderer.render_to_text(&value).unwrap(), r#"{"xs": [1, 2]}"#);
//! ```

pub mod array;
pub mod builtins;
pub mod deferral;
pub mod handler;
pub mod registry;
pub mod renderer;
pub mod value;

pub use array::{ArrayAdapter, NamedArrayHandler, array_summary};
pub use builtins::{BUILTINS, DEFAULT_INTEGRATIONS};
pub use deferral::maybe_defer_rendering;
pub use handler::{
    FnHandler, HandlerError, HandlerResult, NodeHandler, SubtreeRenderer, generic_repr, handler_fn,
};
pub use registry::{Integration, OBJECT_TYPE, Registry, TypeKey};
pub use renderer::Renderer;
pub use value::{ARRAY_TYPE, Record, Value};
