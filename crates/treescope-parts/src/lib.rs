#![forbid(unsafe_code)]

//! The renderable part tree of treescope.
//!
//! A value is lowered into a tree of [`Part`]s. Parts expose cached layout
//! metrics ([`Part::collapsed_width`], [`Part::newlines_in_expanded_parent`])
//! that a layout policy uses to decide which [`Foldable`] nodes start
//! expanded, and are then emitted as plain text ([`text`]) or as markup
//! ([`html`], [`document`]).
//!
//! # Example
//! ```
//! use treescope_parts::builders::{
//!     CommaPolicy, build_foldable_tree_node_from_children, text,
//! };
//! use treescope_parts::{ExpandState, RenderContext, TextOptions, render_to_text};
//!
//! let node = build_foldable_tree_node_from_children(
//!     text("["),
//!     [text("1"), text("2")],
//!     text("]"),
//!     CommaPolicy::SEPARATED,
//!     None,
//!     ExpandState::Collapsed,
//! );
//! let out = render_to_text(&node.renderable, TextOptions::default(), &mut RenderContext::new());
//! assert_eq!(out.unwrap(), "[1, 2]");
//!
//! node.renderable.foldables()[0].set_expand_state(ExpandState::Expanded);
//! let out = render_to_text(&node.renderable, TextOptions::default(), &mut RenderContext::new());
//! assert_eq!(out.unwrap(), "[\n  1,\n  2,\n]");
//! ```

pub mod builders;
pub mod context;
pub mod document;
pub mod html;
pub mod part;
pub mod style;
pub mod text;

pub use context::{ObjectId, Occurrence, PendingDeferred, RenderContext};
pub use document::{DocumentOptions, render_document};
pub use html::{SetupContext, SetupPart, render_to_html, setup_parts};
pub use part::{Deferred, ExpandState, Foldable, LineItem, Part, PartError, PartKind, Tag, TagSet};
pub use style::{OutlineStyle, SpanStyle};
pub use text::{TextFlags, TextOptions, render_to_text};
