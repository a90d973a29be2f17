#![forbid(unsafe_code)]

//! Text helpers for treescope.
//!
//! - [`display_width`] / [`cached_width`] - cell width of a single-line string
//! - [`WidthCache`] - LRU cache for width measurements
//! - [`escape`] - HTML text and attribute escaping
//! - [`lines`] - indentation-aware line joining and comment prefixes
//!
//! # Example
//! ```
//! use treescope_text::{cached_width, escape_html, reindent};
//!
//! assert_eq!(cached_width("[1, 2]"), 6);
//! assert_eq!(escape_html("<a & b>"), "&lt;a &amp; b&gt;");
//! assert_eq!(reindent("a\nb", 2), "a\n  b");
//! ```

pub mod escape;
pub mod lines;
pub mod width;

pub use escape::{escape_html, escape_html_attribute, escape_html_into, without_repeated_whitespace};
pub use lines::{comment_out, newline_count, push_indent, reindent};
pub use width::{
    CacheStats, DEFAULT_CACHE_CAPACITY, WidthCache, cached_width, clear_thread_cache,
    display_width, thread_cache_stats, truncate_with_ellipsis,
};
