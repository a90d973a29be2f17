#![forbid(unsafe_code)]

//! Array summaries and the named-array handler.
//!
//! Arrays reach the renderer only through [`ArrayAdapter`]. The summary line
//! is `dtype(p0, p1 | n0:s0, n1:s1)` followed by the adapter's numeric
//! summary when it deems computing one safe.

use std::rc::Rc;

use treescope_parts::builders::{
    CommaPolicy, abbreviation_color, build_custom_foldable_tree_node, comment_color, empty,
    indented_children, maybe_qualified_type_name, siblings, summarizable_condition, text,
    when_expanded,
};
use treescope_parts::{ExpandState, Part};

use crate::builtins::field_children;
use crate::deferral::maybe_defer_rendering;
use crate::handler::{HandlerError, HandlerResult, NodeHandler, SubtreeRenderer};
use crate::value::Value;

/// Read-only view of an array-like value.
pub trait ArrayAdapter {
    /// Short type name, e.g. `NamedArray`.
    fn type_name(&self) -> &str;

    /// Module-qualified type name; shown in roundtrip mode.
    fn qualified_type_name(&self) -> String {
        self.type_name().to_string()
    }

    /// Type of the wrapped data buffer.
    fn contained_type(&self) -> &str;

    fn dtype(&self) -> &str;

    fn positional_shape(&self) -> Vec<usize>;

    /// Named axes and their sizes, in order.
    fn named_shape(&self) -> Vec<(String, usize)>;

    /// Structural validity.
    ///
    /// # Errors
    ///
    /// A description of why the value is malformed.
    fn check_valid(&self) -> Result<(), String> {
        Ok(())
    }

    /// Statistics over the data, or `None` when reading it is not safe or
    /// cheap.
    fn numeric_summary(&self) -> Option<String> {
        None
    }

    /// One-line repr of a scalar.
    fn scalar_repr(&self) -> Option<String> {
        None
    }

    /// Fields shown in the expanded form.
    fn fields(&self) -> Vec<(String, Value)> {
        Vec::new()
    }
}

/// The summary line of an array. Data is only read if `inspect_data`.
#[must_use]
pub fn array_summary(adapter: &dyn ArrayAdapter, inspect_data: bool) -> String {
    let positional = adapter.positional_shape();
    let named = adapter.named_shape();

    if inspect_data && positional.is_empty() && named.is_empty() {
        if let Some(repr) = adapter.scalar_repr().filter(|r| !r.contains('\n')) {
            return repr;
        }
    }

    let mut out = String::new();
    out.push_str(adapter.dtype());
    out.push('(');
    for (i, size) in positional.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&size.to_string());
    }
    if !positional.is_empty() {
        out.push_str(" |");
    } else if !named.is_empty() {
        out.push('|');
    }
    for (i, (name, size)) in named.iter().enumerate() {
        out.push_str(if i > 0 { ", " } else { " " });
        out.push_str(&format!("{}:{}", name, size));
    }
    out.push(')');

    if inspect_data {
        if let Some(summary) = adapter.numeric_summary() {
            out.push(' ');
            out.push_str(&summary);
        }
    }
    out
}

fn array_label(adapter: &dyn ArrayAdapter, inspect_data: bool) -> Part {
    let summary = array_summary(adapter, inspect_data);
    summarizable_condition(
        abbreviation_color(text(format!(
            "<{} {} (wrapping {})>",
            adapter.type_name(),
            summary,
            adapter.contained_type()
        ))),
        siblings([
            maybe_qualified_type_name(&adapter.qualified_type_name()),
            text("("),
            when_expanded(comment_color(text(format!("  # {}", summary)))),
        ]),
    )
}

/// Renders any [`Value::Array`] as a collapsed summary with its fields
/// behind it.
#[derive(Debug, Clone, Copy)]
pub struct NamedArrayHandler;

impl NodeHandler for NamedArrayHandler {
    fn name(&self) -> &str {
        "named_array"
    }

    fn handle(
        &self,
        value: &Value,
        path: Option<&str>,
        subtree: &mut SubtreeRenderer<'_>,
    ) -> Result<HandlerResult, HandlerError> {
        let Value::Array(adapter) = value else {
            return Ok(HandlerResult::NotHandled);
        };
        adapter
            .check_valid()
            .map_err(|reason| HandlerError::InvalidValue {
                type_name: adapter.type_name().to_string(),
                reason,
            })?;

        let main_adapter = Rc::clone(adapter);
        let label = maybe_defer_rendering(
            subtree.config(),
            move || array_label(&*main_adapter, true),
            || array_label(&**adapter, false),
        );

        let children = field_children(&adapter.fields(), path, subtree);
        let detail = if children.is_empty() {
            text(")")
        } else {
            siblings([indented_children(children, CommaPolicy::SEPARATED), text(")")])
        };
        Ok(HandlerResult::Handled(build_custom_foldable_tree_node(
            label,
            summarizable_condition(empty(), detail),
            path,
            ExpandState::Collapsed,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Default)]
    struct Fake {
        positional: Vec<usize>,
        named: Vec<(String, usize)>,
        scalar: Option<String>,
        stats: Option<String>,
        reads: Cell<usize>,
    }

    impl ArrayAdapter for Fake {
        fn type_name(&self) -> &str {
            "NamedArray"
        }
        fn contained_type(&self) -> &str {
            "ndarray"
        }
        fn dtype(&self) -> &str {
            "float32"
        }
        fn positional_shape(&self) -> Vec<usize> {
            self.positional.clone()
        }
        fn named_shape(&self) -> Vec<(String, usize)> {
            self.named.clone()
        }
        fn numeric_summary(&self) -> Option<String> {
            self.reads.set(self.reads.get() + 1);
            self.stats.clone()
        }
        fn scalar_repr(&self) -> Option<String> {
            self.scalar.clone()
        }
    }

    fn named(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
        pairs.iter().map(|(n, s)| (n.to_string(), *s)).collect()
    }

    #[test]
    fn summary_separators() {
        let both = Fake {
            positional: vec![3, 4],
            named: named(&[("batch", 8), ("seq", 16)]),
            ..Fake::default()
        };
        assert_eq!(array_summary(&both, true), "float32(3, 4 | batch:8, seq:16)");

        let named_only = Fake {
            named: named(&[("batch", 8)]),
            ..Fake::default()
        };
        assert_eq!(array_summary(&named_only, true), "float32(| batch:8)");

        let positional_only = Fake {
            positional: vec![5],
            ..Fake::default()
        };
        assert_eq!(array_summary(&positional_only, true), "float32(5 |)");
    }

    #[test]
    fn numeric_summary_only_when_inspecting() {
        let array = Fake {
            positional: vec![2],
            stats: Some("\u{2248}0.5 \u{00B1}0.1".into()),
            ..Fake::default()
        };
        assert_eq!(array_summary(&array, false), "float32(2 |)");
        assert_eq!(array.reads.get(), 0);
        assert_eq!(array_summary(&array, true), "float32(2 |) \u{2248}0.5 \u{00B1}0.1");
        assert_eq!(array.reads.get(), 1);
    }

    #[test]
    fn scalars_use_their_repr() {
        let scalar = Fake {
            scalar: Some("3.5".into()),
            ..Fake::default()
        };
        assert_eq!(array_summary(&scalar, true), "3.5");
        assert_eq!(array_summary(&scalar, false), "float32()");

        let multiline = Fake {
            scalar: Some("a\nb".into()),
            ..Fake::default()
        };
        assert_eq!(array_summary(&multiline, true), "float32()");
    }
}
