#![forbid(unsafe_code)]

//! Handlers for the built-in value types.
//!
//! Literals render the way they would be written in source, so that roundtrip
//! output of plain data (numbers, strings, lists, dicts) reads back as the
//! same value.

use treescope_parts::builders::{
    CommaPolicy, abbreviation_color, build_custom_foldable_tree_node,
    build_foldable_tree_node_from_children, build_one_line_tree_node, fold_condition,
    indented_children, maybe_qualified_type_name, roundtrip_condition, siblings,
    siblings_with_annotations, summarizable_condition, text, when_expanded,
};
use treescope_parts::{ExpandState, LineItem, Part};
use treescope_text::{cached_width, truncate_with_ellipsis};

use crate::array::NamedArrayHandler;
use crate::handler::{HandlerError, HandlerResult, NodeHandler, SubtreeRenderer};
use crate::registry::{Integration, OBJECT_TYPE, Registry};
use crate::value::{ARRAY_TYPE, Value};

/// Handlers for literals, strings, sequences, dicts, records, and arrays.
pub const BUILTINS: Integration = Integration {
    name: "builtins",
    setup: install,
};

/// Integrations every renderer starts with.
pub const DEFAULT_INTEGRATIONS: [Integration; 1] = [BUILTINS];

fn install(registry: &mut Registry) {
    for key in ["NoneType", "bool", "int", "float"] {
        registry.register(key, LiteralHandler);
    }
    registry.register("str", StringHandler);
    registry.register("list", SequenceHandler);
    registry.register("tuple", SequenceHandler);
    registry.register("dict", DictHandler);
    registry.register(OBJECT_TYPE, RecordHandler);
    registry.register(ARRAY_TYPE, NamedArrayHandler);
    registry.mark_immutable(ARRAY_TYPE);
}

/// Child path for an item or field, if the parent has a path.
fn child_path(path: Option<&str>, suffix: &str) -> Option<String> {
    path.map(|p| format!("{}{}", p, suffix))
}

/// `value` as a quoted string literal.
pub fn quote_str(value: &str) -> Result<String, HandlerError> {
    serde_json::to_string(value).map_err(|e| HandlerError::Format(e.to_string()))
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

/// `None`, booleans, and numbers.
#[derive(Debug, Clone, Copy)]
pub struct LiteralHandler;

impl NodeHandler for LiteralHandler {
    fn name(&self) -> &str {
        "literal"
    }

    fn handle(
        &self,
        value: &Value,
        path: Option<&str>,
        _subtree: &mut SubtreeRenderer<'_>,
    ) -> Result<HandlerResult, HandlerError> {
        let part = match value {
            Value::None => text("None"),
            Value::Bool(true) => text("True"),
            Value::Bool(false) => text("False"),
            Value::Int(i) => text(i.to_string()),
            Value::Float(x) => float_literal(*x),
            _ => return Ok(HandlerResult::NotHandled),
        };
        Ok(HandlerResult::Handled(build_one_line_tree_node(part, path)))
    }
}

fn float_literal(x: f64) -> Part {
    if x.is_finite() {
        return text(format!("{:?}", x));
    }
    let name = if x.is_nan() {
        "nan"
    } else if x > 0.0 {
        "inf"
    } else {
        "-inf"
    };
    roundtrip_condition(text(format!("float('{}')", name)), text(name))
}

// ---------------------------------------------------------------------------
// Strings
// ---------------------------------------------------------------------------

/// Quoted strings. Multi-line strings expand into one literal per line.
#[derive(Debug, Clone, Copy)]
pub struct StringHandler;

/// Single-line strings wider than this are abbreviated under a collapsed
/// parent.
pub const LONG_STRING_WIDTH: usize = 60;

impl NodeHandler for StringHandler {
    fn name(&self) -> &str {
        "str"
    }

    fn handle(
        &self,
        value: &Value,
        path: Option<&str>,
        _subtree: &mut SubtreeRenderer<'_>,
    ) -> Result<HandlerResult, HandlerError> {
        let Value::Str(s) = value else {
            return Ok(HandlerResult::NotHandled);
        };
        let whole = quote_str(s)?;
        let lines: Vec<&str> = s.split_inclusive('\n').collect();
        if lines.len() < 2 {
            let part = if cached_width(&whole) > LONG_STRING_WIDTH {
                let short = truncate_with_ellipsis(&whole, LONG_STRING_WIDTH, "\u{2026}");
                summarizable_condition(abbreviation_color(text(short)), text(whole))
            } else {
                text(whole)
            };
            return Ok(HandlerResult::Handled(build_one_line_tree_node(part, path)));
        }
        let line_literals = lines
            .into_iter()
            .map(|line| quote_str(line).map(text))
            .collect::<Result<Vec<Part>, _>>()?;
        // Adjacent literals concatenate, so the expanded form stays valid.
        let label = fold_condition(text(whole), text("("));
        let contents = when_expanded(siblings([
            indented_children(line_literals, CommaPolicy::NONE),
            text(")"),
        ]));
        Ok(HandlerResult::Handled(build_custom_foldable_tree_node(
            label,
            contents,
            path,
            ExpandState::Automatic,
        )))
    }
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Lists and tuples.
#[derive(Debug, Clone, Copy)]
pub struct SequenceHandler;

impl NodeHandler for SequenceHandler {
    fn name(&self) -> &str {
        "sequence"
    }

    fn handle(
        &self,
        value: &Value,
        path: Option<&str>,
        subtree: &mut SubtreeRenderer<'_>,
    ) -> Result<HandlerResult, HandlerError> {
        let (items, open, close, commas) = match value {
            Value::List(items) => (items.borrow().clone(), "[", "]", CommaPolicy::SEPARATED),
            Value::Tuple(items) => {
                // A one-element tuple needs its trailing comma.
                let commas = if items.len() == 1 {
                    CommaPolicy::TRAILING
                } else {
                    CommaPolicy::SEPARATED
                };
                (items.to_vec(), "(", ")", commas)
            }
            _ => return Ok(HandlerResult::NotHandled),
        };
        let children: Vec<LineItem> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let item_path = child_path(path, &format!("[{}]", i));
                subtree.render(item, item_path.as_deref())
            })
            .collect();
        Ok(HandlerResult::Handled(build_foldable_tree_node_from_children(
            text(open),
            children,
            text(close),
            commas,
            path,
            ExpandState::Automatic,
        )))
    }
}

/// Dicts, rendered as `{key: value, ...}`.
#[derive(Debug, Clone, Copy)]
pub struct DictHandler;

impl NodeHandler for DictHandler {
    fn name(&self) -> &str {
        "dict"
    }

    fn handle(
        &self,
        value: &Value,
        path: Option<&str>,
        subtree: &mut SubtreeRenderer<'_>,
    ) -> Result<HandlerResult, HandlerError> {
        let Value::Dict(entries) = value else {
            return Ok(HandlerResult::NotHandled);
        };
        let entries = entries.borrow().clone();
        let mut children = Vec::with_capacity(entries.len());
        for (key, item) in &entries {
            let key_line = subtree.render(key, None);
            let item_path = match (path, key_suffix(key)?) {
                (Some(p), Some(suffix)) => Some(format!("{}{}", p, suffix)),
                _ => None,
            };
            let item_line = subtree.render(item, item_path.as_deref());
            children.push(siblings_with_annotations(
                [key_line, LineItem::from(": "), item_line],
                Vec::new(),
            ));
        }
        Ok(HandlerResult::Handled(build_foldable_tree_node_from_children(
            text("{"),
            children,
            text("}"),
            CommaPolicy::SEPARATED,
            path,
            ExpandState::Automatic,
        )))
    }
}

/// Index suffix for a dict key, when the key is a literal that can be written
/// in a path.
fn key_suffix(key: &Value) -> Result<Option<String>, HandlerError> {
    Ok(match key {
        Value::Str(s) => Some(format!("[{}]", quote_str(s)?)),
        Value::Int(i) => Some(format!("[{}]", i)),
        Value::Bool(b) => Some(format!("[{}]", if *b { "True" } else { "False" })),
        _ => None,
    })
}

/// Records, rendered as `Type(field=value, ...)`.
#[derive(Debug, Clone, Copy)]
pub struct RecordHandler;

impl NodeHandler for RecordHandler {
    fn name(&self) -> &str {
        "record"
    }

    fn handle(
        &self,
        value: &Value,
        path: Option<&str>,
        subtree: &mut SubtreeRenderer<'_>,
    ) -> Result<HandlerResult, HandlerError> {
        let Value::Record(record) = value else {
            return Ok(HandlerResult::NotHandled);
        };
        let children = field_children(&record.fields(), path, subtree);
        Ok(HandlerResult::Handled(build_foldable_tree_node_from_children(
            siblings([maybe_qualified_type_name(record.type_name()), text("(")]),
            children,
            text(")"),
            CommaPolicy::SEPARATED,
            path,
            ExpandState::Automatic,
        )))
    }
}

/// `name=value` lines for named fields.
pub fn field_children(
    fields: &[(String, Value)],
    path: Option<&str>,
    subtree: &mut SubtreeRenderer<'_>,
) -> Vec<LineItem> {
    fields
        .iter()
        .map(|(name, field)| {
            let field_path = child_path(path, &format!(".{}", name));
            let line = subtree.render(field, field_path.as_deref());
            siblings_with_annotations([LineItem::new(text(format!("{}=", name))), line], Vec::new())
        })
        .collect()
}
