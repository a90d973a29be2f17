//! End-to-end rendering of values through the default registry.

use proptest::prelude::*;
use serde_json::json;
use treescope_core::RenderConfig;
use treescope_layout::LayoutPolicy;
use treescope_render::{ArrayAdapter, Renderer, Value};

// =============================================================================
// Fixtures
// =============================================================================

struct NamedArray {
    positional: Vec<usize>,
    named: Vec<(String, usize)>,
    valid: bool,
}

impl NamedArray {
    fn new(positional: &[usize], named: &[(&str, usize)]) -> Self {
        Self {
            positional: positional.to_vec(),
            named: named.iter().map(|(n, s)| (n.to_string(), *s)).collect(),
            valid: true,
        }
    }
}

impl ArrayAdapter for NamedArray {
    fn type_name(&self) -> &str {
        "NamedArray"
    }
    fn qualified_type_name(&self) -> String {
        "axes.NamedArray".into()
    }
    fn contained_type(&self) -> &str {
        "ndarray"
    }
    fn dtype(&self) -> &str {
        "int32"
    }
    fn positional_shape(&self) -> Vec<usize> {
        self.positional.clone()
    }
    fn named_shape(&self) -> Vec<(String, usize)> {
        self.named.clone()
    }
    fn check_valid(&self) -> Result<(), String> {
        if self.valid {
            Ok(())
        } else {
            Err("axis names do not match the data".into())
        }
    }
    fn numeric_summary(&self) -> Option<String> {
        Some("\u{2248}1.5".into())
    }
    fn fields(&self) -> Vec<(String, Value)> {
        vec![
            ("data_array".into(), Value::str("<buffer>")),
            (
                "names".into(),
                Value::tuple(self.named.iter().map(|(n, _)| Value::str(n.as_str()))),
            ),
        ]
    }
}

fn text(renderer: &Renderer, value: &Value) -> String {
    renderer.render_to_text(value).expect("renders")
}

// =============================================================================
// Literals and roundtrip
// =============================================================================

#[test]
fn readme_example() {
    let value = Value::list([Value::int(1), Value::int(2), Value::str("three")]);
    let out = Renderer::new(RenderConfig::default()).render_to_text(&value).unwrap();
    assert_eq!(out, r#"[1, 2, "three"]"#);
}

fn arb_literal() -> impl Strategy<Value = (Value, serde_json::Value)> {
    let leaf = prop_oneof![
        any::<i32>().prop_map(|i| (Value::int(i64::from(i)), json!(i))),
        "[ -~\u{e9}\n\t]{0,12}".prop_map(|s| (Value::str(s.as_str()), json!(s))),
    ];
    leaf.prop_recursive(3, 32, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(|items| {
                let (values, json): (Vec<_>, Vec<_>) = items.into_iter().unzip();
                (Value::list(values), serde_json::Value::Array(json))
            }),
            prop::collection::btree_map("[a-z]{1,4}", inner, 0..4).prop_map(|entries| {
                let mut object = serde_json::Map::new();
                let mut pairs = Vec::new();
                for (key, (value, json)) in entries {
                    object.insert(key.clone(), json);
                    pairs.push((Value::str(key.as_str()), value));
                }
                (Value::dict(pairs), serde_json::Value::Object(object))
            }),
        ]
    })
}

proptest! {
    #[test]
    fn roundtrip_text_reads_back_as_the_same_literal((value, expected) in arb_literal()) {
        let renderer = Renderer::new(RenderConfig::default().with_roundtrip(true))
            .with_layout(LayoutPolicy::CollapseAll);
        let out = text(&renderer, &value);
        let parsed: serde_json::Value = serde_json::from_str(&out).expect("literal syntax");
        prop_assert_eq!(parsed, expected);
    }

    #[test]
    fn rendering_twice_is_identical((value, _) in arb_literal(), width in 5usize..60) {
        let renderer = Renderer::new(RenderConfig::default().with_target_width(width));
        prop_assert_eq!(text(&renderer, &value), text(&renderer, &value));
        prop_assert_eq!(renderer.render_to_html(&value), renderer.render_to_html(&value));
    }
}

#[test]
fn expanded_output_reindents_nested_values() {
    let value = Value::dict([(
        Value::str("rows"),
        Value::list([
            Value::list((0..6).map(Value::int)),
            Value::list((6..12).map(Value::int)),
        ]),
    )]);
    let renderer = Renderer::new(RenderConfig::default().with_target_width(30));
    assert_eq!(
        text(&renderer, &value),
        "{\n  \"rows\": [\n    [0, 1, 2, 3, 4, 5],\n    [6, 7, 8, 9, 10, 11],\n  ],\n}"
    );
}

// =============================================================================
// Expanded roundtrip output
// =============================================================================

fn expanded_roundtrip() -> Renderer {
    Renderer::new(RenderConfig::default().with_roundtrip(true))
        .with_layout(LayoutPolicy::ExpandAll)
}

#[test]
fn expanded_roundtrip_notes_shared_lists_after_the_comma() {
    let shared = Value::list([Value::int(1)]);
    let value = Value::list([shared.clone(), shared]);
    let expected = [
        "[",
        "  [",
        "    1,",
        "  ],",
        "  [",
        "    1,",
        "  ],  # Repeated list (seen 2 times in this tree)",
        "]",
    ]
    .join("\n");
    assert_eq!(text(&expanded_roundtrip(), &value), expected);
}

#[test]
fn expanded_roundtrip_splits_multiline_strings_into_adjacent_literals() {
    let value = Value::dict([(Value::str("text"), Value::str("one\ntwo"))]);
    let expected = [
        "{",
        "  \"text\": (",
        "    \"one\\n\"",
        "    \"two\"",
        "  ),",
        "}",
    ]
    .join("\n");
    assert_eq!(text(&expanded_roundtrip(), &value), expected);
}

#[test]
fn expanded_roundtrip_named_array_is_a_qualified_call() {
    let value = Value::array(NamedArray::new(&[2], &[("batch", 8)]));
    let expected = [
        "axes.NamedArray(  # int32(2 | batch:8) \u{2248}1.5",
        "  data_array=\"<buffer>\",",
        "  names=(",
        "    \"batch\",",
        "  ),",
        ")",
    ]
    .join("\n");
    assert_eq!(text(&expanded_roundtrip(), &value), expected);
}

// =============================================================================
// Arrays
// =============================================================================

#[test]
fn named_arrays_start_collapsed_with_summary() {
    let value = Value::array(NamedArray::new(&[3], &[("batch", 8)]));
    let renderer = Renderer::default();
    assert_eq!(
        text(&renderer, &value),
        "<NamedArray int32(3 | batch:8) \u{2248}1.5 (wrapping ndarray)>"
    );
}

#[test]
fn named_arrays_in_roundtrip_mode_show_fields() {
    let value = Value::array(NamedArray::new(&[], &[("batch", 8)]));
    let renderer = Renderer::new(RenderConfig::default().with_roundtrip(true));
    assert_eq!(
        text(&renderer, &value),
        r#"axes.NamedArray(data_array="<buffer>", names=("batch",))"#
    );
}

#[test]
fn expanded_named_array_comments_its_summary() {
    let value = Value::array(NamedArray::new(&[2], &[]));
    let renderer = Renderer::default().with_layout(LayoutPolicy::ExpandAll);
    assert_eq!(
        text(&renderer, &value),
        "NamedArray(  # int32(2 |) \u{2248}1.5\n  data_array=\"<buffer>\",\n  names=(),\n)"
    );
}

#[test]
fn invalid_arrays_fall_back_to_generic_repr() {
    let mut array = NamedArray::new(&[2], &[]);
    array.valid = false;
    let out = text(&Renderer::default(), &Value::array(array));
    assert_eq!(out, "<NamedArray object>");
}

#[test]
fn shared_arrays_are_not_flagged() {
    let array = Value::array(NamedArray::new(&[2], &[]));
    let value = Value::list([array.clone(), array]);
    let renderer = Renderer::default().with_layout(LayoutPolicy::ExpandAll);
    assert!(!text(&renderer, &value).contains("Repeated"));
}

#[test]
fn streamed_html_defers_array_labels() {
    let config = RenderConfig {
        stream_deferred: true,
        ..RenderConfig::default()
    };
    let html = Renderer::new(config).render_to_html(&Value::array(NamedArray::new(&[4], &[])));
    let body_end = html.find("</div></div>").expect("body");
    let placeholder = html.find("id=\"treescope_deferred_0\"").expect("slot");
    let template = html
        .find("<template class=\"treescope_deferred\" data-target=\"treescope_deferred_0\">")
        .expect("template");
    assert!(placeholder < body_end && body_end < template);
    // Only the streamed label reads the data.
    assert!(!html[..body_end].contains("\u{2248}1.5"));
    assert!(html[template..].contains("\u{2248}1.5"));
}

#[test]
fn eager_labels_without_deferral() {
    let config = RenderConfig {
        defer_summaries: false,
        stream_deferred: true,
        ..RenderConfig::default()
    };
    let html = Renderer::new(config).render_to_html(&Value::array(NamedArray::new(&[4], &[])));
    assert!(!html.contains("<template"));
    assert!(html.contains("\u{2248}1.5"));
}
