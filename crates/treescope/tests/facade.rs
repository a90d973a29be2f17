use treescope::prelude::*;
use treescope::{ConfigError, PartError};

#[test]
fn one_call_helpers() {
    let value = Value::dict([(Value::str("a"), Value::tuple([Value::int(1)]))]);
    assert_eq!(treescope::render_to_text(&value).unwrap(), r#"{"a": (1,)}"#);
    assert!(treescope::render_to_html(&value).starts_with("<div class=\"treescope_root\">"));
}

#[test]
fn errors_convert_and_display() {
    let err: Error = ConfigError::ZeroValue {
        field: "target_width",
    }
    .into();
    assert_eq!(err.to_string(), "target_width must be greater than zero");
    assert!(std::error::Error::source(&err).is_some());

    let err: Error = PartError::NewlineInCollapsedRender { text: "a\nb".into() }.into();
    assert!(matches!(err, Error::Part(_)));
}

#[test]
fn multiline_literals_report_part_errors() {
    // A handler emitting a raw line break inside a collapsed list.
    let mut renderer = Renderer::default();
    renderer.registry_mut().register(
        "int",
        treescope::handler_fn(
            "raw",
            |_: &Value, path: Option<&str>, _: &mut treescope::SubtreeRenderer<'_>| {
                Ok(treescope::HandlerResult::Handled(
                    parts::builders::build_one_line_tree_node(parts::builders::text("1\n2"), path),
                ))
            },
        ),
    );
    let renderer = renderer.with_layout(LayoutPolicy::CollapseAll);
    let value = Value::list([Value::int(1)]);
    let result: Result<String> = renderer.render_to_text(&value).map_err(Error::from);
    assert!(matches!(
        result,
        Err(Error::Part(PartError::NewlineInCollapsedRender { .. }))
    ));
}

#[test]
fn prelude_exposes_layout_policies() {
    let value = Value::list([Value::list([Value::int(1)])]);
    let renderer = Renderer::new(RenderConfig::default()).with_layout(LayoutPolicy::ExpandAll);
    assert_eq!(renderer.render_to_text(&value).unwrap(), "[\n  [\n    1,\n  ],\n]");
}
