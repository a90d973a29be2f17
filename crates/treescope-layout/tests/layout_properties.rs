//! Property tests: the balanced layout's height estimate and width rule,
//! checked against the text emitter.

use proptest::prelude::*;
use treescope_layout::{BalancedLayout, LayoutPolicy, expand_for_balanced_layout};
use treescope_parts::builders::{CommaPolicy, build_foldable_tree_node_from_children, text};
use treescope_parts::{ExpandState, LineItem, Part, RenderContext, TextOptions, render_to_text};

#[derive(Debug, Clone)]
enum Shape {
    Leaf(u16),
    List(ExpandState, Vec<Shape>),
}

fn arb_state() -> impl Strategy<Value = ExpandState> {
    prop_oneof![
        6 => Just(ExpandState::Automatic),
        1 => Just(ExpandState::Expanded),
        1 => Just(ExpandState::Collapsed),
    ]
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    any::<u16>().prop_map(Shape::Leaf).prop_recursive(4, 64, 6, |inner| {
        (arb_state(), prop::collection::vec(inner, 0..6))
            .prop_map(|(state, children)| Shape::List(state, children))
    })
}

fn build(shape: &Shape) -> LineItem {
    match shape {
        Shape::Leaf(n) => LineItem::new(text(n.to_string())),
        Shape::List(state, children) => build_foldable_tree_node_from_children(
            text("["),
            children.iter().map(build).collect::<Vec<_>>(),
            text("]"),
            CommaPolicy::SEPARATED,
            None,
            *state,
        ),
    }
}

fn render(part: &Part) -> String {
    render_to_text(part, TextOptions::default(), &mut RenderContext::new())
        .expect("no line breaks in literals")
}

proptest! {
    #[test]
    fn height_estimate_matches_rendered_lines(
        shape in arb_shape(),
        max_height in 1usize..40,
        target_width in 4usize..60,
    ) {
        let root = build(&shape).renderable;
        let report = expand_for_balanced_layout(&root, &BalancedLayout { max_height, target_width });
        let out = render(&root);
        prop_assert_eq!(report.height, out.matches('\n').count() + 1);
    }

    #[test]
    fn fitting_roots_stay_on_one_line(shape in arb_shape()) {
        let root = build(&shape).renderable;
        let width = root.collapsed_width().expect("single-line literals");
        let all_automatic = root
            .all_foldables()
            .iter()
            .all(|node| node.expand_state() == ExpandState::Automatic);
        prop_assume!(all_automatic);
        let layout = BalancedLayout { max_height: 1000, target_width: width };
        expand_for_balanced_layout(&root, &layout);
        prop_assert!(!render(&root).contains('\n'));
    }

    #[test]
    fn collapse_all_then_expand_all(shape in arb_shape()) {
        let root = build(&shape).renderable;
        LayoutPolicy::CollapseAll.apply(&root);
        prop_assert!(!render(&root).contains('\n'));
        LayoutPolicy::ExpandAll.apply(&root);
        let expected = root.newlines_in_expanded_parent();
        prop_assert_eq!(render(&root).matches('\n').count(), expected);
    }
}
