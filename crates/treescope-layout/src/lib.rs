#![forbid(unsafe_code)]

//! Layout policies for treescope part trees.
//!
//! Foldable nodes created with [`ExpandState::Automatic`] start collapsed. A
//! [`LayoutPolicy`] walks the tree and records, for each automatic node,
//! whether it should start expanded. Explicit `Expanded` / `Collapsed` states
//! are never overridden by [`LayoutPolicy::Balanced`] or
//! [`LayoutPolicy::ToDepth`].
//!
//! - [`sites`] - foldable positions and their indentation
//! - [`balanced`] - expand over-wide nodes breadth-first under a height budget
//!
//! # Example
//! ```
//! use treescope_layout::{BalancedLayout, LayoutPolicy};
//! use treescope_parts::builders::{CommaPolicy, build_foldable_tree_node_from_children, text};
//! use treescope_parts::{ExpandState, RenderContext, TextOptions, render_to_text};
//!
//! let items: Vec<_> = (0..30).map(|i| text(format!("item{i}"))).collect();
//! let node = build_foldable_tree_node_from_children(
//!     text("["), items, text("]"), CommaPolicy::SEPARATED, None, ExpandState::Automatic,
//! );
//! let policy = LayoutPolicy::Balanced(BalancedLayout { max_height: 40, target_width: 60 });
//! let report = policy.apply(&node.renderable);
//! assert_eq!(report.expanded, 1);
//!
//! let out = render_to_text(&node.renderable, TextOptions::default(), &mut RenderContext::new());
//! assert!(out.unwrap().starts_with("[\n  item0,\n"));
//! ```

pub mod balanced;
pub mod sites;

use serde::{Deserialize, Serialize};
use treescope_core::RenderConfig;
use treescope_parts::{ExpandState, Part};

pub use balanced::{BalancedLayout, expand_for_balanced_layout};
pub use sites::{
    FoldableSite, INDENT_STEP, child_sites, foldable_sites, newlines_outside_foldables, own_newlines,
};

/// Summary of one policy run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutReport {
    /// Automatic nodes resolved as expanded.
    pub expanded: usize,
    /// Breadth-first levels visited.
    pub levels: usize,
    /// Estimated line count of the resulting text rendering.
    pub height: usize,
}

/// How automatic foldables are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum LayoutPolicy {
    /// Expand nodes wider than the target width, level by level, while the
    /// height budget allows.
    Balanced(BalancedLayout),
    /// Expand automatic nodes nested fewer than `depth` foldables deep.
    ToDepth { depth: usize },
    /// Set every node to `Expanded`.
    ExpandAll,
    /// Set every node to `Collapsed`.
    CollapseAll,
}

impl LayoutPolicy {
    /// The balanced policy for a render configuration.
    #[must_use]
    pub fn from_config(config: &RenderConfig) -> Self {
        Self::Balanced(BalancedLayout::from(config))
    }

    /// Resolve the foldables under `root`.
    pub fn apply(&self, root: &Part) -> LayoutReport {
        match self {
            Self::Balanced(layout) => expand_for_balanced_layout(root, layout),
            Self::ToDepth { depth } => expand_to_depth(root, *depth),
            Self::ExpandAll => set_all_expand_states(root, ExpandState::Expanded),
            Self::CollapseAll => set_all_expand_states(root, ExpandState::Collapsed),
        }
    }
}

/// Resolve automatic nodes fewer than `depth` foldables deep as expanded and
/// the rest as collapsed.
pub fn expand_to_depth(root: &Part, depth: usize) -> LayoutReport {
    let mut report = LayoutReport::default();
    let mut frontier = foldable_sites(root, 0);
    let mut level = 0;
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for site in &frontier {
            let expand = level < depth;
            site.node.resolve_automatic(expand);
            if expand && site.node.expand_state() == ExpandState::Automatic {
                report.expanded += 1;
            }
            next.extend(child_sites(site));
        }
        frontier = next;
        level += 1;
    }
    report.levels = level;
    treescope_core::debug!(depth, expanded = report.expanded, "expanded to depth");
    report
}

/// Set the explicit state of every foldable under `root`.
pub fn set_all_expand_states(root: &Part, state: ExpandState) -> LayoutReport {
    let nodes = root.all_foldables();
    for node in &nodes {
        node.set_expand_state(state);
    }
    LayoutReport {
        expanded: if state == ExpandState::Expanded {
            nodes.len()
        } else {
            0
        },
        levels: 0,
        height: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treescope_parts::builders::{CommaPolicy, build_foldable_tree_node_from_children, text};
    use treescope_parts::{LineItem, RenderContext, TextOptions, render_to_text};

    fn nested(depth: usize) -> LineItem {
        if depth == 0 {
            return LineItem::new(text("0"));
        }
        build_foldable_tree_node_from_children(
            text("["),
            [nested(depth - 1), nested(depth - 1)],
            text("]"),
            CommaPolicy::SEPARATED,
            None,
            ExpandState::Automatic,
        )
    }

    fn render(part: &Part) -> String {
        render_to_text(part, TextOptions::default(), &mut RenderContext::new()).unwrap()
    }

    #[test]
    fn to_depth_expands_outer_levels() {
        let root = nested(2).renderable;
        let report = expand_to_depth(&root, 1);
        assert_eq!(report.expanded, 1);
        assert_eq!(report.levels, 2);
        assert_eq!(render(&root), "[\n  [0, 0],\n  [0, 0],\n]");

        let report = expand_to_depth(&root, 0);
        assert_eq!(report.expanded, 0);
        assert_eq!(render(&root), "[[0, 0], [0, 0]]");
    }

    #[test]
    fn to_depth_leaves_explicit_states() {
        let root = nested(2).renderable;
        root.foldables()[0].set_expand_state(ExpandState::Collapsed);
        let report = expand_to_depth(&root, 5);
        assert_eq!(report.expanded, 2);
        assert_eq!(render(&root), "[[0, 0], [0, 0]]");
    }

    #[test]
    fn expand_and_collapse_all() {
        let root = nested(2).renderable;
        let report = LayoutPolicy::ExpandAll.apply(&root);
        assert_eq!(report.expanded, 3);
        assert_eq!(
            render(&root),
            "[\n  [\n    0,\n    0,\n  ],\n  [\n    0,\n    0,\n  ],\n]"
        );
        LayoutPolicy::CollapseAll.apply(&root);
        assert_eq!(render(&root), "[[0, 0], [0, 0]]");
    }

    #[test]
    fn policy_serializes_with_tag() {
        let policy = LayoutPolicy::ToDepth { depth: 2 };
        let json = serde_json::to_string(&policy).unwrap();
        assert_eq!(json, r#"{"policy":"to_depth","depth":2}"#);
        let back: LayoutPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }
}
