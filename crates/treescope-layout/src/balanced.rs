#![forbid(unsafe_code)]

//! Balanced layout.
//!
//! Automatic foldables are visited breadth-first. A node is expanded when its
//! collapsed rendering would overflow the target width at its indentation,
//! and only while the estimated output height stays within the budget. The
//! outermost level is exempt from the budget: a root that does not fit on one
//! line is always expanded.

use serde::{Deserialize, Serialize};
use treescope_core::RenderConfig;
use treescope_parts::{ExpandState, Part};

use crate::LayoutReport;
use crate::sites::{FoldableSite, child_sites, foldable_sites, newlines_outside_foldables, own_newlines};

/// Budget for [`expand_for_balanced_layout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalancedLayout {
    /// Number of lines the output may grow to.
    pub max_height: usize,
    /// Preferred maximum line width.
    pub target_width: usize,
}

impl Default for BalancedLayout {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

impl From<&RenderConfig> for BalancedLayout {
    fn from(config: &RenderConfig) -> Self {
        Self {
            max_height: config.max_height,
            target_width: config.target_width,
        }
    }
}

impl BalancedLayout {
    fn overflows(&self, site: &FoldableSite) -> bool {
        let label = site.node.label().collapsed_width();
        let contents = site.node.contents().collapsed_width();
        match label.and_then(|l| contents.map(|c| l + c)) {
            Ok(width) => site.indent + width > self.target_width,
            // Content that cannot be shown on one line never fits.
            Err(_) => true,
        }
    }
}

/// Resolve every automatic foldable under `root` for a balanced layout.
///
/// Previous decisions are discarded first, so the policy can be re-run after
/// the budget changes.
pub fn expand_for_balanced_layout(root: &Part, layout: &BalancedLayout) -> LayoutReport {
    for node in root.all_foldables() {
        node.resolve_automatic(false);
    }

    let mut report = LayoutReport {
        height: 1 + newlines_outside_foldables(root),
        ..LayoutReport::default()
    };
    let mut frontier = foldable_sites(root, 0);
    // Once one node misses the budget, later automatic nodes stay collapsed.
    // Explicit nodes are still walked so the height stays exact.
    let mut exhausted = false;

    while !frontier.is_empty() {
        let level = report.levels;
        report.levels += 1;
        let mut next = Vec::new();
        for site in frontier {
            match site.node.expand_state() {
                ExpandState::Collapsed => continue,
                ExpandState::Expanded => {
                    report.height += own_newlines(&site);
                }
                ExpandState::Automatic => {
                    if exhausted || !layout.overflows(&site) {
                        continue;
                    }
                    let cost = own_newlines(&site);
                    if level > 0 && report.height + cost > layout.max_height {
                        treescope_core::debug!(
                            level,
                            height = report.height,
                            cost,
                            max_height = layout.max_height,
                            "balanced layout height budget exhausted"
                        );
                        exhausted = true;
                        continue;
                    }
                    site.node.resolve_automatic(true);
                    report.expanded += 1;
                    report.height += cost;
                }
            }
            next.extend(child_sites(&site));
        }
        frontier = next;
    }

    treescope_core::debug!(
        expanded = report.expanded,
        levels = report.levels,
        height = report.height,
        "balanced layout resolved"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use treescope_parts::builders::{
        CommaPolicy, build_foldable_tree_node_from_children, siblings, text,
    };
    use treescope_parts::{LineItem, RenderContext, TextOptions, render_to_text};

    fn list(items: impl IntoIterator<Item = LineItem>) -> LineItem {
        build_foldable_tree_node_from_children(
            text("["),
            items,
            text("]"),
            CommaPolicy::SEPARATED,
            None,
            ExpandState::Automatic,
        )
    }

    fn numbers(n: usize) -> LineItem {
        list((0..n).map(|i| LineItem::new(text(format!("{i:04}")))))
    }

    fn render(part: &Part) -> String {
        render_to_text(part, TextOptions::default(), &mut RenderContext::new()).unwrap()
    }

    fn layout(max_height: usize, target_width: usize) -> BalancedLayout {
        BalancedLayout {
            max_height,
            target_width,
        }
    }

    #[test]
    fn narrow_values_stay_collapsed() {
        let root = numbers(3).renderable;
        let report = expand_for_balanced_layout(&root, &BalancedLayout::default());
        assert_eq!(report.expanded, 0);
        assert_eq!(report.height, 1);
        assert_eq!(render(&root), "[0000, 0001, 0002]");
    }

    #[test]
    fn wide_root_expands_even_over_budget() {
        let root = numbers(10).renderable;
        let report = expand_for_balanced_layout(&root, &layout(3, 20));
        assert_eq!(report.expanded, 1);
        assert_eq!(report.height, 12);
        assert!(render(&root).starts_with("[\n  0000,\n  0001,\n"));
    }

    #[test]
    fn inner_levels_respect_height_budget() {
        let root = list([numbers(8), numbers(8)]).renderable;
        // The root needs three lines, each child nine more.
        let report = expand_for_balanced_layout(&root, &layout(14, 30));
        assert_eq!(report.expanded, 2);
        assert_eq!(report.height, 13);
        let out = render(&root);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[1], "  [");
        assert!(lines.last().is_some_and(|l| l.starts_with(']')));
        assert!(out.contains("[0000, 0001, 0002, 0003, 0004, 0005, 0006, 0007],"));
    }

    #[test]
    fn explicit_states_are_respected() {
        let inner = numbers(20);
        let root = list([inner.clone()]).renderable;
        inner.renderable.foldables()[0].set_expand_state(ExpandState::Collapsed);
        let report = expand_for_balanced_layout(&root, &layout(100, 40));
        assert_eq!(report.expanded, 1);
        assert!(!inner.renderable.foldables()[0].is_expanded());

        root.foldables()[0].set_expand_state(ExpandState::Collapsed);
        let report = expand_for_balanced_layout(&root, &layout(100, 40));
        assert_eq!(report.expanded, 0);
        assert!(!render(&root).contains('\n'));
    }

    #[test]
    fn rerun_rediscovers_decisions() {
        let root = numbers(10).renderable;
        expand_for_balanced_layout(&root, &layout(20, 20));
        assert!(root.foldables()[0].is_expanded());
        expand_for_balanced_layout(&root, &layout(20, 200));
        assert!(!root.foldables()[0].is_expanded());
        assert_eq!(root.foldables()[0].expand_state(), ExpandState::Automatic);
    }

    #[test]
    fn text_outside_foldables_counts_toward_height() {
        let root = siblings([text("a\nb\nc"), numbers(2).renderable]);
        let report = expand_for_balanced_layout(&root, &BalancedLayout::default());
        assert_eq!(report.height, 3);
    }
}
