#![forbid(unsafe_code)]

//! Foldable sites: the outermost foldables of a part, with the column their
//! contents start at.
//!
//! The walk follows the same branches as [`Part::foldables`] (the branch shown
//! when the parent is expanded), so the sites of a part are exactly its
//! foldable descendants in document order.

use treescope_parts::{Foldable, Part, PartKind};

/// Columns added by each level of indented children.
pub const INDENT_STEP: usize = 2;

/// A foldable node and the indentation of the line it starts on.
#[derive(Debug, Clone)]
pub struct FoldableSite {
    pub node: Foldable,
    pub indent: usize,
}

/// Outermost foldables of `part`, rendered starting at `indent`.
#[must_use]
pub fn foldable_sites(part: &Part, indent: usize) -> Vec<FoldableSite> {
    let mut out = Vec::new();
    collect(part, indent, &mut out);
    out
}

/// Foldables directly nested in a site's label and contents.
#[must_use]
pub fn child_sites(site: &FoldableSite) -> Vec<FoldableSite> {
    let mut out = Vec::new();
    collect(site.node.label(), site.indent, &mut out);
    collect(site.node.contents(), site.indent, &mut out);
    out
}

/// Line breaks a site contributes when expanded, excluding those owned by its
/// nested foldables.
#[must_use]
pub fn own_newlines(site: &FoldableSite) -> usize {
    let total = site.node.label().newlines_in_expanded_parent()
        + site.node.contents().newlines_in_expanded_parent();
    let nested: usize = child_sites(site)
        .iter()
        .map(|child| site_newlines(&child.node))
        .sum();
    total.saturating_sub(nested)
}

/// Line breaks `part` contributes when every foldable in it is collapsed.
#[must_use]
pub fn newlines_outside_foldables(part: &Part) -> usize {
    let nested: usize = part.foldables().iter().map(site_newlines).sum();
    part.newlines_in_expanded_parent().saturating_sub(nested)
}

fn site_newlines(node: &Foldable) -> usize {
    node.label().newlines_in_expanded_parent() + node.contents().newlines_in_expanded_parent()
}

fn collect(part: &Part, indent: usize, out: &mut Vec<FoldableSite>) {
    // Parts without foldables are skipped without a walk.
    if part.foldables().is_empty() {
        return;
    }
    match part.kind() {
        PartKind::Empty
        | PartKind::Text(_)
        | PartKind::VerticalSpace(_)
        | PartKind::CopyButton(_)
        | PartKind::EmbeddedHtml { .. } => {}
        PartKind::Siblings(children) => {
            for child in children {
                collect(child, indent, out);
            }
        }
        PartKind::OnSeparateLines(children) => {
            for child in children {
                collect(child, indent, out);
            }
        }
        PartKind::IndentedChildren(children) => {
            for child in children {
                collect(child, indent + INDENT_STEP, out);
            }
        }
        PartKind::FoldCondition { expanded, .. } => collect(expanded, indent, out),
        PartKind::RoundtripCondition { not_roundtrip, .. } => collect(not_roundtrip, indent, out),
        PartKind::SummarizableCondition { detail, .. } => collect(detail, indent, out),
        PartKind::Styled { child, .. }
        | PartKind::Tagged { child, .. }
        | PartKind::OutlinedBox { child, .. }
        | PartKind::HoverTooltip { child, .. }
        | PartKind::ScopedSelectable(child) => collect(child, indent, out),
        PartKind::Foldable(node) => out.push(FoldableSite {
            node: node.clone(),
            indent,
        }),
        PartKind::Deferred(deferred) => collect(deferred.placeholder(), indent, out),
    }
}
