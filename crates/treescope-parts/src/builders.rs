#![forbid(unsafe_code)]

//! Builders for the part tree.
//!
//! These are the supported way to construct parts: they normalize their
//! inputs (flattening nested siblings, dropping empty parts, inserting
//! delimiters, floating line annotations) so the emitters never have to.
//!
//! # Example
//! ```
//! use treescope_parts::builders::{CommaPolicy, indented_children, siblings, text};
//!
//! let list = siblings([
//!     text("["),
//!     indented_children([text("1"), text("2")], CommaPolicy::SEPARATED),
//!     text("]"),
//! ]);
//! assert_eq!(list.collapsed_width(), Ok(6));
//! ```

use smallvec::SmallVec;

use crate::part::{Deferred, ExpandState, Foldable, LineItem, Part, PartKind, Tag, TagSet};
use crate::style::{OutlineStyle, SpanStyle};

// ---------------------------------------------------------------------------
// Leaves
// ---------------------------------------------------------------------------

/// A part that renders nothing.
#[must_use]
pub fn empty() -> Part {
    Part::new(PartKind::Empty)
}

/// A text literal.
///
/// Text containing line breaks must only be shown under expanded parents.
#[must_use]
pub fn text(text: impl Into<String>) -> Part {
    Part::new(PartKind::Text(text.into()))
}

/// A markup-only vertical gap of the given CSS height.
#[must_use]
pub fn vertical_space(height: impl Into<String>) -> Part {
    Part::new(PartKind::VerticalSpace(height.into()))
}

// ---------------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------------

/// Inline concatenation. Nested siblings are flattened and empty parts dropped.
pub fn siblings<I>(items: I) -> Part
where
    I: IntoIterator,
    I::Item: Into<Part>,
{
    let mut children: SmallVec<[Part; 4]> = SmallVec::new();
    for item in items {
        let part: Part = item.into();
        match part.kind() {
            PartKind::Empty => {}
            PartKind::Siblings(inner) => children.extend(inner.iter().cloned()),
            _ => children.push(part),
        }
    }
    Part::new(PartKind::Siblings(children))
}

/// `collapsed` under a collapsed parent, `expanded` under an expanded one.
#[must_use]
pub fn fold_condition(collapsed: Part, expanded: Part) -> Part {
    Part::new(PartKind::FoldCondition {
        collapsed,
        expanded,
    })
}

/// Shown only when the parent is expanded.
#[must_use]
pub fn when_expanded(part: Part) -> Part {
    fold_condition(empty(), part)
}

/// Shown only when the parent is collapsed.
#[must_use]
pub fn when_collapsed(part: Part) -> Part {
    fold_condition(part, empty())
}

/// `roundtrip` in roundtrip mode, `not_roundtrip` otherwise.
#[must_use]
pub fn roundtrip_condition(roundtrip: Part, not_roundtrip: Part) -> Part {
    Part::new(PartKind::RoundtripCondition {
        roundtrip,
        not_roundtrip,
    })
}

/// `summary` when collapsed outside roundtrip mode, `detail` otherwise.
#[must_use]
pub fn summarizable_condition(summary: Part, detail: Part) -> Part {
    Part::new(PartKind::SummarizableCondition { summary, detail })
}

// ---------------------------------------------------------------------------
// Line annotations
// ---------------------------------------------------------------------------

/// Concatenate line items, collecting main content and annotations separately.
pub fn siblings_with_annotations<I>(items: I, extra_annotations: Vec<Part>) -> LineItem
where
    I: IntoIterator,
    I::Item: Into<LineItem>,
{
    let mut parts = Vec::new();
    let mut annotations = Vec::new();
    for item in items {
        let item: LineItem = item.into();
        parts.push(item.renderable);
        annotations.extend(item.annotations);
    }
    annotations.extend(extra_annotations);

    let annotations = siblings(annotations);
    let renderable = siblings(parts);
    if is_blank(&annotations) {
        LineItem::new(renderable)
    } else {
        LineItem::with_annotations(renderable, annotations)
    }
}

/// Concatenate line items and float their annotations to the end of the line.
///
/// Annotations are only shown when the parent is expanded. The result should
/// end its line when expanded, or trailing delimiters may follow a comment.
pub fn build_full_line_with_annotations<I>(items: I) -> Part
where
    I: IntoIterator,
    I::Item: Into<LineItem>,
{
    let combined = siblings_with_annotations(items, Vec::new());
    match combined.annotations {
        Some(annotations) => siblings([combined.renderable, when_expanded(annotations)]),
        None => combined.renderable,
    }
}

fn is_blank(part: &Part) -> bool {
    match part.kind() {
        PartKind::Empty => true,
        PartKind::Siblings(children) => children.is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Structural containers
// ---------------------------------------------------------------------------

/// Comma insertion for [`indented_children`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommaPolicy {
    /// Insert a comma after each child.
    pub comma_separated: bool,
    /// Show the last child's comma even when collapsed.
    pub force_trailing_comma: bool,
}

impl CommaPolicy {
    /// No delimiters.
    pub const NONE: Self = Self {
        comma_separated: false,
        force_trailing_comma: false,
    };
    /// Commas between children; trailing comma only when expanded.
    pub const SEPARATED: Self = Self {
        comma_separated: true,
        force_trailing_comma: false,
    };
    /// Commas after every child, including the last in collapsed form.
    pub const TRAILING: Self = Self {
        comma_separated: true,
        force_trailing_comma: true,
    };
}

/// Children on separate lines when expanded, without extra indentation.
pub fn on_separate_lines<I>(children: I) -> Part
where
    I: IntoIterator,
    I::Item: Into<LineItem>,
{
    let lines = children
        .into_iter()
        .map(|line| {
            let line: LineItem = line.into();
            build_full_line_with_annotations([line])
        })
        .collect();
    Part::new(PartKind::OnSeparateLines(lines))
}

/// Children on separate indented lines when expanded.
///
/// With commas, every child but the last gets `,` plus a collapsed-only
/// space. The last child gets `,` if forced, else an expanded-only `,`.
pub fn indented_children<I>(children: I, commas: CommaPolicy) -> Part
where
    I: IntoIterator,
    I::Item: Into<LineItem>,
{
    let children: Vec<LineItem> = children.into_iter().map(Into::into).collect();
    let count = children.len();
    let lines = children
        .into_iter()
        .enumerate()
        .map(|(i, child)| {
            if !commas.comma_separated {
                return build_full_line_with_annotations([child]);
            }
            let delimiter = if i + 1 < count {
                siblings([text(","), when_collapsed(text(" "))])
            } else if commas.force_trailing_comma {
                text(",")
            } else {
                when_expanded(text(","))
            };
            build_full_line_with_annotations([child, LineItem::new(delimiter)])
        })
        .collect();
    Part::new(PartKind::IndentedChildren(lines))
}

// ---------------------------------------------------------------------------
// Decorative wrappers
// ---------------------------------------------------------------------------

/// Draw an outlined box around `child`.
#[must_use]
pub fn in_outlined_box(child: Part, outline: OutlineStyle) -> Part {
    Part::new(PartKind::OutlinedBox { outline, child })
}

/// Attach a hover tooltip. Text output drops the tooltip.
#[must_use]
pub fn with_hover_tooltip(child: Part, tooltip: impl Into<String>) -> Part {
    Part::new(PartKind::HoverTooltip {
        tooltip: tooltip.into(),
        child,
    })
}

/// An annotation that is not copied along with its surroundings.
///
/// Roundtrip text output shows it as comment lines when expanded and omits
/// it when collapsed.
#[must_use]
pub fn floating_annotation_with_separate_focus(child: Part) -> Part {
    Part::new(PartKind::ScopedSelectable(child))
}

/// Mark `child` with a tag visible to its ancestors.
#[must_use]
pub fn with_layout_mark(child: Part, tag: impl Into<Tag>) -> Part {
    let mut tags = TagSet::new();
    tags.insert(tag.into());
    Part::new(PartKind::Tagged { tags, child })
}

fn styled(child: Part, style: SpanStyle) -> Part {
    Part::new(PartKind::Styled { style, child })
}

/// Color for non-roundtrippable abbreviations.
#[must_use]
pub fn abbreviation_color(child: Part) -> Part {
    styled(child, SpanStyle::Abbreviation)
}

/// Comment color.
#[must_use]
pub fn comment_color(child: Part) -> Part {
    styled(child, SpanStyle::Comment)
}

/// Comment color, applied only when not inside a collapsed node.
#[must_use]
pub fn comment_color_when_expanded(child: Part) -> Part {
    styled(child, SpanStyle::CommentWhenExpanded)
}

/// Error color.
#[must_use]
pub fn error_color(child: Part) -> Part {
    styled(child, SpanStyle::Error)
}

/// Muted style for the module prefix of a qualified name.
#[must_use]
pub fn qualified_type_name_style(child: Part) -> Part {
    styled(child, SpanStyle::QualifiedTypeName)
}

/// Style for a pending deferred placeholder.
#[must_use]
pub fn deferred_placeholder_style(child: Part) -> Part {
    styled(child, SpanStyle::DeferredPlaceholder)
}

/// Text in an arbitrary CSS color.
#[must_use]
pub fn custom_text_color(child: Part, color: impl Into<String>) -> Part {
    styled(child, SpanStyle::TextColor(color.into()))
}

/// Arbitrary inline CSS.
#[must_use]
pub fn custom_style(child: Part, css: impl Into<String>) -> Part {
    styled(child, SpanStyle::Custom(css.into()))
}

/// Embed foreign HTML in an iframe.
///
/// Layout treats the iframe as `virtual_width` columns and `virtual_height`
/// lines; text output renders `fallback` instead.
#[must_use]
pub fn embedded_iframe(
    html: impl Into<String>,
    fallback: Part,
    virtual_width: usize,
    virtual_height: usize,
) -> Part {
    Part::new(PartKind::EmbeddedHtml {
        html: html.into(),
        fallback,
        virtual_width,
        virtual_height,
    })
}

/// A part computed on first emission, shown as `placeholder` until then.
pub fn deferred<F>(placeholder: Part, thunk: F) -> Part
where
    F: FnOnce() -> Part + 'static,
{
    Part::new(PartKind::Deferred(Deferred::new(placeholder, thunk)))
}

// ---------------------------------------------------------------------------
// Tree nodes
// ---------------------------------------------------------------------------

/// A copy button for `path`, or nothing without a path.
#[must_use]
pub fn build_copy_button(path: Option<&str>) -> Part {
    match path {
        Some(path) if !path.is_empty() => Part::new(PartKind::CopyButton(path.to_string())),
        _ => empty(),
    }
}

/// A foldable node with a custom label and contents.
///
/// The copy button for `path` is returned as the line's annotation.
#[must_use]
pub fn build_custom_foldable_tree_node(
    label: Part,
    contents: Part,
    path: Option<&str>,
    expand_state: ExpandState,
) -> LineItem {
    let node = Foldable::new(label, contents, path.map(str::to_string), expand_state);
    annotated(Part::new(PartKind::Foldable(node)), build_copy_button(path))
}

/// A leaf node on a single line, with a copy button for `path`.
pub fn build_one_line_tree_node(line: impl Into<LineItem>, path: Option<&str>) -> LineItem {
    let line = line.into();
    let annotations = siblings(std::iter::once(build_copy_button(path)).chain(line.annotations));
    annotated(line.renderable, annotations)
}

/// A foldable node rendering as `prefix`, indented `children`, `suffix`.
///
/// Without children this is a one-line node `prefix suffix`.
pub fn build_foldable_tree_node_from_children<I>(
    prefix: Part,
    children: I,
    suffix: Part,
    commas: CommaPolicy,
    path: Option<&str>,
    expand_state: ExpandState,
) -> LineItem
where
    I: IntoIterator,
    I::Item: Into<LineItem>,
{
    let children: Vec<LineItem> = children.into_iter().map(Into::into).collect();
    if children.is_empty() {
        return build_one_line_tree_node(siblings([prefix, suffix]), path);
    }
    build_custom_foldable_tree_node(
        prefix,
        siblings([indented_children(children, commas), suffix]),
        path,
        expand_state,
    )
}

fn annotated(renderable: Part, annotations: Part) -> LineItem {
    if is_blank(&annotations) {
        LineItem::new(renderable)
    } else {
        LineItem::with_annotations(renderable, annotations)
    }
}

/// A type name whose module prefix appears only in roundtrip mode.
#[must_use]
pub fn maybe_qualified_type_name(qualified: &str) -> Part {
    match qualified.rsplit_once('.') {
        Some((module, name)) => siblings([
            roundtrip_condition(
                qualified_type_name_style(text(format!("{}.", module))),
                empty(),
            ),
            text(name),
        ]),
        None => text(qualified),
    }
}
