#![forbid(unsafe_code)]

//! The renderable part tree.
//!
//! A [`Part`] is an immutable, reference-counted node. Each node lazily
//! computes and caches four derived properties the layout pass relies on:
//!
//! - [`Part::collapsed_width`]: character count when rendered on one line
//! - [`Part::newlines_in_expanded_parent`]: line breaks introduced when the
//!   enclosing node is expanded
//! - [`Part::tags`]: opaque markers gathered from the subtree
//! - [`Part::foldables`]: the outermost foldable nodes of the subtree
//!
//! The only mutable state in a tree is the expand state of each
//! [`Foldable`] and the memo cell of each [`Deferred`] part. Neither affects
//! the cached metrics.

use std::cell::{Cell, OnceCell};
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use treescope_core::Memo;
use treescope_text::newline_count;

use crate::style::{OutlineStyle, SpanStyle};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Contract violations detected while measuring or emitting parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartError {
    /// The collapsed width of a text literal containing a line break was requested.
    NewlineInCollapsedText { text: String },
    /// A text literal containing a line break was emitted under a collapsed parent.
    NewlineInCollapsedRender { text: String },
}

impl fmt::Display for PartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewlineInCollapsedText { text } => write!(
                f,
                "cannot compute collapsed width of a text literal with a newline: {:?}",
                text
            ),
            Self::NewlineInCollapsedRender { text } => write!(
                f,
                "cannot render a text literal with a newline in collapsed mode: {:?}",
                text
            ),
        }
    }
}

impl std::error::Error for PartError {}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// An opaque marker propagated from a subtree to its ancestors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(Rc<str>);

impl Tag {
    /// Create a tag from its name.
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self(name.into())
    }

    /// The tag's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Ordered set of tags.
pub type TagSet = BTreeSet<Tag>;

// ---------------------------------------------------------------------------
// Parts
// ---------------------------------------------------------------------------

/// Variants of the part tree.
///
/// Construct these through the builder functions in [`crate::builders`],
/// which apply the normalizations (flattening, empty elision, comma
/// insertion) the emitters assume.
#[derive(Debug)]
pub enum PartKind {
    /// Renders nothing.
    Empty,
    /// A literal string.
    Text(String),
    /// Markup-only vertical gap with a CSS height.
    VerticalSpace(String),
    /// Inline concatenation.
    Siblings(SmallVec<[Part; 4]>),
    /// `collapsed` under a collapsed parent, `expanded` under an expanded one.
    FoldCondition { collapsed: Part, expanded: Part },
    /// `roundtrip` in roundtrip mode, `not_roundtrip` otherwise.
    RoundtripCondition { roundtrip: Part, not_roundtrip: Part },
    /// `summary` when collapsed and not roundtrip, `detail` otherwise.
    SummarizableCondition { summary: Part, detail: Part },
    /// One child per line when expanded, no indentation.
    OnSeparateLines(Vec<Part>),
    /// One child per line when expanded, indented by two columns.
    IndentedChildren(Vec<Part>),
    /// A styled span.
    Styled { style: SpanStyle, child: Part },
    /// Adds tags to its child.
    Tagged { tags: TagSet, child: Part },
    /// A box drawn around its child.
    OutlinedBox { outline: OutlineStyle, child: Part },
    /// Child with a markup-only hover tooltip.
    HoverTooltip { tooltip: String, child: Part },
    /// Child excluded from selections started outside it.
    ScopedSelectable(Part),
    /// A node with its own expand state.
    Foldable(Foldable),
    /// Foreign HTML embedded in an iframe, with a text fallback.
    EmbeddedHtml {
        html: String,
        fallback: Part,
        virtual_width: usize,
        virtual_height: usize,
    },
    /// Content computed on first emission.
    Deferred(Deferred),
    /// Markup-only button that copies an accessor path.
    CopyButton(String),
}

struct PartNode {
    kind: PartKind,
    width: OnceCell<Result<usize, PartError>>,
    newlines: OnceCell<usize>,
    tags: OnceCell<TagSet>,
    foldables: OnceCell<Vec<Foldable>>,
}

/// A node of the renderable tree. Cloning is cheap and shares the subtree.
#[derive(Clone)]
pub struct Part(Rc<PartNode>);

impl Part {
    /// Wrap a variant in a new node.
    #[must_use]
    pub fn new(kind: PartKind) -> Self {
        Self(Rc::new(PartNode {
            kind,
            width: OnceCell::new(),
            newlines: OnceCell::new(),
            tags: OnceCell::new(),
            foldables: OnceCell::new(),
        }))
    }

    /// The variant of this node.
    #[must_use]
    pub fn kind(&self) -> &PartKind {
        &self.0.kind
    }

    /// Whether this is the [`PartKind::Empty`] placeholder.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self.0.kind, PartKind::Empty)
    }

    /// Whether both handles point at the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Part) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Character count of the single-line rendering.
    ///
    /// # Errors
    ///
    /// [`PartError::NewlineInCollapsedText`] if a text literal that would be
    /// shown when collapsed contains a line break.
    pub fn collapsed_width(&self) -> Result<usize, PartError> {
        self.0.width.get_or_init(|| self.compute_width()).clone()
    }

    /// Line breaks this part introduces when its parent is expanded.
    #[must_use]
    pub fn newlines_in_expanded_parent(&self) -> usize {
        *self.0.newlines.get_or_init(|| self.compute_newlines())
    }

    /// Tags of this part and its descendants.
    #[must_use]
    pub fn tags(&self) -> &TagSet {
        self.0.tags.get_or_init(|| self.compute_tags())
    }

    /// Outermost foldable nodes, in document order.
    ///
    /// A foldable reports itself, not the foldables nested in it.
    #[must_use]
    pub fn foldables(&self) -> &[Foldable] {
        self.0.foldables.get_or_init(|| self.compute_foldables())
    }

    /// Every foldable in the subtree, outer nodes before the ones they contain.
    #[must_use]
    pub fn all_foldables(&self) -> Vec<Foldable> {
        let mut out = Vec::new();
        let mut stack: Vec<Foldable> = self.foldables().iter().rev().cloned().collect();
        while let Some(node) = stack.pop() {
            let nested: Vec<Foldable> = node
                .label()
                .foldables()
                .iter()
                .chain(node.contents().foldables())
                .cloned()
                .collect();
            stack.extend(nested.into_iter().rev());
            out.push(node);
        }
        out
    }

    fn compute_width(&self) -> Result<usize, PartError> {
        match &self.0.kind {
            PartKind::Empty | PartKind::VerticalSpace(_) | PartKind::CopyButton(_) => Ok(0),
            PartKind::Text(text) => {
                if text.contains('\n') {
                    return Err(PartError::NewlineInCollapsedText { text: text.clone() });
                }
                Ok(text.chars().count())
            }
            PartKind::Siblings(children) => sum_widths(children),
            PartKind::OnSeparateLines(children) | PartKind::IndentedChildren(children) => {
                sum_widths(children)
            }
            PartKind::FoldCondition { collapsed, .. } => collapsed.collapsed_width(),
            PartKind::RoundtripCondition { not_roundtrip, .. } => not_roundtrip.collapsed_width(),
            PartKind::SummarizableCondition { summary, .. } => summary.collapsed_width(),
            PartKind::Styled { child, .. }
            | PartKind::Tagged { child, .. }
            | PartKind::OutlinedBox { child, .. }
            | PartKind::HoverTooltip { child, .. }
            | PartKind::ScopedSelectable(child) => child.collapsed_width(),
            PartKind::Foldable(node) => {
                Ok(node.label().collapsed_width()? + node.contents().collapsed_width()?)
            }
            PartKind::EmbeddedHtml { virtual_width, .. } => Ok(*virtual_width),
            PartKind::Deferred(deferred) => deferred.placeholder().collapsed_width(),
        }
    }

    fn compute_newlines(&self) -> usize {
        match &self.0.kind {
            PartKind::Empty | PartKind::VerticalSpace(_) | PartKind::CopyButton(_) => 0,
            PartKind::Text(text) => newline_count(text),
            PartKind::Siblings(children) => {
                children.iter().map(Part::newlines_in_expanded_parent).sum()
            }
            // One line per child, plus the break back to the enclosing line.
            PartKind::OnSeparateLines(children) | PartKind::IndentedChildren(children) => {
                children
                    .iter()
                    .map(|c| c.newlines_in_expanded_parent() + 1)
                    .sum::<usize>()
                    + 1
            }
            PartKind::FoldCondition { expanded, .. } => expanded.newlines_in_expanded_parent(),
            PartKind::RoundtripCondition { not_roundtrip, .. } => {
                not_roundtrip.newlines_in_expanded_parent()
            }
            PartKind::SummarizableCondition { detail, .. } => detail.newlines_in_expanded_parent(),
            PartKind::OutlinedBox { child, .. } => child.newlines_in_expanded_parent() + 2,
            PartKind::Styled { child, .. }
            | PartKind::Tagged { child, .. }
            | PartKind::HoverTooltip { child, .. }
            | PartKind::ScopedSelectable(child) => child.newlines_in_expanded_parent(),
            PartKind::Foldable(node) => {
                node.label().newlines_in_expanded_parent()
                    + node.contents().newlines_in_expanded_parent()
            }
            PartKind::EmbeddedHtml { virtual_height, .. } => *virtual_height,
            PartKind::Deferred(deferred) => deferred.placeholder().newlines_in_expanded_parent(),
        }
    }

    fn compute_tags(&self) -> TagSet {
        match &self.0.kind {
            PartKind::Empty
            | PartKind::Text(_)
            | PartKind::VerticalSpace(_)
            | PartKind::CopyButton(_)
            | PartKind::EmbeddedHtml { .. } => TagSet::new(),
            PartKind::Siblings(children) => union_tags(children.iter()),
            PartKind::OnSeparateLines(children) | PartKind::IndentedChildren(children) => {
                union_tags(children.iter())
            }
            PartKind::FoldCondition {
                collapsed: a,
                expanded: b,
            }
            | PartKind::RoundtripCondition {
                roundtrip: a,
                not_roundtrip: b,
            }
            | PartKind::SummarizableCondition {
                summary: a,
                detail: b,
            } => union_tags([a, b].into_iter()),
            PartKind::Tagged { tags, child } => {
                let mut out = tags.clone();
                out.extend(child.tags().iter().cloned());
                out
            }
            PartKind::Styled { child, .. }
            | PartKind::OutlinedBox { child, .. }
            | PartKind::HoverTooltip { child, .. }
            | PartKind::ScopedSelectable(child) => child.tags().clone(),
            PartKind::Foldable(node) => union_tags([node.label(), node.contents()].into_iter()),
            PartKind::Deferred(deferred) => deferred.placeholder().tags().clone(),
        }
    }

    fn compute_foldables(&self) -> Vec<Foldable> {
        match &self.0.kind {
            PartKind::Empty
            | PartKind::Text(_)
            | PartKind::VerticalSpace(_)
            | PartKind::CopyButton(_)
            | PartKind::EmbeddedHtml { .. } => Vec::new(),
            PartKind::Siblings(children) => concat_foldables(children.iter()),
            PartKind::OnSeparateLines(children) | PartKind::IndentedChildren(children) => {
                concat_foldables(children.iter())
            }
            // Only the branch visible when expanded can be toggled.
            PartKind::FoldCondition { expanded, .. } => expanded.foldables().to_vec(),
            PartKind::RoundtripCondition { not_roundtrip, .. } => {
                not_roundtrip.foldables().to_vec()
            }
            PartKind::SummarizableCondition { detail, .. } => detail.foldables().to_vec(),
            PartKind::Styled { child, .. }
            | PartKind::Tagged { child, .. }
            | PartKind::OutlinedBox { child, .. }
            | PartKind::HoverTooltip { child, .. }
            | PartKind::ScopedSelectable(child) => child.foldables().to_vec(),
            PartKind::Foldable(node) => vec![node.clone()],
            PartKind::Deferred(deferred) => deferred.placeholder().foldables().to_vec(),
        }
    }
}

fn sum_widths(children: &[Part]) -> Result<usize, PartError> {
    children
        .iter()
        .try_fold(0, |acc, child| Ok(acc + child.collapsed_width()?))
}

fn union_tags<'a>(parts: impl Iterator<Item = &'a Part>) -> TagSet {
    let mut out = TagSet::new();
    for part in parts {
        out.extend(part.tags().iter().cloned());
    }
    out
}

fn concat_foldables<'a>(parts: impl Iterator<Item = &'a Part>) -> Vec<Foldable> {
    parts.flat_map(|p| p.foldables().iter().cloned()).collect()
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.kind.fmt(f)
    }
}

impl From<&str> for Part {
    fn from(text: &str) -> Self {
        crate::builders::text(text)
    }
}

impl From<String> for Part {
    fn from(text: String) -> Self {
        crate::builders::text(text)
    }
}

// ---------------------------------------------------------------------------
// Foldable nodes
// ---------------------------------------------------------------------------

/// Requested expansion of a foldable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExpandState {
    /// Always expanded.
    Expanded,
    /// Always collapsed.
    Collapsed,
    /// Decided by a layout policy; collapsed until one runs.
    #[default]
    Automatic,
}

struct FoldableNode {
    label: Part,
    contents: Part,
    path: Option<String>,
    expand_state: Cell<ExpandState>,
    // Layout decision for `Automatic` nodes. Kept apart from `expand_state`
    // so a policy can be re-run.
    auto_expanded: Cell<bool>,
}

/// Shared handle to a foldable node.
///
/// The label is always shown; the contents only when the node is expanded.
#[derive(Clone)]
pub struct Foldable(Rc<FoldableNode>);

impl Foldable {
    /// Create a foldable node.
    #[must_use]
    pub fn new(label: Part, contents: Part, path: Option<String>, state: ExpandState) -> Self {
        Self(Rc::new(FoldableNode {
            label,
            contents,
            path,
            expand_state: Cell::new(state),
            auto_expanded: Cell::new(false),
        }))
    }

    /// Always-visible label.
    #[must_use]
    pub fn label(&self) -> &Part {
        &self.0.label
    }

    /// Contents, visible when expanded.
    #[must_use]
    pub fn contents(&self) -> &Part {
        &self.0.contents
    }

    /// Accessor path copied by the node's copy button.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.0.path.as_deref()
    }

    /// Requested state.
    #[must_use]
    pub fn expand_state(&self) -> ExpandState {
        self.0.expand_state.get()
    }

    /// Change the requested state. Does not touch the subtree.
    pub fn set_expand_state(&self, state: ExpandState) {
        self.0.expand_state.set(state);
    }

    /// Record a layout decision. Ignored unless the state is `Automatic`.
    pub fn resolve_automatic(&self, expanded: bool) {
        if self.expand_state() == ExpandState::Automatic {
            self.0.auto_expanded.set(expanded);
        }
    }

    /// Effective state used by the emitters.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        match self.expand_state() {
            ExpandState::Expanded => true,
            ExpandState::Collapsed => false,
            ExpandState::Automatic => self.0.auto_expanded.get(),
        }
    }

    /// Whether both handles refer to the same node.
    #[must_use]
    pub fn ptr_eq(&self, other: &Foldable) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Foldable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Foldable")
            .field("expand_state", &self.expand_state())
            .field("expanded", &self.is_expanded())
            .field("label", self.label())
            .field("contents", self.contents())
            .field("path", &self.0.path)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Deferred parts
// ---------------------------------------------------------------------------

struct DeferredNode {
    placeholder: Part,
    value: Memo<Part>,
}

/// A part whose real content is computed at most once, on first emission.
///
/// Layout metrics always come from the placeholder, which is expected to have
/// the same shape as the final content.
#[derive(Clone)]
pub struct Deferred(Rc<DeferredNode>);

impl Deferred {
    /// Create a deferred part from a cheap placeholder and the expensive thunk.
    pub fn new<F>(placeholder: Part, thunk: F) -> Self
    where
        F: FnOnce() -> Part + 'static,
    {
        Self(Rc::new(DeferredNode {
            placeholder,
            value: Memo::new(thunk),
        }))
    }

    /// Part shown until the real content exists.
    #[must_use]
    pub fn placeholder(&self) -> &Part {
        &self.0.placeholder
    }

    /// Compute the content if needed and return it.
    pub fn force(&self) -> &Part {
        if !self.0.value.is_evaluated() {
            treescope_core::trace!("evaluating deferred part");
        }
        self.0.value.force()
    }

    /// The content, if already computed.
    #[must_use]
    pub fn value(&self) -> Option<&Part> {
        self.0.value.get()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("placeholder", self.placeholder())
            .field("value", &self.0.value)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// A renderable plus the annotations floated to the end of its line.
#[derive(Debug, Clone)]
pub struct LineItem {
    pub renderable: Part,
    pub annotations: Option<Part>,
}

impl LineItem {
    /// A line with no annotations.
    #[must_use]
    pub fn new(renderable: Part) -> Self {
        Self {
            renderable,
            annotations: None,
        }
    }

    /// A line with annotations.
    #[must_use]
    pub fn with_annotations(renderable: Part, annotations: Part) -> Self {
        Self {
            renderable,
            annotations: Some(annotations),
        }
    }
}

impl From<Part> for LineItem {
    fn from(renderable: Part) -> Self {
        Self::new(renderable)
    }
}

impl From<&str> for LineItem {
    fn from(text: &str) -> Self {
        Self::new(Part::from(text))
    }
}
