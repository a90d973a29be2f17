#![forbid(unsafe_code)]

//! Plain-text emission.
//!
//! Text output cannot change after it is written, so each conditional part
//! emits exactly the one branch selected by the ambient mode, and deferred
//! parts are evaluated inline.

use bitflags::bitflags;
use treescope_text::{comment_out, push_indent, reindent};

use crate::context::RenderContext;
use crate::part::{Part, PartError, PartKind};

/// Width of the dashed rule drawn around outlined boxes.
const BOX_RULE_WIDTH: usize = 40;

bitflags! {
    /// Ambient mode of a text emission.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextFlags: u8 {
        /// The enclosing node is expanded.
        const EXPANDED_PARENT = 0b01;
        /// Output must re-evaluate to the rendered value.
        const ROUNDTRIP       = 0b10;
    }
}

/// Options for [`render_to_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextOptions {
    /// Whether the root is rendered as if its parent were expanded.
    pub expanded_parent: bool,
    /// Starting indentation.
    pub indent: usize,
    /// Roundtrip mode.
    pub roundtrip: bool,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            expanded_parent: true,
            indent: 0,
            roundtrip: false,
        }
    }
}

impl TextOptions {
    fn flags(self) -> TextFlags {
        let mut flags = TextFlags::empty();
        flags.set(TextFlags::EXPANDED_PARENT, self.expanded_parent);
        flags.set(TextFlags::ROUNDTRIP, self.roundtrip);
        flags
    }
}

/// Render `part` to a string.
///
/// # Errors
///
/// [`PartError::NewlineInCollapsedRender`] if a text literal with a line
/// break is reached under a collapsed parent.
pub fn render_to_text(
    part: &Part,
    opts: TextOptions,
    ctx: &mut RenderContext,
) -> Result<String, PartError> {
    let mut out = String::new();
    emit_text(part, &mut out, opts.flags(), opts.indent, ctx)?;
    Ok(out)
}

/// Append the text rendering of `part` to `out`.
pub fn emit_text(
    part: &Part,
    out: &mut String,
    flags: TextFlags,
    indent: usize,
    ctx: &mut RenderContext,
) -> Result<(), PartError> {
    let expanded = flags.contains(TextFlags::EXPANDED_PARENT);
    let roundtrip = flags.contains(TextFlags::ROUNDTRIP);

    match part.kind() {
        PartKind::Empty | PartKind::VerticalSpace(_) | PartKind::CopyButton(_) => {}
        PartKind::Text(text) => {
            if !expanded && text.contains('\n') {
                return Err(PartError::NewlineInCollapsedRender { text: text.clone() });
            }
            out.push_str(&reindent(text, indent));
        }
        PartKind::Siblings(children) => {
            for child in children {
                emit_text(child, out, flags, indent, ctx)?;
            }
        }
        PartKind::FoldCondition {
            collapsed,
            expanded: when_expanded,
        } => {
            let branch = if expanded { when_expanded } else { collapsed };
            emit_text(branch, out, flags, indent, ctx)?;
        }
        PartKind::RoundtripCondition {
            roundtrip: when_roundtrip,
            not_roundtrip,
        } => {
            let branch = if roundtrip {
                when_roundtrip
            } else {
                not_roundtrip
            };
            emit_text(branch, out, flags, indent, ctx)?;
        }
        PartKind::SummarizableCondition { summary, detail } => {
            let branch = if !expanded && !roundtrip {
                summary
            } else {
                detail
            };
            emit_text(branch, out, flags, indent, ctx)?;
        }
        PartKind::OnSeparateLines(children) => {
            emit_lines(children, out, flags, indent, indent, ctx)?;
        }
        PartKind::IndentedChildren(children) => {
            let inner = if expanded { indent + 2 } else { indent };
            emit_lines(children, out, flags, indent, inner, ctx)?;
        }
        PartKind::Styled { child, .. }
        | PartKind::Tagged { child, .. }
        | PartKind::HoverTooltip { child, .. } => {
            emit_text(child, out, flags, indent, ctx)?;
        }
        PartKind::OutlinedBox { child, .. } => {
            if expanded {
                newline(out, indent);
                out.push_str("#\u{256D}");
                out.extend(std::iter::repeat_n('\u{2504}', BOX_RULE_WIDTH));
                out.push_str("\u{256E}\n");
                newline(out, indent);
            }
            emit_text(child, out, flags, indent, ctx)?;
            if expanded {
                newline(out, indent);
                out.push_str("#\u{2570}");
                out.extend(std::iter::repeat_n('\u{2504}', BOX_RULE_WIDTH));
                out.push('\u{256F}');
                newline(out, indent);
            }
        }
        PartKind::ScopedSelectable(child) => {
            if !roundtrip {
                emit_text(child, out, flags, indent, ctx)?;
            } else if expanded {
                // A comment cannot sit mid-line, so the annotation only
                // appears as whole comment lines.
                let mut local = String::new();
                emit_text(child, &mut local, flags, 0, ctx)?;
                out.push_str(&comment_out(&local, indent));
            }
        }
        PartKind::Foldable(node) => {
            let mut inner = flags;
            inner.set(TextFlags::EXPANDED_PARENT, expanded && node.is_expanded());
            emit_text(node.label(), out, inner, indent, ctx)?;
            emit_text(node.contents(), out, inner, indent, ctx)?;
        }
        PartKind::EmbeddedHtml { fallback, .. } => {
            emit_text(fallback, out, flags, indent, ctx)?;
        }
        PartKind::Deferred(deferred) => {
            let value = ctx.force_deferred(deferred);
            emit_text(&value, out, flags, indent, ctx)?;
        }
    }
    Ok(())
}

fn emit_lines(
    children: &[Part],
    out: &mut String,
    flags: TextFlags,
    outer_indent: usize,
    child_indent: usize,
    ctx: &mut RenderContext,
) -> Result<(), PartError> {
    let expanded = flags.contains(TextFlags::EXPANDED_PARENT);
    for child in children {
        if expanded {
            newline(out, child_indent);
        }
        emit_text(child, out, flags, child_indent, ctx)?;
    }
    if expanded {
        newline(out, outer_indent);
    }
    Ok(())
}

#[inline]
fn newline(out: &mut String, indent: usize) {
    out.push('\n');
    push_indent(out, indent);
}
