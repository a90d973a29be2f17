#![forbid(unsafe_code)]

//! Markup emission.
//!
//! Unlike text output, markup keeps both branches of every conditional part
//! and hides one with CSS keyed on the ambient state: the checkbox of the
//! nearest collapsed foldable, and the `roundtrip_mode` class of the root.
//! Toggling a foldable is therefore a pure style change.
//!
//! Every part also contributes setup parts (CSS rules and JavaScript
//! definitions). They are collected into a set, so each rule is emitted once
//! per document no matter how many parts need it.

use std::collections::BTreeSet;

use treescope_text::{escape_html_attribute, escape_html_into};

use crate::context::RenderContext;
use crate::part::{Part, PartKind};

/// Matches a foldable node whose toggle is unchecked.
pub const COLLAPSED_SELECTOR: &str =
    ".foldable_node:has(>label>.foldable_node_toggle:not(:checked))";
/// Matches the root container in roundtrip mode.
pub const ROUNDTRIP_SELECTOR: &str = ".treescope_root.roundtrip_mode";

/// Selectors available to setup rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupContext {
    pub collapsed_selector: String,
    pub roundtrip_selector: String,
}

impl Default for SetupContext {
    fn default() -> Self {
        Self {
            collapsed_selector: COLLAPSED_SELECTOR.to_string(),
            roundtrip_selector: ROUNDTRIP_SELECTOR.to_string(),
        }
    }
}

/// A rule or definition a part needs in the document head.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SetupPart {
    Css(String),
    Js(String),
}

/// Collect the setup parts of `part` and its subtree.
#[must_use]
pub fn setup_parts(part: &Part, ctx: &SetupContext) -> BTreeSet<SetupPart> {
    let mut out = BTreeSet::new();
    collect_setup(part, ctx, &mut out);
    out
}

/// Add the setup parts of `part` and its subtree to `out`.
pub fn collect_setup(part: &Part, ctx: &SetupContext, out: &mut BTreeSet<SetupPart>) {
    let collapsed = &ctx.collapsed_selector;
    let roundtrip = &ctx.roundtrip_selector;
    match part.kind() {
        PartKind::Empty | PartKind::Text(_) | PartKind::VerticalSpace(_) => {}
        PartKind::Siblings(children) => {
            for child in children {
                collect_setup(child, ctx, out);
            }
        }
        PartKind::FoldCondition {
            collapsed: a,
            expanded: b,
        } => {
            out.insert(SetupPart::Css(format!(
                "
                .when_collapsed {{ display: none; }}
                {collapsed} .when_collapsed {{ display: inline; }}
                .when_expanded {{ display: inline; }}
                {collapsed} .when_expanded {{ display: none; }}
                "
            )));
            collect_setup(a, ctx, out);
            collect_setup(b, ctx, out);
        }
        PartKind::RoundtripCondition {
            roundtrip: a,
            not_roundtrip: b,
        } => {
            out.insert(SetupPart::Css(format!(
                "
                .when_roundtrip {{ display: none; }}
                {roundtrip} .when_roundtrip {{ display: inline; }}
                .when_not_roundtrip {{ display: inline; }}
                {roundtrip} .when_not_roundtrip {{ display: none; }}
                "
            )));
            collect_setup(a, ctx, out);
            collect_setup(b, ctx, out);
        }
        PartKind::SummarizableCondition { summary, detail } => {
            out.insert(SetupPart::Css(format!(
                "
                .when_expanded_or_roundtrip {{ display: none; }}
                .when_expanded_or_roundtrip:not({collapsed} *),
                {roundtrip} .when_expanded_or_roundtrip {{ display: inline; }}
                .when_collapsed_and_not_roundtrip {{ display: inline; }}
                .when_collapsed_and_not_roundtrip:not({collapsed} *),
                {roundtrip} .when_collapsed_and_not_roundtrip {{ display: none; }}
                "
            )));
            collect_setup(summary, ctx, out);
            collect_setup(detail, ctx, out);
        }
        PartKind::OnSeparateLines(children) => {
            out.insert(SetupPart::Css(format!(
                "
                .separate_lines_child:not({collapsed} *) {{ display: block; }}
                .separate_lines_children:not({collapsed} *) {{ display: block; }}
                "
            )));
            for child in children {
                collect_setup(child, ctx, out);
            }
        }
        PartKind::IndentedChildren(children) => {
            out.insert(SetupPart::Css(format!(
                "
                .indented_child:not({collapsed} *) {{
                    display: block;
                    margin-left: calc(2ch - 1px);
                }}
                .indented_children:not({collapsed} *) {{
                    display: block;
                    border-left: dotted 1px #e0e0e0;
                }}
                "
            )));
            for child in children {
                collect_setup(child, ctx, out);
            }
        }
        PartKind::Styled { style, child } => {
            if let Some(rule) = style.css_rule(ctx) {
                out.insert(SetupPart::Css(rule));
            }
            collect_setup(child, ctx, out);
        }
        PartKind::Tagged { child, .. } => collect_setup(child, ctx, out),
        PartKind::OutlinedBox { outline, child } => {
            out.insert(SetupPart::Css(format!(
                "
                .outerbox_for_outline {{
                    display: inline-block;
                    padding: 0.25em;
                    box-sizing: border-box;
                }}
                .box_with_outline {{
                    display: inline-block;
                    padding: 0.25em;
                    box-sizing: border-box;
                }}
                .box_with_outline:not({collapsed} *),
                .outerbox_for_outline:not({collapsed} *) {{
                    display: block;
                    width: max-content;
                }}
                "
            )));
            out.insert(SetupPart::Css(outline.css_rule().to_string()));
            collect_setup(child, ctx, out);
        }
        PartKind::HoverTooltip { child, .. } => {
            out.insert(SetupPart::Css(
                "
                .has_hover_tooltip {
                    text-decoration: underline dotted;
                    position: relative;
                }
                .has_hover_tooltip:hover::after {
                    display: block;
                    position: absolute;
                    top: calc(100% + 0.2ch);
                    left: 0.2ch;
                    content: attr(data-tooltip);
                    outline: 1px dashed oklch(30% 0 0);
                    background-color: oklch(90% 0 0);
                    color: oklch(30% 0 0);
                    z-index: 100;
                    padding: 0.2ch;
                    white-space: pre;
                }
                "
                .to_string(),
            ));
            collect_setup(child, ctx, out);
        }
        PartKind::ScopedSelectable(child) => {
            out.insert(SetupPart::Css(
                ".scoped_unselectable:not(:focus) { user-select: none; }".to_string(),
            ));
            collect_setup(child, ctx, out);
        }
        PartKind::Foldable(node) => {
            out.insert(SetupPart::Css(format!(
                "
                .foldable_node > label {{ cursor: pointer; }}
                .foldable_node_toggle {{ display: none; }}
                .expand_marker {{ color: #888888; font-size: 0.75em; }}
                .expand_marker::before {{ content: \"\\25BC\"; }}
                {collapsed} > label > .expand_marker::before {{ content: \"\\25B6\"; }}
                .foldable_node.first_on_line > label > .expand_marker {{
                    position: absolute;
                    margin-left: -1.5ch;
                }}
                "
            )));
            collect_setup(node.label(), ctx, out);
            collect_setup(node.contents(), ctx, out);
        }
        PartKind::EmbeddedHtml { .. } => {
            out.insert(SetupPart::Js(
                "
                treescope_defns.resize_iframe_by_content = (iframe) => {
                    iframe.height = 0;
                    iframe.style.width = \"80ch\";
                    iframe.style.overflow = \"hidden\";
                    const doc = iframe.contentDocument.scrollingElement;
                    doc.style.width = \"fit-content\";
                    doc.style.height = \"fit-content\";
                    doc.style.overflow = \"hidden\";
                    const observer = new ResizeObserver(() => {
                        const computed = getComputedStyle(doc);
                        iframe.style.width = `calc(4ch + ${computed['width']})`;
                        iframe.style.height = `calc(${computed['height']})`;
                    });
                    observer.observe(doc);
                };
                "
                .to_string(),
            ));
            out.insert(SetupPart::Css(
                "
                .embedded_html {
                    display: block;
                    padding-left: 1ch;
                    padding-right: 1ch;
                    width: max-content;
                }
                .embedded_html iframe { border: none; resize: both; }
                "
                .to_string(),
            ));
        }
        PartKind::Deferred(deferred) => {
            collect_setup(deferred.placeholder(), ctx, out);
            if let Some(value) = deferred.value() {
                collect_setup(value, ctx, out);
            }
        }
        PartKind::CopyButton(_) => {
            out.insert(SetupPart::Css(
                "
                .copybutton {
                    border: none;
                    background: none;
                    cursor: pointer;
                    color: #aaaaaa;
                    padding: 0 0.5ch;
                }
                .copybutton::before { content: \"\\29C9\"; }
                "
                .to_string(),
            ));
            out.insert(SetupPart::Js(
                "
                treescope_defns.copy_path = (button) => {
                    navigator.clipboard.writeText(button.dataset.path);
                };
                "
                .to_string(),
            ));
        }
    }
}

/// Render `part` to a markup fragment (no setup parts).
pub fn render_to_html(part: &Part, ctx: &mut RenderContext) -> String {
    let mut out = String::new();
    emit_html(part, &mut out, true, ctx);
    out
}

/// Append the markup of `part` to `out`.
///
/// `at_line_start` is true when nothing precedes the part on its line; only
/// the first child of an inline sequence inherits it.
pub fn emit_html(part: &Part, out: &mut String, at_line_start: bool, ctx: &mut RenderContext) {
    match part.kind() {
        PartKind::Empty => {}
        PartKind::Text(text) => escape_html_into(out, text),
        PartKind::VerticalSpace(height) => {
            out.push_str(&format!(
                "<div style=\"height:{}; width:0;\"></div>",
                escape_html_attribute(height)
            ));
        }
        PartKind::Siblings(children) => {
            let mut first = at_line_start;
            for child in children {
                emit_html(child, out, first, ctx);
                first = false;
            }
        }
        PartKind::FoldCondition {
            collapsed,
            expanded,
        } => {
            wrap_branch(out, "when_collapsed", collapsed, at_line_start, ctx);
            wrap_branch(out, "when_expanded", expanded, at_line_start, ctx);
        }
        PartKind::RoundtripCondition {
            roundtrip,
            not_roundtrip,
        } => {
            wrap_branch(out, "when_roundtrip", roundtrip, at_line_start, ctx);
            wrap_branch(out, "when_not_roundtrip", not_roundtrip, at_line_start, ctx);
        }
        PartKind::SummarizableCondition { summary, detail } => {
            wrap_branch(
                out,
                "when_collapsed_and_not_roundtrip",
                summary,
                at_line_start,
                ctx,
            );
            wrap_branch(out, "when_expanded_or_roundtrip", detail, at_line_start, ctx);
        }
        PartKind::OnSeparateLines(children) => {
            emit_lines(out, "separate_lines_children", "separate_lines_child", children, ctx);
        }
        PartKind::IndentedChildren(children) => {
            emit_lines(out, "indented_children", "indented_child", children, ctx);
        }
        PartKind::Styled { style, child } => {
            match (style.css_class(), style.inline_css()) {
                (Some(class), _) => {
                    out.push_str(&format!("<span class=\"{}\">", class));
                }
                (None, Some(css)) => {
                    out.push_str(&format!("<span style=\"{}\">", escape_html_attribute(&css)));
                }
                (None, None) => out.push_str("<span>"),
            }
            emit_html(child, out, at_line_start, ctx);
            out.push_str("</span>");
        }
        PartKind::Tagged { child, .. } => emit_html(child, out, at_line_start, ctx),
        PartKind::OutlinedBox { outline, child } => {
            out.push_str("<span class=\"outerbox_for_outline\">");
            out.push_str("<span class=\"box_with_outline ");
            out.push_str(outline.css_class());
            out.push('"');
            if let Some(css) = outline.inline_css() {
                out.push_str(&format!(" style=\"{}\"", escape_html_attribute(&css)));
            }
            out.push('>');
            // The child starts its own line once the box is expanded.
            emit_html(child, out, true, ctx);
            out.push_str("</span></span>");
        }
        PartKind::HoverTooltip { tooltip, child } => {
            out.push_str(&format!(
                "<span class=\"has_hover_tooltip\" data-tooltip=\"{}\">",
                escape_html_attribute(tooltip)
            ));
            emit_html(child, out, at_line_start, ctx);
            out.push_str("</span>");
        }
        PartKind::ScopedSelectable(child) => {
            out.push_str("<span tabindex=\"-1\" class=\"scoped_unselectable\">");
            emit_html(child, out, at_line_start, ctx);
            out.push_str("</span>");
        }
        PartKind::Foldable(node) => {
            out.push_str("<span class=\"foldable_node");
            if at_line_start {
                out.push_str(" first_on_line");
            }
            out.push_str("\"><label><input type=\"checkbox\" class=\"foldable_node_toggle\"");
            if node.is_expanded() {
                out.push_str(" checked");
            }
            out.push_str("><span class=\"expand_marker\"></span></label>");
            emit_html(node.label(), out, at_line_start, ctx);
            emit_html(node.contents(), out, false, ctx);
            out.push_str("</span>");
        }
        PartKind::EmbeddedHtml { html, .. } => {
            let srcdoc = escape_html_attribute(&format!(
                "<html><body style=\"margin: 0\">{}</body></html>",
                html
            ));
            out.push_str(&format!(
                "<div class=\"embedded_html\"><iframe srcdoc=\"{}\" \
                 onload=\"treescope_defns.resize_iframe_by_content(this)\"></iframe></div>",
                srcdoc
            ));
        }
        PartKind::Deferred(deferred) => {
            // Streaming depends only on the context, so a value cached by an
            // earlier render still goes through its slot.
            if ctx.streams_deferred() {
                let node_id = ctx.queue_deferred(deferred.clone());
                out.push_str(&format!("<span id=\"{}\">", deferred_slot_id(node_id)));
                emit_html(deferred.placeholder(), out, at_line_start, ctx);
                out.push_str("</span>");
            } else {
                let value = ctx.force_deferred(deferred);
                emit_html(&value, out, at_line_start, ctx);
            }
        }
        PartKind::CopyButton(path) => {
            out.push_str(&format!(
                "<button class=\"copybutton\" data-path=\"{}\" \
                 onclick=\"treescope_defns.copy_path(this)\"></button>",
                escape_html_attribute(path)
            ));
        }
    }
}

/// Element id of the slot holding a streamed deferred part.
#[must_use]
pub fn deferred_slot_id(node_id: u64) -> String {
    format!("treescope_deferred_{}", node_id)
}

fn wrap_branch(
    out: &mut String,
    class: &str,
    branch: &Part,
    at_line_start: bool,
    ctx: &mut RenderContext,
) {
    if branch.is_empty() {
        return;
    }
    out.push_str(&format!("<span class=\"{}\">", class));
    emit_html(branch, out, at_line_start, ctx);
    out.push_str("</span>");
}

fn emit_lines(
    out: &mut String,
    outer_class: &str,
    child_class: &str,
    children: &[Part],
    ctx: &mut RenderContext,
) {
    out.push_str(&format!("<span class=\"{}\">", outer_class));
    for child in children {
        out.push_str(&format!("<span class=\"{}\">", child_class));
        emit_html(child, out, true, ctx);
        out.push_str("</span>");
    }
    out.push_str("</span>");
}
