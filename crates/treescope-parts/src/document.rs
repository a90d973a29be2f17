#![forbid(unsafe_code)]

//! Self-contained HTML documents.
//!
//! A document is a `treescope_root` container holding the deduplicated setup
//! parts followed by the rendered body. When the render context streams
//! deferred parts, their content follows the body in `<template>` elements
//! that a final script swaps into the placeholder slots.

use std::collections::BTreeSet;

use treescope_text::without_repeated_whitespace;

use crate::context::RenderContext;
use crate::html::{SetupContext, SetupPart, collect_setup, deferred_slot_id, emit_html};
use crate::part::Part;

const ROOT_CSS: &str = "
    .treescope_root {
        font-family: monospace;
        white-space: pre;
        line-height: 1.5;
        color: #202020;
    }
";

const DEFNS_PRELUDE: &str = "window.treescope_defns = window.treescope_defns || {};";

const SWAP_TEMPLATES_JS: &str = "
    for (const template of document.querySelectorAll('template.treescope_deferred')) {
        const slot = document.getElementById(template.dataset.target);
        if (slot) {
            slot.replaceWith(template.content.cloneNode(true));
        }
        template.remove();
    }
";

/// Options for [`render_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Start in roundtrip mode.
    pub roundtrip: bool,
    /// Collapse whitespace in emitted CSS and JavaScript.
    pub compress: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            roundtrip: false,
            compress: true,
        }
    }
}

/// Render `root` as a complete HTML fragment with its setup parts.
#[must_use]
pub fn render_document(root: &Part, opts: DocumentOptions, ctx: &mut RenderContext) -> String {
    let setup_ctx = SetupContext::default();

    let mut body = String::new();
    emit_html(root, &mut body, true, ctx);

    let mut emitted = BTreeSet::new();
    collect_setup(root, &setup_ctx, &mut emitted);

    let mut out = String::with_capacity(body.len() + 4096);
    out.push_str("<div class=\"treescope_root");
    if opts.roundtrip {
        out.push_str(" roundtrip_mode");
    }
    out.push_str("\">");
    write_setup_block(&mut out, ROOT_CSS, &emitted, opts.compress, true);
    out.push_str("<div class=\"treescope_body\">");
    out.push_str(&body);
    out.push_str("</div></div>");

    let streamed = stream_deferred(&mut out, &setup_ctx, &mut emitted, opts.compress, ctx);
    if streamed > 0 {
        out.push_str("<script>");
        out.push_str(&maybe_compress(SWAP_TEMPLATES_JS, opts.compress));
        out.push_str("</script>");
        treescope_core::debug!(streamed, "streamed deferred parts");
    }
    out
}

/// Emit every queued deferred part as a template, including parts queued
/// while rendering earlier ones. Returns how many were emitted.
fn stream_deferred(
    out: &mut String,
    setup_ctx: &SetupContext,
    emitted: &mut BTreeSet<SetupPart>,
    compress: bool,
    ctx: &mut RenderContext,
) -> usize {
    let mut count = 0;
    loop {
        let pending = ctx.take_pending();
        if pending.is_empty() {
            return count;
        }
        for item in pending {
            let value = ctx.force_deferred(&item.deferred);
            let mut html = String::new();
            emit_html(&value, &mut html, false, ctx);

            let mut needed = BTreeSet::new();
            collect_setup(&value, setup_ctx, &mut needed);
            let fresh: BTreeSet<SetupPart> = needed.difference(emitted).cloned().collect();
            if !fresh.is_empty() {
                write_setup_block(out, "", &fresh, compress, false);
                emitted.extend(fresh);
            }

            out.push_str(&format!(
                "<template class=\"treescope_deferred\" data-target=\"{}\">{}</template>",
                deferred_slot_id(item.node_id),
                html
            ));
            count += 1;
        }
    }
}

fn write_setup_block(
    out: &mut String,
    extra_css: &str,
    parts: &BTreeSet<SetupPart>,
    compress: bool,
    with_prelude: bool,
) {
    let mut css = String::new();
    let mut js = String::new();
    if !extra_css.is_empty() {
        css.push_str(&maybe_compress(extra_css, compress));
        css.push('\n');
    }
    if with_prelude {
        js.push_str(DEFNS_PRELUDE);
        js.push('\n');
    }
    for part in parts {
        match part {
            SetupPart::Css(rule) => {
                css.push_str(&maybe_compress(rule, compress));
                css.push('\n');
            }
            SetupPart::Js(defn) => {
                js.push_str(&maybe_compress(defn, compress));
                js.push('\n');
            }
        }
    }
    if !css.is_empty() {
        out.push_str(&format!("<style>{}</style>", css));
    }
    if !js.is_empty() {
        out.push_str(&format!("<script>{}</script>", js));
    }
}

fn maybe_compress(source: &str, compress: bool) -> String {
    if compress {
        without_repeated_whitespace(source)
    } else {
        source.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{deferred, fold_condition, siblings, text};

    #[test]
    fn document_wraps_body_with_setup() {
        let part = fold_condition(text("a"), text("b"));
        let out = render_document(&part, DocumentOptions::default(), &mut RenderContext::new());
        assert!(out.starts_with("<div class=\"treescope_root\"><style>"));
        assert!(out.contains(".when_collapsed { display: none; }"));
        assert!(out.contains(DEFNS_PRELUDE));
        assert!(out.ends_with(
            "<div class=\"treescope_body\"><span class=\"when_collapsed\">a</span>\
             <span class=\"when_expanded\">b</span></div></div>"
        ));
    }

    #[test]
    fn roundtrip_sets_root_class() {
        let opts = DocumentOptions {
            roundtrip: true,
            ..DocumentOptions::default()
        };
        let out = render_document(&text("x"), opts, &mut RenderContext::new());
        assert!(out.starts_with("<div class=\"treescope_root roundtrip_mode\">"));
    }

    #[test]
    fn uncompressed_keeps_rule_layout() {
        let opts = DocumentOptions {
            compress: false,
            ..DocumentOptions::default()
        };
        let out = render_document(&text("x"), opts, &mut RenderContext::new());
        assert!(out.contains("\n        font-family: monospace;\n"));
    }

    #[test]
    fn streamed_deferreds_follow_body() {
        let part = siblings([
            text("v="),
            deferred(text("..."), || fold_condition(text("c"), text("e"))),
        ]);
        let mut ctx = RenderContext::streaming();
        let out = render_document(&part, DocumentOptions::default(), &mut ctx);

        let body_end = out.find("</div></div>").unwrap();
        let template = out
            .find("<template class=\"treescope_deferred\" data-target=\"treescope_deferred_0\">")
            .unwrap();
        assert!(template > body_end);
        // The fold rule is only needed by the deferred content.
        let rule = out.find(".when_collapsed { display: none; }").unwrap();
        assert!(rule > body_end && rule < template);
        assert!(out.ends_with("</script>"));
        assert_eq!(ctx.pending_len(), 0);
        assert_eq!(ctx.deferreds_forced(), 1);
    }

    #[test]
    fn streamed_render_is_repeatable() {
        let part = siblings([text("a"), deferred(text("..."), || text("VALUE"))]);
        let render = || {
            render_document(&part, DocumentOptions::default(), &mut RenderContext::streaming())
        };
        let first = render();
        let second = render();
        assert!(second.contains("<span id=\"treescope_deferred_0\">...</span>"));
        assert!(second.contains(">VALUE</template>"));
        assert_eq!(first, second);
    }

    #[test]
    fn inline_render_does_not_change_later_streaming() {
        let part = deferred(text("..."), || text("VALUE"));
        let inline = render_document(&part, DocumentOptions::default(), &mut RenderContext::new());
        assert!(inline.contains("<div class=\"treescope_body\">VALUE</div>"));
        let streamed =
            render_document(&part, DocumentOptions::default(), &mut RenderContext::streaming());
        assert!(streamed.contains("<div class=\"treescope_body\"><span id="));
        assert_eq!(streamed.matches("<template").count(), 1);
    }

    #[test]
    fn nested_deferreds_are_all_streamed() {
        let part = deferred(text("outer..."), || {
            deferred(text("inner..."), || text("done"))
        });
        let mut ctx = RenderContext::streaming();
        let out = render_document(&part, DocumentOptions::default(), &mut ctx);
        assert_eq!(out.matches("<template").count(), 2);
        assert!(out.contains(">done</template>"));
    }
}
