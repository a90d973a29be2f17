//! HTML escaping.

/// Append `text` to `out` with `& < > " '` replaced by entities.
pub fn escape_html_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
}

/// Escape `text` for use as HTML element content.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_html_into(&mut out, text);
    out
}

/// Escape `text` for a double-quoted attribute value.
///
/// Newlines are encoded too so that `srcdoc` payloads survive on one line.
#[must_use]
pub fn escape_html_attribute(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => {
                let mut buf = [0u8; 4];
                escape_html_into(&mut out, ch.encode_utf8(&mut buf));
            }
        }
    }
    out
}

/// Collapse every whitespace run to one space and trim both ends.
///
/// Used to shrink embedded CSS and JS.
#[must_use]
pub fn without_repeated_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
