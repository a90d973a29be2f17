//! Indentation helpers for expanded text output.

/// Push `width` spaces.
#[inline]
pub fn push_indent(out: &mut String, width: usize) {
    out.extend(std::iter::repeat_n(' ', width));
}

/// Re-join the lines of `text` so every line after the first starts with
/// `indent` spaces.
#[must_use]
pub fn reindent(text: &str, indent: usize) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            push_indent(&mut out, indent);
        }
        out.push_str(line);
    }
    out
}

/// Render `text` as a block of `# ` comment lines at `indent`.
///
/// Each non-empty line becomes `"\n" + indent + "# " + line`; empty lines
/// become a bare `"\n"`. The block is closed with `"\n" + indent` so the
/// next token lands on a fresh, indented line.
#[must_use]
pub fn comment_out(text: &str, indent: usize) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for line in text.lines() {
        out.push('\n');
        if !line.is_empty() {
            push_indent(&mut out, indent);
            out.push_str("# ");
            out.push_str(line);
        }
    }
    out.push('\n');
    push_indent(&mut out, indent);
    out
}

/// Number of `'\n'` characters in `text`.
#[inline]
#[must_use]
pub fn newline_count(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count()
}
