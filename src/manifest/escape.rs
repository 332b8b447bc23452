//! Free-text handling for manifest fields.
//!
//! Text goes through [`sanitize`] (single line, no control characters), then
//! [`truncate`] where a cap applies, then [`escape`]. [`unescape`] inverts
//! `escape` exactly.

/// Characters with structural meaning in an entry line.
pub const SPECIALS: &[char] = &['\\', '|', '[', ']', '{', '}', ',', ';'];

pub const ELLIPSIS: &str = "...";

/// Collapses each run of CR, LF and tab into one space and drops other control
/// characters.
#[must_use]
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if matches!(c, '\r' | '\n' | '\t') {
            if !in_break {
                out.push(' ');
                in_break = true;
            }
            continue;
        }
        in_break = false;
        if !c.is_control() {
            out.push(c);
        }
    }
    out
}

#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        if SPECIALS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[must_use]
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Sanitizes then escapes.
#[must_use]
pub fn clean(text: &str) -> String {
    escape(&sanitize(text))
}

/// Cuts `text` to at most `cap` characters, ending in [`ELLIPSIS`] when cut.
#[must_use]
pub fn truncate(text: &str, cap: usize) -> String {
    if text.chars().count() <= cap {
        return text.to_string();
    }
    let keep = cap.saturating_sub(ELLIPSIS.len());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Splits on `sep` wherever it is not backslash-escaped. Pieces stay escaped.
#[must_use]
pub fn split_unescaped(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&text[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&text[start..]);
    parts
}
