//! Leading documentation extraction: the first comment block of a file.

use crate::lang::{CommentStyle, Lang};

/// Returns the text of the first leading comment, whitespace-collapsed, or `None`
/// if the file starts with code (after a shebang and blank lines).
#[must_use]
pub fn leading_comment(source: &str, lang: Option<Lang>) -> Option<String> {
    let style = lang.map_or(CommentStyle::CFamily, Lang::comment_style);
    let mut lines = source
        .lines()
        .skip_while(|l| l.starts_with("#!"))
        .skip_while(|l| l.trim().is_empty())
        .peekable();

    let first = lines.peek()?.trim_start().to_string();
    let text = match style {
        CommentStyle::Hash if first.starts_with("\"\"\"") || first.starts_with("'''") => {
            docstring(&mut lines)
        }
        CommentStyle::Hash => line_comments(&mut lines, &["#"]),
        CommentStyle::CFamily if first.starts_with("/*") => block_comment(&mut lines),
        CommentStyle::CFamily => line_comments(&mut lines, &["//!", "///", "//"]),
    }?;

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!collapsed.is_empty()).then_some(collapsed)
}

fn line_comments<'a, I>(lines: &mut I, markers: &[&str]) -> Option<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut parts = Vec::new();
    for line in lines {
        let trimmed = line.trim_start();
        let Some(body) = markers.iter().find_map(|m| trimmed.strip_prefix(m)) else {
            break;
        };
        parts.push(body.trim().to_string());
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn block_comment<'a, I>(lines: &mut I) -> Option<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut parts = Vec::new();
    for (i, line) in lines.enumerate() {
        let mut body = line.trim();
        if i == 0 {
            body = body.trim_start_matches("/**").trim_start_matches("/*");
        }
        let done = body.contains("*/");
        if let Some((before, _)) = body.split_once("*/") {
            body = before;
        }
        let body = body.trim().trim_start_matches('*').trim();
        if !body.is_empty() {
            parts.push(body.to_string());
        }
        if done {
            break;
        }
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}

fn docstring<'a, I>(lines: &mut I) -> Option<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut parts = Vec::new();
    let mut quote = "\"\"\"";
    for (i, line) in lines.enumerate() {
        let mut body = line.trim();
        if i == 0 {
            if body.starts_with("'''") {
                quote = "'''";
            }
            body = &body[quote.len()..];
        }
        let done = body.contains(quote);
        if let Some((before, _)) = body.split_once(quote) {
            body = before;
        }
        if !body.trim().is_empty() {
            parts.push(body.trim().to_string());
        }
        if done {
            break;
        }
    }
    (!parts.is_empty()).then(|| parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_line_comments() {
        let src = "// src/graph/mod.rs\n//! Graph metrics.\n\nuse std::io;\n// later\n";
        assert_eq!(
            leading_comment(src, Some(Lang::Rust)).as_deref(),
            Some("src/graph/mod.rs Graph metrics.")
        );
    }

    #[test]
    fn jsdoc_block() {
        let src = "/**\n * Renders the app.\n * @module app\n */\nexport {}\n";
        assert_eq!(
            leading_comment(src, Some(Lang::TypeScript)).as_deref(),
            Some("Renders the app. @module app")
        );
    }

    #[test]
    fn python_docstring_after_shebang() {
        let src = "#!/usr/bin/env python3\n\"\"\"\nPython dependency indexer\nfor IntelliMap\n\"\"\"\nimport ast\n";
        assert_eq!(
            leading_comment(src, Some(Lang::Python)).as_deref(),
            Some("Python dependency indexer for IntelliMap")
        );
    }

    #[test]
    fn single_line_docstring() {
        let src = "\"\"\"Main server module\"\"\"\nfrom .routes import get_routes\n";
        assert_eq!(
            leading_comment(src, Some(Lang::Python)).as_deref(),
            Some("Main server module")
        );
    }

    #[test]
    fn code_first_has_no_doc() {
        assert_eq!(leading_comment("fn main() {}\n// late", Some(Lang::Rust)), None);
        assert_eq!(leading_comment("", None), None);
        assert_eq!(leading_comment("//\n//\nx", Some(Lang::Go)), None);
    }
}
