//! Text utilities shared by the encoders.
//!
//! Each output format has its own escaping rules and they are intentionally not
//! unified: every function below escapes exactly the characters its format needs
//! in practice and nothing more.

use crate::domain::node::{NodeView, SourceRange};

/// DOT label text: double quotes only.
pub fn escape_dot(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// HTML entity escaping used inside DOT HTML-like labels.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON string literal, including the surrounding quotes.
/// Only backslash, double quote, `\n` and `\r` are escaped.
pub fn quote_json(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Cypher string literal body: single quotes only.
pub fn escape_cypher(value: &str) -> String {
    value.replace('\'', "\\'")
}

/// GraphML `<data>` body: angle brackets only. `&` and quotes pass through.
pub fn escape_graphml(value: &str) -> String {
    value.replace('<', "&lt;").replace('>', "&gt;")
}

/// Naive plural to singular: drop one trailing `s`.
///
/// Irregular plurals are not handled (`entries` becomes `entrie`).
pub fn singularize(name: &str) -> &str {
    name.strip_suffix('s').unwrap_or(name)
}

/// `(line,column)-(line,column)`, or `(-)` when the node has no range.
pub fn range_coordinates(range: Option<SourceRange>) -> String {
    match range {
        Some(r) => format!(
            "({},{})-({},{})",
            r.start_line, r.start_column, r.end_line, r.end_column
        ),
        None => "(-)".to_string(),
    }
}

/// Split into lines the way a line reader does: `\n`, `\r\n` and lone `\r` all terminate a line.
fn reader_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < bytes.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Collapse a node's text to one line.
///
/// Single-line text is returned as is. Multi-line text becomes the first line,
/// `...`, and the last character of the last line (typically `}`, `;` or `)`).
pub fn summarize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let mut lines = reader_lines(trimmed);
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    match lines.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [first, .., last] => {
            let mut out = String::with_capacity(first.len() + 4);
            out.push_str(first);
            out.push_str("...");
            if let Some(c) = last.chars().last() {
                out.push(c);
            }
            out
        }
    }
}

/// Summary of a node's rendered source text; empty when the node has none.
pub fn node_summary<N: NodeView + ?Sized>(node: &N) -> String {
    node.source_text()
        .map(|text| summarize(&text))
        .unwrap_or_default()
}

/// Remove `//` and `/* */` comments from Rust source text.
///
/// String, raw string, byte string and char literals are copied verbatim. Lines that
/// held nothing but a comment are dropped entirely.
pub fn strip_comments(src: &str) -> String {
    let chars: Vec<char> = src.chars().collect();
    let mut out = String::with_capacity(src.len());
    let mut line = String::new();
    let mut line_had_comment = false;
    let mut i = 0;

    let flush = |line: &mut String, had_comment: &mut bool, out: &mut String, newline: bool| {
        if !(*had_comment && line.trim().is_empty()) {
            out.push_str(line);
            if newline {
                out.push('\n');
            }
        }
        line.clear();
        *had_comment = false;
    };

    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                flush(&mut line, &mut line_had_comment, &mut out, true);
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                line_had_comment = true;
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
            }
            '/' if chars.get(i + 1) == Some(&'*') => {
                line_had_comment = true;
                let mut depth = 1;
                i += 2;
                while i < chars.len() && depth > 0 {
                    if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
                        depth += 1;
                        i += 2;
                    } else if chars[i] == '*' && chars.get(i + 1) == Some(&'/') {
                        depth -= 1;
                        i += 2;
                    } else {
                        if chars[i] == '\n' {
                            flush(&mut line, &mut line_had_comment, &mut out, true);
                            line_had_comment = true;
                        }
                        i += 1;
                    }
                }
            }
            'r' if is_raw_string_start(&chars, i) => {
                i = copy_raw_string(&chars, i, &mut line);
            }
            '"' => {
                i = copy_quoted(&chars, i, '"', &mut line, &mut out, &mut line_had_comment);
            }
            '\'' if is_char_literal(&chars, i) => {
                i = copy_quoted(&chars, i, '\'', &mut line, &mut out, &mut line_had_comment);
            }
            _ => {
                line.push(c);
                i += 1;
            }
        }
    }
    flush(&mut line, &mut line_had_comment, &mut out, false);
    out
}

fn is_raw_string_start(chars: &[char], i: usize) -> bool {
    if i > 0 && (chars[i - 1].is_alphanumeric() || chars[i - 1] == '_') && chars[i - 1] != 'b' {
        return false;
    }
    let mut j = i + 1;
    while chars.get(j) == Some(&'#') {
        j += 1;
    }
    chars.get(j) == Some(&'"')
}

fn copy_raw_string(chars: &[char], start: usize, line: &mut String) -> usize {
    let mut i = start + 1;
    let mut hashes = 0;
    while chars.get(i) == Some(&'#') {
        hashes += 1;
        i += 1;
    }
    // opening quote
    i += 1;
    line.extend(&chars[start..i]);
    while i < chars.len() {
        if chars[i] == '"' && (1..=hashes).all(|k| chars.get(i + k) == Some(&'#')) {
            line.extend(&chars[i..=i + hashes]);
            return i + hashes + 1;
        }
        line.push(chars[i]);
        i += 1;
    }
    i
}

/// Distinguish `'a'` / `'\n'` from lifetimes such as `'a`.
fn is_char_literal(chars: &[char], i: usize) -> bool {
    match (chars.get(i + 1), chars.get(i + 2)) {
        (Some('\\'), _) => true,
        (Some(_), Some('\'')) => true,
        _ => false,
    }
}

fn copy_quoted(
    chars: &[char],
    start: usize,
    quote: char,
    line: &mut String,
    out: &mut String,
    had_comment: &mut bool,
) -> usize {
    line.push(quote);
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            line.push(c);
            if let Some(&next) = chars.get(i + 1) {
                line.push(next);
            }
            i += 2;
            continue;
        }
        if c == '\n' {
            // multi-line string literal: the line is code, never a comment-only line
            out.push_str(line);
            out.push('\n');
            line.clear();
            *had_comment = false;
            i += 1;
            continue;
        }
        line.push(c);
        i += 1;
        if c == quote {
            break;
        }
    }
    i
}

/// Pad with trailing spaces up to `min_len` characters.
pub fn pad_end(input: &str, min_len: usize) -> String {
    let len = input.chars().count();
    if len >= min_len {
        return input.to_string();
    }
    let mut out = String::with_capacity(min_len);
    out.push_str(input);
    out.extend(std::iter::repeat(' ').take(min_len - len));
    out
}

/// Pad with leading spaces up to `min_len` characters.
pub fn pad_start(input: &str, min_len: usize) -> String {
    let len = input.chars().count();
    if len >= min_len {
        return input.to_string();
    }
    let mut out: String = std::iter::repeat(' ').take(min_len - len).collect();
    out.push_str(input);
    out
}

/// Make tabs and line breaks visible, for single-line diagnostics.
pub fn escape_whitespace(value: &str) -> String {
    value
        .replace("\r\n", "\\r\\n")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_single_line_drops_trailing_newline() {
        assert_eq!(summarize("int i;\n"), "int i;");
    }

    #[test]
    fn test_summarize_multi_line() {
        assert_eq!(summarize("new Object(){\n    int i;\n}"), "new Object(){...}");
        assert_eq!(summarize("foo(\n  a,\n  b)\r\n"), "foo(...)");
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(""), "");
        assert_eq!(summarize("   \n  "), "");
    }

    #[test]
    fn test_escape_dot_only_quotes() {
        assert_eq!(escape_dot(r#"say "hi" <&>"#), r#"say \"hi\" <&>"#);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_quote_json() {
        assert_eq!(quote_json("a\"b\\c\nd\re\t"), "\"a\\\"b\\\\c\\nd\\re\t\"");
    }

    #[test]
    fn test_escape_cypher_only_single_quotes() {
        assert_eq!(escape_cypher(r#"it's "x" \n"#), r#"it\'s "x" \n"#);
    }

    #[test]
    fn test_escape_graphml_leaves_ampersand() {
        assert_eq!(escape_graphml("a<b && c>\"d\""), "a&lt;b && c&gt;\"d\"");
    }

    #[test]
    fn test_singularize_is_naive() {
        assert_eq!(singularize("statements"), "statement");
        assert_eq!(singularize("entries"), "entrie");
        assert_eq!(singularize("body"), "body");
        assert_eq!(singularize("class"), "clas");
    }

    #[test]
    fn test_range_coordinates() {
        assert_eq!(range_coordinates(Some(SourceRange::new(1, 1, 3, 1))), "(1,1)-(3,1)");
        assert_eq!(range_coordinates(None), "(-)");
    }

    #[test]
    fn test_strip_comments() {
        let src = "/// docs\nfn a() { // trailing\n    /* block */ let s = \"// not\";\n}";
        assert_eq!(strip_comments(src), "fn a() { \n     let s = \"// not\";\n}");
    }

    #[test]
    fn test_strip_comments_keeps_lifetimes_and_chars() {
        let src = "fn f<'a>(x: &'a str) -> char { '/' }";
        assert_eq!(strip_comments(src), src);
        let raw = "r#\"// raw\"#";
        assert_eq!(strip_comments(raw), raw);
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad_end("ABC", 0), "ABC");
        assert_eq!(pad_end("ABC", 3), "ABC");
        assert_eq!(pad_end("ABC", 5), "ABC  ");
        assert_eq!(pad_start("ABC", 5), "  ABC");
        assert_eq!(pad_start("ABC", 2), "ABC");
    }

    #[test]
    fn test_escape_whitespace() {
        assert_eq!(escape_whitespace("a\tb\r\nc\nd"), "a\\tb\\r\\nc\\nd");
    }
}
