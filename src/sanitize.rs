//! Best-effort cleanup of generated text before schema parsing.
//!
//! Models often wrap JSON in markdown fences and echo the `//` annotations
//! from the format instructions. Cleanup removes both without touching
//! the contents of JSON string literals.

const FENCE: &str = "```";

/// Strip fences and line comments, then trim surrounding whitespace.
pub fn sanitize(raw: &str) -> String {
    let unfenced = strip_code_fences(raw);
    strip_line_comments(&unfenced).trim().to_string()
}

/// Remove every markdown fence marker, including an info string such as `json`.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        // a run of four or more backticks is still one marker
        rest = rest.trim_start_matches('`');
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        rest = &rest[tag_len..];
    }
    out.push_str(rest);
    out
}

/// Remove `//` comments that start outside a JSON string literal.
pub fn strip_line_comments(text: &str) -> String {
    text.lines()
        .map(strip_comment_from_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_comment_from_line(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
        } else if b == b'"' {
            in_string = true;
        } else if b == b'/' && bytes.get(i + 1) == Some(&b'/') {
            return line[..i].trim_end();
        }
        i += 1;
    }
    line
}

/// The outermost `{ ... }` span, if the text contains one.
///
/// Lets a parse succeed when the model adds prose around the object.
pub fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n{\"a\": 1}\n```";
        assert_eq!(sanitize(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        let raw = "```\n{\"a\": 1}\n```\n";
        assert_eq!(sanitize(raw), "{\"a\": 1}");
    }

    #[test]
    fn strips_inline_fence() {
        assert_eq!(strip_code_fences("```json{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn unfenced_text_is_unchanged() {
        let raw = "{\"a\": [1, 2]}";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn strips_trailing_comments() {
        let raw = "{\n  \"a\": 1, // the count\n  \"b\": 2\n}\n// done";
        assert_eq!(sanitize(raw), "{\n  \"a\": 1,\n  \"b\": 2\n}");
    }

    #[test]
    fn keeps_slashes_inside_strings() {
        let raw = r#"{"url": "https://example.org/help", "x": "a \"//\" b"} // note"#;
        assert_eq!(
            sanitize(raw),
            r#"{"url": "https://example.org/help", "x": "a \"//\" b"}"#
        );
    }

    #[test]
    fn object_span_ignores_surrounding_prose() {
        let text = "Here you go: {\"a\": {\"b\": 1}} Hope it helps!";
        assert_eq!(json_object_span(text), Some("{\"a\": {\"b\": 1}}"));
        assert_eq!(json_object_span("no braces here"), None);
        assert_eq!(json_object_span("} backwards {"), None);
    }
}
