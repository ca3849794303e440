//! Recovers a JSON payload from free-form model output.
//!
//! Models wrap JSON in markdown fences, prepend chatter, leave trailing commas,
//! and emit raw newlines inside string literals. The pipeline here is:
//! strip fences → locate the outermost balanced `{...}` / `[...]` →
//! flatten raw line breaks → strip trailing commas → parse.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use super::LlmError;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").expect("valid regex"));

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid regex"));

/// Bracketed spans tried before giving up; chatter like "[note]" can precede the payload.
const MAX_CANDIDATES: usize = 16;

/// Extracts and parses the JSON value embedded in `text`.
pub fn extract_json(text: &str) -> Result<Value, LlmError> {
    let body = strip_code_fences(text);

    let mut first_error: Option<serde_json::Error> = None;
    let mut search_from = 0;

    for _ in 0..MAX_CANDIDATES {
        let Some((start, end)) = next_balanced_span(body, search_from) else {
            break;
        };
        match parse_candidate(&body[start..end]) {
            Ok(value) => return Ok(value),
            Err(e) => {
                first_error.get_or_insert(e);
                search_from = end;
            }
        }
    }

    match first_error {
        Some(e) => Err(LlmError::Parse(e)),
        None => Err(LlmError::MalformedResponse(format!(
            "no JSON object or array found in reply starting '{}'",
            preview(text)
        ))),
    }
}

/// Returns the contents of the first fenced block, or the input when there is none.
/// An unterminated opening fence is dropped so a truncated reply can still parse.
fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(inner) = FENCED_BLOCK.captures(text).and_then(|c| c.get(1)) {
        return inner.as_str().trim();
    }
    if let Some(stripped) = text.strip_prefix("```json") {
        return stripped.trim_start();
    }
    if let Some(stripped) = text.strip_prefix("```") {
        return stripped.trim_start();
    }
    text
}

fn parse_candidate(candidate: &str) -> Result<Value, serde_json::Error> {
    let flattened = candidate.replace(['\n', '\r', '\t'], " ");
    let cleaned = TRAILING_COMMA.replace_all(&flattened, "$1");
    serde_json::from_str(&cleaned)
}

enum SpanEnd {
    Closed(usize),
    Mismatched,
    Unterminated,
}

/// Finds the next `{`/`[` at or after `from` and the byte offset just past its
/// matching closer, honoring string literals and escapes. An opener left
/// unterminated ends the search; everything after it lies inside that span.
fn next_balanced_span(text: &str, from: usize) -> Option<(usize, usize)> {
    let mut cursor = from;
    loop {
        let offset = text.get(cursor..)?.find(['{', '['])?;
        let start = cursor + offset;
        match balanced_end(text, start) {
            SpanEnd::Closed(end) => return Some((start, end)),
            SpanEnd::Mismatched => cursor = start + 1,
            SpanEnd::Unterminated => return None,
        }
    }
}

fn balanced_end(text: &str, start: usize) -> SpanEnd {
    let mut closers: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => closers.push('}'),
            '[' => closers.push(']'),
            '}' | ']' => {
                if closers.pop() != Some(c) {
                    return SpanEnd::Mismatched;
                }
                if closers.is_empty() {
                    return SpanEnd::Closed(start + i + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    SpanEnd::Unterminated
}

fn preview(text: &str) -> String {
    text.trim().chars().take(80).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_object() {
        let value = extract_json(r#"{"key": "value"}"#).unwrap();
        assert_eq!(value, json!({"key": "value"}));
    }

    #[test]
    fn test_fenced_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(input).unwrap(), json!({"key": "value"}));
    }

    #[test]
    fn test_fenced_without_tag_and_chatter() {
        let input = "Here you go:\n```\n{\"section\": \"skills\"}\n```\nLet me know!";
        assert_eq!(extract_json(input).unwrap(), json!({"section": "skills"}));
    }

    #[test]
    fn test_unterminated_fence() {
        let input = "```json\n{\"a\": 1}";
        assert_eq!(extract_json(input).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_trailing_commas_removed() {
        let input = r#"{"skills": ["Rust", "Go",], "name": "Ada",}"#;
        assert_eq!(
            extract_json(input).unwrap(),
            json!({"skills": ["Rust", "Go"], "name": "Ada"})
        );
    }

    #[test]
    fn test_outermost_object_with_nested_braces() {
        let input = r#"Result: {"outer": {"inner": [1, {"x": 2}]}} trailing words"#;
        assert_eq!(
            extract_json(input).unwrap(),
            json!({"outer": {"inner": [1, {"x": 2}]}})
        );
    }

    #[test]
    fn test_braces_inside_strings_ignored() {
        let input = r#"{"text": "use {braces} and ] brackets", "ok": true}"#;
        let value = extract_json(input).unwrap();
        assert_eq!(value["text"], "use {braces} and ] brackets");
        assert_eq!(value["ok"], true);
    }

    #[test]
    fn test_array_payload() {
        let input = "Suggestions:\n[\"Add metrics\", \"Shorten summary\",]";
        assert_eq!(
            extract_json(input).unwrap(),
            json!(["Add metrics", "Shorten summary"])
        );
    }

    #[test]
    fn test_raw_newline_inside_string_is_flattened() {
        let input = "{\"summary\": \"line one\nline two\"}";
        assert_eq!(extract_json(input).unwrap()["summary"], "line one line two");
    }

    #[test]
    fn test_skips_leading_bracketed_chatter() {
        let input = r#"[note] the edit follows {"section": "skills"}"#;
        assert_eq!(extract_json(input).unwrap(), json!({"section": "skills"}));
    }

    #[test]
    fn test_no_json_is_malformed() {
        let err = extract_json("Sorry, I can't do that.").unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[test]
    fn test_truncated_object_is_malformed() {
        let err = extract_json(r#"{"section": "skills", "updated_content": ["#).unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[test]
    fn test_unparseable_outer_object_never_yields_inner_array() {
        let input = r#"{'section': 'skills', 'updated_content': ["Python", "SQL"]}"#;
        let err = extract_json(input).unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }

    #[test]
    fn test_sibling_after_unparseable_span_is_used() {
        let input = r#"{draft: 1} then {"section": "skills"}"#;
        assert_eq!(extract_json(input).unwrap(), json!({"section": "skills"}));
    }

    #[test]
    fn test_truncated_outer_object_never_yields_inner_object() {
        let err = extract_json(r#"{"section": "skills", "updated_content": {"a": 1}"#).unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[test]
    fn test_invalid_json_is_typed_parse_error() {
        let err = extract_json("{section: skills}").unwrap_err();
        assert!(matches!(err, LlmError::Parse(_)));
    }
}
