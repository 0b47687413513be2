//! Flattening of structured field content to embeddable text
//!
//! The source field of an entity may hold anything from a plain string to a
//! deeply nested summary document. Embedding input is a single plain-text
//! string, so the fold below reduces every JSON shape to one.

use serde_json::Value;

/// Hard cap on embedding input length, in characters.
///
/// Provider token-limit protection; text past the cap is dropped silently.
pub const MAX_EMBED_CHARS: usize = 8000;

/// Recursively reduce a JSON value to a single plain-text string.
///
/// Null becomes the empty string, scalars their display form, sequences and
/// keyed structures the space-joined flattening of their parts. Only
/// sequences guarantee part order; object iteration order is whatever the
/// map yields.
pub fn flatten(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(flatten).collect::<Vec<_>>().join(" "),
        Value::Object(map) => map.values().map(flatten).collect::<Vec<_>>().join(" "),
    }
}

/// Truncate `text` to at most `max_chars` characters.
///
/// Counts characters rather than bytes so multi-byte content is never cut
/// mid-scalar.
pub fn truncate_chars(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_flattens_to_empty() {
        assert_eq!(flatten(&Value::Null), "");
    }

    #[test]
    fn test_scalars_flatten_to_display_form() {
        assert_eq!(flatten(&json!("Fix bug")), "Fix bug");
        assert_eq!(flatten(&json!(42)), "42");
        assert_eq!(flatten(&json!(0.5)), "0.5");
        assert_eq!(flatten(&json!(true)), "true");
    }

    #[test]
    fn test_flatten_is_idempotent_on_scalars() {
        for scalar in [json!("text"), json!(7), json!(false)] {
            let once = flatten(&scalar);
            let twice = flatten(&Value::String(once.clone()));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_sequence_preserves_order() {
        assert_eq!(flatten(&json!(["y", "z"])), "y z");
    }

    #[test]
    fn test_nested_structure_contains_all_leaves() {
        let text = flatten(&json!({ "a": "x", "b": ["y", "z"] }));
        assert!(text.contains('x'));
        assert!(text.contains('y'));
        assert!(text.contains('z'));
        // Order inside the sequence holds even when map order does not.
        let y = text.find('y').unwrap();
        let z = text.find('z').unwrap();
        assert!(y < z);
    }

    #[test]
    fn test_deeply_nested_summary_document() {
        let summary = json!({
            "topics": [
                { "title": "Roadmap", "points": ["ship v2", "cut scope"] },
                { "title": "Hiring", "points": [] }
            ],
            "attendees": 4
        });
        let text = flatten(&summary);
        assert!(text.contains("Roadmap"));
        assert!(text.contains("ship v2"));
        assert!(text.contains('4'));
    }

    #[test]
    fn test_truncate_leaves_short_text_alone() {
        let text = "short".to_string();
        assert_eq!(truncate_chars(text.clone(), MAX_EMBED_CHARS), text);
    }

    #[test]
    fn test_truncate_to_exactly_max_chars() {
        let text = "a".repeat(MAX_EMBED_CHARS + 500);
        let bounded = truncate_chars(text, MAX_EMBED_CHARS);
        assert_eq!(bounded.chars().count(), MAX_EMBED_CHARS);
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let text = "é".repeat(10);
        let bounded = truncate_chars(text, 4);
        assert_eq!(bounded, "é".repeat(4));
    }
}
