//! Extraction of the suggestion payload from model output.
//!
//! Models sometimes wrap JSON in markdown fences even when told not to, so
//! fences are stripped before parsing. The shape is trusted only as far as
//! "top-level object": missing or mistyped arrays become empty lists.

use serde_json::{Map, Value};

use crate::error::PlanError;

/// The four suggestion lists of a generated plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Suggestions {
    pub theme_suggestions: Vec<String>,
    pub activities: Vec<String>,
    pub todo_list: Vec<String>,
    pub gift_ideas: Vec<String>,
}

/// Remove a leading ```` ``` ```` fence (with optional language tag) and a
/// trailing ```` ``` ```` fence, plus surrounding whitespace.
pub fn strip_code_fences(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        let tag_len = rest
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(rest.len());
        s = rest[tag_len..].trim_start();
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest.trim_end();
    }
    s
}

/// Parse model output into [`Suggestions`].
pub fn parse_suggestions(text: &str) -> Result<Suggestions, PlanError> {
    let body = strip_code_fences(text);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| PlanError::MalformedResponse(format!("response is not valid JSON: {e}")))?;

    let Value::Object(obj) = value else {
        return Err(PlanError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            value_kind(&value)
        )));
    };

    Ok(Suggestions {
        theme_suggestions: string_list(&obj, "theme_suggestions"),
        activities: string_list(&obj, "activities"),
        todo_list: string_list(&obj, "todo_list"),
        gift_ideas: string_list(&obj, "gift_ideas"),
    })
}

/// Read `key` as a list of strings, dropping anything that is not one.
fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{"theme_suggestions":["Unicorns"],"activities":["Cake"],"todo_list":["Buy balloons"],"gift_ideas":["Doll"]}"#;

    // -- strip_code_fences --

    #[test]
    fn strips_json_fence_on_one_line() {
        let fenced = format!("```json {PAYLOAD} ```");
        assert_eq!(strip_code_fences(&fenced), PAYLOAD);
    }

    #[test]
    fn strips_multiline_fence() {
        let fenced = format!("```json\n{PAYLOAD}\n```\n");
        assert_eq!(strip_code_fences(&fenced), PAYLOAD);
    }

    #[test]
    fn strips_bare_fence_without_tag() {
        let fenced = format!("```\n{PAYLOAD}\n```");
        assert_eq!(strip_code_fences(&fenced), PAYLOAD);
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences(&format!("  {PAYLOAD}\n")), PAYLOAD);
    }

    #[test]
    fn tag_directly_followed_by_brace() {
        assert_eq!(strip_code_fences("```json{\"a\":1}```"), "{\"a\":1}");
    }

    // -- parse_suggestions --

    #[test]
    fn parses_fenced_payload() {
        let s = parse_suggestions(&format!("```json {PAYLOAD} ```")).unwrap();
        assert_eq!(s.theme_suggestions, vec!["Unicorns"]);
        assert_eq!(s.activities, vec!["Cake"]);
        assert_eq!(s.todo_list, vec!["Buy balloons"]);
        assert_eq!(s.gift_ideas, vec!["Doll"]);
    }

    #[test]
    fn missing_arrays_become_empty() {
        let s = parse_suggestions(r#"{"activities":["Games"]}"#).unwrap();
        assert!(s.theme_suggestions.is_empty());
        assert_eq!(s.activities, vec!["Games"]);
        assert!(s.todo_list.is_empty());
        assert!(s.gift_ideas.is_empty());
    }

    #[test]
    fn wrong_types_are_coerced_to_empty_or_filtered() {
        let s = parse_suggestions(
            r#"{"theme_suggestions":"Pirates","activities":["Dance",3,null,"Quiz"],"todo_list":{}}"#,
        )
        .unwrap();
        assert!(s.theme_suggestions.is_empty());
        assert_eq!(s.activities, vec!["Dance", "Quiz"]);
        assert!(s.todo_list.is_empty());
    }

    #[test]
    fn non_json_is_malformed() {
        let err = parse_suggestions("Sorry, I can't help with that.").unwrap_err();
        assert!(matches!(err, PlanError::MalformedResponse(_)));
    }

    #[test]
    fn top_level_array_is_malformed() {
        let err = parse_suggestions(r#"["Unicorns"]"#).unwrap_err();
        match err {
            PlanError::MalformedResponse(msg) => assert!(msg.contains("an array"), "{msg}"),
            other => panic!("expected malformed response, got {other:?}"),
        }
    }

    #[test]
    fn empty_text_is_malformed() {
        assert!(matches!(
            parse_suggestions("```json\n```"),
            Err(PlanError::MalformedResponse(_))
        ));
    }
}
