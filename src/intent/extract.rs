use serde_json::Value;

use crate::data_models::Intent;
use crate::error::ExtractionError;

/// Pulls the answer text out of one known classifier reply layout.
/// Extractors are tried in order and the first non-empty text wins.
pub trait ContentExtractor: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, payload: &Value) -> Option<String>;
}

/// OpenAI style: `choices[0].message.content`.
#[derive(Debug, Default)]
pub struct ChatCompletionContent;

impl ContentExtractor for ChatCompletionContent {
    fn name(&self) -> &'static str {
        "choices[0].message.content"
    }

    fn extract(&self, payload: &Value) -> Option<String> {
        payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Ollama style: `message.content`.
#[derive(Debug, Default)]
pub struct MessageContent;

impl ContentExtractor for MessageContent {
    fn name(&self) -> &'static str {
        "message.content"
    }

    fn extract(&self, payload: &Value) -> Option<String> {
        payload
            .pointer("/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

#[derive(Debug, Default)]
pub struct DirectContent;

impl ContentExtractor for DirectContent {
    fn name(&self) -> &'static str {
        "content"
    }

    fn extract(&self, payload: &Value) -> Option<String> {
        payload
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
    }
}

/// Last resort: the whole payload as text.
#[derive(Debug, Default)]
pub struct WholePayload;

impl ContentExtractor for WholePayload {
    fn name(&self) -> &'static str {
        "payload"
    }

    fn extract(&self, payload: &Value) -> Option<String> {
        match payload {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

pub fn default_extractors() -> Vec<Box<dyn ContentExtractor>> {
    vec![
        Box::new(ChatCompletionContent),
        Box::new(MessageContent),
        Box::new(DirectContent),
        Box::new(WholePayload),
    ]
}

pub fn extract_content(payload: &Value, extractors: &[Box<dyn ContentExtractor>]) -> Option<String> {
    extractors.iter().find_map(|extractor| {
        let text = extractor.extract(payload)?;
        if text.trim().is_empty() {
            return None;
        }
        log::debug!("classifier content found at {}", extractor.name());
        Some(text)
    })
}

/// Every balanced `{ ... }` span in `text`, in order of their opening brace.
/// Braces inside JSON string literals are ignored.
fn object_candidates(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut candidates = Vec::new();
    let mut start = 0usize;

    while let Some(offset) = text[start..].find('{') {
        let open = start + offset;
        if let Some(close) = matching_brace(bytes, open) {
            candidates.push(&text[open..=close]);
        }
        start = open + 1;
    }

    candidates
}

fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Find the first JSON object embedded in free text, e.g. a reply that wraps
/// the object in prose or a code fence.
pub fn find_json_object(text: &str) -> Result<Value, ExtractionError> {
    let candidates = object_candidates(text);
    let mut first_error = None;

    for candidate in candidates {
        match serde_json::from_str::<Value>(candidate) {
            Ok(value @ Value::Object(_)) => return Ok(value),
            Ok(_) => {}
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(ExtractionError::InvalidJson(e)),
        None => Err(ExtractionError::NoJsonObject),
    }
}

pub fn parse_intent(text: &str) -> Result<Intent, ExtractionError> {
    let object = find_json_object(text)?;
    serde_json::from_value(object).map_err(ExtractionError::UnrecognizedIntent)
}

pub fn intent_from_payload(
    payload: &Value,
    extractors: &[Box<dyn ContentExtractor>],
) -> Result<Intent, ExtractionError> {
    let content = extract_content(payload, extractors).ok_or(ExtractionError::NoJsonObject)?;
    parse_intent(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_models::Category;
    use serde_json::json;

    #[test]
    fn test_extractor_order() {
        let chain = default_extractors();

        let payload = json!({
            "choices": [{"message": {"content": "from choices"}}],
            "message": {"content": "from message"},
            "content": "from content"
        });
        assert_eq!(extract_content(&payload, &chain).unwrap(), "from choices");

        let payload = json!({
            "message": {"content": "from message"},
            "content": "from content"
        });
        assert_eq!(extract_content(&payload, &chain).unwrap(), "from message");

        let payload = json!({"content": "from content"});
        assert_eq!(extract_content(&payload, &chain).unwrap(), "from content");

        let payload = json!({"intent": "general", "response": "hi"});
        assert_eq!(
            extract_content(&payload, &chain).unwrap(),
            payload.to_string()
        );
    }

    #[test]
    fn test_empty_content_falls_through_to_next_extractor() {
        let chain = default_extractors();
        let payload = json!({
            "choices": [{"message": {"content": "   "}}],
            "content": "{\"intent\": \"general\", \"response\": \"ok\"}"
        });
        assert_eq!(
            extract_content(&payload, &chain).unwrap(),
            "{\"intent\": \"general\", \"response\": \"ok\"}"
        );
    }

    #[test]
    fn test_find_json_object_in_prose() {
        let text = "Sure! Here you go:\n```json\n{\"intent\": \"general\", \"response\": \"a {b}\"}\n```\nAnything else?";
        let value = find_json_object(text).unwrap();
        assert_eq!(value["response"], "a {b}");
    }

    #[test]
    fn test_find_json_object_skips_prose_braces() {
        let text = "Use {curly} braces. {\"intent\": \"general\", \"response\": \"x\"} and {\"other\": 1}";
        let value = find_json_object(text).unwrap();
        assert_eq!(value["intent"], "general");
    }

    #[test]
    fn test_find_json_object_failures() {
        assert!(matches!(
            find_json_object("no braces here"),
            Err(ExtractionError::NoJsonObject)
        ));
        assert!(matches!(
            find_json_object("{ unterminated"),
            Err(ExtractionError::NoJsonObject)
        ));
        assert!(matches!(
            find_json_object("{not: json}"),
            Err(ExtractionError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_intent_rejects_unknown_shape() {
        assert!(matches!(
            parse_intent("{\"foo\": \"bar\"}"),
            Err(ExtractionError::UnrecognizedIntent(_))
        ));
    }

    #[test]
    fn test_intent_from_chat_completion_payload() {
        let payload = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "{\"intent\":\"search_places\",\"category\":\"museum\",\"location\":\"Paris\",\"query\":\"art museums in Paris\",\"suggestions\":[\"Louvre\"]}"
                }
            }]
        });
        let intent = intent_from_payload(&payload, &default_extractors()).unwrap();
        match intent {
            Intent::SearchPlaces {
                category,
                location,
                refined_query,
                suggestions,
            } => {
                assert_eq!(category, Category::Museum);
                assert_eq!(location.as_deref(), Some("Paris"));
                assert_eq!(refined_query, "art museums in Paris");
                assert_eq!(suggestions, vec!["Louvre".to_string()]);
            }
            other => panic!("expected search intent, got {:?}", other),
        }
    }

    #[test]
    fn test_string_payload_is_used_verbatim() {
        let payload = Value::String("{\"intent\":\"general\",\"response\":\"hi\"}".to_string());
        let intent = intent_from_payload(&payload, &default_extractors()).unwrap();
        assert_eq!(
            intent,
            Intent::General {
                response: "hi".to_string()
            }
        );
    }
}
