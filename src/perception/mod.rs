//! Perception — one model call turning raw user input into a structured
//! `(intent, entities, tool_hint)` record.
//!
//! The model's reply is parsed defensively: entities may arrive as a flat
//! list of strings, a list of small records, or a single mapping, and all
//! three normalize to a flat list of strings. Any model or parse failure
//! degrades to a fallback record with `intent = "unknown"` — perception
//! failure is non-fatal to the loop.

use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::provider::LanguageModel;
use crate::types::PerceptionResult;

pub struct Perception {
    model: Arc<dyn LanguageModel>,
}

impl Perception {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn extract(&self, user_input: &str) -> PerceptionResult {
        let prompt = build_prompt(user_input);

        let reply = match self.model.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Perception model call failed, using fallback");
                return PerceptionResult::unknown(user_input);
            }
        };

        match parse_reply(user_input, &reply) {
            Some(result) => result,
            None => {
                warn!("Perception reply was not parseable, using fallback");
                PerceptionResult::unknown(user_input)
            }
        }
    }
}

fn build_prompt(user_input: &str) -> String {
    format!(
        r#"Extract structured information from this user input: "{user_input}"

Return a JSON object with:
- intent: brief description of what the user wants
- entities: list of key terms/values
- tool_hint: suggested tool name (if applicable)

Output only the JSON object, no formatting."#
    )
}

fn parse_reply(user_input: &str, reply: &str) -> Option<PerceptionResult> {
    let cleaned = strip_code_fences(reply);
    let parsed: Value = serde_json::from_str(&cleaned).ok()?;
    let object = parsed.as_object()?;

    let intent = object
        .get("intent")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown")
        .to_string();
    let entities = object
        .get("entities")
        .map(normalize_entities)
        .unwrap_or_default();
    let tool_hint = object
        .get("tool_hint")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    Some(PerceptionResult {
        user_input: user_input.to_string(),
        intent,
        entities,
        tool_hint,
    })
}

fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Flatten the three shapes the model produces for entities into strings.
fn normalize_entities(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(entity_to_string).collect(),
        Value::Object(map) => map.values().map(scalar_to_string).collect(),
        _ => Vec::new(),
    }
}

fn entity_to_string(item: &Value) -> String {
    match item {
        Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("entity"))
            .or_else(|| map.values().next())
            .map(scalar_to_string)
            .unwrap_or_default(),
        other => scalar_to_string(other),
    }
}

fn scalar_to_string(value: &Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RecallError, RecallResult};

    struct ScriptedModel {
        reply: RecallResult<String>,
    }

    impl ScriptedModel {
        fn ok(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(RecallError::ModelInvocation("quota exhausted".into())),
            })
        }
    }

    #[async_trait::async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, _prompt: &str) -> RecallResult<String> {
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(_) => Err(RecallError::ModelInvocation("quota exhausted".into())),
            }
        }
    }

    #[tokio::test]
    async fn extracts_structured_record() {
        let model = ScriptedModel::ok(
            r#"{"intent": "find cricket facts", "entities": ["cricket", "history"], "tool_hint": "search_documents"}"#,
        );
        let perception = Perception::new(model);

        let result = perception.extract("tell me about cricket history").await;
        assert_eq!(result.intent, "find cricket facts");
        assert_eq!(result.entities, vec!["cricket", "history"]);
        assert_eq!(result.tool_hint.as_deref(), Some("search_documents"));
        assert_eq!(result.user_input, "tell me about cricket history");
    }

    #[tokio::test]
    async fn tolerates_code_fences() {
        let model =
            ScriptedModel::ok("```json\n{\"intent\": \"greet\", \"entities\": []}\n```");
        let result = Perception::new(model).extract("hi").await;
        assert_eq!(result.intent, "greet");
    }

    #[tokio::test]
    async fn entities_as_mapping_become_values() {
        let model = ScriptedModel::ok(r#"{"intent": "x", "entities": {"a": "x", "b": "y"}}"#);
        let result = Perception::new(model).extract("q").await;
        assert_eq!(result.entities, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn entities_as_records_prefer_value_key() {
        let model = ScriptedModel::ok(
            r#"{"intent": "x", "entities": [{"value": "x"}, {"entity": "y"}, {"other": "z"}]}"#,
        );
        let result = Perception::new(model).extract("q").await;
        assert_eq!(result.entities, vec!["x", "y", "z"]);
    }

    #[tokio::test]
    async fn non_string_entities_are_stringified() {
        let model = ScriptedModel::ok(r#"{"intent": "x", "entities": [42, true, "s"]}"#);
        let result = Perception::new(model).extract("q").await;
        assert_eq!(result.entities, vec!["42", "true", "s"]);
    }

    #[tokio::test]
    async fn scalar_entities_field_normalizes_to_empty() {
        let model = ScriptedModel::ok(r#"{"intent": "x", "entities": "not a list"}"#);
        let result = Perception::new(model).extract("q").await;
        assert!(result.entities.is_empty());
    }

    #[tokio::test]
    async fn model_failure_yields_fallback() {
        let result = Perception::new(ScriptedModel::failing())
            .extract("what is rust")
            .await;
        assert_eq!(result.intent, "unknown");
        assert!(result.entities.is_empty());
        assert_eq!(result.user_input, "what is rust");
    }

    #[tokio::test]
    async fn garbage_reply_yields_fallback() {
        let model = ScriptedModel::ok("I'd be happy to help! What would you like to know?");
        let result = Perception::new(model).extract("q").await;
        assert_eq!(result.intent, "unknown");
    }

    #[tokio::test]
    async fn missing_intent_defaults_to_unknown() {
        let model = ScriptedModel::ok(r#"{"entities": ["a"]}"#);
        let result = Perception::new(model).extract("q").await;
        assert_eq!(result.intent, "unknown");
        assert_eq!(result.entities, vec!["a"]);
    }
}
