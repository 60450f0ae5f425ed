//! Decision — one model call per step producing either a tool-call
//! directive or a final answer.
//!
//! The reply is scanned line by line for the first line starting with one
//! of the action markers; that line is returned verbatim. A reply with no
//! marker line comes back raw (the caller treats it as an ambiguous plan).
//! A model failure degrades to a synthetic final-answer line so the loop
//! always terminates cleanly.

use std::sync::Arc;

use tracing::warn;

use crate::action::{FINAL_ANSWER_MARKER, FUNCTION_CALL_MARKER};
use crate::provider::LanguageModel;
use crate::types::{MemoryItem, PerceptionResult};

/// Synthetic plan returned when the model call fails.
pub const ERROR_PLAN: &str = "FINAL_ANSWER: [error occurred]";

pub struct Decision {
    model: Arc<dyn LanguageModel>,
}

impl Decision {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn plan(
        &self,
        perception: &PerceptionResult,
        memories: &[MemoryItem],
        tool_catalog: &str,
    ) -> String {
        let prompt = build_prompt(perception, memories, tool_catalog);

        let reply = match self.model.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "Decision model call failed, ending with error answer");
                return ERROR_PLAN.to_string();
            }
        };

        extract_plan_line(&reply)
    }
}

fn build_prompt(
    perception: &PerceptionResult,
    memories: &[MemoryItem],
    tool_catalog: &str,
) -> String {
    let memory_context = if memories.is_empty() {
        "None".to_string()
    } else {
        memories
            .iter()
            .map(|m| format!("- {}", m.text))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are an AI agent that solves tasks step-by-step using tools.

Available tools:
{tool_catalog}

Relevant context:
{memory_context}

User request:
- Input: "{input}"
- Intent: {intent}
- Entities: {entities:?}

Instructions:
1. If you need a tool, respond: FUNCTION_CALL: tool_name|param=value
2. If you have the answer, respond: FINAL_ANSWER: [your answer]

Rules:
- Use search_documents for factual questions
- Don't repeat the same tool call
- If previous output has the answer, use FINAL_ANSWER

Your response:"#,
        input = perception.user_input,
        intent = perception.intent,
        entities = perception.entities,
    )
}

/// First marker line of the reply, or the raw reply when none exists.
fn extract_plan_line(reply: &str) -> String {
    for line in reply.lines() {
        let line = line.trim();
        if line.starts_with(FUNCTION_CALL_MARKER) || line.starts_with(FINAL_ANSWER_MARKER) {
            return line.to_string();
        }
    }
    reply.trim().to_string()
}
