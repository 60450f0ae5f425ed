use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Memory ─────────────────────────────────────────────────────────────────

/// A single memory entry, immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryItem {
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_query: Option<String>,
}

impl MemoryItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Utc::now(),
            tool_name: None,
            user_query: None,
        }
    }

    pub fn with_tool_name(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_user_query(mut self, user_query: impl Into<String>) -> Self {
        self.user_query = Some(user_query.into());
        self
    }
}

// ─── Perception ─────────────────────────────────────────────────────────────

/// Structured understanding of one piece of user input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerceptionResult {
    pub user_input: String,
    pub intent: String,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_hint: Option<String>,
}

impl PerceptionResult {
    /// Fallback used when the model call or reply parsing fails.
    /// Perception failure is non-fatal to the loop.
    pub fn unknown(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            intent: "unknown".into(),
            entities: Vec::new(),
            tool_hint: None,
        }
    }
}

// ─── Tools ──────────────────────────────────────────────────────────────────

/// A tool definition, as advertised to the decision model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub input_schema: serde_json::Value,
}

/// A parsed tool-call directive, consumed exactly once by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallDirective {
    pub tool_name: String,
    /// Argument tree; dotted keys in the source text become nested objects.
    pub arguments: serde_json::Value,
}

/// Result of executing one tool-call directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub tool_name: String,
    pub arguments: serde_json::Value,
    /// Canonical text form of the tool's output, normalized at the boundary.
    pub result: String,
}

// ─── Agent ──────────────────────────────────────────────────────────────────

/// Agent loop configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Step budget; the loop aborts when it is exhausted without a final answer.
    pub max_steps: usize,
    /// How many memories to retrieve per step.
    pub memory_top_k: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: 3,
            memory_top_k: 3,
        }
    }
}

/// Events emitted during agent execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    SessionStart {
        session_id: String,
    },
    StepStart {
        step: usize,
    },
    Perceived {
        intent: String,
    },
    MemoryRecalled {
        count: usize,
    },
    PlanProduced {
        plan: String,
    },
    ToolStart {
        tool_name: String,
    },
    ToolEnd {
        tool_name: String,
        result: String,
    },
    ToolFailed {
        message: String,
    },
    FinalAnswer {
        answer: String,
    },
    SessionEnd {
        session_id: String,
        outcome: AgentOutcome,
    },
}

/// Terminal state of one agent session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AgentOutcome {
    /// The decision model produced a final answer.
    Done { answer: String, steps: usize },
    /// The step budget was exhausted without a final answer.
    Aborted { steps: usize },
}

impl AgentOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, AgentOutcome::Done { .. })
    }

    pub fn steps(&self) -> usize {
        match self {
            AgentOutcome::Done { steps, .. } | AgentOutcome::Aborted { steps } => *steps,
        }
    }
}
