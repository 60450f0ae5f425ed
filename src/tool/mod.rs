//! Tools the agent can invoke, and the executor that dispatches to them.

mod search;

pub use search::DocumentSearchTool;

use async_trait::async_trait;

use crate::error::{RecallError, RecallResult};
use crate::types::{ToolCallDirective, ToolCallResult, ToolDefinition};

/// A tool that can be executed by the agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match the definition name).
    fn name(&self) -> &str;

    /// Tool definition for the decision model's catalog.
    fn definition(&self) -> ToolDefinition;

    /// Invoke the tool with the given argument tree.
    async fn invoke(&self, arguments: serde_json::Value) -> RecallResult<ToolPayload>;
}

/// The closed set of shapes a tool may return. Normalized to canonical
/// text at the executor boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolPayload {
    Text(String),
    Fragments(Vec<String>),
    Structured(serde_json::Value),
}

impl ToolPayload {
    /// Canonical text form: fragments join with newlines, structured
    /// values render as compact JSON.
    pub fn into_text(self) -> String {
        match self {
            ToolPayload::Text(text) => text,
            ToolPayload::Fragments(fragments) => fragments.join("\n"),
            ToolPayload::Structured(value) => value.to_string(),
        }
    }
}

/// Registry of tools available to the agent.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// One `- name: description` line per tool, for the decision prompt.
    pub fn catalog(&self) -> String {
        self.tools
            .iter()
            .map(|t| {
                let def = t.definition();
                format!("- {}: {}", def.name, def.description)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a parsed directive: look up the tool, invoke it, and
    /// normalize the result. Lookup failure is `ToolNotFound`; any
    /// invocation failure is wrapped as `ToolExecution` carrying the
    /// tool name.
    pub async fn execute(&self, directive: &ToolCallDirective) -> RecallResult<ToolCallResult> {
        let tool = self
            .get(&directive.tool_name)
            .ok_or_else(|| RecallError::ToolNotFound {
                name: directive.tool_name.clone(),
            })?;

        let payload = tool
            .invoke(directive.arguments.clone())
            .await
            .map_err(|e| RecallError::ToolExecution {
                tool_name: directive.tool_name.clone(),
                message: e.to_string(),
            })?;

        Ok(ToolCallResult {
            tool_name: directive.tool_name.clone(),
            arguments: directive.arguments.clone(),
            result: payload.into_text(),
        })
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
