use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{RecallError, RecallResult};
use crate::indexer::DocumentIndexer;
use crate::types::ToolDefinition;

use super::{Tool, ToolPayload};

/// Built-in document retrieval tool backed by the persistent index.
pub struct DocumentSearchTool {
    indexer: Arc<DocumentIndexer>,
}

impl DocumentSearchTool {
    pub fn new(indexer: Arc<DocumentIndexer>) -> Self {
        Self { indexer }
    }
}

#[async_trait]
impl Tool for DocumentSearchTool {
    fn name(&self) -> &str {
        "search_documents"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "search_documents".into(),
            description: "Search for relevant content from uploaded documents".into(),
            input_schema: json!({
                "type": "object",
                "properties": {"query": {"type": "string"}},
                "required": ["query"]
            }),
        }
    }

    async fn invoke(&self, arguments: serde_json::Value) -> RecallResult<ToolPayload> {
        let query = arguments
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RecallError::ToolExecution {
                tool_name: "search_documents".into(),
                message: "missing string argument 'query'".into(),
            })?;

        let results = self.indexer.search(query, self.indexer.search_k()).await?;
        if results.is_empty() {
            return Ok(ToolPayload::Text("No matching documents found".into()));
        }
        Ok(ToolPayload::Fragments(results))
    }
}
