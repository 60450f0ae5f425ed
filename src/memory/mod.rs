//! Short-term semantic memory, scoped to one agent session.
//!
//! Every added item is embedded and appended to a private vector index;
//! retrieval embeds the query and returns the nearest items. The index is
//! created lazily with the embedding's dimension on the first add, and
//! nothing is persisted — memory dies with the session.

use std::sync::Arc;

use tracing::debug;

use crate::embedding::EmbeddingClient;
use crate::error::RecallResult;
use crate::index::VectorIndex;
use crate::types::MemoryItem;

pub struct MemoryManager {
    embedder: Arc<dyn EmbeddingClient>,
    index: Option<VectorIndex>,
    items: Vec<MemoryItem>,
}

impl MemoryManager {
    pub fn new(embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self {
            embedder,
            index: None,
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add a memory item. Embeds `item.text`; an embedding-service failure
    /// propagates and the item is not stored.
    pub async fn add(&mut self, item: MemoryItem) -> RecallResult<()> {
        let vector = self.embedder.embed(&item.text).await?;

        if self.index.is_none() {
            self.index = Some(VectorIndex::new(vector.len())?);
        }
        if let Some(index) = self.index.as_mut() {
            index.append(vector)?;
        }
        self.items.push(item);

        debug!(count = self.items.len(), "Stored memory item");
        Ok(())
    }

    /// Record a tool execution as a memory item with a deterministic summary.
    pub async fn add_tool_result(
        &mut self,
        tool_name: &str,
        arguments: &serde_json::Value,
        result: &str,
        user_query: &str,
    ) -> RecallResult<()> {
        let text = format!("Used {tool_name} with {arguments}, got: {result}");
        self.add(
            MemoryItem::new(text)
                .with_tool_name(tool_name)
                .with_user_query(user_query),
        )
        .await
    }

    /// Retrieve the `top_k` most similar memories, most-similar first.
    /// Returns an empty list without touching the embedding service when
    /// nothing has been stored yet.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> RecallResult<Vec<MemoryItem>> {
        let index = match self.index.as_ref() {
            Some(index) if !self.items.is_empty() => index,
            _ => return Ok(Vec::new()),
        };

        let query_vec = self.embedder.embed(query).await?;
        let neighbors = index.search(&query_vec, top_k)?;

        Ok(neighbors
            .into_iter()
            .map(|n| self.items[n.position].clone())
            .collect())
    }
}
