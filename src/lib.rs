//! # recall-core
//!
//! Retrieval-augmented agent runtime — a bounded plan/act/observe loop that
//! interleaves language-model calls with tool execution and semantic memory,
//! backed by a nearest-neighbor vector index for both short-term memory and
//! long-term document retrieval.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use recall_core::agent::{AgentLoop, RunOptions};
//! use recall_core::embedding::OllamaEmbeddingClient;
//! use recall_core::indexer::{DocumentIndexer, IndexerConfig, PlainTextConverter};
//! use recall_core::memory::MemoryManager;
//! use recall_core::provider::GeminiProvider;
//! use recall_core::tool::{DocumentSearchTool, ToolRegistry};
//! use recall_core::types::AgentConfig;
//!
//! # async fn example() -> recall_core::RecallResult<()> {
//! let embedder = Arc::new(OllamaEmbeddingClient::new());
//! let model = Arc::new(GeminiProvider::new("api-key"));
//!
//! // Index a directory of documents (incremental: unchanged files are skipped)
//! let indexer = Arc::new(DocumentIndexer::new(
//!     IndexerConfig::new("./index"),
//!     embedder.clone(),
//!     Arc::new(PlainTextConverter),
//! ));
//! indexer.index("./documents".as_ref()).await?;
//!
//! // Wire the loop: model + tools + session memory
//! let mut tools = ToolRegistry::new();
//! tools.register(Box::new(DocumentSearchTool::new(indexer)));
//! let memory = MemoryManager::new(embedder);
//! let mut agent = AgentLoop::new(model, tools, memory, AgentConfig::default());
//!
//! let (event_tx, _event_rx) = mpsc::unbounded_channel();
//! let outcome = agent
//!     .run(RunOptions::new("who is the god of cricket?"), event_tx)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | Core types: `MemoryItem`, `PerceptionResult`, `ToolCallDirective`, `AgentEvent`, `AgentOutcome` |
//! | [`embedding`] | Embedding capability trait + Ollama-compatible HTTP client |
//! | [`index`] | Flat vector index: append, squared-L2 k-NN, atomic JSON persistence |
//! | [`memory`] | Session-scoped semantic memory over a private vector index |
//! | [`indexer`] | Incremental document indexing: content-hash cache, overlapping word chunks, durable artifacts |
//! | [`action`] | `FUNCTION_CALL:` / `FINAL_ANSWER:` action-grammar parser |
//! | [`tool`] | Async tool trait, registry, directive executor, built-in document search |
//! | [`provider`] | Language-model capability trait + Gemini provider |
//! | [`perception`] | Intent/entity extraction with defensive normalization |
//! | [`decision`] | Per-step planning: tool-call directive or final answer |
//! | [`agent`] | The bounded agent loop state machine |
//! | [`error`] | Error kinds with thiserror: embedding, dimension, parse, tool, model |

pub mod action;
pub mod agent;
pub mod decision;
pub mod embedding;
pub mod error;
pub mod index;
pub mod indexer;
pub mod memory;
pub mod perception;
pub mod provider;
pub mod tool;
pub mod types;

pub use error::{RecallError, RecallResult};
pub use types::*;
