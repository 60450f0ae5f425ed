//! Persistent document index with incremental re-indexing.
//!
//! `index()` scans a directory, skips files whose content hash matches the
//! persisted cache, and chunks/embeds the rest into a durable vector index.
//! Three artifacts live in the index directory, all written temp+rename:
//!
//! - `index.json`    — the vector store
//! - `metadata.json` — per-chunk `{doc, chunk, chunk_id}`, index-aligned
//! - `doc_cache.json` — document filename → content hash
//!
//! Re-indexing is a single-writer operation guarded by an exclusive file
//! lock; concurrent readers are unaffected.

mod chunk;
mod convert;

pub use chunk::{chunk_words, ChunkConfig};
pub use convert::{DocumentConverter, PlainTextConverter};

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::embedding::EmbeddingClient;
use crate::error::{RecallError, RecallResult};
use crate::index::{write_atomic, VectorIndex};

pub const INDEX_FILE: &str = "index.json";
pub const METADATA_FILE: &str = "metadata.json";
pub const CACHE_FILE: &str = "doc_cache.json";
const LOCK_FILE: &str = ".lock";

/// Metadata for one indexed chunk, stored index-aligned with the vectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub doc: String,
    pub chunk: String,
    pub chunk_id: String,
}

#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Directory holding the three persisted artifacts.
    pub index_dir: PathBuf,
    pub chunk: ChunkConfig,
    /// Default result count for `search` callers that don't pick their own.
    pub search_k: usize,
}

impl IndexerConfig {
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        Self {
            index_dir: index_dir.into(),
            chunk: ChunkConfig::default(),
            search_k: 5,
        }
    }

    pub fn with_chunk(mut self, chunk: ChunkConfig) -> Self {
        self.chunk = chunk;
        self
    }
}

/// What one `index()` pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    /// Files that were (re-)chunked and embedded, in scan order.
    pub indexed: Vec<String>,
    /// Files skipped because their content hash matched the cache.
    pub skipped: usize,
    pub chunks_added: usize,
}

pub struct DocumentIndexer {
    config: IndexerConfig,
    embedder: Arc<dyn EmbeddingClient>,
    converter: Arc<dyn DocumentConverter>,
}

impl DocumentIndexer {
    pub fn new(
        config: IndexerConfig,
        embedder: Arc<dyn EmbeddingClient>,
        converter: Arc<dyn DocumentConverter>,
    ) -> Self {
        Self {
            config,
            embedder,
            converter,
        }
    }

    pub fn search_k(&self) -> usize {
        self.config.search_k
    }

    /// Index every document in `doc_dir`, skipping unchanged files.
    ///
    /// Holds an exclusive lock on the index directory for the duration;
    /// artifacts are only rewritten when at least one file changed.
    pub async fn index(&self, doc_dir: &Path) -> RecallResult<IndexReport> {
        tokio::fs::create_dir_all(&self.config.index_dir).await?;
        let _lock = self.acquire_writer_lock()?;

        let mut cache: BTreeMap<String, String> = self
            .load_artifact(CACHE_FILE)
            .await?
            .unwrap_or_default();
        let mut metadata: Vec<ChunkMeta> = self
            .load_artifact(METADATA_FILE)
            .await?
            .unwrap_or_default();
        let index_path = self.config.index_dir.join(INDEX_FILE);
        let mut index = if index_path.exists() {
            Some(VectorIndex::load(&index_path).await?)
        } else {
            None
        };

        let mut report = IndexReport::default();

        for path in self.scan_documents(doc_dir).await? {
            let name = file_name(&path);
            let bytes = tokio::fs::read(&path).await?;
            let hash = content_hash(&bytes);

            if cache.get(&name).is_some_and(|cached| *cached == hash) {
                debug!(doc = %name, "Skipping unchanged document");
                report.skipped += 1;
                continue;
            }

            info!(doc = %name, "Indexing document");
            let text = self.converter.convert(&path).await?;
            let chunks = chunk_words(&text, &self.config.chunk);
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());

            for (seq, chunk) in chunks.into_iter().enumerate() {
                let vector = self.embedder.embed(&chunk).await?;
                if index.is_none() {
                    index = Some(VectorIndex::new(vector.len())?);
                }
                if let Some(index) = index.as_mut() {
                    index.append(vector)?;
                }
                metadata.push(ChunkMeta {
                    doc: name.clone(),
                    chunk,
                    chunk_id: format!("{stem}_{seq}"),
                });
                report.chunks_added += 1;
            }

            cache.insert(name.clone(), hash);
            report.indexed.push(name);
        }

        if !report.indexed.is_empty() {
            if let Some(index) = &index {
                index.save(&index_path).await?;
            }
            self.save_artifact(METADATA_FILE, &metadata).await?;
            self.save_artifact(CACHE_FILE, &cache).await?;
            info!(
                indexed = report.indexed.len(),
                chunks = report.chunks_added,
                "Index persisted"
            );
        }

        Ok(report)
    }

    /// Search the persisted index, returning the top-k chunks formatted as
    /// `"{chunk}\n[Source: {doc}]"`. An absent or empty index yields an
    /// empty result.
    pub async fn search(&self, query: &str, k: usize) -> RecallResult<Vec<String>> {
        let index_path = self.config.index_dir.join(INDEX_FILE);
        if !index_path.exists() {
            return Ok(Vec::new());
        }

        let index = VectorIndex::load(&index_path).await?;
        let metadata: Vec<ChunkMeta> = self
            .load_artifact(METADATA_FILE)
            .await?
            .unwrap_or_default();

        let query_vec = self.embedder.embed(query).await?;
        let neighbors = index.search(&query_vec, k)?;

        neighbors
            .into_iter()
            .map(|n| {
                let meta = metadata.get(n.position).ok_or_else(|| {
                    RecallError::Index(format!(
                        "metadata out of sync: no entry for position {}",
                        n.position
                    ))
                })?;
                Ok(format!("{}\n[Source: {}]", meta.chunk, meta.doc))
            })
            .collect()
    }

    fn acquire_writer_lock(&self) -> RecallResult<std::fs::File> {
        let lock = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.config.index_dir.join(LOCK_FILE))?;
        lock.lock_exclusive()?;
        Ok(lock)
    }

    async fn scan_documents(&self, doc_dir: &Path) -> RecallResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(doc_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if file_name(&path).starts_with('.') {
                continue;
            }
            paths.push(path);
        }
        paths.sort();
        Ok(paths)
    }

    async fn load_artifact<T: DeserializeOwned>(&self, file: &str) -> RecallResult<Option<T>> {
        let path = self.config.index_dir.join(file);
        if !path.exists() {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&path).await?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    async fn save_artifact<T: Serialize>(&self, file: &str, value: &T) -> RecallResult<()> {
        let json = serde_json::to_string_pretty(value)?;
        write_atomic(&self.config.index_dir.join(file), &json).await
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
