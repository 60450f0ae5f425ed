//! Flat vector index with squared-Euclidean nearest-neighbor search.
//!
//! Insertion order is the implicit ID: `append` returns the position, and
//! `search` reports positions that the owner resolves against its own
//! payload list. All vectors share the dimension fixed at construction.
//! The durable variant persists to JSON via temp-file + rename so a crash
//! mid-write never corrupts a previously valid index.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RecallError, RecallResult};

/// One search hit: the stored vector's position and its squared-L2 distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Ordered collection of fixed-dimension vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    pub fn new(dimension: usize) -> RecallResult<Self> {
        if dimension == 0 {
            return Err(RecallError::InvalidConfig(
                "vector index dimension must be non-zero".into(),
            ));
        }
        Ok(Self {
            dimension,
            vectors: Vec::new(),
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Append a vector, returning its position.
    pub fn append(&mut self, vector: Vec<f32>) -> RecallResult<usize> {
        if vector.len() != self.dimension {
            return Err(RecallError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.vectors.push(vector);
        Ok(self.vectors.len() - 1)
    }

    /// K-nearest-neighbor search by squared Euclidean distance, nearest first.
    ///
    /// `k` is clamped to the number of stored vectors; searching an empty
    /// index returns an empty result rather than failing.
    pub fn search(&self, query: &[f32], k: usize) -> RecallResult<Vec<Neighbor>> {
        if self.vectors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(RecallError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, vector)| Neighbor {
                position,
                distance: squared_l2(query, vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k.min(self.vectors.len()));
        Ok(scored)
    }

    /// Persist to disk. Writes a temp file then renames into place.
    pub async fn save(&self, path: &Path) -> RecallResult<()> {
        let json = serde_json::to_string(self)?;
        write_atomic(path, &json).await
    }

    /// Load a previously persisted index.
    pub async fn load(path: &Path) -> RecallResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let index: VectorIndex = serde_json::from_str(&content)?;
        if index.dimension == 0 {
            return Err(RecallError::Index(format!(
                "persisted index at {} has zero dimension",
                path.display()
            )));
        }
        if let Some(bad) = index.vectors.iter().find(|v| v.len() != index.dimension) {
            return Err(RecallError::Index(format!(
                "persisted index at {} holds a {}-dim vector, expected {}",
                path.display(),
                bad.len(),
                index.dimension
            )));
        }
        Ok(index)
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Write `content` to `path` via a sibling temp file + rename.
pub(crate) async fn write_atomic(path: &Path, content: &str) -> RecallResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
