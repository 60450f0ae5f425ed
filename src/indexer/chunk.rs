use serde::{Deserialize, Serialize};

use crate::error::{RecallError, RecallResult};

/// Word-count chunking parameters.
///
/// Invariant: `overlap < chunk_size`, otherwise the chunking loop would
/// never advance. Enforced at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl ChunkConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> RecallResult<Self> {
        if chunk_size == 0 {
            return Err(RecallError::InvalidConfig(
                "chunk_size must be non-zero".into(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RecallError::InvalidConfig(format!(
                "overlap ({overlap}) must be strictly less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            chunk_size: 256,
            overlap: 40,
        }
    }
}

/// Split text into overlapping word-count chunks.
///
/// Every chunk except possibly the last has exactly `chunk_size` words; each
/// chunk after the first starts with the last `overlap` words of its
/// predecessor. The window stops advancing once it reaches the end of the
/// text, so a tail shorter than `step` never produces extra fragments.
pub fn chunk_words(text: &str, config: &ChunkConfig) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + config.chunk_size).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start += config.step();
    }
    chunks
}
