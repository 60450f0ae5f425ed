use std::path::Path;

use crate::error::RecallResult;

/// Capability for turning a source document into plain text.
///
/// The conversion mechanics (markdown rendering, PDF extraction, OCR, ...)
/// live behind this seam; the indexer only sees text.
#[async_trait::async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, path: &Path) -> RecallResult<String>;
}

/// Default converter: reads the file as UTF-8 text, replacing invalid
/// sequences rather than failing on them.
pub struct PlainTextConverter;

#[async_trait::async_trait]
impl DocumentConverter for PlainTextConverter {
    async fn convert(&self, path: &Path) -> RecallResult<String> {
        let bytes = tokio::fs::read(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
