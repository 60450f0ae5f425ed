//! Language-model capability — prompt in, text out.
//!
//! The reply carries no structural contract; callers parse defensively.
//! Failures surface as `RecallError::ModelInvocation`.

mod gemini;

pub use gemini::GeminiProvider;

use crate::error::RecallResult;

/// Capability for one blocking language-model completion.
#[async_trait::async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> RecallResult<String>;
}
