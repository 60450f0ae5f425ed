use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecallError {
    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("Dimension mismatch: index holds {expected}-dim vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Action parse error: {message}")]
    Parse { message: String },

    #[error("Tool not found: {name}")]
    ToolNotFound { name: String },

    #[error("Tool execution error: tool={tool_name}, {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Model invocation error: {0}")]
    ModelInvocation(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RecallResult<T> = Result<T, RecallError>;
