use crate::ir::BlockId;

/// Core error type for the unspool back-end.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("unsupported terminator in {block:?} of `{func}`")]
    UnsupportedTerminator { func: String, block: BlockId },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
