use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlidecastError {
    #[error("Input not found: {0}")]
    InputNotFound(String),

    #[error("No matching input files: {0}")]
    NoMatchingInputs(String),

    #[error("Required tool unavailable: {0}")]
    ToolUnavailable(String),

    #[error("Merge failed after stream copy and re-encode attempts\n- copy: {copy}\n- reencode: {reencode}")]
    MergeExhausted { copy: String, reencode: String },

    #[error("Output already exists: {0} (use overwrite to replace it)")]
    OutputExists(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SlidecastError>;
