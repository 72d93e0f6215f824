use std::path::PathBuf;

use crate::core::model::FileState;

#[derive(Debug, thiserror::Error)]
pub enum ScribeError {
    #[error("gemini api key required. Use --api-key or set GEMINI_API_KEY environment variable")]
    MissingCredential,
    #[error("gemini api key contains invalid characters")]
    InvalidCredential,
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("unsupported format '{extension}'. Supported: {supported}")]
    UnsupportedFormat {
        extension: String,
        supported: String,
    },
    #[error("invalid time format: {0}. Use MM:SS format")]
    InvalidTimeFormat(String),
    #[error("start time must be before end time ({start} >= {end})")]
    InvalidRange { start: String, end: String },
    #[error("start time {start} exceeds audio duration {duration}")]
    StartExceedsDuration { start: String, duration: String },
    #[error("could not decode audio: {0}")]
    AudioDecode(String),
    #[error("could not write trimmed audio: {0}")]
    AudioEncode(String),
    #[error("file upload failed with state: {0}")]
    UploadFailed(FileState),
    #[error("gemini request failed: {0}")]
    Request(String),
    #[error("model response was empty: {0}")]
    EmptyResponse(String),
    #[error("transcription failed: {0}")]
    TranscriptionError(String),
    #[error("summarization failed: {0}")]
    Summarization(String),
    #[error("process interrupted by user")]
    UserInterrupted,
    #[error("cleanup incomplete: {0}")]
    CleanupWarning(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
