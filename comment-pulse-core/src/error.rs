use thiserror::Error;

/// Terminal conditions for a pipeline run. Everything else (provider
/// failures, quota errors, bad batches) is absorbed at the stage that
/// produced it and degrades to a fallback path.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// No recognition pattern matched the video reference.
    #[error("no video identifier could be extracted from {0:?}")]
    InvalidReference(String),

    /// Both fetch providers returned nothing. Not a crash: the run simply
    /// has nothing to analyze.
    #[error("no comments found for video {0}")]
    NoCommentsFound(String),

    /// The sentiment model could not be loaded after all retry attempts.
    #[error("sentiment model unavailable after {attempts} attempts: {message}")]
    ModelUnavailable { attempts: u32, message: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
