use std::path::PathBuf;

use thiserror::Error;

/// Error type for every pipeline step
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Validation errors (e.g., invalid test size, empty dataset, shape mismatch)
    #[error("ValidationError: {0}")]
    ValidationError(String),
    /// Model training/prediction errors
    #[error("ModelError: {0}")]
    ModelError(String),
    /// Arrow-related errors (model artifact encoding, schema mismatch)
    #[error("ArrowError: {0}")]
    ArrowError(String),
    /// Dataset download errors (HTTP status, transport, local copy)
    #[error("DownloadError: {0}")]
    DownloadError(String),
    /// Configuration could not be loaded or is out of range
    #[error("ConfigError: {0}")]
    ConfigError(String),
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("input file is empty: {}", .0.display())]
    EmptyInput(PathBuf),
    /// A child-process step exited unsuccessfully
    #[error("step '{step}' failed with exit code {code}")]
    StepFailed { step: String, code: i32 },
    /// An in-process step returned an error
    #[error("step '{step}' failed")]
    StepError {
        step: String,
        #[source]
        source: Box<PipelineError>,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
