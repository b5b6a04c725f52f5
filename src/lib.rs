//! Tabular Pipeline - a small regression pipeline over CSV data
//!
//! Each stage (download, prep, train, test, predict) is a plain function over
//! files on disk, so stages can run one at a time from the command line or in
//! sequence through [`pipeline::Pipeline`].

pub mod artifact;
pub mod config;
pub mod dataset;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod split;
pub mod steps;
pub mod summary;
pub mod utils;

pub use config::PipelineConfig;
pub use dataset::Dataset;
pub use model::{LinearModel, RegressionMetrics};
pub use pipeline::{InProcessRunner, Pipeline, PipelineReport, StepRunner, SubprocessRunner};
pub use summary::PredictionSummary;
pub use utils::PipelineError;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, PipelineError>;
