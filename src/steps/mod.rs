//! One module per pipeline stage.
//!
//! Stages talk to each other only through the files named below. Every stage
//! validates its inputs before it creates any output, so a failed run does not
//! leave half-written artifacts behind.

pub mod download;
pub mod evaluate;
pub mod inference_prep;
pub mod predict;
pub mod prep;
pub mod train;

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::Result;

pub const X_TRAIN_FILE: &str = "X_train.csv";
pub const X_TEST_FILE: &str = "X_test.csv";
pub const Y_TRAIN_FILE: &str = "y_train.csv";
pub const Y_TEST_FILE: &str = "y_test.csv";
pub const METADATA_FILE: &str = "metadata.json";
pub const PREDICTIONS_FILE: &str = "predictions.csv";
pub const PREDICTION_SUMMARY_FILE: &str = "prediction_summary.json";
pub const CLEANED_DATA_FILE: &str = "cleaned_data.csv";
pub const PREDICTION_COLUMN: &str = "prediction";

/// Write a pretty-printed JSON document, creating the parent directory
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    Ok(())
}
