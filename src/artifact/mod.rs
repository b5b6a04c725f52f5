//! Model artifact storage
//!
//! A trained [`LinearModel`] is persisted as an Arrow IPC stream so the
//! test and predict steps can load it without retraining.

pub mod builder;
pub mod parser;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::LinearModel;
use crate::utils::PipelineError;
use crate::Result;

// Re-export commonly used functions
pub use builder::encode_model;
pub use parser::decode_model;

/// File name of the model artifact inside a model directory
pub const MODEL_FILE: &str = "model.arrow";

pub(crate) const META_MODEL_TYPE: &str = "model_type";
pub(crate) const META_INTERCEPT: &str = "intercept";
pub(crate) const META_FORMAT_VERSION: &str = "format_version";
pub(crate) const FORMAT_VERSION: &str = "1";

/// Resolve a model directory (or an explicit file path) to the artifact file
pub fn model_path(path: &Path) -> PathBuf {
    if path.is_dir() || path.extension().is_none() {
        path.join(MODEL_FILE)
    } else {
        path.to_path_buf()
    }
}

/// Write the model artifact, creating the parent directory when needed
pub fn write_model(path: &Path, model: &LinearModel) -> Result<PathBuf> {
    let target = model_path(path);
    let bytes = encode_model(model)?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, bytes)?;
    debug!(path = %target.display(), features = model.n_features(), "model artifact written");
    Ok(target)
}

/// Load a model artifact from a model directory or file
pub fn read_model(path: &Path) -> Result<LinearModel> {
    let target = model_path(path);
    if !target.is_file() {
        return Err(PipelineError::MissingInput(target));
    }

    let bytes = fs::read(&target)?;
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput(target));
    }
    decode_model(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_model_path_resolution() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(model_path(dir.path()), dir.path().join(MODEL_FILE));
        assert_eq!(
            model_path(Path::new("out/custom.arrow")),
            PathBuf::from("out/custom.arrow")
        );
        assert_eq!(
            model_path(Path::new("not_yet_created")),
            PathBuf::from("not_yet_created").join(MODEL_FILE)
        );
    }

    #[test]
    fn test_reloaded_model_reproduces_predictions() {
        let x = arr2(&[[1.0, 3.0], [2.0, 1.0], [3.0, 4.0], [4.0, 1.5], [5.0, 9.0]]);
        let y = arr1(&[4.1, 4.9, 9.2, 8.8, 17.5]);
        let model = LinearModel::fit(vec!["a".into(), "b".into()], x.clone(), y).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let written = write_model(&dir.path().join("train_output"), &model).unwrap();
        assert!(written.ends_with(MODEL_FILE));

        let loaded = read_model(&dir.path().join("train_output")).unwrap();
        let before = model.predict(&x.view()).unwrap();
        let after = loaded.predict(&x.view()).unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_read_model_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_model(dir.path());
        assert!(matches!(result, Err(PipelineError::MissingInput(_))));
    }
}
