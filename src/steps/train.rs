use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{write_json, METADATA_FILE, X_TRAIN_FILE, Y_TRAIN_FILE};
use crate::artifact::write_model;
use crate::dataset::{read_target_csv, Dataset};
use crate::model::{LinearModel, MODEL_TYPE};
use crate::utils::PipelineError;
use crate::Result;

#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Directory holding the prepared data
    pub input_dir: PathBuf,
    /// Directory receiving the model artifact and metadata
    pub output_dir: PathBuf,
}

/// Contents of `metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMetadata {
    pub model_type: String,
    pub train_score: f64,
    pub n_features: usize,
    pub n_training_samples: usize,
    pub feature_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainReport {
    pub metadata: TrainingMetadata,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    pub model_file: PathBuf,
    pub metadata_file: PathBuf,
}

/// Load a prepared feature file and its target file, checking they line up
pub(crate) fn load_split(
    dir: &Path,
    features_file: &str,
    target_file: &str,
) -> Result<(Vec<String>, Array2<f64>, Array1<f64>)> {
    let features = Dataset::from_csv_path(&dir.join(features_file))?;
    let target = read_target_csv(&dir.join(target_file))?;

    if features.len() != target.len() {
        return Err(PipelineError::ValidationError(format!(
            "{} has {} rows but {} has {}",
            features_file,
            features.len(),
            target_file,
            target.len()
        )));
    }

    let x = features.to_matrix()?;
    Ok((features.columns, x, target))
}

/// Fit the regression on the prepared training split and persist it
pub fn run(options: &TrainOptions) -> Result<TrainReport> {
    info!(path = %options.input_dir.display(), "loading training data");
    let (feature_names, x_train, y_train) =
        load_split(&options.input_dir, X_TRAIN_FILE, Y_TRAIN_FILE)?;
    info!(
        rows = x_train.nrows(),
        features = x_train.ncols(),
        "training LinearRegression model"
    );

    let model = LinearModel::fit(feature_names.clone(), x_train.clone(), y_train.clone())?;
    let train_score = model.score(&x_train.view(), &y_train)?;
    info!(train_score, intercept = model.intercept, "model fitted");

    let metadata = TrainingMetadata {
        model_type: MODEL_TYPE.to_string(),
        train_score,
        n_features: model.n_features(),
        n_training_samples: x_train.nrows(),
        feature_names,
    };

    fs::create_dir_all(&options.output_dir)?;
    let model_file = write_model(&options.output_dir, &model)?;
    let metadata_file = options.output_dir.join(METADATA_FILE);
    write_json(&metadata_file, &metadata)?;
    info!(path = %model_file.display(), "model saved");

    Ok(TrainReport {
        metadata,
        coefficients: model.coefficients,
        intercept: model.intercept,
        model_file,
        metadata_file,
    })
}
