use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use super::{write_json, PREDICTIONS_FILE, PREDICTION_COLUMN, PREDICTION_SUMMARY_FILE};
use crate::artifact::read_model;
use crate::dataset::Dataset;
use crate::summary::PredictionSummary;
use crate::utils::PipelineError;
use crate::Result;

#[derive(Debug, Clone)]
pub struct PredictOptions {
    /// Model directory (or explicit artifact file)
    pub model: PathBuf,
    /// New data to score
    pub input: PathBuf,
    /// Directory receiving predictions and their summary
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictReport {
    pub summary: PredictionSummary,
    pub predictions_file: PathBuf,
    pub summary_file: PathBuf,
    #[serde(skip)]
    pub scored: Dataset,
}

/// Score new data with a trained model
///
/// The model's feature columns are picked from the input by name; any other
/// columns are carried through to `predictions.csv` untouched, followed by
/// the `prediction` column.
pub fn run(options: &PredictOptions) -> Result<PredictReport> {
    let model = read_model(&options.model)?;
    info!(path = %options.model.display(), features = model.n_features(), "model loaded");

    let input = Dataset::from_csv_path(&options.input)?;
    info!(
        path = %options.input.display(),
        rows = input.len(),
        columns = input.num_columns(),
        "new data loaded"
    );

    if input.is_empty() {
        return Err(PipelineError::ValidationError(format!(
            "no rows to predict in {}",
            options.input.display()
        )));
    }

    let x = input.select_columns(&model.feature_names)?.to_matrix()?;
    let predictions = model.predict(&x.view())?;
    let values = predictions.to_vec();
    info!(count = values.len(), "predictions generated");

    let summary = PredictionSummary::compute(&values).ok_or_else(|| {
        PipelineError::ValidationError("no predictions were generated".to_string())
    })?;
    let scored = input.with_column(PREDICTION_COLUMN, &values)?;

    fs::create_dir_all(&options.output_dir)?;
    let predictions_file = options.output_dir.join(PREDICTIONS_FILE);
    scored.write_csv(&predictions_file, true)?;
    let summary_file = options.output_dir.join(PREDICTION_SUMMARY_FILE);
    write_json(&summary_file, &summary)?;
    info!(path = %predictions_file.display(), "predictions saved");

    Ok(PredictReport {
        summary,
        predictions_file,
        summary_file,
        scored,
    })
}
