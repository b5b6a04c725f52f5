use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use super::{X_TEST_FILE, X_TRAIN_FILE, Y_TEST_FILE, Y_TRAIN_FILE};
use crate::dataset::Dataset;
use crate::split::train_test_split;
use crate::utils::PipelineError;
use crate::Result;

#[derive(Debug, Clone)]
pub struct PrepOptions {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub test_size: f64,
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrepReport {
    pub columns: Vec<String>,
    pub rows_loaded: usize,
    pub rows_dropped: usize,
    pub n_features: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub output_dir: PathBuf,
}

/// Clean the raw dataset and write the train/test feature and target files
///
/// The last column is the target. Feature files keep their header, target
/// files are written as a bare single column.
pub fn run(options: &PrepOptions) -> Result<PrepReport> {
    info!(path = %options.input.display(), "loading raw data");
    let mut dataset = Dataset::from_csv_path(&options.input)?;
    let rows_loaded = dataset.len();
    info!(rows = rows_loaded, columns = dataset.num_columns(), "raw data loaded");

    let rows_dropped = dataset.drop_missing();
    if rows_dropped > 0 {
        warn!(rows = rows_dropped, "dropped rows with missing values");
    }

    let (features, target) = dataset.split_target()?;
    if features.is_empty() {
        return Err(PipelineError::ValidationError(
            "no rows left after dropping missing values".to_string(),
        ));
    }

    let split = train_test_split(dataset.len(), options.test_size, options.seed)?;

    let x_train = features.select_rows(&split.train)?;
    let x_test = features.select_rows(&split.test)?;
    let y_train = target.select_rows(&split.train)?;
    let y_test = target.select_rows(&split.test)?;

    fs::create_dir_all(&options.output_dir)?;
    write_split(&options.output_dir, &x_train, &x_test, &y_train, &y_test)?;

    info!(
        train = x_train.len(),
        test = x_test.len(),
        output = %options.output_dir.display(),
        "prepared data saved"
    );

    Ok(PrepReport {
        columns: dataset.columns.clone(),
        rows_loaded,
        rows_dropped,
        n_features: features.num_columns(),
        train_rows: x_train.len(),
        test_rows: x_test.len(),
        output_dir: options.output_dir.clone(),
    })
}

fn write_split(
    dir: &Path,
    x_train: &Dataset,
    x_test: &Dataset,
    y_train: &Dataset,
    y_test: &Dataset,
) -> Result<()> {
    x_train.write_csv(&dir.join(X_TRAIN_FILE), true)?;
    x_test.write_csv(&dir.join(X_TEST_FILE), true)?;
    y_train.write_csv(&dir.join(Y_TRAIN_FILE), false)?;
    y_test.write_csv(&dir.join(Y_TEST_FILE), false)?;
    Ok(())
}
