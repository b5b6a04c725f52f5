use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use super::train::load_split;
use super::{write_json, X_TEST_FILE, Y_TEST_FILE};
use crate::artifact::read_model;
use crate::model::RegressionMetrics;
use crate::utils::PipelineError;
use crate::Result;

#[derive(Debug, Clone)]
pub struct EvaluateOptions {
    /// Directory holding the prepared data
    pub input_dir: PathBuf,
    /// Model directory (or explicit artifact file)
    pub model: PathBuf,
    /// Destination of the metrics document
    pub metrics_file: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluateReport {
    pub metrics: RegressionMetrics,
    pub metrics_file: PathBuf,
}

/// Score the trained model on the held-out split and write the metrics file
pub fn run(options: &EvaluateOptions) -> Result<EvaluateReport> {
    info!(path = %options.input_dir.display(), "loading test data");
    let (feature_names, x_test, y_test) = load_split(&options.input_dir, X_TEST_FILE, Y_TEST_FILE)?;

    let model = read_model(&options.model)?;
    info!(path = %options.model.display(), "model loaded");

    if feature_names != model.feature_names {
        return Err(PipelineError::ValidationError(format!(
            "test features {:?} do not match model features {:?}",
            feature_names, model.feature_names
        )));
    }

    let y_pred = model.predict(&x_test.view())?;
    let metrics = RegressionMetrics::compute(&y_test, &y_pred)?;
    info!(
        mse = metrics.mse,
        rmse = metrics.rmse,
        mae = metrics.mae,
        r2 = metrics.r2_score,
        "model evaluated"
    );

    write_json(&options.metrics_file, &metrics)?;
    info!(path = %options.metrics_file.display(), "metrics saved");

    Ok(EvaluateReport {
        metrics,
        metrics_file: options.metrics_file.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::write_model;
    use crate::model::LinearModel;
    use std::fs;
    use std::path::Path;

    fn write_test_split(dir: &Path, header: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(X_TEST_FILE), format!("{}\n1,1\n2,0\n0,3\n", header)).unwrap();
        fs::write(dir.join(Y_TEST_FILE), "4\n5\n8\n").unwrap();
    }

    fn model() -> LinearModel {
        // predicts 2a + 2b + 0 -> 4, 4, 6
        LinearModel {
            feature_names: vec!["a".to_string(), "b".to_string()],
            coefficients: vec![2.0, 2.0],
            intercept: 0.0,
        }
    }

    #[test]
    fn test_evaluate_writes_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let prep = dir.path().join("prep_output");
        let train = dir.path().join("train_output");
        write_test_split(&prep, "a,b");
        write_model(&train, &model()).unwrap();

        let metrics_file = dir.path().join("outputs").join("metrics.json");
        let report = run(&EvaluateOptions {
            input_dir: prep,
            model: train,
            metrics_file: metrics_file.clone(),
        })
        .unwrap();

        // residuals: 0, 1, 2
        assert!((report.metrics.mse - 5.0 / 3.0).abs() < 1e-12);
        assert!((report.metrics.mae - 1.0).abs() < 1e-12);
        assert_eq!(report.metrics.n_test_samples, 3);

        let written: RegressionMetrics =
            serde_json::from_str(&fs::read_to_string(&metrics_file).unwrap()).unwrap();
        assert_eq!(written, report.metrics);
    }

    #[test]
    fn test_evaluate_rejects_feature_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let prep = dir.path().join("prep_output");
        let train = dir.path().join("train_output");
        write_test_split(&prep, "a,c");
        write_model(&train, &model()).unwrap();

        let metrics_file = dir.path().join("metrics.json");
        let err = run(&EvaluateOptions {
            input_dir: prep,
            model: train,
            metrics_file: metrics_file.clone(),
        })
        .unwrap_err();
        assert!(err.to_string().contains("do not match"));
        assert!(!metrics_file.exists());
    }

    #[test]
    fn test_evaluate_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let prep = dir.path().join("prep_output");
        write_test_split(&prep, "a,b");

        let metrics_file = dir.path().join("metrics.json");
        let result = run(&EvaluateOptions {
            input_dir: prep,
            model: dir.path().join("train_output"),
            metrics_file: metrics_file.clone(),
        });
        assert!(matches!(result, Err(PipelineError::MissingInput(_))));
        assert!(!metrics_file.exists());
    }
}
