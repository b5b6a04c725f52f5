use linfa::prelude::SingleTargetRegression;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::utils::PipelineError;

/// Held-out regression metrics, written as the metrics JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub mae: f64,
    pub r2_score: f64,
    pub n_test_samples: usize,
}

impl RegressionMetrics {
    /// Compare predictions against ground truth
    ///
    /// # Arguments
    /// * `y_true` - Observed target values
    /// * `y_pred` - Model predictions, same length as `y_true`
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self, PipelineError> {
        if y_true.is_empty() {
            return Err(PipelineError::ValidationError(
                "cannot evaluate on an empty test set".to_string(),
            ));
        }

        if y_true.len() != y_pred.len() {
            return Err(PipelineError::ValidationError(format!(
                "y_true length ({}) must match y_pred length ({})",
                y_true.len(),
                y_pred.len()
            )));
        }

        let metric_err = |e: linfa::Error| PipelineError::ModelError(format!("metric failed: {}", e));

        let mse = y_pred.mean_squared_error(y_true).map_err(metric_err)?;
        let mae = y_pred.mean_absolute_error(y_true).map_err(metric_err)?;
        let r2_score = y_pred.r2(y_true).map_err(metric_err)?;

        Ok(Self {
            mse,
            rmse: mse.sqrt(),
            mae,
            r2_score,
            n_test_samples: y_true.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_perfect_predictions() {
        let y = arr1(&[1.0, 2.0, 3.0, 4.0]);
        let metrics = RegressionMetrics::compute(&y, &y.clone()).unwrap();

        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert!((metrics.r2_score - 1.0).abs() < 1e-9);
        assert_eq!(metrics.n_test_samples, 4);
    }

    #[test]
    fn test_known_errors() {
        let y_true = arr1(&[1.0, 2.0, 3.0, 4.0]);
        let y_pred = arr1(&[2.0, 2.0, 3.0, 2.0]);
        let metrics = RegressionMetrics::compute(&y_true, &y_pred).unwrap();

        // residuals: -1, 0, 0, 2
        assert!((metrics.mse - 1.25).abs() < 1e-12);
        assert!((metrics.rmse - 1.25f64.sqrt()).abs() < 1e-12);
        assert!((metrics.mae - 0.75).abs() < 1e-12);
        // SS_res = 5, SS_tot = 5
        assert!(metrics.r2_score.abs() < 1e-6);
    }

    #[test]
    fn test_length_mismatch() {
        let result = RegressionMetrics::compute(&arr1(&[1.0, 2.0]), &arr1(&[1.0]));
        assert!(result.is_err());
    }

    #[test]
    fn test_serializes_expected_keys() {
        let y = arr1(&[1.0, 3.0]);
        let metrics = RegressionMetrics::compute(&y, &arr1(&[1.0, 2.0])).unwrap();
        let json = serde_json::to_value(&metrics).unwrap();
        for key in ["mse", "rmse", "mae", "r2_score", "n_test_samples"] {
            assert!(json.get(key).is_some(), "missing key {}", key);
        }
    }
}
