use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2, ArrayView2, Axis};

use super::feature::{validate_features, validate_target};
use crate::utils::PipelineError;

pub const MODEL_TYPE: &str = "LinearRegression";

/// Ordinary least squares model with an intercept term
///
/// Fitting is delegated to linfa; the fitted parameters are kept as plain
/// vectors so a model read back from disk predicts exactly like the one
/// that was trained. Constant feature columns carry no information and get a
/// zero coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Fit a linear regression on the given features and target
    ///
    /// # Arguments
    /// * `feature_names` - One name per column of `x`
    /// * `x` - Feature matrix (rows=samples, cols=features)
    /// * `y` - Target values (1D array)
    ///
    /// # Returns
    /// * `Ok(LinearModel)` - Fitted coefficients and intercept
    /// * `Err(PipelineError)` - If validation or training fails
    pub fn fit(
        feature_names: Vec<String>,
        x: Array2<f64>,
        y: Array1<f64>,
    ) -> Result<Self, PipelineError> {
        validate_features(&x)?;
        validate_target(&x, &y)?;

        if feature_names.len() != x.ncols() {
            return Err(PipelineError::ValidationError(format!(
                "got {} feature names for {} feature columns",
                feature_names.len(),
                x.ncols()
            )));
        }

        // Constant columns make the design matrix singular; fit without them
        let varying: Vec<usize> = (0..x.ncols())
            .filter(|&j| {
                let column = x.column(j);
                column.iter().any(|v| *v != column[0])
            })
            .collect();

        let mut coefficients = vec![0.0; x.ncols()];
        let intercept = if varying.is_empty() {
            y.mean().ok_or_else(|| {
                PipelineError::ValidationError("target must not be empty".to_string())
            })?
        } else {
            let dataset = Dataset::new(x.select(Axis(1), &varying), y);
            let fitted = LinearRegression::default()
                .fit(&dataset)
                .map_err(|e| PipelineError::ModelError(format!("linear regression failed: {}", e)))?;
            for (&j, &coef) in varying.iter().zip(fitted.params().iter()) {
                coefficients[j] = coef;
            }
            fitted.intercept()
        };

        if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
            return Err(PipelineError::ModelError(
                "linear regression produced non-finite parameters".to_string(),
            ));
        }

        Ok(Self {
            feature_names,
            coefficients,
            intercept,
        })
    }

    pub fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    /// Predict one value per row of `x`
    pub fn predict(&self, x: &ArrayView2<f64>) -> Result<Array1<f64>, PipelineError> {
        if x.ncols() != self.n_features() {
            return Err(PipelineError::ValidationError(format!(
                "input has {} feature columns, model expects {}",
                x.ncols(),
                self.n_features()
            )));
        }

        let coefficients = Array1::from(self.coefficients.clone());
        Ok(x.dot(&coefficients) + self.intercept)
    }

    /// R² of the model's predictions on `x` against `y`
    pub fn score(&self, x: &ArrayView2<f64>, y: &Array1<f64>) -> Result<f64, PipelineError> {
        let predictions = self.predict(x)?;
        predictions
            .r2(y)
            .map_err(|e| PipelineError::ModelError(format!("failed to compute R² score: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("x{}", i)).collect()
    }

    #[test]
    fn test_fit_recovers_exact_line() {
        let x = arr2(&[[1.0], [2.0], [3.0], [4.0]]);
        let y = arr1(&[3.0, 5.0, 7.0, 9.0]); // y = 2x + 1

        let model = LinearModel::fit(names(1), x, y).unwrap();

        assert!((model.coefficients[0] - 2.0).abs() < 1e-6);
        assert!((model.intercept - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_two_features() {
        // y = 1.5 a - 2 b + 4
        let x = arr2(&[
            [1.0, 0.0],
            [0.0, 1.0],
            [2.0, 1.0],
            [3.0, 5.0],
            [4.0, 2.0],
        ]);
        let y = x.rows().into_iter().map(|r| 1.5 * r[0] - 2.0 * r[1] + 4.0).collect::<Array1<f64>>();

        let model = LinearModel::fit(names(2), x.clone(), y.clone()).unwrap();
        let predictions = model.predict(&x.view()).unwrap();

        for (p, t) in predictions.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-6);
        }
        assert!((model.score(&x.view(), &y).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_dimension_mismatch() {
        let x = arr2(&[[1.0], [2.0]]);
        let y = arr1(&[1.0, 2.0, 3.0]);
        assert!(LinearModel::fit(names(1), x, y).is_err());
    }

    #[test]
    fn test_fit_all_zero_column() {
        let x = arr2(&[[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [4.0, 0.0]]);
        let y = arr1(&[3.0, 5.0, 7.0, 9.0]);

        let model = LinearModel::fit(names(2), x, y).unwrap();

        assert!((model.coefficients[0] - 2.0).abs() < 1e-6);
        assert_eq!(model.coefficients[1], 0.0);
        assert!((model.intercept - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_constant_column_gets_zero_coefficient() {
        // rooms is always 3
        let x = arr2(&[[3.0, 1.0], [3.0, 2.0], [3.0, 3.0], [3.0, 4.0]]);
        let y = arr1(&[3.0, 5.0, 7.0, 9.0]);

        let model = LinearModel::fit(names(2), x.clone(), y.clone()).unwrap();

        assert_eq!(model.coefficients[0], 0.0);
        assert!((model.coefficients[1] - 2.0).abs() < 1e-6);
        assert!((model.intercept - 1.0).abs() < 1e-6);
        assert!((model.score(&x.view(), &y).unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_only_constant_columns_predicts_mean() {
        let x = arr2(&[[5.0], [5.0], [5.0]]);
        let y = arr1(&[1.0, 2.0, 3.0]);

        let model = LinearModel::fit(names(1), x, y).unwrap();

        assert_eq!(model.coefficients, vec![0.0]);
        assert!((model.intercept - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_name_count_mismatch() {
        let x = arr2(&[[1.0], [2.0], [3.0]]);
        let y = arr1(&[1.0, 2.0, 3.0]);
        let err = LinearModel::fit(names(2), x, y).unwrap_err();
        assert!(err.to_string().contains("feature names"));
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let model = LinearModel {
            feature_names: names(2),
            coefficients: vec![1.0, 1.0],
            intercept: 0.0,
        };
        let x = arr2(&[[1.0, 2.0, 3.0]]);
        assert!(model.predict(&x.view()).is_err());
    }

    #[test]
    fn test_predict_applies_intercept() {
        let model = LinearModel {
            feature_names: names(2),
            coefficients: vec![2.0, -1.0],
            intercept: 0.5,
        };
        let x = arr2(&[[1.0, 1.0], [3.0, 2.0]]);
        let predictions = model.predict(&x.view()).unwrap();
        assert_eq!(predictions.to_vec(), vec![1.5, 4.5]);
    }
}
