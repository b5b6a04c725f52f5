use ndarray::{Array1, Array2};

use crate::utils::PipelineError;

/// Validate feature matrix dimensions and values
///
/// # Arguments
/// * `features` - Feature matrix to validate
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(PipelineError::ValidationError)` if invalid
pub fn validate_features(features: &Array2<f64>) -> Result<(), PipelineError> {
    if features.nrows() == 0 {
        return Err(PipelineError::ValidationError(
            "feature matrix cannot be empty".to_string(),
        ));
    }

    if features.ncols() == 0 {
        return Err(PipelineError::ValidationError(
            "feature matrix must have at least one column".to_string(),
        ));
    }

    if features.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::ValidationError(
            "feature matrix contains NaN or Inf values".to_string(),
        ));
    }

    Ok(())
}

/// Validate a target vector against the feature matrix it belongs to
pub fn validate_target(features: &Array2<f64>, target: &Array1<f64>) -> Result<(), PipelineError> {
    if features.nrows() != target.len() {
        return Err(PipelineError::ValidationError(format!(
            "feature rows ({}) must match target length ({})",
            features.nrows(),
            target.len()
        )));
    }

    if target.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::ValidationError(
            "target contains NaN or Inf values".to_string(),
        ));
    }

    Ok(())
}
