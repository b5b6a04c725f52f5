use super::error::PipelineError;

/// Validate the held-out fraction lies strictly inside (0, 1)
///
/// # Arguments
/// * `test_size` - Fraction of rows assigned to the test split
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(PipelineError::ValidationError)` if out of range
pub fn validate_test_size(test_size: f64) -> Result<(), PipelineError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(PipelineError::ValidationError(format!(
            "test_size must be between 0 and 1 (exclusive), got {}",
            test_size
        )));
    }
    Ok(())
}

/// Parse a CSV cell into f64
///
/// # Arguments
/// * `raw` - Cell text, surrounding whitespace is ignored
/// * `column` - Column name used in the error message
/// * `row` - 1-based data row used in the error message
pub fn parse_cell(raw: &str, column: &str, row: usize) -> Result<f64, PipelineError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed.parse().map_err(|_| {
        PipelineError::ValidationError(format!(
            "column '{}' row {}: '{}' is not numeric",
            column, row, trimmed
        ))
    })?;

    if !value.is_finite() {
        return Err(PipelineError::ValidationError(format!(
            "column '{}' row {}: '{}' is not a finite number",
            column, row, trimmed
        )));
    }

    Ok(value)
}
