use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Schema};
use arrow::ipc::reader::StreamReader;
use std::io::Cursor;

use super::{FORMAT_VERSION, META_FORMAT_VERSION, META_INTERCEPT, META_MODEL_TYPE};
use crate::model::{LinearModel, MODEL_TYPE};
use crate::utils::PipelineError;

/// Decode a model previously written by `encode_model`
///
/// # Arguments
/// * `data` - Raw bytes in Arrow IPC Stream format
///
/// # Returns
/// * `Ok(LinearModel)` with feature names, coefficients and intercept
/// * `Err(PipelineError)` if parsing fails or schema validation fails
pub fn decode_model(data: &[u8]) -> Result<LinearModel, PipelineError> {
    if data.is_empty() {
        return Err(PipelineError::ArrowError("empty model data".to_string()));
    }

    let reader = StreamReader::try_new(Cursor::new(data), None)
        .map_err(|e| PipelineError::ArrowError(format!("failed to create StreamReader: {}", e)))?;

    let schema = reader.schema();
    validate_schema(&schema)?;
    let intercept = read_intercept(&schema)?;

    let mut feature_names = Vec::new();
    let mut coefficients = Vec::new();

    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| PipelineError::ArrowError(format!("failed to read batch: {}", e)))?;

        let names = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| PipelineError::ArrowError("feature column is not StringArray".to_string()))?;
        let coefs = batch
            .column(1)
            .as_any()
            .downcast_ref::<Float64Array>()
            .ok_or_else(|| {
                PipelineError::ArrowError("coefficient column is not Float64Array".to_string())
            })?;

        for i in 0..batch.num_rows() {
            feature_names.push(names.value(i).to_string());
            coefficients.push(coefs.value(i));
        }
    }

    if coefficients.is_empty() {
        return Err(PipelineError::ValidationError(
            "model artifact has no coefficients".to_string(),
        ));
    }

    Ok(LinearModel {
        feature_names,
        coefficients,
        intercept,
    })
}

/// Validate the artifact schema: field layout and model metadata
fn validate_schema(schema: &Schema) -> Result<(), PipelineError> {
    let fields = schema.fields();
    if fields.len() != 2 {
        return Err(PipelineError::ArrowError(format!(
            "model schema must have 2 fields, got {}",
            fields.len()
        )));
    }

    if fields[0].name() != "feature" || !matches!(fields[0].data_type(), DataType::Utf8) {
        return Err(PipelineError::ArrowError(format!(
            "first field must be 'feature' (Utf8), got '{}' ({:?})",
            fields[0].name(),
            fields[0].data_type()
        )));
    }

    if fields[1].name() != "coefficient" || !matches!(fields[1].data_type(), DataType::Float64) {
        return Err(PipelineError::ArrowError(format!(
            "second field must be 'coefficient' (Float64), got '{}' ({:?})",
            fields[1].name(),
            fields[1].data_type()
        )));
    }

    let metadata = schema.metadata();
    match metadata.get(META_MODEL_TYPE).map(String::as_str) {
        Some(MODEL_TYPE) => {}
        other => {
            return Err(PipelineError::ArrowError(format!(
                "unsupported model type: {:?}",
                other
            )))
        }
    }

    match metadata.get(META_FORMAT_VERSION).map(String::as_str) {
        Some(FORMAT_VERSION) => Ok(()),
        other => Err(PipelineError::ArrowError(format!(
            "unsupported artifact format version: {:?}",
            other
        ))),
    }
}

fn read_intercept(schema: &Schema) -> Result<f64, PipelineError> {
    let raw = schema
        .metadata()
        .get(META_INTERCEPT)
        .ok_or_else(|| PipelineError::ArrowError("intercept missing from metadata".to_string()))?;

    let intercept: f64 = raw
        .parse()
        .map_err(|_| PipelineError::ArrowError(format!("invalid intercept '{}'", raw)))?;

    if !intercept.is_finite() {
        return Err(PipelineError::ArrowError(format!(
            "intercept must be finite, got {}",
            raw
        )));
    }
    Ok(intercept)
}
