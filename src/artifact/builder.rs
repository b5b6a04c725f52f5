use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::ipc::writer::StreamWriter;
use arrow::record_batch::RecordBatch;
use std::collections::HashMap;
use std::sync::Arc;

use super::{FORMAT_VERSION, META_FORMAT_VERSION, META_INTERCEPT, META_MODEL_TYPE};
use crate::model::{LinearModel, MODEL_TYPE};
use crate::utils::PipelineError;

/// Encode a fitted model as an Arrow IPC stream
///
/// # Arguments
/// * `model` - Fitted linear model
///
/// # Returns
/// * `Ok(Vec<u8>)` - Arrow IPC Stream format bytes, one row per coefficient
/// * `Err(PipelineError)` - If the model is inconsistent or writing fails
///
/// # Layout
/// Columns `feature` (Utf8) and `coefficient` (Float64); the intercept,
/// model type and format version travel in the schema metadata.
pub fn encode_model(model: &LinearModel) -> Result<Vec<u8>, PipelineError> {
    if model.feature_names.len() != model.coefficients.len() {
        return Err(PipelineError::ValidationError(
            "feature_names and coefficients must have same length".to_string(),
        ));
    }

    if model.coefficients.is_empty() {
        return Err(PipelineError::ValidationError(
            "model has no coefficients".to_string(),
        ));
    }

    let metadata = HashMap::from([
        (META_MODEL_TYPE.to_string(), MODEL_TYPE.to_string()),
        (META_INTERCEPT.to_string(), model.intercept.to_string()),
        (META_FORMAT_VERSION.to_string(), FORMAT_VERSION.to_string()),
    ]);

    let schema = Arc::new(Schema::new_with_metadata(
        vec![
            Field::new("feature", DataType::Utf8, false),
            Field::new("coefficient", DataType::Float64, false),
        ],
        metadata,
    ));

    let feature_array = Arc::new(StringArray::from(model.feature_names.clone())) as ArrayRef;
    let coef_array = Arc::new(Float64Array::from(model.coefficients.clone())) as ArrayRef;

    let batch = RecordBatch::try_new(schema.clone(), vec![feature_array, coef_array])
        .map_err(|e| PipelineError::ArrowError(format!("failed to create RecordBatch: {}", e)))?;

    serialize_to_ipc(schema, batch)
}

/// Serialize RecordBatch to Arrow IPC Stream format
fn serialize_to_ipc(schema: Arc<Schema>, batch: RecordBatch) -> Result<Vec<u8>, PipelineError> {
    let mut buffer = Vec::new();
    {
        let mut writer = StreamWriter::try_new(&mut buffer, &schema).map_err(|e| {
            PipelineError::ArrowError(format!("failed to create StreamWriter: {}", e))
        })?;
        writer
            .write(&batch)
            .map_err(|e| PipelineError::ArrowError(format!("failed to write batch: {}", e)))?;
        writer
            .finish()
            .map_err(|e| PipelineError::ArrowError(format!("failed to finish writer: {}", e)))?;
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::ipc::reader::StreamReader;
    use std::io::Cursor;

    fn sample_model() -> LinearModel {
        LinearModel {
            feature_names: vec!["sqft".to_string(), "rooms".to_string()],
            coefficients: vec![0.2, 15.0],
            intercept: -3.5,
        }
    }

    #[test]
    fn test_encode_model_schema() {
        let bytes = encode_model(&sample_model()).unwrap();
        assert!(!bytes.is_empty());

        let reader = StreamReader::try_new(Cursor::new(bytes), None).unwrap();
        let schema = reader.schema();
        assert_eq!(schema.fields().len(), 2);
        assert_eq!(schema.fields()[0].name(), "feature");
        assert_eq!(schema.fields()[1].name(), "coefficient");
        assert_eq!(
            schema.metadata().get(META_MODEL_TYPE).map(String::as_str),
            Some("LinearRegression")
        );
        assert_eq!(
            schema.metadata().get(META_INTERCEPT).map(String::as_str),
            Some("-3.5")
        );
    }

    #[test]
    fn test_encode_model_length_mismatch() {
        let mut model = sample_model();
        model.coefficients.pop();
        let result = encode_model(&model);
        assert!(result.unwrap_err().to_string().contains("must have same length"));
    }

    #[test]
    fn test_encode_model_empty() {
        let model = LinearModel {
            feature_names: vec![],
            coefficients: vec![],
            intercept: 0.0,
        };
        assert!(encode_model(&model).is_err());
    }
}
