use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Summary statistics over a batch of predictions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub n_predictions: usize,
    pub mean_prediction: f64,
    pub min_prediction: f64,
    pub max_prediction: f64,
    /// Sample standard deviation (ddof = 1), absent for fewer than two predictions
    pub std_prediction: Option<f64>,
}

impl PredictionSummary {
    /// Compute the summary, or `None` for an empty batch
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let view = ArrayView1::from(values);
        let mean = view.mean()?;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let std = (values.len() > 1).then(|| view.std(1.0));

        Some(PredictionSummary {
            n_predictions: values.len(),
            mean_prediction: mean,
            min_prediction: min,
            max_prediction: max,
            std_prediction: std,
        })
    }
}
