/// Regression model, metrics and input validation
pub mod feature;
pub mod linear;
pub mod metrics;

// Re-export commonly used types
pub use feature::{validate_features, validate_target};
pub use linear::{LinearModel, MODEL_TYPE};
pub use metrics::RegressionMetrics;
