/// Utility modules for error handling and type conversions
pub mod error;
pub mod type_convert;

// Re-export commonly used types
pub use error::PipelineError;
pub use type_convert::{parse_cell, validate_test_size};
