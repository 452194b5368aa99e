use std::path::PathBuf;
use thiserror::Error;

/// Failure to load one of the two startup artifacts
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse artifact {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid artifact {path}: {message}")]
    Invalid { path: PathBuf, message: String },
}

/// Faults raised while evaluating the exported pipeline on one row
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Column '{0}' is not present in the engineered record")]
    UnknownColumn(String),

    #[error("Column '{0}' expects a numeric value but received a category")]
    ExpectedNumeric(String),

    #[error("Column '{0}' expects a category but received a number")]
    ExpectedCategory(String),

    #[error("Found unknown category '{value}' in column '{column}' during transform")]
    UnknownCategory { column: String, value: String },

    #[error("Regressor expects {expected} features but preprocessing produced {actual}")]
    FeatureWidth { expected: usize, actual: usize },

    #[error("Pipeline parameters are inconsistent: {0}")]
    InvalidPipeline(String),

    #[error("Regressor produced a non-finite output")]
    NonFiniteOutput,
}

/// Every way a single prediction request can fail after validation
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Model not loaded: {0}")]
    ModelNotLoaded(String),

    #[error("Expected column configuration not loaded: {0}")]
    ColumnsNotLoaded(String),

    #[error("Columns missing after feature engineering: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Prediction failed: {0}")]
    Model(#[from] ModelError),

    #[error("Predicted price is not finite (raw model output {0})")]
    NonFinitePrice(f64),
}
