// Machine Learning Module

pub mod artifact;
pub mod pipeline;
pub mod predictor;
pub mod regressor;

// Expose key types and functions
pub use artifact::{load_columns, load_pipeline, ModelArtifact};
pub use pipeline::{Pipeline, TargetTransform};
pub use predictor::{round_price, PredictionResult, PricePredictor};
pub use regressor::{LinearModel, PricePredictionModel, Regressor};
