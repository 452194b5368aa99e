pub mod error;

pub use error::{ArtifactError, ModelError, PredictionError};
