use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::artifact::ModelArtifact;
use crate::core::PredictionError;
use crate::features::{engineer_features, EngineeredRecord};
use crate::schema::PropertyRecord;
use crate::track_performance;

/// A successful prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_sale_price: f64,
}

/// Magnitude beyond which an `f64` carries no cents to round
const WHOLE_UNITS_ONLY: f64 = 1e15;

/// Round to cents from the exact binary value, ties to even
pub fn round_price(price: f64) -> f64 {
    if !price.is_finite() || price.abs() >= WHOLE_UNITS_ONLY {
        return price;
    }
    format!("{:.2}", price).parse().unwrap_or(price)
}

/// Turns validated property records into prices using the shared artifact
#[derive(Debug, Clone)]
pub struct PricePredictor {
    artifact: Arc<ModelArtifact>,
}

impl PricePredictor {
    pub fn new(artifact: Arc<ModelArtifact>) -> Self {
        Self { artifact }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Apply the training-time feature transform against the frozen column list
    pub fn engineer(&self, record: &PropertyRecord) -> Result<EngineeredRecord, PredictionError> {
        let columns = self
            .artifact
            .columns()
            .map_err(|e| PredictionError::ColumnsNotLoaded(e.to_string()))?;

        Ok(engineer_features(record, columns))
    }

    /// Transform, check columns, predict, then undo the log10 target scaling
    pub fn predict(&self, record: &PropertyRecord) -> Result<PredictionResult, PredictionError> {
        track_performance!("predict_sale_price");

        let pipeline = self
            .artifact
            .pipeline()
            .map_err(|e| PredictionError::ModelNotLoaded(e.to_string()))?;
        let engineered = self.engineer(record)?;

        let missing: Vec<String> = pipeline
            .required_columns()
            .filter(|column| !engineered.contains(column))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(PredictionError::MissingColumns(missing));
        }

        let raw = pipeline.predict_raw(&engineered)?;
        let price = pipeline.target_transform().inverse(raw);
        if !price.is_finite() {
            return Err(PredictionError::NonFinitePrice(raw));
        }

        let predicted_sale_price = round_price(price);
        if !predicted_sale_price.is_finite() {
            return Err(PredictionError::NonFinitePrice(raw));
        }

        debug!(raw_output = raw, price, "Prediction complete");

        Ok(PredictionResult {
            predicted_sale_price,
        })
    }
}
