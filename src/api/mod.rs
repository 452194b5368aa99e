pub mod server;

pub use server::{PredictionServer, ServerConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};
use warp::http::StatusCode;
use warp::reply::{self, Reply, Response};

use crate::core::PredictionError;
use crate::ml::{ModelArtifact, PredictionResult, PricePredictor};
use crate::schema::RecordValidator;

pub const API_TITLE: &str = "Ames House Price Prediction API";
pub const API_VERSION: &str = "1.0";

/// Body of `GET /`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageMessage {
    pub message: String,
}

impl Default for UsageMessage {
    fn default() -> Self {
        Self {
            message: format!(
                "{} v{}. Use the /predict/ endpoint to predict the sale price of a house in the Ames dataset.",
                API_TITLE, API_VERSION
            ),
        }
    }
}

/// Body of `POST /predict/`; failures are reported in-band with HTTP 200
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PredictResponse {
    Price { predicted_sale_price: f64 },
    Error { error: String },
}

impl From<Result<PredictionResult, PredictionError>> for PredictResponse {
    fn from(result: Result<PredictionResult, PredictionError>) -> Self {
        match result {
            Ok(prediction) => PredictResponse::Price {
                predicted_sale_price: prediction.predicted_sale_price,
            },
            Err(e) => PredictResponse::Error {
                error: e.to_string(),
            },
        }
    }
}

/// Everything a request handler needs; built once and shared read-only
pub struct AppState {
    predictor: PricePredictor,
    validator: RecordValidator,
}

impl AppState {
    pub fn new(artifact: Arc<ModelArtifact>) -> Result<Self> {
        if !artifact.is_ready() {
            warn!("Model artifacts are incomplete; /predict/ will answer with errors");
        }

        Ok(Self {
            predictor: PricePredictor::new(artifact),
            validator: RecordValidator::new()?,
        })
    }

    pub fn predictor(&self) -> &PricePredictor {
        &self.predictor
    }

    pub fn validator(&self) -> &RecordValidator {
        &self.validator
    }
}

/// `GET /`
pub fn usage() -> UsageMessage {
    UsageMessage::default()
}

/// Validate, then predict. Schema failures are 422, prediction failures are in-band.
pub fn predict(state: &AppState, body: &Value) -> Response {
    let record = match state.validator.validate(body) {
        Ok(record) => record,
        Err(errors) => {
            info!(issues = errors.issues.len(), "Rejected invalid prediction request");
            return reply::with_status(reply::json(&errors), StatusCode::UNPROCESSABLE_ENTITY)
                .into_response();
        }
    };

    let result = state.predictor.predict(&record);
    if let Err(e) = &result {
        warn!("Prediction failed: {}", e);
    }

    reply::json(&PredictResponse::from(result)).into_response()
}
