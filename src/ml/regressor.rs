use serde::{Deserialize, Serialize};

use crate::core::ModelError;

/// Anything that maps a fully preprocessed feature vector to a raw target
pub trait PricePredictionModel {
    /// Width of the feature vector the model was fitted on
    fn n_features(&self) -> usize;

    /// Predict the raw (still log-scaled) target
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError>;
}

/// Fitted linear coefficients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub coef: Vec<f64>,
    pub intercept: f64,
}

impl PricePredictionModel for LinearModel {
    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.coef.len() {
            return Err(ModelError::FeatureWidth {
                expected: self.coef.len(),
                actual: features.len(),
            });
        }

        let output = self.intercept
            + self
                .coef
                .iter()
                .zip(features)
                .map(|(weight, value)| weight * value)
                .sum::<f64>();

        if output.is_finite() {
            Ok(output)
        } else {
            Err(ModelError::NonFiniteOutput)
        }
    }
}

/// Final estimator of the exported pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Ridge {
        #[serde(default)]
        alpha: Option<f64>,
        #[serde(flatten)]
        model: LinearModel,
    },
    LinearRegression {
        #[serde(flatten)]
        model: LinearModel,
    },
}

impl Regressor {
    fn linear(&self) -> &LinearModel {
        match self {
            Regressor::Ridge { model, .. } | Regressor::LinearRegression { model } => model,
        }
    }
}

impl PricePredictionModel for Regressor {
    fn n_features(&self) -> usize {
        self.linear().n_features()
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.linear().predict(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_linear_prediction() {
        let model = LinearModel {
            coef: vec![0.5, -1.0, 2.0],
            intercept: 5.0,
        };

        let prediction = model.predict(&[2.0, 1.0, 0.25]).unwrap();
        assert!((prediction - 5.5).abs() < 1e-12);
    }

    #[test]
    fn test_width_mismatch() {
        let model = LinearModel {
            coef: vec![1.0, 1.0],
            intercept: 0.0,
        };

        assert_eq!(
            model.predict(&[1.0]),
            Err(ModelError::FeatureWidth {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_non_finite_output() {
        let model = LinearModel {
            coef: vec![f64::MAX, f64::MAX],
            intercept: 0.0,
        };

        assert_eq!(model.predict(&[2.0, 2.0]), Err(ModelError::NonFiniteOutput));
    }

    #[test]
    fn test_tagged_regressor() {
        let ridge: Regressor = serde_json::from_value(json!({
            "kind": "ridge",
            "alpha": 10.0,
            "coef": [0.1, 0.2],
            "intercept": 5.2
        }))
        .unwrap();
        let ols: Regressor = serde_json::from_value(json!({
            "kind": "linear_regression",
            "coef": [0.1, 0.2],
            "intercept": 5.2
        }))
        .unwrap();

        assert_eq!(ridge.n_features(), 2);
        assert_eq!(ridge.predict(&[1.0, 1.0]), ols.predict(&[1.0, 1.0]));
        assert!(matches!(ridge, Regressor::Ridge { alpha: Some(a), .. } if a == 10.0));
    }
}
