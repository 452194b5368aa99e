use serde::{Deserialize, Serialize};

use super::regressor::{PricePredictionModel, Regressor};
use crate::core::ModelError;
use crate::features::{EngineeredRecord, FeatureValue};

/// How an imputer's statistics were fitted; informational at serving time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    Mean,
    Median,
    MostFrequent,
    Constant,
}

/// Per-column fill values learned during training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleImputer<T> {
    pub strategy: ImputeStrategy,
    pub statistics: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn apply(&self, index: usize, value: f64) -> f64 {
        // Zero-variance columns were fitted with a unit scale
        let scale = match self.scale[index] {
            s if s == 0.0 => 1.0,
            s => s,
        };
        (value - self.mean[index]) / scale
    }
}

/// What to do with a category the encoder never saw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Emit an all-zero block
    #[default]
    Ignore,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotEncoder {
    pub categories: Vec<Vec<String>>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    fn width(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericTransformer {
    pub columns: Vec<String>,
    pub imputer: SimpleImputer<f64>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalTransformer {
    pub columns: Vec<String>,
    pub imputer: SimpleImputer<String>,
    pub encoder: OneHotEncoder,
}

/// Inverse of the transform applied to the sale price before fitting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTransform {
    #[default]
    Log10,
    #[serde(rename = "none")]
    Identity,
}

impl TargetTransform {
    pub fn inverse(&self, raw: f64) -> f64 {
        match self {
            TargetTransform::Log10 => 10f64.powf(raw),
            TargetTransform::Identity => raw,
        }
    }
}

/// A fitted preprocessing + regression pipeline exported from training.
///
/// Output layout matches the training column transformer: scaled numeric
/// columns first, then one one-hot block per categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub numeric: NumericTransformer,
    pub categorical: CategoricalTransformer,
    pub regressor: Regressor,
    #[serde(default)]
    pub target_transform: TargetTransform,
}

impl Pipeline {
    /// Check that every fitted parameter vector lines up
    pub fn validate(&self) -> Result<(), String> {
        let numeric = &self.numeric;
        if numeric.imputer.statistics.len() != numeric.columns.len() {
            return Err(format!(
                "numeric imputer has {} statistics for {} columns",
                numeric.imputer.statistics.len(),
                numeric.columns.len()
            ));
        }
        if numeric.imputer.statistics.iter().any(|s| !s.is_finite()) {
            return Err("numeric imputer statistics must be finite".to_string());
        }
        if let Some(scaler) = &numeric.scaler {
            if scaler.mean.len() != numeric.columns.len()
                || scaler.scale.len() != numeric.columns.len()
            {
                return Err(format!(
                    "scaler is fitted on {} means and {} scales for {} columns",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    numeric.columns.len()
                ));
            }
        }

        let categorical = &self.categorical;
        if categorical.imputer.statistics.len() != categorical.columns.len() {
            return Err(format!(
                "categorical imputer has {} fill values for {} columns",
                categorical.imputer.statistics.len(),
                categorical.columns.len()
            ));
        }
        if categorical.encoder.categories.len() != categorical.columns.len() {
            return Err(format!(
                "encoder has {} category lists for {} columns",
                categorical.encoder.categories.len(),
                categorical.columns.len()
            ));
        }

        let width = self.output_width();
        if self.regressor.n_features() != width {
            return Err(format!(
                "regressor has {} coefficients but preprocessing yields {} features",
                self.regressor.n_features(),
                width
            ));
        }

        Ok(())
    }

    /// Every engineered column the preprocessing reads, numeric first
    pub fn required_columns(&self) -> impl Iterator<Item = &str> {
        self.numeric
            .columns
            .iter()
            .chain(self.categorical.columns.iter())
            .map(String::as_str)
    }

    pub fn output_width(&self) -> usize {
        self.numeric.columns.len() + self.categorical.encoder.width()
    }

    pub fn target_transform(&self) -> TargetTransform {
        self.target_transform
    }

    /// Impute, scale, and one-hot encode a single row
    pub fn transform(&self, row: &EngineeredRecord) -> Result<Vec<f64>, ModelError> {
        // Fitted vectors are indexed per column below
        self.validate().map_err(ModelError::InvalidPipeline)?;

        let mut features = Vec::with_capacity(self.output_width());

        for (index, column) in self.numeric.columns.iter().enumerate() {
            let value = match lookup(row, column)? {
                FeatureValue::Number(value) => *value,
                FeatureValue::Missing => self.numeric.imputer.statistics[index],
                FeatureValue::Category(_) => {
                    return Err(ModelError::ExpectedNumeric(column.clone()))
                }
            };

            let value = match &self.numeric.scaler {
                Some(scaler) => scaler.apply(index, value),
                None => value,
            };
            features.push(value);
        }

        let encoder = &self.categorical.encoder;
        for (index, column) in self.categorical.columns.iter().enumerate() {
            let category = match lookup(row, column)? {
                FeatureValue::Category(category) => category.as_str(),
                FeatureValue::Missing => self.categorical.imputer.statistics[index].as_str(),
                FeatureValue::Number(_) => {
                    return Err(ModelError::ExpectedCategory(column.clone()))
                }
            };

            let known = &encoder.categories[index];
            let position = known.iter().position(|c| c == category);
            if position.is_none() && encoder.handle_unknown == HandleUnknown::Error {
                return Err(ModelError::UnknownCategory {
                    column: column.clone(),
                    value: category.to_string(),
                });
            }

            features.extend((0..known.len()).map(|slot| {
                if Some(slot) == position {
                    1.0
                } else {
                    0.0
                }
            }));
        }

        Ok(features)
    }

    /// Raw model output for one row, still on the training target scale
    pub fn predict_raw(&self, row: &EngineeredRecord) -> Result<f64, ModelError> {
        let features = self.transform(row)?;
        self.regressor.predict(&features)
    }
}

fn lookup<'a>(row: &'a EngineeredRecord, column: &str) -> Result<&'a FeatureValue, ModelError> {
    row.get(column)
        .ok_or_else(|| ModelError::UnknownColumn(column.to_string()))
}
