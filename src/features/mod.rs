// Feature engineering shared with the training notebook

pub mod columns;
pub mod engineering;

pub use columns::ColumnSchema;
pub use engineering::{engineer_features, DerivedFeatures};

use serde::Serialize;

pub const AGE: &str = "Age";
pub const TOTAL_SF: &str = "TotalSF";
pub const BATH_ROOMS: &str = "Bath_Rooms";
pub const HAS_FIREPLACE: &str = "HasFireplace";
pub const HAS_GARAGE: &str = "HasGarage";
pub const RECENT_REMODEL: &str = "RecentRemodel";

/// A single cell of an engineered row
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
    /// Placeholder left for the model's imputer
    Missing,
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        FeatureValue::Number(value as f64)
    }
}

impl From<Option<f64>> for FeatureValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FeatureValue::Missing, FeatureValue::Number)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Category(value.to_string())
    }
}

/// One row laid out in the frozen training-time column order
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredRecord {
    columns: Vec<String>,
    values: Vec<FeatureValue>,
}

impl EngineeredRecord {
    pub fn new(cells: Vec<(String, FeatureValue)>) -> Self {
        let (columns, values) = cells.into_iter().unzip();
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<&FeatureValue> {
        self.columns
            .iter()
            .position(|name| name == column)
            .map(|index| &self.values[index])
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|name| name == column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for EngineeredRecord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}
