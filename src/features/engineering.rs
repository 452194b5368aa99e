use std::collections::HashMap;

use super::*;
use crate::schema::{self, PropertyRecord};

/// The six fields derived from a property at training time
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedFeatures {
    /// Remodel year minus build year; negative when the remodel predates construction.
    /// Computed in floating point so implausible years cannot overflow.
    pub age: f64,
    /// Above-ground plus basement area, missing when the basement area is missing
    pub total_sf: Option<f64>,
    pub bath_rooms: i64,
    pub has_fireplace: u8,
    pub has_garage: u8,
    pub recent_remodel: u8,
}

impl DerivedFeatures {
    pub fn from_record(record: &PropertyRecord) -> Self {
        Self {
            age: record.year_remod_add as f64 - record.year_built as f64,
            total_sf: record
                .total_bsmt_sf
                .map(|basement| record.gr_liv_area as f64 + basement),
            bath_rooms: record.full_bath,
            has_fireplace: indicator(record.fireplaces > 0),
            // A missing garage area compares false, as NaN does
            has_garage: indicator(record.garage_area.map_or(false, |area| area > 0.0)),
            recent_remodel: indicator(record.year_remod_add > record.year_built),
        }
    }
}

fn indicator(condition: bool) -> u8 {
    u8::from(condition)
}

/// Every input attribute keyed by its training column name
fn raw_cells(record: &PropertyRecord) -> HashMap<&'static str, FeatureValue> {
    HashMap::from([
        (schema::GR_LIV_AREA, FeatureValue::from(record.gr_liv_area)),
        (schema::GARAGE_AREA, FeatureValue::from(record.garage_area)),
        (schema::TOTAL_BSMT_SF, FeatureValue::from(record.total_bsmt_sf)),
        (schema::YEAR_BUILT, FeatureValue::from(record.year_built)),
        (schema::YEAR_REMOD_ADD, FeatureValue::from(record.year_remod_add)),
        (schema::FULL_BATH, FeatureValue::from(record.full_bath)),
        (schema::FIREPLACES, FeatureValue::from(record.fireplaces)),
        (schema::TOT_RMS_ABV_GRD, FeatureValue::from(record.tot_rms_abv_grd)),
        (schema::LOT_AREA, FeatureValue::from(record.lot_area)),
        (schema::GARAGE_CARS, FeatureValue::from(record.garage_cars)),
        (schema::MS_ZONING, FeatureValue::from(record.ms_zoning.as_str())),
        (schema::NEIGHBORHOOD, FeatureValue::from(record.neighborhood.as_str())),
        (schema::HOUSE_STYLE, FeatureValue::from(record.house_style.as_str())),
        (schema::EXTER_QUAL, FeatureValue::from(record.exter_qual.as_str())),
        (schema::KITCHEN_QUAL, FeatureValue::from(record.kitchen_qual.as_str())),
    ])
}

/// Apply the training-time transform and lay the result out in `columns` order.
///
/// Reference columns with no source get [`FeatureValue::Missing`]; working
/// columns outside the reference list are dropped.
pub fn engineer_features(record: &PropertyRecord, columns: &ColumnSchema) -> EngineeredRecord {
    let derived = DerivedFeatures::from_record(record);

    let mut working = raw_cells(record);
    working.insert(AGE, FeatureValue::Number(derived.age));
    working.insert(TOTAL_SF, derived.total_sf.into());
    working.insert(BATH_ROOMS, derived.bath_rooms.into());
    working.insert(HAS_FIREPLACE, i64::from(derived.has_fireplace).into());
    working.insert(HAS_GARAGE, i64::from(derived.has_garage).into());
    working.insert(RECENT_REMODEL, i64::from(derived.recent_remodel).into());

    let cells = columns
        .columns()
        .iter()
        .map(|column| {
            let value = working
                .remove(column.as_str())
                .unwrap_or(FeatureValue::Missing);
            (column.clone(), value)
        })
        .collect();

    EngineeredRecord::new(cells)
}
