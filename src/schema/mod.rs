//! Raw property attributes accepted by the prediction endpoint.

pub mod validation;

pub use validation::{RecordValidator, ValidationErrors, ValidationIssue};

use serde::Serialize;

pub const GR_LIV_AREA: &str = "Gr_Liv_Area";
pub const GARAGE_AREA: &str = "Garage_Area";
pub const TOTAL_BSMT_SF: &str = "Total_Bsmt_SF";
pub const YEAR_BUILT: &str = "Year_Built";
pub const YEAR_REMOD_ADD: &str = "Year_Remod_Add";
pub const FULL_BATH: &str = "Full_Bath";
pub const FIREPLACES: &str = "Fireplaces";
pub const TOT_RMS_ABV_GRD: &str = "TotRms_AbvGrd";
pub const LOT_AREA: &str = "Lot_Area";
pub const GARAGE_CARS: &str = "Garage_Cars";
pub const MS_ZONING: &str = "MS_Zoning";
pub const NEIGHBORHOOD: &str = "Neighborhood";
pub const HOUSE_STYLE: &str = "House_Style";
pub const EXTER_QUAL: &str = "Exter_Qual";
pub const KITCHEN_QUAL: &str = "Kitchen_Qual";

/// Declared type of an input attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    /// Real number that may be explicitly `null`
    OptionalReal,
    Text,
}

/// The fifteen input attributes in request order
pub const PROPERTY_FIELDS: [(&str, FieldKind); 15] = [
    (GR_LIV_AREA, FieldKind::Integer),
    (GARAGE_AREA, FieldKind::OptionalReal),
    (TOTAL_BSMT_SF, FieldKind::OptionalReal),
    (YEAR_BUILT, FieldKind::Integer),
    (YEAR_REMOD_ADD, FieldKind::Integer),
    (FULL_BATH, FieldKind::Integer),
    (FIREPLACES, FieldKind::Integer),
    (TOT_RMS_ABV_GRD, FieldKind::Integer),
    (LOT_AREA, FieldKind::Integer),
    (GARAGE_CARS, FieldKind::OptionalReal),
    (MS_ZONING, FieldKind::Text),
    (NEIGHBORHOOD, FieldKind::Text),
    (HOUSE_STYLE, FieldKind::Text),
    (EXTER_QUAL, FieldKind::Text),
    (KITCHEN_QUAL, FieldKind::Text),
];

/// A validated, typed property description.
///
/// Built only through [`RecordValidator::validate`]; optional areas stay `None`
/// when the client sends `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyRecord {
    #[serde(rename = "Gr_Liv_Area")]
    pub gr_liv_area: i64,
    #[serde(rename = "Garage_Area")]
    pub garage_area: Option<f64>,
    #[serde(rename = "Total_Bsmt_SF")]
    pub total_bsmt_sf: Option<f64>,
    #[serde(rename = "Year_Built")]
    pub year_built: i64,
    #[serde(rename = "Year_Remod_Add")]
    pub year_remod_add: i64,
    #[serde(rename = "Full_Bath")]
    pub full_bath: i64,
    #[serde(rename = "Fireplaces")]
    pub fireplaces: i64,
    #[serde(rename = "TotRms_AbvGrd")]
    pub tot_rms_abv_grd: i64,
    #[serde(rename = "Lot_Area")]
    pub lot_area: i64,
    #[serde(rename = "Garage_Cars")]
    pub garage_cars: Option<f64>,
    #[serde(rename = "MS_Zoning")]
    pub ms_zoning: String,
    #[serde(rename = "Neighborhood")]
    pub neighborhood: String,
    #[serde(rename = "House_Style")]
    pub house_style: String,
    #[serde(rename = "Exter_Qual")]
    pub exter_qual: String,
    #[serde(rename = "Kitchen_Qual")]
    pub kitchen_qual: String,
}
