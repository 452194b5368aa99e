use anyhow::{anyhow, Result};
use jsonschema::error::ValidationErrorKind;
use jsonschema::JSONSchema;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use super::*;

/// One problem found in a request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Location of the offending value, starting with `"body"`
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationIssue {
    pub fn new(loc: Vec<String>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    fn field(name: &str, msg: &str, kind: &str) -> Self {
        Self::new(vec!["body".to_string(), name.to_string()], msg, kind)
    }
}

/// All problems found in a rejected request, rendered as `{"detail": [...]}`
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{} validation error(s) for PropertyRecord", .issues.len())]
pub struct ValidationErrors {
    #[serde(rename = "detail")]
    pub issues: Vec<ValidationIssue>,
}

impl ValidationErrors {
    pub fn single(issue: ValidationIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    /// Names of the fields that were absent from the body
    pub fn missing_fields(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|issue| issue.kind == "value_error.missing")
            .filter_map(|issue| issue.loc.last().map(String::as_str))
            .collect()
    }
}

/// Structural JSON Schema for the request body.
///
/// Numeric fields also admit strings here; whether a string actually parses is
/// decided during coercion.
pub fn property_record_schema() -> Value {
    let mut properties = Map::new();
    for (name, kind) in PROPERTY_FIELDS {
        let rule = match kind {
            FieldKind::Integer => json!({ "type": ["integer", "number", "string"] }),
            FieldKind::OptionalReal => json!({ "type": ["number", "string", "null"] }),
            FieldKind::Text => json!({ "type": "string" }),
        };
        properties.insert(name.to_string(), rule);
    }

    let required: Vec<&str> = PROPERTY_FIELDS.iter().map(|(name, _)| *name).collect();

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "title": "PropertyRecord",
        "type": "object",
        "required": required,
        "properties": properties,
    })
}

/// Validates raw JSON bodies into [`PropertyRecord`]s
pub struct RecordValidator {
    schema: JSONSchema,
}

impl RecordValidator {
    pub fn new() -> Result<Self> {
        let schema = property_record_schema();
        let compiled = JSONSchema::compile(&schema)
            .map_err(|e| anyhow!("Invalid PropertyRecord schema: {}", e))?;

        Ok(Self { schema: compiled })
    }

    /// Check structure against the schema, then coerce each field to its declared type
    pub fn validate(&self, body: &Value) -> Result<PropertyRecord, ValidationErrors> {
        if let Err(errors) = self.schema.validate(body) {
            let issues = errors.map(|error| schema_issue(&error)).collect();
            return Err(ValidationErrors { issues });
        }

        let object = body.as_object().ok_or_else(|| {
            ValidationErrors::single(ValidationIssue::new(
                vec!["body".to_string()],
                "value is not a valid dict",
                "type_error.dict",
            ))
        })?;

        let mut coercer = Coercer::new(object);
        let record = PropertyRecord {
            gr_liv_area: coercer.integer(GR_LIV_AREA),
            garage_area: coercer.optional_real(GARAGE_AREA),
            total_bsmt_sf: coercer.optional_real(TOTAL_BSMT_SF),
            year_built: coercer.integer(YEAR_BUILT),
            year_remod_add: coercer.integer(YEAR_REMOD_ADD),
            full_bath: coercer.integer(FULL_BATH),
            fireplaces: coercer.integer(FIREPLACES),
            tot_rms_abv_grd: coercer.integer(TOT_RMS_ABV_GRD),
            lot_area: coercer.integer(LOT_AREA),
            garage_cars: coercer.optional_real(GARAGE_CARS),
            ms_zoning: coercer.text(MS_ZONING),
            neighborhood: coercer.text(NEIGHBORHOOD),
            house_style: coercer.text(HOUSE_STYLE),
            exter_qual: coercer.text(EXTER_QUAL),
            kitchen_qual: coercer.text(KITCHEN_QUAL),
        };

        if coercer.issues.is_empty() {
            Ok(record)
        } else {
            Err(ValidationErrors {
                issues: coercer.issues,
            })
        }
    }
}

fn schema_issue(error: &jsonschema::ValidationError<'_>) -> ValidationIssue {
    let mut loc = vec!["body".to_string()];
    loc.extend(
        error
            .instance_path
            .to_string()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(str::to_string),
    );

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let name = property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| property.to_string());
            loc.push(name);
            ValidationIssue::new(loc, "field required", "value_error.missing")
        }
        ValidationErrorKind::Type { .. } => ValidationIssue::new(loc, error.to_string(), "type_error"),
        _ => ValidationIssue::new(loc, error.to_string(), "value_error"),
    }
}

/// Collects coercion failures while a record is assembled field by field
struct Coercer<'a> {
    object: &'a Map<String, Value>,
    issues: Vec<ValidationIssue>,
}

impl<'a> Coercer<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            issues: Vec::new(),
        }
    }

    fn lookup(&mut self, name: &str) -> Option<&'a Value> {
        let value = self.object.get(name);
        if value.is_none() {
            self.issues
                .push(ValidationIssue::field(name, "field required", "value_error.missing"));
        }
        value
    }

    fn integer(&mut self, name: &str) -> i64 {
        let Some(value) = self.lookup(name) else {
            return 0;
        };

        match coerce_integer(value) {
            Some(parsed) => parsed,
            None => {
                self.reject(name, value, "value is not a valid integer", "type_error.integer");
                0
            }
        }
    }

    fn optional_real(&mut self, name: &str) -> Option<f64> {
        let value = self.lookup(name)?;
        if value.is_null() {
            return None;
        }

        let parsed = coerce_real(value);
        if parsed.is_none() {
            self.reject(name, value, "value is not a valid float", "type_error.float");
        }
        parsed
    }

    fn text(&mut self, name: &str) -> String {
        let Some(value) = self.lookup(name) else {
            return String::new();
        };

        match value.as_str() {
            Some(text) => text.to_string(),
            None => {
                self.reject(name, value, "str type expected", "type_error.str");
                String::new()
            }
        }
    }

    fn reject(&mut self, name: &str, value: &Value, msg: &str, kind: &str) {
        if value.is_null() {
            self.issues.push(ValidationIssue::field(
                name,
                "none is not an allowed value",
                "type_error.none.not_allowed",
            ));
        } else {
            self.issues.push(ValidationIssue::field(name, msg, kind));
        }
    }
}

/// Integers, integral floats, and integer strings
fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                return Some(int);
            }
            let float = number.as_f64()?;
            let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
            (float.fract() == 0.0 && in_range).then_some(float as i64)
        }
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Any JSON number, or a string holding a finite real
fn coerce_real(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn sample_body() -> Value {
        json!({
            "Gr_Liv_Area": 1500,
            "Garage_Area": 400,
            "Total_Bsmt_SF": 800,
            "Year_Built": 2000,
            "Year_Remod_Add": 2010,
            "Full_Bath": 2,
            "Fireplaces": 1,
            "TotRms_AbvGrd": 6,
            "Lot_Area": 8000,
            "Garage_Cars": 2,
            "MS_Zoning": "RL",
            "Neighborhood": "NAmes",
            "House_Style": "1Story",
            "Exter_Qual": "TA",
            "Kitchen_Qual": "TA"
        })
    }

    #[test]
    fn test_valid_body_is_typed() {
        let validator = RecordValidator::new().unwrap();
        let record = validator.validate(&sample_body()).unwrap();

        assert_eq!(record.gr_liv_area, 1500);
        assert_eq!(record.garage_area, Some(400.0));
        assert_eq!(record.total_bsmt_sf, Some(800.0));
        assert_eq!(record.year_remod_add, 2010);
        assert_eq!(record.garage_cars, Some(2.0));
        assert_eq!(record.neighborhood, "NAmes");
        assert_eq!(record.kitchen_qual, "TA");
    }

    #[test]
    fn test_every_field_is_required() {
        let validator = RecordValidator::new().unwrap();

        for (name, _) in PROPERTY_FIELDS {
            let mut body = sample_body();
            body.as_object_mut().unwrap().remove(name);

            let errors = validator.validate(&body).unwrap_err();
            assert_eq!(errors.missing_fields(), vec![name], "removing {}", name);
        }
    }

    #[test]
    fn test_explicit_null_keeps_optional_fields_absent() {
        let validator = RecordValidator::new().unwrap();
        let mut body = sample_body();
        body["Garage_Area"] = Value::Null;
        body["Total_Bsmt_SF"] = Value::Null;
        body["Garage_Cars"] = Value::Null;

        let record = validator.validate(&body).unwrap();

        assert_eq!(record.garage_area, None);
        assert_eq!(record.total_bsmt_sf, None);
        assert_eq!(record.garage_cars, None);
    }

    #[test]
    fn test_no_range_validation() {
        let validator = RecordValidator::new().unwrap();
        let mut body = sample_body();
        body["Gr_Liv_Area"] = json!(-20);
        body["Year_Remod_Add"] = json!(1890);
        body["Garage_Area"] = json!(-1.5);

        let record = validator.validate(&body).unwrap();

        assert_eq!(record.gr_liv_area, -20);
        assert_eq!(record.year_remod_add, 1890);
        assert_eq!(record.garage_area, Some(-1.5));
    }

    #[test_case(json!(1500) => Some(1500) ; "integer")]
    #[test_case(json!(1500.0) => Some(1500) ; "integral float")]
    #[test_case(json!(" 1500 ") => Some(1500) ; "numeric string")]
    #[test_case(json!(1500.5) => None ; "fractional float")]
    #[test_case(json!("15x") => None ; "garbage string")]
    #[test_case(json!(true) => None ; "boolean")]
    fn test_coerce_integer(value: Value) -> Option<i64> {
        coerce_integer(&value)
    }

    #[test_case(json!(2.5) => Some(2.5) ; "float")]
    #[test_case(json!(2) => Some(2.0) ; "integer")]
    #[test_case(json!("2.5") => Some(2.5) ; "string")]
    #[test_case(json!("NaN") => None ; "nan string")]
    #[test_case(json!([2.5]) => None ; "array")]
    fn test_coerce_real(value: Value) -> Option<f64> {
        coerce_real(&value)
    }

    #[test]
    fn test_uncoercible_values_are_all_reported() {
        let validator = RecordValidator::new().unwrap();
        let mut body = sample_body();
        body["Year_Built"] = json!("nineteen ninety");
        body["Garage_Cars"] = json!("two");

        let errors = validator.validate(&body).unwrap_err();

        assert_eq!(
            errors.issues,
            vec![
                ValidationIssue::field(YEAR_BUILT, "value is not a valid integer", "type_error.integer"),
                ValidationIssue::field(GARAGE_CARS, "value is not a valid float", "type_error.float"),
            ]
        );
    }

    #[test]
    fn test_wrong_kinds_fail_schema_stage() {
        let validator = RecordValidator::new().unwrap();
        let mut body = sample_body();
        body["MS_Zoning"] = json!(5);
        body["Fireplaces"] = Value::Null;

        let errors = validator.validate(&body).unwrap_err();

        assert_eq!(errors.issues.len(), 2);
        assert!(errors.issues.iter().all(|issue| issue.kind == "type_error"));
        let locs: Vec<_> = errors.issues.iter().map(|issue| issue.loc.join(".")).collect();
        assert!(locs.contains(&"body.MS_Zoning".to_string()));
        assert!(locs.contains(&"body.Fireplaces".to_string()));
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let validator = RecordValidator::new().unwrap();
        let errors = validator.validate(&json!([1, 2, 3])).unwrap_err();

        assert_eq!(errors.issues[0].loc, vec!["body".to_string()]);
    }

    #[test]
    fn test_errors_render_as_detail() {
        let errors = ValidationErrors::single(ValidationIssue::field(
            LOT_AREA,
            "field required",
            "value_error.missing",
        ));

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({
                "detail": [
                    { "loc": ["body", "Lot_Area"], "msg": "field required", "type": "value_error.missing" }
                ]
            })
        );
    }
}
