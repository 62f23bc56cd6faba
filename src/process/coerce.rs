use crate::error::RecordError;
use crate::process::key::composite_key;
use crate::process::record::TypedRecord;
use crate::process::utils::{clean_str, has_digit};

/// One contribution to a per-key sum.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedMeasure {
    pub key: String,
    pub value: f64,
}

fn parse_finite(column: &str, raw: &str) -> Result<f64, RecordError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(RecordError::NumericFormat {
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Case counts: a field with no digits means "no cases reported" (`0.0`).
/// A field with digits must parse, or it is a [`RecordError::NumericFormat`].
pub fn case_count_value(column: &str, raw: &str) -> Result<f64, RecordError> {
    let raw = clean_str(raw);
    if !has_digit(raw) {
        return Ok(0.0);
    }
    parse_finite(column, raw)
}

/// Rainfall in mm. Negative readings are sensor artifacts and clamp to `0.0`.
pub fn rainfall_value(raw: &str) -> Result<f64, RecordError> {
    let mm = parse_finite("measurement_mm", clean_str(raw))?;
    Ok(if mm < 0.0 { 0.0 } else { mm })
}

/// Key a case record by `REGION-PERIOD` and coerce its count.
///
/// The record must already carry `period`. `reserved` is a character the
/// region may not contain (see [`crate::process::key::check_region`]).
pub fn case_measure(
    record: &TypedRecord,
    measure_column: &str,
    region_column: &str,
    reserved: char,
) -> Result<KeyedMeasure, RecordError> {
    let period = record
        .period()
        .ok_or_else(|| RecordError::MissingColumn("period".to_string()))?;
    let key = composite_key(record.require(region_column)?, period, reserved)?;
    let value = case_count_value(measure_column, record.require(measure_column)?)?;
    Ok(KeyedMeasure { key, value })
}
