//! Line-level transforms: raw text line → keyed measure.
//!
//! Everything here is pure and runs independently per line, so the
//! pipeline can hand it to rayon without coordination.

pub mod coerce;
pub mod key;
pub mod record;
pub mod utils;

use crate::config::{CaseSeriesConfig, RainfallSeriesConfig};
use crate::error::RecordError;

pub use coerce::KeyedMeasure;
pub use record::TypedRecord;

/// Case series: parse against the schema, derive `period`, coerce the count.
///
/// `output_delimiter` may not appear in the region code.
pub fn case_line_to_measure(
    line: &str,
    cfg: &CaseSeriesConfig,
    output_delimiter: char,
) -> Result<KeyedMeasure, RecordError> {
    let mut record = record::parse_record(line, &cfg.columns, cfg.delimiter)?;
    key::derive_period(&mut record, &cfg.date_column)?;
    coerce::case_measure(
        &record,
        &cfg.measure_column,
        &cfg.region_column,
        output_delimiter,
    )
}

/// Rainfall series: `date,measurement_mm,state` straight to a keyed measure.
pub fn rainfall_line_to_measure(
    line: &str,
    cfg: &RainfallSeriesConfig,
    output_delimiter: char,
) -> Result<KeyedMeasure, RecordError> {
    let fields = record::split_line(line, cfg.delimiter);
    let [date, mm, state] = fields.as_slice() else {
        return Err(RecordError::MalformedLine {
            expected: 3,
            found: fields.len(),
        });
    };
    let key = key::rainfall_key(date, state, output_delimiter)?;
    let value = coerce::rainfall_value(mm)?;
    Ok(KeyedMeasure { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_line_end_to_end() {
        let cfg = CaseSeriesConfig::default();
        let m = case_line_to_measure(
            "1|2015-01-03|10|2304400|Fortaleza|CE|60000-000|-3.71|-38.54",
            &cfg,
            ';',
        )
        .unwrap();
        assert_eq!(m.key, "CE-2015-01");
        assert_eq!(m.value, 10.0);
    }

    #[test]
    fn case_line_with_placeholder_count_is_zero() {
        let cfg = CaseSeriesConfig::default();
        let m = case_line_to_measure("7|2016-11-20|-|3550308|São Paulo|SP|01000-000|0|0", &cfg, ';')
            .unwrap();
        assert_eq!(m.key, "SP-2016-11");
        assert_eq!(m.value, 0.0);
    }

    #[test]
    fn case_line_with_wrong_field_count_is_malformed() {
        let cfg = CaseSeriesConfig::default();
        let err = case_line_to_measure("1|2015-01-03|10|23|Fortaleza|CE", &cfg, ';').unwrap_err();
        assert_eq!(
            err,
            RecordError::MalformedLine {
                expected: 9,
                found: 6
            }
        );
    }

    #[test]
    fn case_line_with_bad_date() {
        let cfg = CaseSeriesConfig::default();
        let err =
            case_line_to_measure("1|20150103|10|23|Fortaleza|CE|x|0|0", &cfg, ';').unwrap_err();
        assert!(matches!(err, RecordError::MalformedDate(_)));
    }

    #[test]
    fn rainfall_line_end_to_end() {
        let cfg = RainfallSeriesConfig::default();
        let m = rainfall_line_to_measure("2015-01-15,85.8,CE", &cfg, ';').unwrap();
        assert_eq!(m.key, "CE-2015-01");
        assert_eq!(m.value, 85.8);

        let m = rainfall_line_to_measure("2015-01-16,-9999.0,CE", &cfg, ';').unwrap();
        assert_eq!(m.value, 0.0);
    }

    #[test]
    fn rainfall_line_with_extra_field_is_malformed() {
        let cfg = RainfallSeriesConfig::default();
        let err = rainfall_line_to_measure("2015-01-15,85.8,CE,extra", &cfg, ';').unwrap_err();
        assert_eq!(
            err,
            RecordError::MalformedLine {
                expected: 3,
                found: 4
            }
        );
    }

    #[test]
    fn region_holding_output_delimiter_is_rejected_on_both_series() {
        let err = case_line_to_measure(
            "1|2015-01-03|1|23|Fortaleza|C;E|x|0|0",
            &CaseSeriesConfig::default(),
            ';',
        )
        .unwrap_err();
        assert_eq!(err, RecordError::InvalidRegion("C;E".to_string()));

        let err =
            rainfall_line_to_measure("2015-01-15,2.0,C;E", &RainfallSeriesConfig::default(), ';')
                .unwrap_err();
        assert_eq!(err, RecordError::InvalidRegion("C;E".to_string()));
    }
}
