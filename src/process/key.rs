//! Composite keys: `STATE-YEAR-MONTH`.

use crate::error::RecordError;
use crate::process::record::TypedRecord;
use crate::process::utils::clean_str;

pub const KEY_DELIMITER: char = '-';

/// First two dash-separated components of a date, e.g. `2015-01-03` → (`2015`, `01`).
pub fn year_month(date: &str) -> Result<(&str, &str), RecordError> {
    let date = clean_str(date);
    let mut parts = date.split(KEY_DELIMITER);
    match (parts.next(), parts.next()) {
        (Some(year), Some(month)) if !year.is_empty() && !month.is_empty() => Ok((year, month)),
        _ => Err(RecordError::MalformedDate(date.to_string())),
    }
}

/// Store `YEAR-MONTH` from `date_column` on the record as `period`.
pub fn derive_period(record: &mut TypedRecord, date_column: &str) -> Result<(), RecordError> {
    let (year, month) = year_month(record.require(date_column)?)?;
    let period = format!("{}{}{}", year, KEY_DELIMITER, month);
    record.set_period(period);
    Ok(())
}

/// A region must be non-empty and free of the key delimiter, or the key
/// could not be split back into its three parts. It must also be free of
/// `reserved` (the output field delimiter), or the output row would gain
/// a field.
pub fn check_region(region: &str, reserved: char) -> Result<&str, RecordError> {
    let region = clean_str(region);
    if region.is_empty() || region.contains(KEY_DELIMITER) || region.contains(reserved) {
        return Err(RecordError::InvalidRegion(region.to_string()));
    }
    Ok(region)
}

/// `REGION-PERIOD` where `period` is already `YEAR-MONTH`.
pub fn composite_key(region: &str, period: &str, reserved: char) -> Result<String, RecordError> {
    let region = check_region(region, reserved)?;
    Ok(format!("{}{}{}", region, KEY_DELIMITER, period))
}

/// Rainfall path: build the key straight from a date and a state code.
pub fn rainfall_key(date: &str, state: &str, reserved: char) -> Result<String, RecordError> {
    let (year, month) = year_month(date)?;
    let state = check_region(state, reserved)?;
    Ok(format!("{state}{d}{year}{d}{month}", d = KEY_DELIMITER))
}

/// Split a composite key back into (region, year, month).
///
/// Splits from the right, so only the region may be ambiguous.
pub fn split_key(key: &str) -> Option<(&str, &str, &str)> {
    let mut parts = key.rsplitn(3, KEY_DELIMITER);
    let month = parts.next()?;
    let year = parts.next()?;
    let region = parts.next()?;
    Some((region, year, month))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CaseSeriesConfig;
    use crate::process::record::parse_record;

    #[test]
    fn year_month_takes_first_two_components() {
        assert_eq!(year_month("2015-01-03").unwrap(), ("2015", "01"));
        assert_eq!(year_month("2015-01-03T00:00:00").unwrap(), ("2015", "01"));
        assert_eq!(year_month("2015-01").unwrap(), ("2015", "01"));
    }

    #[test]
    fn year_month_rejects_short_dates() {
        for bad in ["20150103", "", "2015-", "-01"] {
            assert!(
                matches!(year_month(bad), Err(RecordError::MalformedDate(_))),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn derive_period_sets_field() {
        let cols = CaseSeriesConfig::default().columns;
        let mut rec = parse_record("1|2016-12-25|3|1|Porto Alegre|RS|x|0|0", &cols, '|').unwrap();
        derive_period(&mut rec, "reported_date").unwrap();
        assert_eq!(rec.period(), Some("2016-12"));
        assert_eq!(rec.len(), 10);
    }

    #[test]
    fn derive_period_missing_column() {
        let cols = CaseSeriesConfig::default().columns;
        let mut rec = parse_record("1|2016-12-25|3|1|Porto Alegre|RS|x|0|0", &cols, '|').unwrap();
        assert_eq!(
            derive_period(&mut rec, "data_iniSE"),
            Err(RecordError::MissingColumn("data_iniSE".to_string()))
        );
    }

    #[test]
    fn keys_from_both_series_agree() {
        assert_eq!(composite_key("CE", "2015-01", ';').unwrap(), "CE-2015-01");
        assert_eq!(rainfall_key("2015-01-15", "CE", ';').unwrap(), "CE-2015-01");
    }

    #[test]
    fn dashed_region_is_rejected() {
        assert_eq!(
            rainfall_key("2015-01-15", "C-E", ';'),
            Err(RecordError::InvalidRegion("C-E".to_string()))
        );
        assert!(composite_key("", "2015-01", ';').is_err());
    }

    #[test]
    fn region_with_output_delimiter_is_rejected() {
        assert_eq!(
            rainfall_key("2015-01-15", "C;E", ';'),
            Err(RecordError::InvalidRegion("C;E".to_string()))
        );
        assert_eq!(
            composite_key("C;E", "2015-01", ';'),
            Err(RecordError::InvalidRegion("C;E".to_string()))
        );
        assert_eq!(composite_key("C;E", "2015-01", '\t').unwrap(), "C;E-2015-01");
    }

    #[test]
    fn split_key_round_trips() {
        assert_eq!(split_key("CE-2015-01"), Some(("CE", "2015", "01")));
        assert_eq!(split_key("X-Y-2015-01"), Some(("X-Y", "2015", "01")));
        assert_eq!(split_key("2015-01"), None);
    }
}
