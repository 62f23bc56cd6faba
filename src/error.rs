//! Per-record data-quality errors.
//!
//! These never abort a run. Each failing line is turned into a
//! [`RejectedRecord`] and collected next to the accepted measures.

use serde::Serialize;
use thiserror::Error;

/// Why a single input line could not be turned into a keyed measure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    MalformedLine { expected: usize, found: usize },

    #[error("date {0:?} has fewer than two dash-separated components")]
    MalformedDate(String),

    #[error("column {column} holds {value:?}, which is not a number")]
    NumericFormat { column: String, value: String },

    #[error("region code {0:?} is empty or contains the key delimiter")]
    InvalidRegion(String),

    #[error("missing column {0}")]
    MissingColumn(String),
}

impl RecordError {
    /// Stable short name, used in logs and the rejects file.
    pub fn kind(&self) -> &'static str {
        match self {
            RecordError::MalformedLine { .. } => "malformed_line",
            RecordError::MalformedDate(_) => "malformed_date",
            RecordError::NumericFormat { .. } => "numeric_format",
            RecordError::InvalidRegion(_) => "invalid_region",
            RecordError::MissingColumn(_) => "missing_column",
        }
    }
}

/// The two input datasets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    Cases,
    Rainfall,
}

impl Series {
    pub fn as_str(&self) -> &str {
        match self {
            Series::Cases => "cases",
            Series::Rainfall => "rainfall",
        }
    }
}

/// A line that was dropped, with enough context to find and fix it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub series: Series,
    pub source: String,
    pub line_no: usize,
    pub line: String,
    pub kind: &'static str,
    pub reason: String,
}

impl RejectedRecord {
    pub fn new(
        series: Series,
        source: &str,
        line_no: usize,
        line: &str,
        err: &RecordError,
    ) -> Self {
        Self {
            series,
            source: source.to_string(),
            line_no,
            line: line.to_string(),
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_record_carries_kind_and_reason() {
        let err = RecordError::MalformedLine {
            expected: 9,
            found: 3,
        };
        let rec = RejectedRecord::new(Series::Cases, "casos.txt", 4, "a|b|c", &err);
        assert_eq!(rec.kind, "malformed_line");
        assert_eq!(rec.reason, "expected 9 fields, found 3");
        assert_eq!(rec.line_no, 4);

        let json = serde_json::to_string(&rec).unwrap();
        assert!(json.contains("\"series\":\"cases\""));
    }
}
