use std::collections::HashMap;

use crate::error::RecordError;
use crate::process::utils::clean_str;

/// Name of the field added by [`crate::process::key::derive_period`].
pub const PERIOD_FIELD: &str = "period";

/// A case-series line zipped against the declared columns.
///
/// Holds exactly the declared columns, plus `period` once the key
/// deriver has run.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRecord {
    fields: HashMap<String, String>,
}

impl TypedRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Like [`get`](Self::get), but a missing column is an error.
    pub fn require(&self, column: &str) -> Result<&str, RecordError> {
        self.get(column)
            .ok_or_else(|| RecordError::MissingColumn(column.to_string()))
    }

    pub fn period(&self) -> Option<&str> {
        self.get(PERIOD_FIELD)
    }

    pub(crate) fn set_period(&mut self, period: String) {
        self.fields.insert(PERIOD_FIELD.to_string(), period);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split one line on `delimiter`, cleaning each field.
pub fn split_line(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).map(clean_str).collect()
}

/// Zip a line positionally into the declared columns.
///
/// A field count that differs from the schema is a [`RecordError::MalformedLine`].
pub fn parse_record(
    line: &str,
    columns: &[String],
    delimiter: char,
) -> Result<TypedRecord, RecordError> {
    let values = split_line(line, delimiter);
    if values.len() != columns.len() {
        return Err(RecordError::MalformedLine {
            expected: columns.len(),
            found: values.len(),
        });
    }

    let fields = columns
        .iter()
        .cloned()
        .zip(values.into_iter().map(str::to_string))
        .collect();
    Ok(TypedRecord { fields })
}
