//! Row formatting and the text sinks.

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};
use tracing::{debug, info, warn};

use crate::error::RejectedRecord;
use crate::join::{complete_entries, JoinedSeries};
use crate::process::key::split_key;

/// Shortest round-trip repr, always with a fractional part (`10.0`, `85.8`).
///
/// Values below 1e-4 or from 1e16 up use exponent form with a signed,
/// two-digit exponent (`1e+16`, `2.5e-05`).
pub fn format_measure(value: f64) -> String {
    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => format!(
                "{}e{}{:02}",
                mantissa,
                if exp < 0 { '-' } else { '+' },
                exp.abs()
            ),
            Err(_) => repr,
        },
        None => repr,
    }
}

/// One completed join, expanded back out of its composite key.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRow {
    pub region: String,
    pub year: String,
    pub month: String,
    pub rainfall: f64,
    pub cases: f64,
}

impl OutputRow {
    pub fn from_entry(key: &str, rainfall: f64, cases: f64) -> Option<Self> {
        let (region, year, month) = split_key(key)?;
        Some(Self {
            region: region.to_string(),
            year: year.to_string(),
            month: month.to_string(),
            rainfall,
            cases,
        })
    }

    pub fn to_line(&self, delimiter: char) -> String {
        [
            self.region.clone(),
            self.year.clone(),
            self.month.clone(),
            format_measure(self.rainfall),
            format_measure(self.cases),
        ]
        .join(&delimiter.to_string())
    }
}

/// Complete entries of `joined` as output rows, in key order.
pub fn output_rows(joined: &JoinedSeries) -> Vec<OutputRow> {
    complete_entries(joined)
        .filter_map(|(key, rain, cases)| {
            let row = OutputRow::from_entry(key, rain, cases);
            if row.is_none() {
                warn!(key, "key does not split into region, year and month");
            }
            row
        })
        .collect()
}

/// Write `header` then one line per item to `path`, via `<path>.tmp` + rename.
pub fn write_lines<I, S>(path: &Path, header: Option<&str>, lines: I) -> Result<usize>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");
    let file = File::create(&temp_path)
        .with_context(|| format!("creating file {}", temp_path.display()))?;
    let mut out = BufWriter::new(file);

    if let Some(header) = header {
        writeln!(out, "{}", header)?;
    }
    let mut written = 0;
    for line in lines {
        writeln!(out, "{}", line.as_ref())?;
        written += 1;
    }
    out.flush()
        .with_context(|| format!("flushing {}", temp_path.display()))?;
    drop(out);

    fs::rename(&temp_path, path)
        .with_context(|| format!("renaming {} to {}", temp_path.display(), path.display()))?;
    debug!(path = %path.display(), written, "wrote lines");
    Ok(written)
}

/// Header + one delimited row per output row.
pub fn write_rows(path: &Path, header: &str, rows: &[OutputRow], delimiter: char) -> Result<usize> {
    let written = write_lines(
        path,
        Some(header),
        rows.iter().map(|r| r.to_line(delimiter)),
    )?;
    info!(path = %path.display(), rows = written, "wrote joined rows");
    Ok(written)
}

/// Rejected lines as JSON Lines.
pub fn write_rejects(path: &Path, rejected: &[RejectedRecord]) -> Result<usize> {
    let lines = rejected
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()
        .context("serialising rejected records")?;
    write_lines(path, None, lines)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serialising JSON")?;
    write_lines(path, None, [text])?;
    Ok(())
}
