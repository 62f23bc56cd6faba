//! Pipeline configuration.
//!
//! Every field has a default, so an empty YAML document (or
//! `PipelineConfig::default()`) reproduces the dengue/rainfall job.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

use crate::process::key::KEY_DELIMITER;
use crate::process::record::PERIOD_FIELD;
use std::collections::HashSet;

/// Top-level configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PipelineConfig {
    #[serde(default)]
    pub cases: CaseSeriesConfig,

    #[serde(default)]
    pub rainfall: RainfallSeriesConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Series A: pipe-delimited case reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseSeriesConfig {
    /// Glob pattern of input files
    #[serde(default = "default_cases_path")]
    pub path: String,

    #[serde(default = "default_cases_delimiter")]
    pub delimiter: char,

    #[serde(default = "default_skip_header_lines")]
    pub skip_header_lines: usize,

    /// Declared column schema, in file order
    #[serde(default = "default_case_columns")]
    pub columns: Vec<String>,

    #[serde(default = "default_date_column")]
    pub date_column: String,

    #[serde(default = "default_measure_column")]
    pub measure_column: String,

    #[serde(default = "default_region_column")]
    pub region_column: String,
}

/// Series B: comma-delimited `date,measurement_mm,state` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallSeriesConfig {
    #[serde(default = "default_rainfall_path")]
    pub path: String,

    #[serde(default = "default_rainfall_delimiter")]
    pub delimiter: char,

    #[serde(default = "default_skip_header_lines")]
    pub skip_header_lines: usize,

    /// Decimal places kept on each aggregated rainfall sum; `None` keeps the raw sum
    #[serde(default = "default_round_digits")]
    pub round_digits: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output path without suffix, e.g. `out/resultado`
    #[serde(default = "default_output_prefix")]
    pub prefix: String,

    #[serde(default = "default_output_suffix")]
    pub suffix: String,

    #[serde(default = "default_output_delimiter")]
    pub delimiter: char,

    #[serde(default = "default_output_header")]
    pub header: String,

    /// Write rejected lines to `<prefix>-rejected.jsonl`
    #[serde(default = "default_true")]
    pub write_rejects: bool,

    /// Write run counters to `<prefix>-summary.json`
    #[serde(default = "default_true")]
    pub write_summary: bool,
}

fn default_cases_path() -> String {
    "casos_dengue.txt".to_string()
}

fn default_cases_delimiter() -> char {
    '|'
}

fn default_skip_header_lines() -> usize {
    1
}

fn default_case_columns() -> Vec<String> {
    [
        "id",
        "reported_date",
        "case_count",
        "region_code",
        "city",
        "state",
        "postal_code",
        "latitude",
        "longitude",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_date_column() -> String {
    "reported_date".to_string()
}

fn default_measure_column() -> String {
    "case_count".to_string()
}

fn default_region_column() -> String {
    "state".to_string()
}

fn default_rainfall_path() -> String {
    "chuvas.csv".to_string()
}

fn default_rainfall_delimiter() -> char {
    ','
}

fn default_round_digits() -> Option<u32> {
    Some(1)
}

fn default_output_prefix() -> String {
    "resultado".to_string()
}

fn default_output_suffix() -> String {
    ".csv".to_string()
}

fn default_output_delimiter() -> char {
    ';'
}

fn default_output_header() -> String {
    "UF;ANO;MES;CHUVA;DENGUE".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CaseSeriesConfig {
    fn default() -> Self {
        Self {
            path: default_cases_path(),
            delimiter: default_cases_delimiter(),
            skip_header_lines: default_skip_header_lines(),
            columns: default_case_columns(),
            date_column: default_date_column(),
            measure_column: default_measure_column(),
            region_column: default_region_column(),
        }
    }
}

impl Default for RainfallSeriesConfig {
    fn default() -> Self {
        Self {
            path: default_rainfall_path(),
            delimiter: default_rainfall_delimiter(),
            skip_header_lines: default_skip_header_lines(),
            round_digits: default_round_digits(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: default_output_prefix(),
            suffix: default_output_suffix(),
            delimiter: default_output_delimiter(),
            header: default_output_header(),
            write_rejects: default_true(),
            write_summary: default_true(),
        }
    }
}

impl PipelineConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&text)
                .with_context(|| format!("parsing JSON config {}", path.display()))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&text)
                .with_context(|| format!("parsing YAML config {}", path.display()))?,
            other => bail!(
                "unsupported config extension {:?} for {}",
                other,
                path.display()
            ),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let cases = &self.cases;
        if cases.columns.is_empty() {
            bail!("cases.columns must not be empty");
        }
        let mut seen = HashSet::new();
        for column in &cases.columns {
            if column == PERIOD_FIELD {
                bail!("cases.columns may not declare {:?}; it is derived", PERIOD_FIELD);
            }
            if !seen.insert(column.as_str()) {
                bail!("cases.columns declares {:?} more than once", column);
            }
        }
        for (role, name) in [
            ("date_column", &cases.date_column),
            ("measure_column", &cases.measure_column),
            ("region_column", &cases.region_column),
        ] {
            if !cases.columns.iter().any(|c| c == name) {
                bail!("cases.{} {:?} is not one of the declared columns", role, name);
            }
        }
        if self.output.delimiter == KEY_DELIMITER {
            bail!(
                "output.delimiter must differ from the key delimiter {:?}",
                KEY_DELIMITER
            );
        }
        if self.output.header.split(self.output.delimiter).count() != 5 {
            bail!(
                "output.header {:?} must have five {:?}-separated fields",
                self.output.header,
                self.output.delimiter
            );
        }
        Ok(())
    }

    pub fn output_path(&self) -> String {
        format!("{}{}", self.output.prefix, self.output.suffix)
    }

    pub fn rejects_path(&self) -> String {
        format!("{}-rejected.jsonl", self.output.prefix)
    }

    pub fn summary_path(&self) -> String {
        format!("{}-summary.json", self.output.prefix)
    }
}
