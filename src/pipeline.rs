//! Wiring: two independent per-series pipelines, a barrier, the join,
//! and the sinks.
//!
//! ```text
//! cases lines    ─ parse ─ period ─ coerce ─ sum ─┐
//!                                                  ├─ co_group ─ complete? ─ rows ─ sink
//! rainfall lines ─ split ─ key ─── clamp ── sum ──┘
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rayon::iter::Either;
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::aggregate::{round_all, sum_per_key, AggregatedMeasure};
use crate::config::PipelineConfig;
use crate::error::{RecordError, RejectedRecord, Series};
use crate::join::co_group;
use crate::output::{output_rows, write_json, write_rejects, write_rows, OutputRow};
use crate::process::{case_line_to_measure, rainfall_line_to_measure, KeyedMeasure};
use crate::source::{read_lines, SourceLine};

/// Counters for one series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesStats {
    pub lines: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub keys: usize,
}

struct SeriesResult {
    sums: AggregatedMeasure,
    rejected: Vec<RejectedRecord>,
    stats: SeriesStats,
}

/// Everything the core produces from the two line sets.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub rows: Vec<OutputRow>,
    pub rejected: Vec<RejectedRecord>,
    pub cases: SeriesStats,
    pub rainfall: SeriesStats,
    pub joined_keys: usize,
    pub dropped_keys: usize,
}

/// What a finished run reports, also written as `<prefix>-summary.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub output: String,
    pub cases: SeriesStats,
    pub rainfall: SeriesStats,
    pub joined_keys: usize,
    pub dropped_keys: usize,
    pub rows_written: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

fn run_series<F>(series: Series, lines: &[SourceLine], to_measure: F) -> SeriesResult
where
    F: Fn(&str) -> Result<KeyedMeasure, RecordError> + Sync,
{
    let (measures, rejected): (Vec<KeyedMeasure>, Vec<RejectedRecord>) =
        lines.par_iter().partition_map(|line| match to_measure(&line.text) {
            Ok(m) => Either::Left(m),
            Err(e) => Either::Right(RejectedRecord::new(
                series,
                &line.source,
                line.line_no,
                &line.text,
                &e,
            )),
        });

    for r in &rejected {
        warn!(
            series = series.as_str(),
            source = %r.source,
            line_no = r.line_no,
            kind = r.kind,
            "rejected: {}",
            r.reason
        );
    }

    let accepted = measures.len();
    let sums = sum_per_key(measures);
    let stats = SeriesStats {
        lines: lines.len(),
        accepted,
        rejected: rejected.len(),
        keys: sums.len(),
    };
    info!(series = series.as_str(), ?stats, "series aggregated");

    SeriesResult {
        sums,
        rejected,
        stats,
    }
}

/// The pure core: both series to joined output rows plus rejects.
///
/// The two series are processed under `rayon::join`; the join itself only
/// starts once both aggregates are complete.
#[instrument(level = "info", skip_all, fields(cases = case_lines.len(), rainfall = rainfall_lines.len()))]
pub fn join_series(
    case_lines: &[SourceLine],
    rainfall_lines: &[SourceLine],
    config: &PipelineConfig,
) -> JoinOutcome {
    let (cases, mut rainfall) = rayon::join(
        || {
            run_series(Series::Cases, case_lines, |line| {
                case_line_to_measure(line, &config.cases, config.output.delimiter)
            })
        },
        || {
            run_series(Series::Rainfall, rainfall_lines, |line| {
                rainfall_line_to_measure(line, &config.rainfall, config.output.delimiter)
            })
        },
    );

    if let Some(digits) = config.rainfall.round_digits {
        round_all(&mut rainfall.sums, digits);
    }

    let joined = co_group(rainfall.sums, cases.sums);
    let rows = output_rows(&joined);
    let joined_keys = joined.len();
    let dropped_keys = joined_keys - rows.len();
    info!(joined_keys, complete = rows.len(), dropped_keys, "joined");

    let mut rejected = cases.rejected;
    rejected.extend(rainfall.rejected);

    JoinOutcome {
        rows,
        rejected,
        cases: cases.stats,
        rainfall: rainfall.stats,
        joined_keys,
        dropped_keys,
    }
}

/// Read both series, join them, and write the output files.
#[instrument(level = "info", skip(config))]
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    config.validate()?;
    let started_at = Utc::now();
    let start = Instant::now();

    let (case_lines, rainfall_lines) = rayon::join(
        || read_lines(&config.cases.path, config.cases.skip_header_lines),
        || read_lines(&config.rainfall.path, config.rainfall.skip_header_lines),
    );
    let case_lines = case_lines.context("reading case series")?;
    let rainfall_lines = rainfall_lines.context("reading rainfall series")?;

    let outcome = join_series(&case_lines, &rainfall_lines, config);

    let output = config.output_path();
    let rows_written = write_rows(
        Path::new(&output),
        &config.output.header,
        &outcome.rows,
        config.output.delimiter,
    )?;

    if config.output.write_rejects {
        let path = config.rejects_path();
        let n = write_rejects(Path::new(&path), &outcome.rejected)?;
        if n > 0 {
            warn!(path = %path, rejected = n, "some input lines were rejected");
        }
    }

    let summary = RunSummary {
        output,
        cases: outcome.cases,
        rainfall: outcome.rainfall,
        joined_keys: outcome.joined_keys,
        dropped_keys: outcome.dropped_keys,
        rows_written,
        started_at,
        finished_at: Utc::now(),
    };

    if config.output.write_summary {
        write_json(Path::new(&config.summary_path()), &summary)?;
    }

    info!(elapsed = ?start.elapsed(), rows = rows_written, "run complete");
    Ok(summary)
}
