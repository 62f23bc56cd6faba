//! Raw line source: every file matching a glob, minus its header lines.

use anyhow::{bail, Context, Result};
use glob::glob;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};
use tracing::{debug, info, instrument};

/// One physical input line.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLine {
    pub source: String,
    /// 1-based physical line number within `source`
    pub line_no: usize,
    pub text: String,
}

/// Expand `pattern` into a sorted list of files. Matching nothing is an error.
pub fn resolve_paths(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = glob(pattern)
        .with_context(|| format!("Failed to read glob pattern '{}'", pattern))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();
    if paths.is_empty() {
        bail!("No input files found matching '{}'", pattern);
    }
    paths.sort();
    Ok(paths)
}

/// Read all lines of all files matching `pattern`, skipping the first
/// `skip_header_lines` of each file and any blank lines.
#[instrument(level = "info", skip(pattern), fields(pattern = %pattern))]
pub fn read_lines(pattern: &str, skip_header_lines: usize) -> Result<Vec<SourceLine>> {
    let mut out = Vec::new();
    for path in resolve_paths(pattern)? {
        let source = path.display().to_string();
        let file = File::open(&path).with_context(|| format!("opening {}", source))?;
        let before = out.len();

        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.with_context(|| format!("reading {} at line {}", source, idx + 1))?;
            if idx < skip_header_lines {
                continue;
            }
            let text = line.trim_end_matches('\r');
            if text.trim().is_empty() {
                continue;
            }
            out.push(SourceLine {
                source: source.clone(),
                line_no: idx + 1,
                text: text.to_string(),
            });
        }
        debug!(file = %source, lines = out.len() - before, "read file");
    }
    info!(lines = out.len(), "read input");
    Ok(out)
}
