//! Per-key summation of keyed measures.
//!
//! Each rayon worker folds its partition into a local map; partial maps
//! are then merged pairwise by addition. There is no shared accumulator.
//! Float addition is only approximately associative, so sums of
//! non-representable values may differ in the last ulp between runs with
//! different partitioning.

use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::process::KeyedMeasure;

/// Key → summed value, one map per series.
pub type AggregatedMeasure = HashMap<String, f64>;

fn add_measure(mut acc: AggregatedMeasure, m: KeyedMeasure) -> AggregatedMeasure {
    *acc.entry(m.key).or_insert(0.0) += m.value;
    acc
}

/// Merge two partial sums. Keys seen in either side survive.
pub fn merge_partials(a: AggregatedMeasure, b: AggregatedMeasure) -> AggregatedMeasure {
    let (mut big, small) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    for (key, value) in small {
        *big.entry(key).or_insert(0.0) += value;
    }
    big
}

/// Group by key and sum. Keys with no contributions never appear.
#[instrument(level = "debug", skip(measures))]
pub fn sum_per_key<I>(measures: I) -> AggregatedMeasure
where
    I: IntoParallelIterator<Item = KeyedMeasure>,
{
    let sums = measures
        .into_par_iter()
        .fold(AggregatedMeasure::new, add_measure)
        .reduce(AggregatedMeasure::new, merge_partials);
    debug!(keys = sums.len(), "aggregated");
    sums
}

/// Round to `digits` decimal places by the value's exact binary expansion,
/// exact ties going to the even digit (`2.6 + 0.05` → `2.6`, `0.25` → `0.2`).
pub fn round_to(value: f64, digits: u32) -> f64 {
    format!("{:.*}", digits as usize, value)
        .parse()
        .unwrap_or(value)
}

pub fn round_all(sums: &mut AggregatedMeasure, digits: u32) {
    for value in sums.values_mut() {
        *value = round_to(*value, digits);
    }
}
