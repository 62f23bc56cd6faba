//! Co-grouping of the two aggregated series and the completeness rule.

use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::aggregate::AggregatedMeasure;

/// Both sides of one key after the outer join.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JoinedEntry {
    pub rainfall: Option<f64>,
    pub cases: Option<f64>,
}

impl JoinedEntry {
    /// Present on both sides. A present `0.0` counts; an absent side does not.
    pub fn is_complete(&self) -> bool {
        self.rainfall.is_some() && self.cases.is_some()
    }

    /// `(rainfall, cases)` if complete.
    pub fn pair(&self) -> Option<(f64, f64)> {
        Some((self.rainfall?, self.cases?))
    }
}

/// Key → joined entry, ordered by key.
pub type JoinedSeries = BTreeMap<String, JoinedEntry>;

/// Full outer join on the composite key.
pub fn co_group(rainfall: AggregatedMeasure, cases: AggregatedMeasure) -> JoinedSeries {
    let mut joined = JoinedSeries::new();
    for (key, sum) in rainfall {
        joined.entry(key).or_default().rainfall = Some(sum);
    }
    for (key, sum) in cases {
        joined.entry(key).or_default().cases = Some(sum);
    }
    debug!(keys = joined.len(), "co-grouped");
    joined
}

/// Keep only complete entries, as `(key, rainfall, cases)`.
pub fn complete_entries(joined: &JoinedSeries) -> impl Iterator<Item = (&str, f64, f64)> + '_ {
    joined
        .iter()
        .filter(|(key, entry)| {
            let complete = entry.is_complete();
            if !complete {
                trace!(key = %key, ?entry, "incomplete, dropped");
            }
            complete
        })
        .filter_map(|(key, entry)| entry.pair().map(|(rain, cases)| (key.as_str(), rain, cases)))
}
