// Hard filter stage
// Duration floor, then a per-brightness-bucket aesthetic floor.

use std::collections::BTreeMap;

use crate::config::{CutoffMethod, FilterConfig};
use crate::manifest::ClipRecord;
use crate::stats;

/// Aesthetic cutoff computed for one brightness bucket
#[derive(Debug, Clone, PartialEq)]
pub struct BucketCutoff {
    pub quantile: f64,
    pub cutoff: f64,
    pub candidates: usize,
    pub kept: usize,
}

/// Result of the hard filter
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub kept: Vec<ClipRecord>,
    pub dropped_short: usize,
    pub dropped_aesthetic: usize,
    /// Brightness label -> cutoff used
    pub cutoffs: BTreeMap<String, BucketCutoff>,
}

/// Aesthetic cutoff for one bucket's values
pub fn bucket_cutoff(values: &[f64], quantile: f64, method: CutoffMethod) -> Option<f64> {
    let sorted = stats::sorted(values);
    match method {
        CutoffMethod::Rank => stats::rank_quantile(&sorted, quantile),
        CutoffMethod::Linear => stats::linear_quantile(&sorted, quantile),
    }
}

/// Apply the duration floor and the per-bucket aesthetic floor.
/// Rows exactly at a cutoff are kept. Input order is preserved.
pub fn apply_hard_filter(records: Vec<ClipRecord>, config: &FilterConfig) -> FilterOutcome {
    let before = records.len();
    let long_enough: Vec<ClipRecord> = records
        .into_iter()
        .filter(|r| r.duration_s >= config.min_duration_s)
        .collect();
    let dropped_short = before - long_enough.len();

    let mut cutoffs: BTreeMap<String, BucketCutoff> = BTreeMap::new();
    {
        let mut by_bucket: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for r in &long_enough {
            by_bucket.entry(r.brightness.as_str()).or_default().push(r.aesthetic_score);
        }

        for (label, values) in &by_bucket {
            let quantile = config.quantile_for(label);
            if let Some(cutoff) = bucket_cutoff(values, quantile, config.cutoff_method) {
                cutoffs.insert(label.to_string(), BucketCutoff {
                    quantile,
                    cutoff,
                    candidates: values.len(),
                    kept: 0,
                });
            }
        }
    }

    let mut kept = Vec::with_capacity(long_enough.len());
    for r in long_enough {
        if let Some(bucket) = cutoffs.get_mut(&r.brightness) {
            if r.aesthetic_score >= bucket.cutoff {
                bucket.kept += 1;
                kept.push(r);
            }
        }
    }

    let dropped_aesthetic = before - dropped_short - kept.len();

    for (label, bucket) in &cutoffs {
        log::debug!(
            "  Aesthetic floor [{}]: q={} cutoff={:.4} kept {}/{}",
            label, bucket.quantile, bucket.cutoff, bucket.kept, bucket.candidates
        );
    }

    FilterOutcome { kept, dropped_short, dropped_aesthetic, cutoffs }
}
