// Weighted sampler
// Filters the candidate manifest, weights the survivors for trajectory, semantic
// and quality balance, and draws a fixed-size sample without replacement.

pub mod buckets;
pub mod draw;
pub mod filter;
pub mod weights;


use std::collections::BTreeMap;
use serde::Serialize;

use crate::config::SamplerConfig;
use crate::constants::*;
use crate::error::{Result, SamplerError};
use crate::manifest::{parse_records, ClipRecord, Table};

use buckets::TrajectoryBins;
use filter::BucketCutoff;

/// A surviving clip with its buckets and weights
#[derive(Debug, Clone)]
pub struct WeightedClip {
    pub record: ClipRecord,
    pub bins: TrajectoryBins,
    pub w_dyn: f64,
    pub w_sem: f64,
    pub w_qual: f64,
    pub weight: f64,
}

/// Row counts through the pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleStats {
    pub input_rows: usize,
    pub dropped_invalid: usize,
    pub dropped_short: usize,
    pub dropped_aesthetic: usize,
    pub candidates: usize,
    pub selected: usize,
}

/// Filtered and weighted candidates, ready to draw from
#[derive(Debug, Clone)]
pub struct Candidates {
    pub clips: Vec<WeightedClip>,
    pub cutoffs: BTreeMap<String, BucketCutoff>,
    pub stats: SampleStats,
}

impl Candidates {
    pub fn weights(&self) -> Vec<f64> {
        self.clips.iter().map(|c| c.weight).collect()
    }
}

/// Result of a full sampling run
#[derive(Debug, Clone)]
pub struct SampleOutcome {
    pub candidates: Candidates,
    /// Indices into `candidates.clips`, in draw order
    pub selected: Vec<usize>,
    /// Sampled manifest: input columns plus weight and bucket columns
    pub table: Table,
}

impl SampleOutcome {
    pub fn selected_clips(&self) -> impl Iterator<Item = &WeightedClip> + '_ {
        self.selected.iter().map(move |&i| &self.candidates.clips[i])
    }

    pub fn stats(&self) -> &SampleStats {
        &self.candidates.stats
    }
}

pub struct WeightedSampler {
    config: SamplerConfig,
}

impl WeightedSampler {
    /// Build a sampler; the configuration is validated up front
    pub fn new(config: SamplerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Parse, filter and weight the manifest without drawing
    pub fn prepare(&self, table: &Table) -> Result<Candidates> {
        let parsed = parse_records(table, &self.config)?;
        let outcome = filter::apply_hard_filter(parsed.records, &self.config.filter);

        let stats = SampleStats {
            input_rows: table.len(),
            dropped_invalid: parsed.dropped,
            dropped_short: outcome.dropped_short,
            dropped_aesthetic: outcome.dropped_aesthetic,
            candidates: outcome.kept.len(),
            selected: 0,
        };

        log::info!(
            "Filtered {} rows: {} short, {} below aesthetic floor, {} invalid -> {} candidates",
            stats.input_rows, stats.dropped_short, stats.dropped_aesthetic, stats.dropped_invalid, stats.candidates
        );

        if outcome.kept.is_empty() {
            return Err(SamplerError::NoSurvivors);
        }

        let records = outcome.kept;
        let bins: Vec<TrajectoryBins> = records
            .iter()
            .map(|r| TrajectoryBins::for_record(r, &self.config.dynamics))
            .collect();
        let table_w = weights::compute_weights(&records, &bins, &self.config);

        let clips = records
            .into_iter()
            .zip(bins)
            .enumerate()
            .map(|(i, (record, bins))| WeightedClip {
                record,
                bins,
                w_dyn: table_w.dynamics[i],
                w_sem: table_w.semantic[i],
                w_qual: table_w.quality[i],
                weight: table_w.composite[i],
            })
            .collect::<Vec<_>>();

        Ok(Candidates { clips, cutoffs: outcome.cutoffs, stats })
    }

    /// Full run: prepare, draw, and build the sampled manifest
    pub fn run(&self, table: &Table) -> Result<SampleOutcome> {
        let mut candidates = self.prepare(table)?;

        let n = usize::try_from(self.config.target_size)
            .map_err(|_| SamplerError::InvalidConfig(format!("target size {}", self.config.target_size)))?;
        if n > candidates.clips.len() {
            log::info!(
                "Requested {} clips but only {} candidates survive; returning all",
                n, candidates.clips.len()
            );
        }

        let selected = draw::weighted_sample_seeded(&candidates.weights(), n, self.config.seed);
        candidates.stats.selected = selected.len();
        log::info!("Sampled {} of {} candidates (seed {})", selected.len(), candidates.clips.len(), self.config.seed);

        let table = sampled_table(table, &candidates.clips, &selected);
        Ok(SampleOutcome { candidates, selected, table })
    }
}

/// Input rows for the selected clips, annotated with weight and bucket columns
fn sampled_table(input: &Table, clips: &[WeightedClip], selected: &[usize]) -> Table {
    let rows: Vec<usize> = selected.iter().map(|&i| clips[i].record.row).collect();
    let mut out = input.select_rows(&rows);

    let picked: Vec<&WeightedClip> = selected.iter().map(|&i| &clips[i]).collect();
    out.set_column(COL_WEIGHT, picked.iter().map(|c| c.weight.to_string()).collect());
    out.set_column(COL_MOVE_BIN, picked.iter().map(|c| c.bins.move_bin.to_string()).collect());
    out.set_column(COL_ROT_BIN, picked.iter().map(|c| c.bins.rot_bin.to_string()).collect());
    out.set_column(COL_TURN_BIN, picked.iter().map(|c| c.bins.turn_bin.to_string()).collect());
    out
}
