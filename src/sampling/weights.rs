// Weight groups
// Inverse-frequency balancing for dynamics and semantics, penalties for quality.
// Each group is renormalized to mean 1.0 over the surviving rows so no group
// dominates the composite by scale alone.

use std::collections::HashMap;
use std::hash::Hash;

use crate::config::{AxisConfig, ClampRange, QualityConfig, SamplerConfig};
use crate::constants::{AESTHETIC_MIN_STD, NORMALIZE_MIN_MEAN};
use crate::manifest::ClipRecord;
use crate::stats;
use super::buckets::TrajectoryBins;

/// Per-row weights for every surviving clip, index-aligned with the records
#[derive(Debug, Clone, Default)]
pub struct WeightTable {
    pub dynamics: Vec<f64>,
    pub semantic: Vec<f64>,
    pub quality: Vec<f64>,
    pub composite: Vec<f64>,
}

/// Rescale in place so the mean is 1.0. A near-zero mean is left untouched.
pub fn normalize_mean(weights: &mut [f64]) {
    let Some(m) = stats::mean(weights) else {
        return;
    };
    if m <= NORMALIZE_MIN_MEAN {
        return;
    }
    for w in weights.iter_mut() {
        *w /= m;
    }
}

/// Element-wise product of equally sized weight vectors
fn product(axes: &[Vec<f64>]) -> Vec<f64> {
    let len = axes.first().map(Vec::len).unwrap_or(0);
    (0..len).map(|i| axes.iter().map(|a| a[i]).product()).collect()
}

/// Inverse-frequency weight per row: (1 / count)^alpha for the row's label,
/// normalized to mean 1.0, then clamped when the axis has bounds.
/// Only observed labels are counted, so no bucket has a zero count.
pub fn inverse_frequency_weights<K: Eq + Hash>(labels: &[K], axis: &AxisConfig) -> Vec<f64> {
    let mut counts: HashMap<&K, usize> = HashMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }

    let mut weights: Vec<f64> = labels
        .iter()
        .map(|label| (counts[label] as f64).powf(-axis.alpha))
        .collect();
    normalize_mean(&mut weights);

    if let Some(clamp) = &axis.clamp {
        for w in weights.iter_mut() {
            *w = clamp.apply(*w);
        }
    }
    weights
}

/// W_dyn: balance moveDist, rotAngle and trajTurns buckets
pub fn dynamics_weights(bins: &[TrajectoryBins], config: &SamplerConfig) -> Vec<f64> {
    let cfg = &config.dynamics;
    let moves: Vec<_> = bins.iter().map(|b| b.move_bin).collect();
    let rots: Vec<_> = bins.iter().map(|b| b.rot_bin).collect();
    let turns: Vec<_> = bins.iter().map(|b| b.turn_bin).collect();

    let mut w = product(&[
        inverse_frequency_weights(&moves, &cfg.move_dist),
        inverse_frequency_weights(&rots, &cfg.rot_angle),
        inverse_frequency_weights(&turns, &cfg.traj_turns),
    ]);
    normalize_mean(&mut w);
    w
}

fn label_weights<'a, F>(records: &'a [ClipRecord], label: F, axis: &AxisConfig) -> Vec<f64>
where
    F: Fn(&'a ClipRecord) -> &'a str,
{
    let labels: Vec<&str> = records.iter().map(label).collect();
    inverse_frequency_weights(&labels, axis)
}

/// W_sem: balance the five categorical axes.
/// motionTags combinations count as one category each.
pub fn semantic_weights(records: &[ClipRecord], config: &SamplerConfig) -> Vec<f64> {
    let cfg = &config.semantic;
    let mut w = product(&[
        label_weights(records, |r| r.brightness.as_str(), &cfg.brightness),
        label_weights(records, |r| r.time_of_day.as_str(), &cfg.time_of_day),
        label_weights(records, |r| r.weather.as_str(), &cfg.weather),
        label_weights(records, |r| r.scene_type.as_str(), &cfg.scene_type),
        label_weights(records, |r| r.motion_tags.as_str(), &cfg.motion_tags),
    ]);
    normalize_mean(&mut w);
    w
}

/// Shaky clips are down-weighted, everything else is neutral
pub fn motion_factor(motion_score: f64, cfg: &QualityConfig) -> f64 {
    if motion_score > cfg.shaky_motion_threshold {
        cfg.shaky_motion_factor
    } else {
        1.0
    }
}

/// Static cameras are down-weighted, everything else is neutral
pub fn stillness_factor(dist_level: i64, cfg: &QualityConfig) -> f64 {
    if dist_level == cfg.static_dist_level {
        cfg.static_camera_factor
    } else {
        1.0
    }
}

/// Aesthetic shaping: 1 + slope * z, clamped.
/// A population without spread gets a neutral 1.0 for every row.
pub fn aesthetic_weights(scores: &[f64], slope: f64, clamp: &ClampRange) -> Vec<f64> {
    let (Some(mu), Some(sigma)) = (stats::mean(scores), stats::sample_std(scores)) else {
        return vec![1.0; scores.len()];
    };
    if sigma <= AESTHETIC_MIN_STD {
        return vec![1.0; scores.len()];
    }
    scores
        .iter()
        .map(|s| clamp.apply(1.0 + slope * (s - mu) / sigma))
        .collect()
}

/// W_qual: motion penalty x stillness penalty x aesthetic shaping
pub fn quality_weights(records: &[ClipRecord], config: &SamplerConfig) -> Vec<f64> {
    let cfg = &config.quality;
    let motion: Vec<f64> = records.iter().map(|r| motion_factor(r.motion_score, cfg)).collect();
    let still: Vec<f64> = records.iter().map(|r| stillness_factor(r.dist_level, cfg)).collect();
    let scores: Vec<f64> = records.iter().map(|r| r.aesthetic_score).collect();
    let aesthetic = aesthetic_weights(&scores, cfg.aesthetic_slope, &cfg.aesthetic_clamp);

    let mut w = product(&[motion, still, aesthetic]);
    normalize_mean(&mut w);
    w
}

/// Compute all weight groups and the clamped composite
pub fn compute_weights(records: &[ClipRecord], bins: &[TrajectoryBins], config: &SamplerConfig) -> WeightTable {
    let dynamics = dynamics_weights(bins, config);
    let semantic = semantic_weights(records, config);
    let quality = quality_weights(records, config);

    let composite = dynamics
        .iter()
        .zip(&semantic)
        .zip(&quality)
        .map(|((d, s), q)| config.composite_clamp.apply(d * s * q))
        .collect();

    WeightTable { dynamics, semantic, quality, composite }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::tests::{assert_mean_one, clip};

    #[test]
    fn test_inverse_frequency_favours_rare_labels() {
        let labels = ["a", "a", "a", "a", "b"];
        let w = inverse_frequency_weights(&labels, &AxisConfig::new(0.8, None));
        assert_mean_one(&w);
        assert!(w[4] > w[0]);
        // Partial equalization: the ratio is 4^0.8, not 4
        assert!((w[4] / w[0] - 4f64.powf(0.8)).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_zero_is_neutral() {
        let labels = ["a", "a", "b"];
        let w = inverse_frequency_weights(&labels, &AxisConfig::new(0.0, None));
        assert!(w.iter().all(|v| (v - 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_axis_clamp_applies_after_normalization() {
        let labels: Vec<&str> = std::iter::repeat("common").take(99).chain(["rare"]).collect();
        let clamp = ClampRange::new(0.5, 3.0);
        let w = inverse_frequency_weights(&labels, &AxisConfig::new(1.0, Some(clamp)));
        assert_eq!(w[99], 3.0);
        assert!(w[..99].iter().all(|v| *v >= 0.5));
    }

    #[test]
    fn test_aesthetic_weights_are_bounded() {
        let scores = [0.0, 5.0, 5.0, 5.0, 5.0, 100.0];
        let w = aesthetic_weights(&scores, 0.5, &ClampRange::new(0.5, 1.5));
        assert!(w.iter().all(|v| (0.5..=1.5).contains(v)));
        assert_eq!(w[5], 1.5);
    }

    #[test]
    fn test_aesthetic_weights_without_spread_are_neutral() {
        let w = aesthetic_weights(&[4.0, 4.0, 4.0], 0.5, &ClampRange::new(0.5, 1.5));
        assert_eq!(w, vec![1.0, 1.0, 1.0]);
        assert_eq!(aesthetic_weights(&[4.0], 0.5, &ClampRange::new(0.5, 1.5)), vec![1.0]);
    }

    #[test]
    fn test_shaky_clip_has_lower_quality_weight() {
        let records = vec![
            clip("shaky").motion(9.0).build(),
            clip("steady").motion(5.0).build(),
        ];
        let w = quality_weights(&records, &SamplerConfig::default());
        assert!(w[0] < w[1]);
        assert_mean_one(&w);
    }

    #[test]
    fn test_static_camera_is_penalized() {
        let records = vec![
            clip("still").dist_level(0).build(),
            clip("moving").dist_level(3).build(),
        ];
        let w = quality_weights(&records, &SamplerConfig::default());
        assert!((w[0] / w[1] - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_groups_are_mean_normalized() {
        let records: Vec<_> = (0..30)
            .map(|i| {
                clip(&format!("c{}", i))
                    .move_dist((i % 7) as f64 * 1.5)
                    .rot_angle((i % 4) as f64)
                    .traj_turns(i % 5)
                    .brightness(if i % 3 == 0 { "Dim" } else { "Bright" })
                    .weather(if i % 10 == 0 { "Rain" } else { "Sunny" })
                    .motion_tags(if i % 2 == 0 { "forward" } else { "right,forward" })
                    .aesthetic(3.0 + (i % 6) as f64)
                    .motion(if i % 8 == 0 { 9.5 } else { 4.0 })
                    .build()
            })
            .collect();
        let config = SamplerConfig::default();
        let bins: Vec<_> = records.iter().map(|r| TrajectoryBins::for_record(r, &config.dynamics)).collect();
        let table = compute_weights(&records, &bins, &config);

        assert_mean_one(&table.dynamics);
        assert_mean_one(&table.semantic);
        assert_mean_one(&table.quality);
        assert!(table.composite.iter().all(|w| config.composite_clamp.contains(*w)));
    }

    #[test]
    fn test_composite_is_clamped() {
        let mut config = SamplerConfig::default();
        config.composite_clamp = ClampRange::new(0.9, 1.1);
        let records: Vec<_> = (0..10)
            .map(|i| clip(&format!("c{}", i)).aesthetic(i as f64).move_dist(if i == 0 { 20.0 } else { 1.0 }).build())
            .collect();
        let bins: Vec<_> = records.iter().map(|r| TrajectoryBins::for_record(r, &config.dynamics)).collect();
        let table = compute_weights(&records, &bins, &config);
        assert!(table.composite.iter().all(|w| (0.9..=1.1).contains(w)));
        assert_eq!(table.composite[0], 1.1);
    }
}
