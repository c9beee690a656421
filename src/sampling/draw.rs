// Weighted sampling without replacement
//
// One-pass priority scheme: every row gets key = ln(u) / w with u uniform in (0, 1],
// and the n largest keys win. This draws each next row with probability
// proportional to its weight among the rows not yet drawn, without any
// redraw-and-reject loop. Selection order is descending key (draw order).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draw `n` distinct indices from `weights`.
/// When `n` covers every row, all indices are returned in input order.
pub fn weighted_sample<R: Rng>(weights: &[f64], n: usize, rng: &mut R) -> Vec<usize> {
    if n >= weights.len() {
        return (0..weights.len()).collect();
    }

    let mut keyed: Vec<(f64, usize)> = weights
        .iter()
        .enumerate()
        .map(|(idx, &w)| {
            let u = 1.0 - rng.gen::<f64>();
            let key = if w > 0.0 { u.ln() / w } else { f64::NEG_INFINITY };
            (key, idx)
        })
        .collect();

    keyed.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    keyed.truncate(n);
    keyed.into_iter().map(|(_, idx)| idx).collect()
}

/// Seeded draw; the same weights, size and seed always give the same indices
pub fn weighted_sample_seeded(weights: &[f64], n: usize, seed: u64) -> Vec<usize> {
    let mut rng = StdRng::seed_from_u64(seed);
    weighted_sample(weights, n, &mut rng)
}
