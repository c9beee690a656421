// Small descriptive statistics helpers shared by the filter, weights and report

/// Arithmetic mean, None for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator), None below two values
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mu = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - mu) * (v - mu)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Sort a copy of the values ascending
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(f64::total_cmp);
    out
}

/// Linearly interpolated quantile of an ascending slice, q in [0, 1]
pub fn linear_quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Slack for q * n landing just under a whole rank, e.g. 0.29 * 100
const RANK_EPSILON: f64 = 1e-9;

/// Value at rank floor(q * n) of an ascending slice.
/// With fewer than 1/q values this is the minimum.
pub fn rank_quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let k = (q.clamp(0.0, 1.0) * sorted.len() as f64 + RANK_EPSILON).floor() as usize;
    Some(sorted[k.min(sorted.len() - 1)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), Some(5.0));
        let s = sample_std(&v).unwrap();
        assert!((s - 2.138089935).abs() < 1e-6);
        assert_eq!(sample_std(&[1.0]), None);
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_linear_quantile_matches_interpolation() {
        let v: Vec<f64> = (1..=9).map(f64::from).collect();
        assert_eq!(linear_quantile(&v, 0.5), Some(5.0));
        assert!((linear_quantile(&v, 0.05).unwrap() - 1.4).abs() < 1e-12);
        assert_eq!(linear_quantile(&v, 1.0), Some(9.0));
        assert_eq!(linear_quantile(&[3.0], 0.99), Some(3.0));
    }

    #[test]
    fn test_rank_quantile_small_bucket_is_minimum() {
        let v: Vec<f64> = (1..=9).map(f64::from).collect();
        assert_eq!(rank_quantile(&v, 0.05), Some(1.0));

        let v: Vec<f64> = (1..=100).map(f64::from).collect();
        assert_eq!(rank_quantile(&v, 0.05), Some(6.0));
        assert_eq!(rank_quantile(&v, 0.02), Some(3.0));
    }

    #[test]
    fn test_rank_quantile_whole_ranks_survive_float_error() {
        let v: Vec<f64> = (1..=100).map(f64::from).collect();
        // 0.29 * 100 evaluates to 28.999999999999996
        assert_eq!(rank_quantile(&v, 0.29), Some(30.0));
        assert_eq!(rank_quantile(&v, 0.57), Some(58.0));
        assert_eq!(rank_quantile(&v, 0.0), Some(1.0));
        assert_eq!(rank_quantile(&v, 0.999), Some(100.0));
    }
}
