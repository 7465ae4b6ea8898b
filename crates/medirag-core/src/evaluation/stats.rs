//! Sample statistics over `f64` slices.
//!
//! Standard deviations are population deviations. Percentiles interpolate
//! linearly between closest ranks.

use medirag_types::evaluation::{LatencySummary, StatSummary};

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// The `p`th percentile (`0..=100`) of the values; 0 when empty.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// Round to three decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub fn summarize(values: &[f64]) -> Option<StatSummary> {
    if values.is_empty() {
        return None;
    }
    Some(StatSummary {
        mean: mean(values),
        std: std_dev(values),
        min: min(values),
        max: max(values),
    })
}

pub fn latency_summary(values: &[f64]) -> Option<LatencySummary> {
    if values.is_empty() {
        return None;
    }
    Some(LatencySummary {
        mean: mean(values),
        median: percentile(values, 50.0),
        std: std_dev(values),
        min: min(values),
        max: max(values),
        p95: percentile(values, 95.0),
        p99: percentile(values, 99.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(close(mean(&values), 5.0));
        assert!(close(std_dev(&values), 2.0));
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert!(close(percentile(&values, 50.0), 2.5));
        assert!(close(percentile(&values, 0.0), 1.0));
        assert!(close(percentile(&values, 100.0), 4.0));
        assert!(close(percentile(&values, 95.0), 3.85));
        assert!(close(percentile(&[7.0], 99.0), 7.0));
    }

    #[test]
    fn test_summaries() {
        assert!(summarize(&[]).is_none());
        let summary = summarize(&[1.0, 3.0]).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert!(close(summary.std, 1.0));

        let latency = latency_summary(&[0.1, 0.2, 0.3]).unwrap();
        assert!(close(latency.median, 0.2));
        assert!(latency.p99 <= 0.3 && latency.p99 > latency.p95);
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(0.12345), 0.123);
        assert_eq!(round3(2.0), 2.0);
    }
}
