//! Descriptive statistics over numeric samples.

use serde::Serialize;

/// Summary statistics of a non-empty sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub q1: f64,
    pub q3: f64,
}

/// The values needed to draw one box of a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiveNumber {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[must_use]
pub fn sorted(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Percentile `p` (0 to 100) of an ascending sample, linearly
/// interpolated between the closest ranks.
///
/// Returns NaN for an empty sample.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return f64::NAN;
    };
    let rank = p / 100.0 * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(data: &[f64]) -> Option<Summary> {
    if data.is_empty() {
        return None;
    }

    let sorted = sorted(data);
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(Summary {
        count: data.len(),
        mean,
        median: percentile(&sorted, 50.0),
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        q1: percentile(&sorted, 25.0),
        q3: percentile(&sorted, 75.0),
    })
}

#[must_use]
pub fn five_number(data: &[f64]) -> Option<FiveNumber> {
    let sorted = sorted(data);
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    Some(FiveNumber {
        min,
        q1: percentile(&sorted, 25.0),
        median: percentile(&sorted, 50.0),
        q3: percentile(&sorted, 75.0),
        max,
    })
}

/// Bin edges and counts for `bins` equal-width bins spanning the sample.
///
/// The last bin includes its right edge. A constant sample is spread over
/// `[v - 0.5, v + 0.5]`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]
pub fn histogram(data: &[f64], bins: usize) -> (Vec<f64>, Vec<u64>) {
    let bins = bins.max(1);
    let (mut lo, mut hi) = data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if data.is_empty() {
        (lo, hi) = (0.0, 1.0);
    } else if lo == hi {
        (lo, hi) = (lo - 0.5, hi + 0.5);
    }

    let width = (hi - lo) / bins as f64;
    let edges = (0..=bins).map(|i| (i as f64).mul_add(width, lo)).collect();

    let mut counts = vec![0_u64; bins];
    for &v in data {
        let index = (((v - lo) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    (edges, counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_small_sample() {
        let summary = summarize(&[4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(summary.count, 5);
        assert!((summary.mean - 3.0).abs() < 1e-12);
        assert!((summary.median - 3.0).abs() < 1e-12);
        assert!((summary.std_dev - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((summary.q1 - 2.0).abs() < 1e-12);
        assert!((summary.q3 - 4.0).abs() < 1e-12);
        assert!((summary.min - 1.0).abs() < 1e-12);
        assert!((summary.max - 5.0).abs() < 1e-12);
    }

    #[test]
    fn percentile_interpolates() {
        let data = sorted(&[1.0, 2.0, 3.0, 4.0]);
        assert!((percentile(&data, 50.0) - 2.5).abs() < 1e-12);
        assert!((percentile(&data, 25.0) - 1.75).abs() < 1e-12);
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn empty_sample_has_no_summary() {
        assert!(summarize(&[]).is_none());
        assert!(five_number(&[]).is_none());
    }

    #[test]
    fn histogram_counts_every_value() {
        let (edges, counts) = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(edges.len(), 5);
        assert_eq!(counts, [1, 1, 1, 2]);
    }

    #[test]
    fn constant_sample_gets_unit_range() {
        let (edges, counts) = histogram(&[2.0, 2.0], 1);
        assert!((edges[0] - 1.5).abs() < 1e-12);
        assert!((edges[1] - 2.5).abs() < 1e-12);
        assert_eq!(counts, [2]);
    }
}
