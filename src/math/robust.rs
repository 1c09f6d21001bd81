//! Robust scalar statistics.
//!
//! Conventions, chosen to match the offline SIPP analysis pipeline:
//!
//! - variance/std use the population denominator (n, not n-1)
//! - percentiles use linear interpolation between order statistics
//! - medians are the 50th percentile (average of the middle two for even n)
//!
//! All helpers return `None` on empty input rather than NaN; callers decide
//! whether missing is an error (estimation) or "unavailable" (validation).

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (denominator n).
pub fn variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some(ss / values.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// Sort a copy of `values` ascending.
///
/// Inputs are expected to be finite; NaNs would compare as equal here, which
/// is why every producer checks finiteness before aggregation.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    out
}

/// Percentile of pre-sorted data with linear interpolation, q in [0, 100].
///
/// Sorting is hoisted out so per-period aggregation can sort each column once
/// and evaluate the whole percentile band against it.
pub fn percentile_of_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() || !q.is_finite() {
        return None;
    }
    let q = q.clamp(0.0, 100.0);
    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = rank - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Percentile of unsorted data.
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    percentile_of_sorted(&sorted(values), q)
}

/// Median (50th percentile).
pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Cap values above the given upper percentile at that percentile.
///
/// Capping rather than discarding keeps the sample size while bounding the
/// influence of extreme observations (e.g. reporting errors in the panel).
pub fn winsorize_upper(values: &[f64], pct: f64) -> Vec<f64> {
    match percentile(values, pct) {
        Some(cap) => values.iter().map(|&v| v.min(cap)).collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_variance_population() {
        let xs = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&xs).unwrap() - 5.0).abs() < 1e-12);
        // Population variance of the classic example is exactly 4.
        assert!((variance(&xs).unwrap() - 4.0).abs() < 1e-12);
        assert!((std_dev(&xs).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(mean(&[]).is_none());
        assert!(variance(&[]).is_none());
        assert!(median(&[]).is_none());
        assert!(percentile(&[], 50.0).is_none());
        assert!(winsorize_upper(&[], 99.0).is_empty());
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        // rank = 0.25 * 3 = 0.75 -> 1 + 0.75 * (2 - 1) = 1.75
        assert!((percentile(&xs, 25.0).unwrap() - 1.75).abs() < 1e-12);
        assert!((percentile(&xs, 75.0).unwrap() - 3.25).abs() < 1e-12);
        assert_eq!(percentile(&xs, 0.0), Some(1.0));
        assert_eq!(percentile(&xs, 100.0), Some(4.0));
    }

    #[test]
    fn percentile_is_monotone_in_q() {
        let xs = sorted(&[5.0, -1.0, 3.3, 8.2, 0.0, 2.7, 2.7]);
        let qs = [5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0];
        let band: Vec<f64> = qs
            .iter()
            .map(|&q| percentile_of_sorted(&xs, q).unwrap())
            .collect();
        for w in band.windows(2) {
            assert!(w[0] <= w[1], "band not monotone: {band:?}");
        }
    }

    #[test]
    fn winsorize_caps_only_the_tail() {
        let mut xs: Vec<f64> = (1..=99).map(|i| i as f64).collect();
        xs.push(1_000_000.0);
        let capped = winsorize_upper(&xs, 99.0);
        let max = capped.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        assert!(max < 1_000_000.0);
        // Values well inside the distribution are untouched.
        assert_eq!(capped[0], 1.0);
        assert_eq!(capped[50], 51.0);
    }
}
