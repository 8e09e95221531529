//! Grouped statistical normalization.
//!
//! Every metric is normalized within one market-cap-bucket peer group at a
//! time; normalized values from different groups are never comparable.

use std::collections::HashMap;

/// Rounds to the given number of decimal places.
#[must_use]
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Maps a series onto a bounded 0-100 scale via Z-score and a logistic
/// transform.
///
/// A degenerate series — zero sample variance, including singletons — carries
/// no ordering information and maps to the neutral 50 everywhere. Otherwise
/// each element becomes `100 / (1 + e^{-z})`, rounded to 4 decimals, which is
/// strictly inside (0, 100) and monotone in the input.
#[must_use]
pub fn zscore_to_100(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
        var.sqrt()
    } else {
        0.0
    };

    if std == 0.0 {
        return vec![50.0; n];
    }

    values
        .iter()
        .map(|v| {
            let z = (v - mean) / std;
            round_to(100.0 / (1.0 + (-z).exp()), 4)
        })
        .collect()
}

/// Exponentially-weighted mean with the given span, evaluated at the most
/// recent observation. Inputs must be in chronological order.
///
/// Uses span-style weights `(1 - α)^(n-1-i)` with `α = 2 / (span + 1)`, so
/// recent days dominate. Returns `None` for an empty series.
#[must_use]
pub fn ewm_mean(values: &[f64], span: usize) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let n = values.len();
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, v) in values.iter().enumerate() {
        let w = (1.0 - alpha).powi((n - 1 - i) as i32);
        num += w * v;
        den += w;
    }
    Some(num / den)
}

/// Explicit group-by: maps each distinct key to the indices holding it.
#[must_use]
pub fn group_indices(keys: &[String]) -> HashMap<String, Vec<usize>> {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, key) in keys.iter().enumerate() {
        groups.entry(key.clone()).or_default().push(i);
    }
    groups
}

/// Applies `zscore_to_100` independently per group and scatters the results
/// back to the original positions.
#[must_use]
pub fn normalize_grouped(values: &[f64], groups: &HashMap<String, Vec<usize>>) -> Vec<f64> {
    let mut out = vec![50.0; values.len()];
    for indices in groups.values() {
        let members: Vec<f64> = indices.iter().map(|&i| values[i]).collect();
        let normalized = zscore_to_100(&members);
        for (&i, v) in indices.iter().zip(normalized) {
            out[i] = v;
        }
    }
    out
}

/// Dense ranks (1, 2, 2, 3, ...) for a series already sorted descending.
#[must_use]
pub fn dense_ranks_sorted_desc(sorted_values: &[f64]) -> Vec<i32> {
    let mut ranks = Vec::with_capacity(sorted_values.len());
    let mut rank = 0;
    let mut previous = f64::INFINITY;
    for &value in sorted_values {
        if value < previous {
            rank += 1;
            previous = value;
        }
        ranks.push(rank);
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonzero_variance_stays_in_open_interval_and_monotone() {
        let values = vec![-3.0, 1.0, 4.0, 10.0, 25.0];
        let normalized = zscore_to_100(&values);

        for v in &normalized {
            assert!(*v > 0.0 && *v < 100.0);
        }
        for pair in normalized.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn degenerate_series_maps_to_neutral_50() {
        assert_eq!(zscore_to_100(&[7.0]), vec![50.0]);
        assert_eq!(zscore_to_100(&[3.0, 3.0, 3.0]), vec![50.0, 50.0, 50.0]);
        assert!(zscore_to_100(&[]).is_empty());
    }

    #[test]
    fn zero_maps_to_midpoint_of_symmetric_series() {
        let normalized = zscore_to_100(&[-1.0, 0.0, 1.0]);
        assert!((normalized[1] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn ewm_weights_recent_days_more_heavily() {
        // Simple mean of [0, 10] is 5; the EW mean must sit above it.
        let ewm = ewm_mean(&[0.0, 10.0], 3).unwrap();
        assert!(ewm > 5.0);
        assert_eq!(ewm_mean(&[], 3), None);
        let flat = ewm_mean(&[4.0, 4.0, 4.0], 3).unwrap();
        assert!((flat - 4.0).abs() < 1e-12);
    }

    #[test]
    fn grouped_normalization_never_mixes_groups() {
        let keys = vec![
            "a".to_string(),
            "b".to_string(),
            "a".to_string(),
            "b".to_string(),
        ];
        let groups = group_indices(&keys);
        // Group "b" is degenerate; group "a" is not. A pooled normalization
        // would move the "b" members off 50.
        let values = vec![1.0, 5.0, 9.0, 5.0];
        let normalized = normalize_grouped(&values, &groups);

        assert_eq!(normalized[1], 50.0);
        assert_eq!(normalized[3], 50.0);
        assert!(normalized[0] < 50.0);
        assert!(normalized[2] > 50.0);
    }

    #[test]
    fn dense_ranks_share_rank_on_ties() {
        let ranks = dense_ranks_sorted_desc(&[90.0, 75.0, 75.0, 60.0]);
        assert_eq!(ranks, vec![1, 2, 2, 3]);
    }
}
