//! Historical percentile ranking.

/// Value used whenever a distribution is too small to rank against.
pub const NEUTRAL_PERCENTILE: f64 = 50.0;

/// Weak percentile-of-score: the share of `history` at or below `value`,
/// scaled to 0-100.
///
/// The boundary is inclusive, so a value equal to an observation counts that
/// observation. Histories of size 0 or 1 cannot discriminate and return
/// [`NEUTRAL_PERCENTILE`].
#[must_use]
pub fn percentile_of_score(history: &[f64], value: f64) -> f64 {
    if history.len() <= 1 {
        return NEUTRAL_PERCENTILE;
    }
    let at_or_below = history.iter().filter(|&&h| h <= value).count();
    at_or_below as f64 * 100.0 / history.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    // Convention pinned here: weak (inclusive) percentile-of-score. For the
    // history [10, 20, 30, 40, 50] and value 30, three of five observations
    // are at or below 30, so the percentile is 60 — not the strict variant's
    // 40, nor scipy's rank-interpolated variants.
    #[test]
    fn weak_convention_counts_inclusive_boundary() {
        let history = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert!((percentile_of_score(&history, 30.0) - 60.0).abs() < 1e-12);
    }

    #[test]
    fn extremes_map_to_0_and_100() {
        let history = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert!((percentile_of_score(&history, 5.0) - 0.0).abs() < 1e-12);
        assert!((percentile_of_score(&history, 55.0) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn short_history_is_neutral() {
        assert_eq!(percentile_of_score(&[], 1.0), NEUTRAL_PERCENTILE);
        assert_eq!(percentile_of_score(&[42.0], 1.0), NEUTRAL_PERCENTILE);
    }

    #[test]
    fn ties_all_count() {
        let history = [10.0, 10.0, 10.0, 20.0];
        assert!((percentile_of_score(&history, 10.0) - 75.0).abs() < 1e-12);
    }
}
