//! Trend-flip signal detection.

/// A trend-direction flip on the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendSignal {
    /// Direction flipped from -1 to +1
    Buy,
    /// Direction flipped from +1 to -1
    Sell,
}

impl TrendSignal {
    /// Human-readable label used in notifications.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TrendSignal::Buy => "BUY",
            TrendSignal::Sell => "SELL",
        }
    }
}

/// Inspects the two-bar tail of a direction series.
///
/// Only a (-1, +1) or (+1, -1) pair on the last two bars is a signal; any
/// other pair — including warmup zeros and series shorter than two — is not.
#[must_use]
pub fn detect_flip(directions: &[i8]) -> Option<TrendSignal> {
    if directions.len() < 2 {
        return None;
    }
    match (
        directions[directions.len() - 2],
        directions[directions.len() - 1],
    ) {
        (-1, 1) => Some(TrendSignal::Buy),
        (1, -1) => Some(TrendSignal::Sell),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_on_down_to_up_tail() {
        assert_eq!(detect_flip(&[-1, -1, 1]), Some(TrendSignal::Buy));
    }

    #[test]
    fn sell_on_up_to_down_tail() {
        assert_eq!(detect_flip(&[1, 1, -1]), Some(TrendSignal::Sell));
    }

    #[test]
    fn steady_trends_and_warmup_are_silent() {
        assert_eq!(detect_flip(&[1, 1]), None);
        assert_eq!(detect_flip(&[-1, -1]), None);
        assert_eq!(detect_flip(&[0, 1]), None);
        assert_eq!(detect_flip(&[1]), None);
        assert_eq!(detect_flip(&[]), None);
    }

    #[test]
    fn only_the_tail_counts() {
        // A flip buried earlier in the series is not a fresh signal.
        assert_eq!(detect_flip(&[-1, 1, 1]), None);
    }
}
