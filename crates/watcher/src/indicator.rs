//! Heikin-Ashi SuperTrend, Pine-script semantics.
//!
//! The trend study runs on Heikin-Ashi candles rather than raw OHLC: the HA
//! recursion smooths single-bar noise, and the SuperTrend bands then ride the
//! smoothed series. ATR uses RMA smoothing (alpha = 1/length), and the bands
//! carry forward until price crosses them, exactly as the Pine reference.

/// Plain OHLC input bar.
#[derive(Debug, Clone, Copy)]
pub struct OhlcBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Full study output, aligned with the input bars.
///
/// Indices before the warmup (`length - 1`) hold NaN bands and direction 0.
#[derive(Debug, Clone)]
pub struct HaSuperTrend {
    pub ha_open: Vec<f64>,
    pub ha_high: Vec<f64>,
    pub ha_low: Vec<f64>,
    pub ha_close: Vec<f64>,
    pub supertrend: Vec<f64>,
    /// +1 while the trend is up, -1 while it is down, 0 during warmup
    pub direction: Vec<i8>,
}

/// Computes Heikin-Ashi candles for a bar series.
///
/// Returns (ha_open, ha_high, ha_low, ha_close), empty for empty input.
#[must_use]
pub fn heikin_ashi(bars: &[OhlcBar]) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut ha_open = vec![0.0; n];
    let mut ha_high = vec![0.0; n];
    let mut ha_low = vec![0.0; n];
    let mut ha_close = vec![0.0; n];

    for (i, bar) in bars.iter().enumerate() {
        ha_close[i] = (bar.open + bar.high + bar.low + bar.close) / 4.0;
        ha_open[i] = if i == 0 {
            (bar.open + bar.close) / 2.0
        } else {
            (ha_open[i - 1] + ha_close[i - 1]) / 2.0
        };
        ha_high[i] = bar.high.max(ha_open[i]).max(ha_close[i]);
        ha_low[i] = bar.low.min(ha_open[i]).min(ha_close[i]);
    }
    (ha_open, ha_high, ha_low, ha_close)
}

/// Runs the Heikin-Ashi SuperTrend study.
///
/// Returns `None` when the series is shorter than `length + 1` bars — the
/// ATR seed needs `length` bars and the band recursion at least one more.
#[must_use]
pub fn ha_supertrend(bars: &[OhlcBar], length: usize, multiplier: f64) -> Option<HaSuperTrend> {
    let n = bars.len();
    if length == 0 || n < length + 1 {
        return None;
    }

    let (ha_open, ha_high, ha_low, ha_close) = heikin_ashi(bars);

    // True range on the HA candles; the first bar has no prior close.
    let mut tr = vec![0.0; n];
    for i in 0..n {
        let range = ha_high[i] - ha_low[i];
        tr[i] = if i == 0 {
            range
        } else {
            range
                .max((ha_high[i] - ha_close[i - 1]).abs())
                .max((ha_low[i] - ha_close[i - 1]).abs())
        };
    }

    // RMA: seeded with the simple mean of the first `length` ranges.
    let alpha = 1.0 / length as f64;
    let start = length - 1;
    let mut rma = vec![f64::NAN; n];
    rma[start] = tr[..length].iter().sum::<f64>() / length as f64;
    for i in length..n {
        rma[i] = alpha * tr[i] + (1.0 - alpha) * rma[i - 1];
    }

    let src: Vec<f64> = (0..n).map(|i| (ha_high[i] + ha_low[i]) / 2.0).collect();

    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    let mut supertrend = vec![f64::NAN; n];
    let mut direction = vec![0i8; n];

    upper[start] = src[start] + multiplier * rma[start];
    lower[start] = src[start] - multiplier * rma[start];
    supertrend[start] = upper[start];
    direction[start] = 1;

    for i in start + 1..n {
        let current_upper = src[i] + multiplier * rma[i];
        let current_lower = src[i] - multiplier * rma[i];

        lower[i] = if current_lower > lower[i - 1] || ha_close[i - 1] < lower[i - 1] {
            current_lower
        } else {
            lower[i - 1]
        };
        upper[i] = if current_upper < upper[i - 1] || ha_close[i - 1] > upper[i - 1] {
            current_upper
        } else {
            upper[i - 1]
        };

        direction[i] = if supertrend[i - 1] == upper[i - 1] {
            if ha_close[i] > upper[i] {
                1
            } else {
                -1
            }
        } else if ha_close[i] < lower[i] {
            -1
        } else {
            1
        };
        supertrend[i] = if direction[i] == 1 { lower[i] } else { upper[i] };
    }

    Some(HaSuperTrend {
        ha_open,
        ha_high,
        ha_low,
        ha_close,
        supertrend,
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(open: f64, high: f64, low: f64, close: f64) -> OhlcBar {
        OhlcBar {
            open,
            high,
            low,
            close,
        }
    }

    #[test]
    fn heikin_ashi_recursion_matches_hand_computation() {
        let bars = vec![bar(10.0, 12.0, 8.0, 11.0), bar(11.0, 15.0, 10.0, 14.0)];
        let (ha_open, ha_high, ha_low, ha_close) = heikin_ashi(&bars);

        assert!((ha_close[0] - 10.25).abs() < 1e-12);
        assert!((ha_open[0] - 10.5).abs() < 1e-12);
        assert!((ha_high[0] - 12.0).abs() < 1e-12);
        assert!((ha_low[0] - 8.0).abs() < 1e-12);

        assert!((ha_close[1] - 12.5).abs() < 1e-12);
        assert!((ha_open[1] - 10.375).abs() < 1e-12);
        assert!((ha_high[1] - 15.0).abs() < 1e-12);
        assert!((ha_low[1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn too_short_series_yields_none() {
        let bars = vec![bar(10.0, 11.0, 9.0, 10.5); 4];
        assert!(ha_supertrend(&bars, 4, 3.0).is_none());
        assert!(ha_supertrend(&bars, 0, 3.0).is_none());
    }

    fn trending_bars() -> Vec<OhlcBar> {
        // Accelerating rally, then a crash: each leg moves far beyond the
        // trailing ATR so both trend states appear.
        let mut bars = Vec::new();
        let mut price = 10.0;
        for _ in 0..8 {
            let next = price * 2.0;
            bars.push(bar(price, next * 1.01, price * 0.99, next));
            price = next;
        }
        for _ in 0..6 {
            let next = price * 0.4;
            bars.push(bar(price, price * 1.01, next * 0.99, next));
            price = next;
        }
        bars
    }

    #[test]
    fn direction_tracks_trend_and_flips_on_reversal() {
        let bars = trending_bars();
        let study = ha_supertrend(&bars, 3, 0.5).unwrap();

        // Warmup indices carry no direction.
        assert_eq!(study.direction[0], 0);
        assert_eq!(study.direction[1], 0);
        // The rally establishes an uptrend, the crash ends in a downtrend.
        assert!(study.direction[3..8].contains(&1));
        assert_eq!(*study.direction.last().unwrap(), -1);
        // Exactly one up-to-down flip once the crash begins.
        let flips = study
            .direction
            .windows(2)
            .filter(|w| w[0] == 1 && w[1] == -1)
            .count();
        assert_eq!(flips, 1);
    }

    #[test]
    fn supertrend_sits_below_price_in_an_uptrend() {
        let bars = trending_bars();
        let study = ha_supertrend(&bars, 3, 0.5).unwrap();

        for i in 4..8 {
            if study.direction[i] == 1 {
                assert!(study.supertrend[i] < study.ha_close[i]);
            }
        }
    }
}
