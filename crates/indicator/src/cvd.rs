use shingo_core::market::entity::Candle;
use shingo_core::signal::entity::Bias;

/// # Summary
/// 计算累计成交量差 (CVD)。
///
/// # Logic
/// 阳线计入 `+volume`，阴线计入 `-volume`，十字星计 0，逐根累计。
/// 正值代表买方累积，负值代表卖方派发。
///
/// # Returns
/// 与输入等长的序列；不足两根时为空。
pub fn cvd(candles: &[Candle]) -> Vec<f64> {
    if candles.len() < 2 {
        return Vec::new();
    }

    let mut out = vec![0.0; candles.len()];
    let mut cumulative = 0.0;

    for (i, candle) in candles.iter().enumerate() {
        let delta = if candle.is_bullish() {
            candle.volume
        } else if candle.is_bearish() {
            -candle.volume
        } else {
            0.0
        };
        cumulative += delta;
        out[i] = cumulative;
    }

    out
}

/// # Summary
/// 取最近 CVD 值及其在 `lookback` 窗口内的变化趋势。
///
/// # Returns
/// `(value, trend)`；数据不足时为 `(0, 0)`。
pub fn last_cvd_trend(candles: &[Candle], lookback: usize) -> (f64, f64) {
    let series = cvd(candles);
    if series.len() < lookback + 1 {
        return (0.0, 0.0);
    }

    let value = series[series.len() - 1];
    let previous = series[series.len() - lookback - 1];
    (value, value - previous)
}

/// # Summary
/// 检测价格与 CVD 之间的常规背离。
///
/// # Logic
/// 价格走低而 CVD 走高为看涨背离；价格走高而 CVD 走低为看跌背离。
///
/// # Returns
/// 无背离或数据不足时返回 `None`。
pub fn cvd_divergence(candles: &[Candle], lookback: usize) -> Option<Bias> {
    if candles.len() < lookback * 2 {
        return None;
    }

    let series = cvd(candles);
    let n = candles.len();

    let recent_price = candles[n - 1].close;
    let recent_cvd = series[n - 1];
    let previous_price = candles[n - lookback - 1].close;
    let previous_cvd = series[n - lookback - 1];

    if recent_price < previous_price && recent_cvd > previous_cvd {
        return Some(Bias::Bullish);
    }
    if recent_price > previous_price && recent_cvd < previous_cvd {
        return Some(Bias::Bearish);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(open: f64, close: f64, volume: f64) -> Candle {
        Candle {
            open_time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume,
            close_time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 5, 0).unwrap(),
        }
    }

    #[test]
    fn bullish_candles_accumulate() {
        let candles = vec![candle(10.0, 11.0, 5.0), candle(11.0, 12.0, 7.0)];
        let out = cvd(&candles);
        assert_eq!(out, vec![5.0, 12.0]);
    }

    #[test]
    fn bearish_candles_distribute() {
        let candles = vec![candle(12.0, 11.0, 5.0), candle(11.0, 10.0, 7.0)];
        let out = cvd(&candles);
        assert_eq!(out, vec![-5.0, -12.0]);
    }
}
