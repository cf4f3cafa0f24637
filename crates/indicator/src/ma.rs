use shingo_core::signal::entity::TrendState;

/// # Summary
/// 计算指数移动平均 (EMA)。
///
/// # Logic
/// 1. 数据不足 `period` 时返回空序列。
/// 2. 首个 EMA 取前 `period` 个值的简单平均作为种子。
/// 3. 之后按标准平滑系数 `2 / (period + 1)` 递推。
///
/// # Arguments
/// * `values`: 按时间升序的价格序列。
/// * `period`: 平滑周期。
///
/// # Returns
/// 与输入等长的序列；下标 `period - 1` 之前的位置为 0。
pub fn ema(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let mut out = vec![0.0; values.len()];
    let multiplier = 2.0 / (period as f64 + 1.0);

    let seed: f64 = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = seed;

    for i in period..values.len() {
        out[i] = (values[i] - out[i - 1]) * multiplier + out[i - 1];
    }

    out
}

/// # Summary
/// 计算简单移动平均 (SMA)。
///
/// # Returns
/// 与输入等长的序列；下标 `period - 1` 之前的位置为 0。
pub fn sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let mut out = vec![0.0; values.len()];
    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        out[i] = window.iter().sum::<f64>() / period as f64;
    }
    out
}

/// 取序列最后一个 EMA 值；数据不足时返回 0。
pub fn last_ema(values: &[f64], period: usize) -> f64 {
    ema(values, period).last().copied().unwrap_or(0.0)
}

/// # Summary
/// 由快慢 EMA 的相对位置判断趋势交叉状态。
///
/// # Logic
/// 快线在慢线上方为金叉，下方为死叉；数据不足时为中性。
///
/// # Returns
/// `(状态, 快线值, 慢线值)`。
pub fn trend_state(closes: &[f64], fast: usize, slow: usize) -> (TrendState, f64, f64) {
    if closes.len() < slow {
        return (TrendState::Neutral, 0.0, 0.0);
    }

    let last_fast = last_ema(closes, fast);
    let last_slow = last_ema(closes, slow);

    let state = if last_fast > last_slow {
        TrendState::GoldenCross
    } else if last_fast < last_slow {
        TrendState::DeathCross
    } else {
        TrendState::Neutral
    };

    (state, last_fast, last_slow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_seeds_with_sma() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = ema(&values, 3);
        assert_eq!(out.len(), 5);
        assert!((out[2] - 2.0).abs() < 1e-12); // (1+2+3)/3
        // out[3] = (4 - 2) * 0.5 + 2 = 3
        assert!((out[3] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn insufficient_data_returns_empty() {
        assert!(ema(&[1.0, 2.0], 3).is_empty());
        assert!(sma(&[1.0], 2).is_empty());
    }

    #[test]
    fn sma_window_average() {
        let out = sma(&[2.0, 4.0, 6.0, 8.0], 2);
        assert_eq!(out[1], 3.0);
        assert_eq!(out[3], 7.0);
    }
}
