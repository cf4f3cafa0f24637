use crate::ma::sma;

/// # Summary
/// 计算随机 RSI (Stochastic RSI) 的 %K 与 %D 线。
///
/// # Logic
/// 1. 对每个下标，在 `period` 窗口内求 RSI 的最高与最低值。
/// 2. `raw = (rsi - min) / (max - min) * 100`；窗口内 RSI 完全持平时取 100。
/// 3. %K 为 raw 的 SMA(`smooth_k`)，%D 为 %K 的 SMA(`smooth_d`)。
///
/// # Arguments
/// * `rsi_values`: RSI 序列 (通常来自 `rsi::rsi`)。
/// * `period`: 窗口长度 (常用 14)。
/// * `smooth_k` / `smooth_d`: 平滑参数 (常用 3, 3)。
///
/// # Returns
/// `(k, d)` 两个序列；数据不足时为空。
pub fn stoch_rsi(
    rsi_values: &[f64],
    period: usize,
    smooth_k: usize,
    smooth_d: usize,
) -> (Vec<f64>, Vec<f64>) {
    if period == 0 || rsi_values.len() < period {
        return (Vec::new(), Vec::new());
    }

    let mut raw = vec![0.0; rsi_values.len()];
    for i in (period - 1)..rsi_values.len() {
        let window = &rsi_values[i + 1 - period..=i];
        let min = window.iter().copied().fold(f64::MAX, f64::min);
        let max = window.iter().copied().fold(f64::MIN, f64::max);

        raw[i] = if max - min == 0.0 {
            100.0
        } else {
            (rsi_values[i] - min) / (max - min) * 100.0
        };
    }

    let k = sma(&raw, smooth_k);
    let d = sma(&k, smooth_d);
    (k, d)
}

/// 取最近的 %K 与 %D 值；数据不足时返回 `(0, 0)`。
pub fn last_stoch_rsi(rsi_values: &[f64], period: usize, smooth_k: usize, smooth_d: usize) -> (f64, f64) {
    let (k, d) = stoch_rsi(rsi_values, period, smooth_k, smooth_d);
    match (k.last(), d.last()) {
        (Some(k), Some(d)) => (*k, *d),
        _ => (0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_rsi_saturates() {
        let rsi = vec![50.0; 20];
        let (k, _) = stoch_rsi(&rsi, 14, 3, 3);
        assert!((k.last().unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn k_bounded() {
        let rsi: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.7).sin() * 30.0).collect();
        let (k, _) = stoch_rsi(&rsi, 14, 3, 3);
        for v in k.iter().skip(16) {
            assert!((0.0..=100.0).contains(v));
        }
    }
}
