/// # Summary
/// 计算成交量加权平均价 (VWAP)。
///
/// # Logic
/// 累计 `典型价格 × 成交量` 除以累计成交量。
///
/// # Returns
/// 与输入等长的序列；序列长度不一致时为空。
/// 累计成交量为 0 的前缀位置保持 0。
pub fn vwap(highs: &[f64], lows: &[f64], closes: &[f64], volumes: &[f64]) -> Vec<f64> {
    if highs.len() != lows.len() || lows.len() != closes.len() || closes.len() != volumes.len() {
        return Vec::new();
    }

    let mut out = vec![0.0; closes.len()];
    let mut cumulative_tpv = 0.0;
    let mut cumulative_volume = 0.0;

    for i in 0..closes.len() {
        let typical = (highs[i] + lows[i] + closes[i]) / 3.0;
        cumulative_tpv += typical * volumes[i];
        cumulative_volume += volumes[i];

        if cumulative_volume != 0.0 {
            out[i] = cumulative_tpv / cumulative_volume;
        }
    }

    out
}

/// 取序列最后一个 VWAP 值；数据不足时返回 0。
pub fn last_vwap(highs: &[f64], lows: &[f64], closes: &[f64], volumes: &[f64]) -> f64 {
    vwap(highs, lows, closes, volumes).last().copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_candle_vwap_is_typical_price() {
        let out = vwap(&[12.0], &[9.0], &[10.5], &[100.0]);
        assert!((out[0] - 10.5).abs() < 1e-12);
    }

    #[test]
    fn zero_volume_prefix_stays_zero() {
        let out = vwap(&[10.0, 10.0], &[10.0, 10.0], &[10.0, 10.0], &[0.0, 50.0]);
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 10.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_lengths_return_empty() {
        assert!(vwap(&[1.0], &[1.0], &[1.0], &[]).is_empty());
    }
}
