use crate::ma::ema;

/// # Summary
/// 计算 MACD (指数平滑异同移动平均)。
///
/// # Logic
/// 1. `MACD = EMA(fast) - EMA(slow)`，自下标 `slow - 1` 起有定义。
/// 2. 信号线为 MACD 有效段上的 EMA。
/// 3. 柱状图在每个有定义的下标上等于 `MACD - signal`。
///
/// # Arguments
/// * `closes`: 按时间升序的收盘价序列。
/// * `fast` / `slow` / `signal_period`: 标准参数 (12, 26, 9)。
///
/// # Returns
/// `(macd, signal, histogram)` 三个序列；数据不足时全部为空。
/// `macd` 与输入等长，`signal` 与 `histogram` 对齐 MACD 有效段。
pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    if closes.len() < slow {
        return (Vec::new(), Vec::new(), Vec::new());
    }

    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);

    let mut macd_line = vec![0.0; closes.len()];
    for i in (slow - 1)..closes.len() {
        macd_line[i] = fast_ema[i] - slow_ema[i];
    }

    let signal_line = ema(&macd_line[slow - 1..], signal_period);

    let mut histogram = vec![0.0; signal_line.len()];
    for i in 0..signal_line.len() {
        histogram[i] = macd_line[slow - 1 + i] - signal_line[i];
    }

    (macd_line, signal_line, histogram)
}

/// # Summary
/// 取最近的 MACD、信号线与柱状图值。
///
/// # Returns
/// 数据不足时返回 `(0, 0, 0)`。
pub fn last_macd(closes: &[f64], fast: usize, slow: usize, signal_period: usize) -> (f64, f64, f64) {
    let (macd_line, signal_line, histogram) = macd(closes, fast, slow, signal_period);
    match (macd_line.last(), signal_line.last(), histogram.last()) {
        (Some(m), Some(s), Some(h)) => (*m, *s, *h),
        _ => (0.0, 0.0, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_is_macd_minus_signal() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let (macd_line, signal_line, histogram) = macd(&closes, 12, 26, 9);
        assert!(!histogram.is_empty());
        for i in 0..signal_line.len() {
            let expect = macd_line[25 + i] - signal_line[i];
            assert!((histogram[i] - expect).abs() < 1e-12);
        }
    }

    #[test]
    fn insufficient_data_returns_empty() {
        let closes = vec![1.0; 10];
        let (m, s, h) = macd(&closes, 12, 26, 9);
        assert!(m.is_empty() && s.is_empty() && h.is_empty());
        assert_eq!(last_macd(&closes, 12, 26, 9), (0.0, 0.0, 0.0));
    }
}
