use crate::adx::true_range;

/// # Summary
/// 计算平均真实波幅 (ATR)，采用 Wilder 平滑。
///
/// # Logic
/// 1. 数据不足 `period + 1` 时返回 0。
/// 2. 首个 ATR 取前 `period` 个真实波幅的简单平均。
/// 3. 之后按 `(prev * (period - 1) + tr) / period` 递推，返回最末值。
///
/// # Arguments
/// * `highs` / `lows` / `closes`: 按时间升序的等长序列。
/// * `period`: 平滑周期 (常用 14)。
///
/// # Returns
/// 最近的 ATR 标量；数据不足时为 0。
pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    if period == 0
        || highs.len() < period + 1
        || highs.len() != lows.len()
        || highs.len() != closes.len()
    {
        return 0.0;
    }

    let tr = true_range(highs, lows, closes);

    // tr[0] 不含前收盘信息，从 tr[1] 起参与平滑
    let mut current: f64 = tr[1..=period].iter().sum::<f64>() / period as f64;
    for value in &tr[period + 1..] {
        current = (current * (period as f64 - 1.0) + value) / period as f64;
    }

    current
}
