/// # Summary
/// 计算真实波幅 (True Range) 序列。
///
/// # Logic
/// 首根取 `high - low`；之后取
/// `max(high - low, |high - prev_close|, |low - prev_close|)`。
///
/// # Returns
/// 与输入等长的序列。
pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<f64> {
    if highs.is_empty() || highs.len() != lows.len() || highs.len() != closes.len() {
        return Vec::new();
    }

    let mut tr = vec![0.0; highs.len()];
    tr[0] = highs[0] - lows[0];
    for i in 1..highs.len() {
        let hl = highs[i] - lows[i];
        let hc = (highs[i] - closes[i - 1]).abs();
        let lc = (lows[i] - closes[i - 1]).abs();
        tr[i] = hl.max(hc).max(lc);
    }
    tr
}

/// # Summary
/// Wilder 平滑：首值取前 `period` 个的简单平均，
/// 之后按 `(prev * (period - 1) + current) / period` 递推。
///
/// # Returns
/// 长度为 `len - period + 1` 的压缩序列；数据不足时为空。
pub fn smooth_wilder(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let mut out = vec![0.0; values.len() - period + 1];
    out[0] = values[..period].iter().sum::<f64>() / period as f64;

    for i in 1..out.len() {
        out[i] = (out[i - 1] * (period as f64 - 1.0) + values[i + period - 1]) / period as f64;
    }
    out
}

/// # Summary
/// 计算平均趋向指数 (ADX)。
///
/// # Logic
/// 1. 由相邻 K 线推导 +DM / -DM。
/// 2. 对 +DM、-DM 与真实波幅分别做 Wilder 平滑后求 +DI / -DI。
/// 3. `DX = |+DI - -DI| / (+DI + -DI) * 100`，再对 DX 做 Wilder 平滑。
///
/// # Arguments
/// * `highs` / `lows` / `closes`: 按时间升序的等长序列。
/// * `period`: 平滑周期。
///
/// # Returns
/// 压缩后的 ADX 序列；数据不足时为空。输出恒为非负。
pub fn adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0
        || highs.len() < period + 1
        || lows.len() < period + 1
        || closes.len() < period + 1
        || highs.len() != lows.len()
        || highs.len() != closes.len()
    {
        return Vec::new();
    }

    let n = highs.len();
    let mut plus_dm = vec![0.0; n - 1];
    let mut minus_dm = vec![0.0; n - 1];

    for i in 1..n {
        let high_diff = highs[i] - highs[i - 1];
        let low_diff = lows[i - 1] - lows[i];

        if high_diff > low_diff && high_diff > 0.0 {
            plus_dm[i - 1] = high_diff;
        }
        if low_diff > high_diff && low_diff > 0.0 {
            minus_dm[i - 1] = low_diff;
        }
    }

    let tr = true_range(highs, lows, closes);

    let smoothed_plus = smooth_wilder(&plus_dm, period);
    let smoothed_minus = smooth_wilder(&minus_dm, period);
    let smoothed_tr = smooth_wilder(&tr[1..], period);

    let mut plus_di = vec![0.0; smoothed_tr.len()];
    let mut minus_di = vec![0.0; smoothed_tr.len()];
    for i in 0..smoothed_tr.len() {
        if smoothed_tr[i] != 0.0 {
            plus_di[i] = smoothed_plus[i] / smoothed_tr[i] * 100.0;
            minus_di[i] = smoothed_minus[i] / smoothed_tr[i] * 100.0;
        }
    }

    let mut dx = vec![0.0; plus_di.len()];
    for i in 0..plus_di.len() {
        let di_sum = plus_di[i] + minus_di[i];
        if di_sum != 0.0 {
            dx[i] = (plus_di[i] - minus_di[i]).abs() / di_sum * 100.0;
        }
    }

    smooth_wilder(&dx, period)
}

/// 取序列最后一个 ADX 值；数据不足时返回 0。
pub fn last_adx(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> f64 {
    adx(highs, lows, closes, period).last().copied().unwrap_or(0.0)
}
