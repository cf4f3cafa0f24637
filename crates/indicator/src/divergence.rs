use shingo_core::signal::entity::Bias;

/// # Summary
/// 检测价格与震荡指标之间的常规背离。
///
/// # Logic
/// 1. 在回看窗口中 (排除最近 5 根以分离前峰) 找前高/前低及对应指标值。
/// 2. 看跌：价格创更高高点而指标走低，且指标处于高位 (> 50)。
/// 3. 看涨：价格创更低低点而指标走高，且指标处于低位 (< 50)。
///
/// # Arguments
/// * `prices`: 价格序列 (看跌用高点，看涨用低点；用收盘价亦可)。
/// * `indicators`: 与价格对齐的指标序列 (如 RSI)。
/// * `lookback`: 回看窗口长度。
///
/// # Returns
/// 无背离或数据不足时返回 `None`。
pub fn detect_divergence(prices: &[f64], indicators: &[f64], lookback: usize) -> Option<Bias> {
    if prices.len() < lookback || indicators.len() < lookback || lookback <= 5 {
        return None;
    }

    let n = prices.len();
    let current_price = prices[n - 1];
    let current_ind = indicators[n - 1];

    let window = (n - lookback)..(n - 5);

    let mut max_price_prev = f64::MIN;
    let mut max_ind_prev = f64::MIN;
    let mut min_price_prev = f64::MAX;
    let mut min_ind_prev = f64::MAX;

    for i in window {
        if prices[i] > max_price_prev {
            max_price_prev = prices[i];
            max_ind_prev = indicators[i];
        }
        if prices[i] < min_price_prev {
            min_price_prev = prices[i];
            min_ind_prev = indicators[i];
        }
    }

    if current_price > max_price_prev && current_ind < max_ind_prev && current_ind > 50.0 {
        return Some(Bias::Bearish);
    }
    if current_price < min_price_prev && current_ind > min_ind_prev && current_ind < 50.0 {
        return Some(Bias::Bullish);
    }
    None
}
