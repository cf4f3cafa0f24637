use shingo_core::market::entity::Candle;

/// # Summary
/// 识别最近 K 线组合的经典形态标签。
///
/// # Logic
/// 按优先级检查：锤子线/射击之星 → 十字星 → 吞没 → 启明星/黄昏星。
/// 不足三根或无匹配时返回 `None`。
pub fn identify_pattern(candles: &[Candle]) -> Option<&'static str> {
    if candles.len() < 3 {
        return None;
    }

    let last = &candles[candles.len() - 1];
    let prev = &candles[candles.len() - 2];
    let prev2 = &candles[candles.len() - 3];

    let body = (last.close - last.open).abs();
    let upper_wick = last.high - last.open.max(last.close);
    let lower_wick = last.open.min(last.close) - last.low;
    let total_range = last.high - last.low;

    // 锤子线：实体居上，下影线至少两倍实体
    if lower_wick > body * 2.0 && upper_wick < body {
        return if last.is_bearish() {
            Some("Hammer (Weak)")
        } else {
            Some("Hammer")
        };
    }
    // 射击之星：实体居下，长上影线
    if upper_wick > body * 2.0 && lower_wick < body {
        return Some("Shooting Star");
    }

    // 十字星：实体不足波幅 10% 且两侧均有影线
    if body <= total_range * 0.1 && upper_wick > body && lower_wick > body {
        return Some("Doji");
    }

    // 吞没形态
    if prev.is_bearish() && last.is_bullish() && last.close > prev.open && last.open < prev.close {
        return Some("Bullish Engulfing");
    }
    if prev.is_bullish() && last.is_bearish() && last.close < prev.open && last.open > prev.close {
        return Some("Bearish Engulfing");
    }

    // 启明星：大阴 → 小实体 → 收复首根一半以上的阳线
    let prev_body = (prev.close - prev.open).abs();
    let prev_range = prev.high - prev.low;
    if prev2.is_bearish()
        && prev_body < prev_range * 0.3
        && last.is_bullish()
        && last.close > (prev2.open + prev2.close) / 2.0
    {
        return Some("Morning Star");
    }

    // 黄昏星：大阳 → 小实体 → 跌破首根一半以下的阴线
    if prev2.is_bullish()
        && prev_body < prev_range * 0.3
        && last.is_bearish()
        && last.close < (prev2.open + prev2.close) / 2.0
    {
        return Some("Evening Star");
    }

    None
}
