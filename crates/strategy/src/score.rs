use shingo_core::signal::entity::{Bias, Direction, LeaderTrend, MarketRegime};

/// # Summary
/// 汇合评分的全部输入因子。
///
/// # Invariants
/// - 距离类字段为百分比。
/// - `volume_ratio` 在均量为 0 时取 0 (触发低参与度惩罚)。
#[derive(Debug, Clone)]
pub struct ScoreInput {
    pub direction: Direction,
    pub rsi_1h: f64,
    pub rsi_15m: f64,
    pub adx_1h: f64,
    pub adx_15m: f64,
    pub histogram: f64,
    pub volume_ratio: f64,
    pub order_flow_delta: f64,
    pub pivot_distance: f64,
    pub fib_distance: f64,
    pub btc_trend: Option<LeaderTrend>,
    pub fvg: Option<Bias>,
    pub ob: Option<Bias>,
    pub poc_distance: f64,
}

/// # Summary
/// 多周期 ADX 市场状态判定。
///
/// # Logic
/// 1. 取 1h 与 15m ADX 的平均。
/// 2. 低于 `choppy_adx` 为 CHOPPY；低于 `choppy_adx + 5` 为 RANGING。
/// 3. 其余按现价与 EMA-50(4h) 的相对位置判定趋势方向。
pub fn detect_regime(adx_1h: f64, adx_15m: f64, price: f64, ema50: f64, choppy_adx: f64) -> MarketRegime {
    let avg_adx = (adx_1h + adx_15m) / 2.0;

    if avg_adx < choppy_adx {
        return MarketRegime::Choppy;
    }
    if avg_adx < choppy_adx + 5.0 {
        return MarketRegime::Ranging;
    }

    if price > ema50 {
        MarketRegime::TrendingUp
    } else {
        MarketRegime::TrendingDown
    }
}

/// # Summary
/// 由市场状态与 4h 指标确定候选方向。
///
/// # Logic
/// - LONG：上行趋势、价格高于 EMA-50(4h)、RSI-14(4h) < 70。
/// - SHORT：下行趋势、价格低于 EMA-50(4h)、RSI-14(4h) > 30。
/// - 其余无方向。
pub fn signal_direction(
    regime: MarketRegime,
    price: f64,
    ema50: f64,
    rsi_4h: f64,
) -> Option<Direction> {
    if regime == MarketRegime::TrendingUp && price > ema50 && rsi_4h < 70.0 {
        return Some(Direction::Long);
    }
    if regime == MarketRegime::TrendingDown && price < ema50 && rsi_4h > 30.0 {
        return Some(Direction::Short);
    }
    None
}

/// # Summary
/// 关键位接近度闸门。
///
/// # Logic
/// 任一关键位距离不超过 `proximity_pct` 即通过；
/// 分数达到 Premium 线时豁免。
pub fn passes_proximity_gate(
    score: u8,
    pivot_distance: f64,
    fib_distance: f64,
    proximity_pct: f64,
    premium_score: u8,
) -> bool {
    pivot_distance <= proximity_pct || fib_distance <= proximity_pct || score >= premium_score
}

/// # Summary
/// 加权汇合评分 (0-100)。
///
/// 权重分布 (合计 100):
/// 1. 趋势对齐 (1h + 15m ADX):  20
/// 2. RSI 动量 (15m 优先):      25
/// 3. 关键位接近度:             15
/// 4. 成交量:                   10
/// 5. 订单流:                    5
/// 6. MACD 柱:                   5
/// 7. 聪明钱 (OB/FVG):          10
/// 8. 量价分布 (POC):            5
/// 9. BTC 相关性:                5 (逆势 -10)
/// 低参与度惩罚: volume_ratio < 0.8 时 -10。
///
/// # Returns
/// 钳制到 [0, 100] 的整数分。
pub fn confluence_score(input: &ScoreInput) -> u8 {
    let mut score: i32 = 0;

    // 1. 趋势对齐 (Max 20)
    if input.adx_1h > 25.0 && input.adx_15m > 25.0 {
        score += 20;
    } else if input.adx_1h > 25.0 || input.adx_15m > 25.0 {
        score += 10;
    }

    // 2. RSI 动量 (Max 25)，15m 回调入场优先
    match input.direction {
        Direction::Long => {
            if input.rsi_15m < 45.0 && input.rsi_15m > 30.0 {
                score += 25; // 上行趋势中的回调
            } else if input.rsi_15m < 60.0 && input.rsi_1h < 70.0 {
                score += 15; // 顺势延续
            }
        }
        Direction::Short => {
            if input.rsi_15m > 55.0 && input.rsi_15m < 70.0 {
                score += 25;
            } else if input.rsi_15m > 40.0 && input.rsi_1h > 30.0 {
                score += 15;
            }
        }
    }

    // 3. 关键位接近度 (Max 15)
    if input.pivot_distance <= 1.5 || input.fib_distance <= 1.5 {
        score += 15;
    } else if input.pivot_distance <= 2.5 || input.fib_distance <= 2.5 {
        score += 8;
    }

    // 4. 成交量 (Max 10)
    if input.volume_ratio >= 1.5 {
        score += 10;
    } else if input.volume_ratio >= 1.2 {
        score += 5;
    }

    // 5. 订单流 (Max 5)
    let flow_agrees = match input.direction {
        Direction::Long => input.order_flow_delta > 0.0,
        Direction::Short => input.order_flow_delta < 0.0,
    };
    if flow_agrees {
        score += 5;
    }

    // 6. MACD 柱 (Max 5)
    let macd_agrees = match input.direction {
        Direction::Long => input.histogram > 0.0,
        Direction::Short => input.histogram < 0.0,
    };
    if macd_agrees {
        score += 5;
    }

    // 7. 聪明钱 (Max 10)
    let wanted = match input.direction {
        Direction::Long => Bias::Bullish,
        Direction::Short => Bias::Bearish,
    };
    if input.ob == Some(wanted) {
        score += 5;
    }
    if input.fvg == Some(wanted) {
        score += 5;
    }

    // 8. 量价分布 / POC (Max 5)
    if input.poc_distance <= 2.0 {
        score += 5;
    }

    // 9. BTC 相关性 (Max 5 / 逆势 -10)
    if let Some(trend) = input.btc_trend {
        let aligned = matches!(
            (input.direction, trend),
            (Direction::Long, LeaderTrend::Up) | (Direction::Short, LeaderTrend::Down)
        );
        if aligned {
            score += 5;
        } else {
            score -= 10;
        }
    }

    // 低参与度惩罚
    if input.volume_ratio < 0.8 {
        score -= 10;
    }

    score.clamp(0, 100) as u8
}
