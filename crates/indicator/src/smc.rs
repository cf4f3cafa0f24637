use shingo_core::market::entity::Candle;
use shingo_core::signal::entity::Bias;
use chrono::{DateTime, Utc};

/// 向前回溯时保留的特征数量上限。
const MAX_ZONES: usize = 5;

/// # Summary
/// 公允价值缺口 (FVG)：三根 K 线中首尾影线不重叠形成的价格失衡区。
#[derive(Debug, Clone, PartialEq)]
pub struct Fvg {
    pub top: f64,
    pub bottom: f64,
    pub bias: Bias,
    pub created_at: DateTime<Utc>,
}

/// # Summary
/// 订单块 (OB)：强势位移行情前的最后一根反向 K 线。
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBlock {
    pub top: f64,
    pub bottom: f64,
    pub bias: Bias,
    pub created_at: DateTime<Utc>,
}

/// # Summary
/// 识别最近窗口内的公允价值缺口。
///
/// # Logic
/// 1. 自最新向旧逐根回溯 (最近优先)，数量上限 5。
/// 2. 看涨缺口：中间为阳线且 `next.low > prev.high`；看跌镜像。
/// 3. 缺口需大于中间 K 线波幅的 10% 才计入。
pub fn find_fvgs(candles: &[Candle]) -> Vec<Fvg> {
    let mut fvgs = Vec::new();
    if candles.len() < 3 {
        return fvgs;
    }

    for i in (1..candles.len() - 1).rev() {
        let current = &candles[i];
        let prev = &candles[i - 1];
        let next = &candles[i + 1];

        if current.is_bullish() && next.low > prev.high {
            let gap = next.low - prev.high;
            if gap > (current.high - current.low) * 0.1 {
                fvgs.push(Fvg {
                    top: next.low,
                    bottom: prev.high,
                    bias: Bias::Bullish,
                    created_at: current.close_time,
                });
            }
        }

        if current.is_bearish() && next.high < prev.low {
            let gap = prev.low - next.high;
            if gap > (current.high - current.low) * 0.1 {
                fvgs.push(Fvg {
                    top: prev.low,
                    bottom: next.high,
                    bias: Bias::Bearish,
                    created_at: current.close_time,
                });
            }
        }

        if fvgs.len() >= MAX_ZONES {
            break;
        }
    }
    fvgs
}

/// # Summary
/// 识别最近窗口内的订单块。
///
/// # Logic
/// 1. 自最新向旧回溯，数量上限 5。
/// 2. 看涨 OB：一根阴线之后三根内出现收盘突破其高点、
///    且位移超过该 K 线波幅两倍的阳线行情；看跌镜像。
pub fn find_order_blocks(candles: &[Candle]) -> Vec<OrderBlock> {
    let mut obs = Vec::new();
    if candles.len() < 5 {
        return obs;
    }

    for i in (1..candles.len() - 3).rev() {
        let candle = &candles[i];
        let ob_size = candle.high - candle.low;

        if candle.is_bearish() {
            let mut highest_after = 0.0_f64;
            for j in 1..=3 {
                if let Some(later) = candles.get(i + j) {
                    if later.is_bullish() && later.close > candle.high {
                        highest_after = highest_after.max(later.close);
                    }
                }
            }
            if highest_after > candle.high + ob_size * 2.0 {
                obs.push(OrderBlock {
                    top: candle.high,
                    bottom: candle.low,
                    bias: Bias::Bullish,
                    created_at: candle.close_time,
                });
            }
        }

        if candle.is_bullish() {
            let mut lowest_after = f64::MAX;
            for j in 1..=3 {
                if let Some(later) = candles.get(i + j) {
                    if later.is_bearish() && later.close < candle.low {
                        lowest_after = lowest_after.min(later.close);
                    }
                }
            }
            if lowest_after < candle.low - ob_size * 2.0 {
                obs.push(OrderBlock {
                    top: candle.high,
                    bottom: candle.low,
                    bias: Bias::Bearish,
                    created_at: candle.close_time,
                });
            }
        }

        if obs.len() >= MAX_ZONES {
            break;
        }
    }
    obs
}

/// 现价落在任一缺口内时返回该缺口的方向。
pub fn price_in_fvg(price: f64, fvgs: &[Fvg]) -> Option<Bias> {
    fvgs.iter()
        .find(|f| price >= f.bottom && price <= f.top)
        .map(|f| f.bias)
}

/// 现价落在任一订单块内 (回踩) 时返回该块的方向。
pub fn price_in_ob(price: f64, obs: &[OrderBlock]) -> Option<Bias> {
    obs.iter()
        .find(|o| price >= o.bottom && price <= o.top)
        .map(|o| o.bias)
}
