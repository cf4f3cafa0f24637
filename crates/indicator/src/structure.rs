use shingo_core::market::entity::Candle;
use shingo_core::signal::entity::{Direction, MarketStructure};

/// # Summary
/// 市场结构分析结果：最近两组摆动点及其形态分类。
#[derive(Debug, Clone, PartialEq)]
pub struct StructureInfo {
    pub structure: MarketStructure,
    pub last_swing_high: f64,
    pub last_swing_low: f64,
    pub previous_high: f64,
    pub previous_low: f64,
    pub higher_highs: bool,
    pub higher_lows: bool,
    pub lower_highs: bool,
    pub lower_lows: bool,
    // 结构对齐时的加权贡献
    pub score: i32,
}

impl StructureInfo {
    fn neutral() -> Self {
        Self {
            structure: MarketStructure::Neutral,
            last_swing_high: 0.0,
            last_swing_low: 0.0,
            previous_high: 0.0,
            previous_low: 0.0,
            higher_highs: false,
            higher_lows: false,
            lower_highs: false,
            lower_lows: false,
            score: 0,
        }
    }
}

/// # Summary
/// 检测摆动高点：对称回看窗口内严格高于两侧的高点。
pub fn swing_highs(candles: &[Candle], lookback: usize) -> Vec<f64> {
    let mut out = Vec::new();
    if candles.len() <= lookback * 2 {
        return out;
    }

    for i in lookback..candles.len() - lookback {
        let current = candles[i].high;
        let is_swing = (i - lookback..=i + lookback)
            .filter(|j| *j != i)
            .all(|j| candles[j].high < current);
        if is_swing {
            out.push(current);
        }
    }
    out
}

/// # Summary
/// 检测摆动低点：对称回看窗口内严格低于两侧的低点。
pub fn swing_lows(candles: &[Candle], lookback: usize) -> Vec<f64> {
    let mut out = Vec::new();
    if candles.len() <= lookback * 2 {
        return out;
    }

    for i in lookback..candles.len() - lookback {
        let current = candles[i].low;
        let is_swing = (i - lookback..=i + lookback)
            .filter(|j| *j != i)
            .all(|j| candles[j].low > current);
        if is_swing {
            out.push(current);
        }
    }
    out
}

/// # Summary
/// 取最近 `lookback` 根内的区间极值 (摆动区间)。
///
/// # Returns
/// `(区间最高, 区间最低)`；空输入返回 `(0, 0)`。
pub fn swing_range(highs: &[f64], lows: &[f64], lookback: usize) -> (f64, f64) {
    if highs.is_empty() || lows.is_empty() {
        return (0.0, 0.0);
    }
    let lookback = lookback.min(highs.len()).min(lows.len());

    let start_h = highs.len() - lookback;
    let start_l = lows.len() - lookback;

    let high = highs[start_h..].iter().copied().fold(f64::MIN, f64::max);
    let low = lows[start_l..].iter().copied().fold(f64::MAX, f64::min);
    (high, low)
}

/// # Summary
/// 基于最近两组摆动点分类市场结构 (BOS / ChoCH / 中性)。
///
/// # Logic
/// 1. 以对称回看 5 检测摆动高低点，少于两组时判定中性。
/// 2. 更高高点 + 更高低点且现价突破前高 → 看涨 BOS。
/// 3. 更低高点 + 更低低点且现价跌破前低 → 看跌 BOS。
/// 4. 下行后首个更高低点 → 看涨 ChoCH；上行后首个更低高点 → 看跌 ChoCH。
///
/// # Arguments
/// * `candles`: 按时间升序的 K 线序列。
/// * `lookback`: 最小样本要求的基准窗口。
pub fn analyze_structure(candles: &[Candle], lookback: usize) -> StructureInfo {
    if candles.len() < lookback + 10 {
        return StructureInfo::neutral();
    }

    let highs = swing_highs(candles, 5);
    let lows = swing_lows(candles, 5);
    if highs.len() < 2 || lows.len() < 2 {
        return StructureInfo::neutral();
    }

    let mut info = StructureInfo {
        last_swing_high: highs[highs.len() - 1],
        last_swing_low: lows[lows.len() - 1],
        previous_high: highs[highs.len() - 2],
        previous_low: lows[lows.len() - 2],
        ..StructureInfo::neutral()
    };

    info.higher_highs = info.last_swing_high > info.previous_high;
    info.higher_lows = info.last_swing_low > info.previous_low;
    info.lower_highs = info.last_swing_high < info.previous_high;
    info.lower_lows = info.last_swing_low < info.previous_low;

    let current_price = candles[candles.len() - 1].close;

    match (
        info.higher_highs,
        info.higher_lows,
        info.lower_highs,
        info.lower_lows,
    ) {
        (true, true, _, _) => {
            if current_price > info.previous_high {
                info.structure = MarketStructure::BullishBos;
                info.score = 10;
            } else {
                info.structure = MarketStructure::Neutral;
                info.score = 5;
            }
        }
        (_, _, true, true) => {
            if current_price < info.previous_low {
                info.structure = MarketStructure::BearishBos;
                info.score = 10;
            } else {
                info.structure = MarketStructure::Neutral;
                info.score = 5;
            }
        }
        // 收敛区间：等待突破
        (_, true, true, _) => {
            info.structure = MarketStructure::Neutral;
            info.score = 0;
        }
        (false, true, _, _) => {
            info.structure = MarketStructure::BullishChoch;
            info.score = 8;
        }
        (_, _, true, false) => {
            info.structure = MarketStructure::BearishChoch;
            info.score = 8;
        }
        _ => {
            info.structure = MarketStructure::Neutral;
            info.score = 0;
        }
    }

    info
}

/// # Summary
/// 结构与信号方向的对齐评分：同向给正分，逆向给 -10 惩罚。
pub fn structure_score(info: &StructureInfo, direction: Direction) -> i32 {
    use MarketStructure::*;
    match (direction, info.structure) {
        (Direction::Long, BullishBos | BullishChoch) => info.score,
        (Direction::Short, BearishBos | BearishChoch) => info.score,
        (Direction::Long, BearishBos | BearishChoch) => -10,
        (Direction::Short, BullishBos | BullishChoch) => -10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(high: f64, low: f64, close: f64) -> Candle {
        Candle {
            open_time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            open: close,
            high,
            low,
            close,
            volume: 100.0,
            close_time: Utc.with_ymd_and_hms(2026, 1, 1, 1, 0, 0).unwrap(),
        }
    }

    #[test]
    fn swing_high_requires_strict_peak() {
        let mut candles: Vec<Candle> = (0..11).map(|_| candle(10.0, 9.0, 9.5)).collect();
        candles[5] = candle(12.0, 9.0, 11.0);
        let highs = swing_highs(&candles, 5);
        assert_eq!(highs, vec![12.0]);
    }

    #[test]
    fn swing_range_takes_window_extremes() {
        let highs = [1.0, 5.0, 3.0, 4.0];
        let lows = [0.5, 0.2, 0.8, 0.9];
        let (h, l) = swing_range(&highs, &lows, 3);
        assert_eq!(h, 5.0);
        assert_eq!(l, 0.2);
    }

    #[test]
    fn short_series_is_neutral() {
        let candles: Vec<Candle> = (0..8).map(|_| candle(10.0, 9.0, 9.5)).collect();
        let info = analyze_structure(&candles, 50);
        assert_eq!(info.structure, MarketStructure::Neutral);
        assert_eq!(info.score, 0);
    }

    #[test]
    fn against_structure_penalized() {
        let info = StructureInfo {
            structure: MarketStructure::BearishBos,
            score: 10,
            ..StructureInfo::neutral()
        };
        assert_eq!(structure_score(&info, Direction::Long), -10);
        assert_eq!(structure_score(&info, Direction::Short), 10);
    }
}
