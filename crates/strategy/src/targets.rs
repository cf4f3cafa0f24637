use shingo_core::signal::entity::Direction;
use shingo_indicator::pivot::{next_resistance, next_support, PivotPoints};

/// # Summary
/// 止损止盈结构：价格与对应的百分比距离。
///
/// # Invariants
/// - LONG: `stop_loss < entry < tp1 <= tp2`；SHORT 镜像。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetSet {
    pub stop_loss: f64,
    pub take_profit_1: f64,
    pub take_profit_2: f64,
    // 各自到入场价的绝对百分比
    pub sl_percent: f64,
    pub tp1_percent: f64,
    pub tp2_percent: f64,
}

/// # Summary
/// 波动率自适应的止损止盈推导。
///
/// # Logic
/// 1. 基准档：SL 2%，TP1 3%，TP2 6%。
/// 2. `ATR% > 3` 放宽到 3 / 4.5 / 9；`ATR% < 1` 收紧到 1.5 / 2.25 / 4.5。
/// 3. 沿信号方向乘法作用于入场价。
/// 4. 当下一枢轴阻力 (LONG) / 支撑 (SHORT) 落在朴素 TP2 与
///    入场价 ±15% 之间时，将 TP2 收敛到该枢轴位。
///
/// # Arguments
/// * `direction`: 信号方向。
/// * `entry`: 入场价 (最新收盘)。
/// * `atr_percent`: 1h ATR 相对入场价的百分比。
/// * `pivots`: 日线枢轴位。
pub fn derive_targets(
    direction: Direction,
    entry: f64,
    atr_percent: f64,
    pivots: &PivotPoints,
) -> TargetSet {
    let (mut sl_pct, mut tp1_pct, mut tp2_pct) = (0.02, 0.03, 0.06);
    if atr_percent > 3.0 {
        // 高波动：放宽
        (sl_pct, tp1_pct, tp2_pct) = (0.03, 0.045, 0.09);
    } else if atr_percent < 1.0 {
        // 低波动：收紧
        (sl_pct, tp1_pct, tp2_pct) = (0.015, 0.0225, 0.045);
    }

    let (stop_loss, take_profit_1, mut take_profit_2) = match direction {
        Direction::Long => (
            entry * (1.0 - sl_pct),
            entry * (1.0 + tp1_pct),
            entry * (1.0 + tp2_pct),
        ),
        Direction::Short => (
            entry * (1.0 + sl_pct),
            entry * (1.0 - tp1_pct),
            entry * (1.0 - tp2_pct),
        ),
    };

    match direction {
        Direction::Long => {
            if let Some(tp_pivot) = next_resistance(entry, pivots) {
                if tp_pivot > take_profit_2 && tp_pivot < entry * 1.15 {
                    take_profit_2 = tp_pivot;
                    tp2_pct = (take_profit_2 - entry) / entry;
                }
            }
        }
        Direction::Short => {
            if let Some(tp_pivot) = next_support(entry, pivots) {
                if tp_pivot < take_profit_2 && tp_pivot > entry * 0.85 {
                    take_profit_2 = tp_pivot;
                    tp2_pct = (entry - take_profit_2) / entry;
                }
            }
        }
    }

    TargetSet {
        stop_loss,
        take_profit_1,
        take_profit_2,
        sl_percent: sl_pct * 100.0,
        tp1_percent: tp1_pct * 100.0,
        tp2_percent: tp2_pct * 100.0,
    }
}
