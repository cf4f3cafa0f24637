use shingo_core::signal::entity::Direction;

/// Kelly 仓位上限 (账户百分比)。
const KELLY_CAP: f64 = 25.0;

/// # Summary
/// 风险回报比明细。
///
/// # Invariants
/// - `break_even_win_rate` 为百分比形式。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RiskReward {
    pub ratio: f64,
    pub risk_amount: f64,
    pub reward_amount: f64,
    pub break_even_win_rate: f64,
}

/// # Summary
/// 计算风险回报比。
///
/// # Logic
/// 1. `risk = |entry - stop|`，`reward = |target - entry|`。
/// 2. `risk == 0` 时比率取 0 (风控闸门据此拒绝)。
/// 3. 盈亏平衡胜率 `= risk / (risk + reward) * 100`。
pub fn risk_reward(entry: f64, stop_loss: f64, take_profit: f64) -> RiskReward {
    let risk = (entry - stop_loss).abs();
    let reward = (take_profit - entry).abs();

    let ratio = if risk == 0.0 { 0.0 } else { reward / risk };
    let break_even = if risk + reward > 0.0 {
        risk / (risk + reward) * 100.0
    } else {
        0.0
    };

    RiskReward {
        ratio,
        risk_amount: risk,
        reward_amount: reward,
        break_even_win_rate: break_even,
    }
}

/// # Summary
/// 由风险回报比推导盈亏平衡胜率 (百分比)。
///
/// # Logic
/// `win_rate = 1 / (rr + 1)`；比率非正时需要 100% 胜率。
pub fn break_even_win_rate(risk_reward_ratio: f64) -> f64 {
    if risk_reward_ratio <= 0.0 {
        return 100.0;
    }
    1.0 / (risk_reward_ratio + 1.0) * 100.0
}

/// # Summary
/// 汇合分数到概率的映射 (0.0 - 1.0)。
pub fn signal_probability(confluence_score: i32) -> f64 {
    (confluence_score.clamp(0, 100) as f64) / 100.0
}

/// # Summary
/// 半 Kelly 仓位 (账户百分比)。
///
/// # Logic
/// 1. `kelly = (p - (1 - p) / b) * 100`，b 为盈亏比。
/// 2. 取半 Kelly，向下不低于 0，向上不超过 25%。
///
/// # Arguments
/// * `win_rate`: 胜率 (0.0 - 1.0)。
/// * `win_loss_ratio`: 盈亏比 (此处即 R:R)。
pub fn kelly_fraction(win_rate: f64, win_loss_ratio: f64) -> f64 {
    if win_loss_ratio == 0.0 {
        return 0.0;
    }

    let kelly = (win_rate - (1.0 - win_rate) / win_loss_ratio) * 100.0;
    (kelly / 2.0).clamp(0.0, KELLY_CAP)
}

/// # Summary
/// 方向感知的盈亏百分比。
pub fn pnl_percent(entry: f64, exit: f64, direction: Direction) -> f64 {
    match direction {
        Direction::Long => (exit - entry) / entry * 100.0,
        Direction::Short => (entry - exit) / entry * 100.0,
    }
}

/// # Summary
/// 按账户风险百分比推导仓位数量。
pub fn position_size(account_balance: f64, risk_percentage: f64, entry: f64, stop_loss: f64) -> f64 {
    let price_risk = (entry - stop_loss).abs();
    if price_risk == 0.0 {
        return 0.0;
    }
    account_balance * (risk_percentage / 100.0) / price_risk
}
