use shingo_core::common::format_price;
use shingo_core::signal::entity::Signal;

/// # Summary
/// 新信号通知文本。
///
/// # Returns
/// `(主题, 正文)`。
pub fn new_signal(signal: &Signal) -> (String, String) {
    let subject = format!("New {} signal: {}", signal.direction, signal.symbol);
    let tier = signal
        .validator_tier
        .map(|t| t.to_string())
        .unwrap_or_else(|| signal.tier.to_string());
    let content = format!(
        "ID: {}\nTier: {}\nRegime: {}\n\nEntry: {}\nStop Loss: {} (-{:.2}%)\nTP1: {} (+{:.2}%)\nTP2: {} (+{:.2}%)\nR:R: {:.2}\nSize: {:.1}% of account\n\nConfluence: {}/100\nValidator: {}/100 ({})",
        signal.id,
        tier,
        signal.regime,
        format_price(signal.entry_price),
        format_price(signal.stop_loss),
        signal.risk_percent,
        format_price(signal.take_profit_1),
        signal.tp1_percent,
        format_price(signal.take_profit_2),
        signal.tp2_percent,
        signal.risk_reward_ratio,
        signal.recommended_size,
        signal.confluence_score,
        signal.validator_score,
        signal.validator_reason,
    );
    (subject, content)
}

/// 止盈命中通知。
pub fn take_profit_hit(signal: &Signal, exit_price: f64, pnl: f64) -> (String, String) {
    let subject = format!("Take profit hit: {}", signal.symbol);
    let content = format!(
        "{} {}\nEntry: {}\nExit: {}\nTarget: {}\nPnL: +{:.2}%\n\nBook profits and trail the remainder.",
        signal.symbol,
        signal.direction,
        format_price(signal.entry_price),
        format_price(exit_price),
        format_price(signal.take_profit_2),
        pnl,
    );
    (subject, content)
}

/// 止损命中通知。
pub fn stop_loss_hit(signal: &Signal, exit_price: f64, pnl: f64) -> (String, String) {
    let subject = format!("Stop loss hit: {}", signal.symbol);
    let content = format!(
        "{} {}\nEntry: {}\nExit: {}\nStop: {}\nPnL: {:.2}%\n\nRespecting the stop is the trade.",
        signal.symbol,
        signal.direction,
        format_price(signal.entry_price),
        format_price(exit_price),
        format_price(signal.stop_loss),
        pnl,
    );
    (subject, content)
}

/// 快速反转预警 (建仓初期的不利波动)。
pub fn reversal_warning(signal: &Signal, current_price: f64, adverse_pct: f64) -> (String, String) {
    let subject = format!("Reversal warning: {}", signal.symbol);
    let content = format!(
        "{} {} moving against entry.\nEntry: {}\nCurrent: {}\nAdverse move: {:.2}%\nStop: {}\n\nConsider closing on confirmed breakdown or moving the stop to break-even.",
        signal.symbol,
        signal.direction,
        format_price(signal.entry_price),
        format_price(current_price),
        adverse_pct,
        format_price(signal.stop_loss),
    );
    (subject, content)
}

/// 移动止损建议 (顺利浮盈阶段)。
pub fn trailing_suggestion(signal: &Signal, profit_pct: f64, new_stop: f64) -> (String, String) {
    let subject = format!("Trailing stop suggestion: {}", signal.symbol);
    let content = format!(
        "{} {} up {:.2}%.\nOld stop: {}\nSuggested stop: {}\n\nLock in the move.",
        signal.symbol,
        signal.direction,
        profit_pct,
        format_price(signal.stop_loss),
        format_price(new_stop),
    );
    (subject, content)
}
