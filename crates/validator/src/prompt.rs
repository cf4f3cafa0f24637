use shingo_core::common::format_price;
use shingo_core::signal::entity::Signal;

/// # Summary
/// 构造整批候选的验证提示词。
///
/// # Logic
/// 1. 头部声明分析准则与严格的 JSON 数组响应格式。
/// 2. 逐候选追加结构化明细块，顺序即响应顺序。
pub fn batch_prompt(candidates: &[Signal]) -> String {
    let mut prompt = String::from(
        r#"You are a senior crypto trading desk analyst. Scrutinize the following signal candidates and discard any setup lacking proper technical alignment or risk management.

STRICT CRITERIA:
1. Multi-timeframe alignment: 4H and 1H trends must agree for high scores.
2. Volume confirmation: real moves need >= 1.5x average volume.
3. Key level integrity: respect major pivot and Fibonacci levels.
4. Risk management: a signal with R:R below 2.0 is invalid.

RESPONSE FORMAT:
Respond ONLY with a JSON array, one element per candidate, in the same order:
[
  {"signal": 1, "score": <0-100>, "confidence": <0-100>, "tier": "PREMIUM"|"STANDARD"|"REJECT", "reason": "<concise expert reasoning>"}
]
Scoring: 90+ = PREMIUM, 70-89 = STANDARD, below 70 = REJECT.

CANDIDATES:
"#,
    );

    for (idx, signal) in candidates.iter().enumerate() {
        prompt.push_str(&signal_block(idx + 1, signal));
    }

    prompt
}

/// 单候选的结构化明细块。
fn signal_block(number: usize, signal: &Signal) -> String {
    let ctx = &signal.context;
    let volume_ratio = if ctx.avg_vol > 0.0 {
        ctx.current_vol / ctx.avg_vol
    } else {
        0.0
    };

    format!(
        r#"
---------- CANDIDATE {number}: {symbol} ----------
BASIC:
- Direction: {direction} | Tier: {tier} | Regime: {regime}

RISK / REWARD:
- Entry: {entry} | Stop: {stop} (-{risk:.2}%) | TP2: {tp2} (+{reward:.2}%)
- ATR (1H): {atr:.4} | R:R: {rr:.2} | Break-even win rate: {bewr:.2}%
- Kelly size: {size:.2}% of account

MOMENTUM & TREND:
- RSI 4H/1H/15m/5m: {rsi4h:.1} / {rsi1h:.1} / {rsi15m:.1} / {rsi5m:.1}
- Stochastic RSI (15m): {stoch:.1}
- ADX 4H/1H/15m: {adx4h:.1} / {adx1h:.1} / {adx15m:.1}
- MACD (5m): line {macd:.6} | signal {macd_signal:.6} | histogram {hist:.6}
- Trend state: {trend_state:?}

VOLUME & FLOW:
- VWAP: {vwap:.4} | Volume ratio: {vol_ratio:.2}x | Order flow delta: {flow:.2}

STRUCTURE & LEVELS:
- Pivot: {pivot} | R1: {r1} | S1: {s1} | Nearest pivot: {near_pivot}
- Fib 50%: {fib500} | 61.8%: {fib618} | Nearest fib: {near_fib}
- Nearest level distance: {level_dist:.2}%
- Market structure: {structure:?}

SMART MONEY:
- Order block: {ob:?} | Fair value gap: {fvg:?}
- POC: {poc} (distance {poc_dist:.2}%)
- BTC correlation: {btc:?}
- Candlestick pattern: {pattern:?} | Divergence: {div:?}

SYSTEM SCORE:
- Confluence: {confluence}/100 | Internal confidence: {confidence:.0}%
"#,
        number = number,
        symbol = signal.symbol,
        direction = signal.direction,
        tier = signal.tier,
        regime = signal.regime,
        entry = format_price(signal.entry_price),
        stop = format_price(signal.stop_loss),
        risk = signal.risk_percent,
        tp2 = format_price(signal.take_profit_2),
        reward = signal.reward_percent,
        atr = ctx.atr,
        rr = signal.risk_reward_ratio,
        bewr = signal.break_even_win_rate,
        size = signal.recommended_size,
        rsi4h = ctx.rsi_4h,
        rsi1h = ctx.rsi_1h,
        rsi15m = ctx.rsi_15m,
        rsi5m = ctx.rsi_5m,
        stoch = ctx.stoch_rsi,
        adx4h = ctx.adx_4h,
        adx1h = ctx.adx_1h,
        adx15m = ctx.adx_15m,
        macd = ctx.macd,
        macd_signal = ctx.macd_signal,
        hist = ctx.histogram,
        trend_state = ctx.trend_state,
        vwap = ctx.vwap,
        vol_ratio = volume_ratio,
        flow = ctx.order_flow_delta,
        pivot = format_price(ctx.pivot_point),
        r1 = format_price(ctx.pivot_r1),
        s1 = format_price(ctx.pivot_s1),
        near_pivot = ctx.nearest_pivot,
        fib500 = format_price(ctx.fib_500),
        fib618 = format_price(ctx.fib_618),
        near_fib = ctx.nearest_fib,
        level_dist = signal.nearest_level_dist,
        structure = ctx.market_structure,
        ob = ctx.ob_type,
        fvg = ctx.fvg_type,
        poc = format_price(ctx.poc),
        poc_dist = ctx.poc_distance,
        btc = ctx.btc_correlation,
        pattern = ctx.candlestick_pattern,
        div = ctx.divergence,
        confluence = signal.confluence_score,
        confidence = signal.confidence_score * 100.0,
    )
}
