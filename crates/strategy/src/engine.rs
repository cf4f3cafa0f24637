use crate::error::StrategyError;
use crate::score::{confluence_score, detect_regime, signal_direction, ScoreInput};
use crate::targets::derive_targets;
use chrono::Utc;
use shingo_core::common::TimeFrame;
use shingo_core::config::StrategyConfig;
use shingo_core::market::entity::Candle;
use shingo_core::market::port::MarketDataProvider;
use shingo_core::signal::entity::{
    IndicatorContext, LeaderTrend, MarketRegime, Signal, SignalStatus, SignalTier,
};
use shingo_indicator::{
    adx, atr, candlestick, divergence, fibonacci, ma, macd, pivot, risk, rsi, smc, stoch_rsi,
    structure, volume_profile,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 各周期的历史深度 (日线仅用于前日枢轴)。
const DEPTH_1D: usize = 10;
const DEPTH_4H: usize = 200;
const DEPTH_1H: usize = 200;
const DEPTH_15M: usize = 200;
const DEPTH_5M: usize = 200;

/// 订单流统计窗口 (5m K 线数)。
const ORDER_FLOW_WINDOW: usize = 20;

/// # Summary
/// 单交易对评估结果。
///
/// # Invariants
/// - 只要 5m 数据非空，`price` 即为最新收盘价，无论是否产出信号。
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub signal: Option<Signal>,
    pub price: f64,
}

/// # Summary
/// 汇合策略引擎：抓取 → 关键位 → 指标 → 状态 → 方向 → 评分 →
/// 止损止盈 → 风控闸门 → 组装信号。
///
/// # Invariants
/// - 评估是确定性的：相同 K 线输入产出相同信号 (ID 与时间戳除外)。
/// - 数据不足返回无信号的成功结果，不产生错误。
pub struct StrategyEngine {
    market: Arc<dyn MarketDataProvider>,
    cfg: StrategyConfig,
}

impl StrategyEngine {
    pub fn new(market: Arc<dyn MarketDataProvider>, cfg: StrategyConfig) -> Self {
        Self { market, cfg }
    }

    /// # Summary
    /// 对单个交易对执行一次完整的多因子评估。
    ///
    /// # Logic
    /// 1. 抓取五个周期的 K 线与领先标的上下文。
    /// 2. 计算日线枢轴、4h 斐波那契、1h ATR 等关键位。
    /// 3. 计算多周期 RSI / ADX、VWAP、MACD、量能与订单流。
    /// 4. 判定市场状态，CHOPPY 直接放弃。
    /// 5. 确定方向并计算汇合分数，低于阈值放弃。
    /// 6. 关键位接近度闸门 (Premium 分数豁免)。
    /// 7. 推导止损止盈并执行 R:R 闸门，半 Kelly 仓位。
    /// 8. 组装带完整上下文快照的 ACTIVE 信号。
    ///
    /// # Arguments
    /// * `symbol`: 交易对代码。
    ///
    /// # Returns
    /// 成功返回 `Evaluation`；仅上游数据故障返回错误。
    pub async fn evaluate_symbol(&self, symbol: &str) -> Result<Evaluation, StrategyError> {
        debug!(symbol, "evaluating symbol");

        // ---------- 1. 数据采集 (高周期优先) ----------
        let klines_1d = self.market.fetch_candles(symbol, TimeFrame::Day1, DEPTH_1D).await?;
        let klines_4h = self.market.fetch_candles(symbol, TimeFrame::Hour4, DEPTH_4H).await?;
        let klines_1h = self.market.fetch_candles(symbol, TimeFrame::Hour1, DEPTH_1H).await?;
        let klines_15m = self
            .market
            .fetch_candles(symbol, TimeFrame::Minute15, DEPTH_15M)
            .await?;
        let klines_5m = self
            .market
            .fetch_candles(symbol, TimeFrame::Minute5, DEPTH_5M)
            .await?;

        let (closes_4h, highs_4h, lows_4h, _) = extract_series(&klines_4h);
        let (closes_1h, highs_1h, lows_1h, _) = extract_series(&klines_1h);
        let (closes_15m, highs_15m, lows_15m, _) = extract_series(&klines_15m);
        let (closes_5m, highs_5m, lows_5m, volumes_5m) = extract_series(&klines_5m);

        let current_price = match closes_5m.last() {
            Some(price) => *price,
            None => return Ok(Evaluation { signal: None, price: 0.0 }),
        };
        let no_signal = |price: f64| Evaluation { signal: None, price };

        // ---------- 1.1 领先标的上下文 ----------
        let btc_trend = self.leader_trend(symbol).await;

        // ---------- 2. 关键位 ----------
        let pivots = if klines_1d.len() >= 2 {
            // 取前一个已完结交易日
            let prev_day = &klines_1d[klines_1d.len() - 2];
            pivot::standard_pivots(prev_day.high, prev_day.low, prev_day.close)
        } else {
            pivot::PivotPoints::default()
        };
        let (_, nearest_pivot_name) = pivot::nearest_pivot_level(current_price, &pivots);

        let (swing_high, swing_low) = structure::swing_range(&highs_4h, &lows_4h, 50);

        let ema50_4h = ma::last_ema(&closes_4h, 50);
        if ema50_4h == 0.0 {
            return Ok(no_signal(current_price));
        }

        let fib_trend = if current_price < ema50_4h {
            fibonacci::SwingTrend::Down
        } else {
            fibonacci::SwingTrend::Up
        };
        let fibs = fibonacci::retracements(swing_high, swing_low, fib_trend);
        let (_, nearest_fib_name) = fibonacci::nearest_fib_level(current_price, &fibs);

        let atr_1h = atr::atr(&highs_1h, &lows_1h, &closes_1h, 14);

        // ---------- 3. 指标计算 ----------
        let rsi_4h = rsi::last_rsi(&closes_4h, 14);
        let rsi_1h_series = rsi::rsi(&closes_1h, 14);
        let rsi_1h = rsi_1h_series.last().copied().unwrap_or(0.0);
        let rsi_15m_series = rsi::rsi(&closes_15m, 14);
        let rsi_15m = rsi_15m_series.last().copied().unwrap_or(0.0);
        let rsi_5m = rsi::last_rsi(&closes_5m, 14);

        let adx_4h = adx::last_adx(&highs_4h, &lows_4h, &closes_4h, 14);
        let adx_1h = adx::last_adx(&highs_1h, &lows_1h, &closes_1h, 14);
        let adx_15m = adx::last_adx(&highs_15m, &lows_15m, &closes_15m, 14);

        if rsi_4h == 0.0 || rsi_1h == 0.0 || adx_4h == 0.0 {
            debug!(symbol, "insufficient data");
            return Ok(no_signal(current_price));
        }

        let vwap = shingo_indicator::vwap::last_vwap(&highs_5m, &lows_5m, &closes_5m, &volumes_5m);
        let (macd_line, macd_signal, histogram) = macd::last_macd(&closes_5m, 12, 26, 9);

        let avg_vol = average(&volumes_5m);
        let current_vol = volumes_5m.last().copied().unwrap_or(0.0);
        // 均量为 0 时比率取 0，使低参与度惩罚生效
        let volume_ratio = if avg_vol > 0.0 { current_vol / avg_vol } else { 0.0 };

        let order_flow_delta = order_flow_delta(&klines_5m, ORDER_FLOW_WINDOW);

        // ---------- 3.1 SMC 与量价分布 ----------
        let fvgs = smc::find_fvgs(&klines_1h);
        let obs = smc::find_order_blocks(&klines_1h);
        let fvg_type = smc::price_in_fvg(current_price, &fvgs);
        let ob_type = smc::price_in_ob(current_price, &obs);

        let vp = volume_profile::volume_profile(&klines_4h, 100);
        let poc_dist = volume_profile::poc_distance(current_price, vp.poc);

        // ---------- 3.2 补充上下文 (仅供验证器与记录，不参与评分) ----------
        let stoch_k = stoch_rsi::last_stoch_rsi(&rsi_15m_series, 14, 3, 3).0;
        let (trend_state, _, _) = ma::trend_state(&closes_4h, 50, 200);
        let market_structure = structure::analyze_structure(&klines_1h, 50).structure;
        let rsi_divergence = divergence::detect_divergence(&closes_1h, &rsi_1h_series, 20);
        let candle_pattern = candlestick::identify_pattern(&klines_5m).map(str::to_string);

        // ---------- 4. 市场状态 ----------
        let regime = detect_regime(adx_1h, adx_15m, current_price, ema50_4h, self.cfg.choppy_adx);
        debug!(symbol, %regime, adx_1h, adx_15m, "regime detected");

        if regime == MarketRegime::Choppy {
            debug!(symbol, "skipped: choppy market");
            return Ok(no_signal(current_price));
        }

        // ---------- 5. 方向与汇合评分 ----------
        let direction = match signal_direction(regime, current_price, ema50_4h, rsi_4h) {
            Some(direction) => direction,
            None => {
                debug!(symbol, "no clear direction");
                return Ok(no_signal(current_price));
            }
        };

        let pivot_prox = pivot::pivot_distance(current_price, &pivots);
        let fib_prox = fibonacci::fib_distance(current_price, &fibs);

        let score = confluence_score(&ScoreInput {
            direction,
            rsi_1h,
            rsi_15m,
            adx_1h,
            adx_15m,
            histogram,
            volume_ratio,
            order_flow_delta,
            pivot_distance: pivot_prox,
            fib_distance: fib_prox,
            btc_trend,
            fvg: fvg_type,
            ob: ob_type,
            poc_distance: poc_dist,
        });

        info!(symbol, score, %direction, "confluence score");

        if score < self.cfg.min_confluence_score {
            debug!(symbol, score, "score below threshold");
            return Ok(no_signal(current_price));
        }

        // ---------- 6. 关键位接近度闸门 ----------
        if !crate::score::passes_proximity_gate(
            score,
            pivot_prox,
            fib_prox,
            self.cfg.proximity_pct,
            self.cfg.premium_score,
        ) {
            debug!(symbol, pivot_prox, fib_prox, "not near key level");
            return Ok(no_signal(current_price));
        }

        // ---------- 7. 层级与止损止盈 ----------
        let tier = if score >= self.cfg.premium_score {
            SignalTier::Premium
        } else {
            SignalTier::Standard
        };

        let atr_percent = atr_1h / current_price * 100.0;
        let targets = derive_targets(direction, current_price, atr_percent, &pivots);

        // ---------- 8. 风控闸门与仓位 ----------
        let rr = risk::risk_reward(current_price, targets.stop_loss, targets.take_profit_2);
        if rr.ratio < self.cfg.min_risk_reward {
            debug!(symbol, ratio = rr.ratio, "risk reward too low");
            return Ok(no_signal(current_price));
        }

        let probability = risk::signal_probability(score as i32);
        let break_even = risk::break_even_win_rate(rr.ratio);
        let recommended_size = risk::kelly_fraction(probability, rr.ratio);

        let risk_percent = (current_price - targets.stop_loss).abs() / current_price * 100.0;
        let reward_percent = (targets.take_profit_2 - current_price).abs() / current_price * 100.0;
        let tp1_percent = (targets.take_profit_1 - current_price).abs() / current_price * 100.0;
        let nearest_level_dist = pivot_prox.min(fib_prox);

        // ---------- 9. 组装信号 ----------
        let context = IndicatorContext {
            rsi_4h,
            rsi_1h,
            rsi_15m,
            rsi_5m,
            adx_4h,
            adx_1h,
            adx_15m,
            vwap,
            current_vol,
            avg_vol,
            macd: macd_line,
            macd_signal,
            histogram,
            order_flow_delta,
            pivot_point: pivots.pivot,
            pivot_r1: pivots.r1,
            pivot_r2: pivots.r2,
            pivot_r3: pivots.r3,
            pivot_s1: pivots.s1,
            pivot_s2: pivots.s2,
            pivot_s3: pivots.s3,
            nearest_pivot: nearest_pivot_name,
            fib_0: fibs.level_0,
            fib_236: fibs.level_236,
            fib_382: fibs.level_382,
            fib_500: fibs.level_500,
            fib_618: fibs.level_618,
            fib_786: fibs.level_786,
            fib_100: fibs.level_100,
            nearest_fib: nearest_fib_name,
            fvg_type,
            ob_type,
            poc: vp.poc,
            poc_distance: poc_dist,
            btc_correlation: btc_trend,
            atr: atr_1h,
            market_structure,
            stoch_rsi: stoch_k,
            divergence: rsi_divergence,
            trend_state,
            candlestick_pattern: candle_pattern,
        };

        let signal = Signal {
            id: Signal::new_short_id(),
            symbol: symbol.to_string(),
            direction,
            tier,
            entry_price: current_price,
            stop_loss: targets.stop_loss,
            take_profit_1: targets.take_profit_1,
            take_profit_2: targets.take_profit_2,
            risk_reward_ratio: rr.ratio,
            recommended_size,
            regime,
            context,
            confluence_score: score,
            confidence_score: probability,
            break_even_win_rate: break_even,
            risk_percent,
            reward_percent,
            tp1_percent,
            tp2_percent: reward_percent,
            nearest_level_dist,
            validator_score: 0,
            validator_confidence: 0,
            validator_tier: None,
            validator_reason: String::new(),
            status: SignalStatus::Active,
            close_reason: None,
            realized_pnl: 0.0,
            tp_alert_sent: false,
            sl_alert_sent: false,
            reversal_alert_sent: false,
            trailing_alert_sent: false,
            last_alert_time: None,
            created_at: Utc::now(),
            closed_at: None,
        };

        info!(
            symbol,
            %direction,
            score,
            %tier,
            ratio = rr.ratio,
            entry = current_price,
            "signal produced"
        );

        Ok(Evaluation { signal: Some(signal), price: current_price })
    }

    /// # Summary
    /// 抓取领先标的 4h 趋势 (现价相对 EMA-50)。
    ///
    /// # Logic
    /// 自身即领先标的或抓取失败时返回 `None`；失败只告警不致错。
    async fn leader_trend(&self, symbol: &str) -> Option<LeaderTrend> {
        if symbol == self.cfg.leader_symbol {
            return None;
        }

        match self
            .market
            .fetch_candles(&self.cfg.leader_symbol, TimeFrame::Hour4, DEPTH_4H)
            .await
        {
            Ok(klines) => {
                let closes: Vec<f64> = klines.iter().map(|c| c.close).collect();
                let ema50 = ma::last_ema(&closes, 50);
                let last = closes.last().copied()?;
                if ema50 == 0.0 {
                    return None;
                }
                Some(if last > ema50 { LeaderTrend::Up } else { LeaderTrend::Down })
            }
            Err(e) => {
                warn!(error = %e, "failed to fetch leader context");
                None
            }
        }
    }
}

/// 拆出收盘/最高/最低/成交量四个序列。
fn extract_series(candles: &[Candle]) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut closes = Vec::with_capacity(candles.len());
    let mut highs = Vec::with_capacity(candles.len());
    let mut lows = Vec::with_capacity(candles.len());
    let mut volumes = Vec::with_capacity(candles.len());
    for candle in candles {
        closes.push(candle.close);
        highs.push(candle.high);
        lows.push(candle.low);
        volumes.push(candle.volume);
    }
    (closes, highs, lows, volumes)
}

/// 算术平均；空序列为 0。
fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// 最近 `window` 根 K 线的带方向成交量差。
fn order_flow_delta(candles: &[Candle], window: usize) -> f64 {
    let start = candles.len().saturating_sub(window);
    candles[start..]
        .iter()
        .map(|c| {
            if c.is_bullish() {
                c.volume
            } else {
                -c.volume
            }
        })
        .sum()
}
