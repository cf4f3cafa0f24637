use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use shingo_core::common::TimeFrame;
use shingo_core::config::StrategyConfig;
use shingo_core::market::entity::Candle;
use shingo_core::market::error::MarketError;
use shingo_core::market::port::MarketDataProvider;
use shingo_strategy::engine::StrategyEngine;
use std::collections::HashMap;
use std::sync::Arc;

/// 固定数据集的行情桩：按周期返回预置 K 线，可切换为故障模式。
struct MockProvider {
    data: HashMap<TimeFrame, Vec<Candle>>,
    fail: bool,
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn fetch_candles(
        &self,
        _symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketError> {
        if self.fail {
            return Err(MarketError::Network("connection refused".to_string()));
        }
        let candles = self.data.get(&timeframe).cloned().unwrap_or_default();
        let start = candles.len().saturating_sub(limit);
        Ok(candles[start..].to_vec())
    }
}

fn make_candles(n: usize, step: impl Fn(usize) -> f64) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = step(i);
            let open = if i == 0 { close } else { step(i - 1) };
            Candle {
                open_time: base + Duration::minutes(i as i64 * 5),
                open,
                high: open.max(close) * 1.001,
                low: open.min(close) * 0.999,
                close,
                volume: 100.0,
                close_time: base + Duration::minutes(i as i64 * 5 + 5),
            }
        })
        .collect()
}

/// 轻微锯齿行情：ADX 极低，不会给出方向。
fn zigzag_dataset() -> HashMap<TimeFrame, Vec<Candle>> {
    let zigzag = |i: usize| 100.0 + if i % 2 == 0 { 0.1 } else { -0.1 };
    let mut data = HashMap::new();
    for tf in [
        TimeFrame::Day1,
        TimeFrame::Hour4,
        TimeFrame::Hour1,
        TimeFrame::Minute15,
        TimeFrame::Minute5,
    ] {
        data.insert(tf, make_candles(200, zigzag));
    }
    data
}

fn engine_with(data: HashMap<TimeFrame, Vec<Candle>>, fail: bool) -> StrategyEngine {
    StrategyEngine::new(
        Arc::new(MockProvider { data, fail }),
        StrategyConfig::default(),
    )
}

#[tokio::test]
async fn insufficient_history_yields_no_signal_without_error() {
    // 每个周期仅 5 根：任何指标窗口都不满足
    let mut data = HashMap::new();
    for tf in [
        TimeFrame::Day1,
        TimeFrame::Hour4,
        TimeFrame::Hour1,
        TimeFrame::Minute15,
        TimeFrame::Minute5,
    ] {
        data.insert(tf, make_candles(5, |i| 100.0 + i as f64));
    }
    let engine = engine_with(data, false);

    let eval = engine.evaluate_symbol("ETHUSDT").await.unwrap();
    assert!(eval.signal.is_none());
    // 5m 数据存在，即使无信号也必须上报现价
    assert!((eval.price - 104.0).abs() < 1e-9);
}

#[tokio::test]
async fn quiet_market_yields_no_signal_but_reports_price() {
    let engine = engine_with(zigzag_dataset(), false);

    let eval = engine.evaluate_symbol("ETHUSDT").await.unwrap();
    assert!(eval.signal.is_none());
    // 锯齿数据最后一根 (i=199, 奇数) 收于 99.9
    assert!((eval.price - 99.9).abs() < 1e-9);
}

#[tokio::test]
async fn evaluation_is_deterministic() {
    let engine = engine_with(zigzag_dataset(), false);

    let a = engine.evaluate_symbol("ETHUSDT").await.unwrap();
    let b = engine.evaluate_symbol("ETHUSDT").await.unwrap();

    assert_eq!(a.price, b.price);
    match (a.signal, b.signal) {
        (None, None) => {}
        (Some(mut x), Some(mut y)) => {
            // ID 与时间戳之外必须逐字段相同
            x.id = String::new();
            y.id = String::new();
            x.created_at = y.created_at;
            assert_eq!(x, y);
        }
        _ => panic!("evaluations diverged"),
    }
}

#[tokio::test]
async fn upstream_failure_propagates_as_error() {
    let engine = engine_with(HashMap::new(), true);
    assert!(engine.evaluate_symbol("ETHUSDT").await.is_err());
}

#[tokio::test]
async fn empty_feed_reports_zero_price() {
    // 空响应：没有 5m 收盘价可报
    let engine = engine_with(HashMap::new(), false);
    let eval = engine.evaluate_symbol("ETHUSDT").await.unwrap();
    assert!(eval.signal.is_none());
    assert_eq!(eval.price, 0.0);
}
