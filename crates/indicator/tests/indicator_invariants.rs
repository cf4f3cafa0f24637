use chrono::{Duration, TimeZone, Utc};
use shingo_core::market::entity::Candle;
use shingo_indicator::{adx, fibonacci, macd, pivot, risk, rsi, smc, volume_profile};

/// 构造一段确定性的合成行情 (正弦叠加线性趋势)。
fn synthetic_candles(n: usize) -> Vec<Candle> {
    let base = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let drift = i as f64 * 0.2;
            let wave = (i as f64 * 0.35).sin() * 2.0;
            let close = 100.0 + drift + wave;
            let open = close - 0.4;
            Candle {
                open_time: base + Duration::minutes(i as i64 * 5),
                open,
                high: open.max(close) + 0.8,
                low: open.min(close) - 0.8,
                close,
                volume: 50.0 + (i % 10) as f64 * 5.0,
                close_time: base + Duration::minutes(i as i64 * 5 + 5),
            }
        })
        .collect()
}

fn series(candles: &[Candle]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    (
        candles.iter().map(|c| c.close).collect(),
        candles.iter().map(|c| c.high).collect(),
        candles.iter().map(|c| c.low).collect(),
    )
}

#[test]
fn rsi_always_within_bounds() {
    let candles = synthetic_candles(120);
    let (closes, _, _) = series(&candles);

    // 1. 任意输入上 RSI 必须落在 [0, 100]
    for period in [7, 14, 21] {
        for v in rsi::rsi(&closes, period) {
            assert!((0.0..=100.0).contains(&v), "RSI out of bounds: {}", v);
        }
    }
}

#[test]
fn adx_never_negative() {
    let candles = synthetic_candles(120);
    let (closes, highs, lows) = series(&candles);

    for v in adx::adx(&highs, &lows, &closes, 14) {
        assert!(v >= 0.0, "ADX negative: {}", v);
    }
}

#[test]
fn macd_histogram_identity_at_every_index() {
    let candles = synthetic_candles(120);
    let (closes, _, _) = series(&candles);

    let (macd_line, signal_line, histogram) = macd::macd(&closes, 12, 26, 9);
    for i in 0..signal_line.len() {
        let expect = macd_line[25 + i] - signal_line[i];
        assert!((histogram[i] - expect).abs() < 1e-12);
    }
}

#[test]
fn same_input_yields_identical_output() {
    // 2. 指标为纯函数：相同输入必须产出逐位相同的结果
    let candles = synthetic_candles(100);
    let (closes, highs, lows) = series(&candles);

    assert_eq!(rsi::rsi(&closes, 14), rsi::rsi(&closes, 14));
    assert_eq!(
        adx::adx(&highs, &lows, &closes, 14),
        adx::adx(&highs, &lows, &closes, 14)
    );
    assert_eq!(
        volume_profile::volume_profile(&candles, 50),
        volume_profile::volume_profile(&candles, 50)
    );
    assert_eq!(smc::find_fvgs(&candles), smc::find_fvgs(&candles));
}

#[test]
fn pivot_and_fib_distances_are_percentages() {
    let pivots = pivot::standard_pivots(110.0, 90.0, 100.0);
    let fibs = fibonacci::retracements(110.0, 90.0, fibonacci::SwingTrend::Up);

    let pd = pivot::pivot_distance(100.5, &pivots);
    let fd = fibonacci::fib_distance(100.5, &fibs);
    assert!(pd >= 0.0 && pd <= 100.0);
    assert!(fd >= 0.0 && fd <= 100.0);
}

#[test]
fn risk_gate_properties() {
    // entry == stop 时比率为 0，风控闸门必然拒绝
    assert_eq!(risk::risk_reward(100.0, 100.0, 110.0).ratio, 0.0);

    // break_even = 1 / (1 + rr)
    let rr = risk::risk_reward(100.0, 98.0, 106.0);
    assert!((rr.break_even_win_rate - 100.0 / (1.0 + rr.ratio)).abs() < 1e-9);

    // Kelly 恒在 [0, 25]
    for score in 0..=100 {
        let p = risk::signal_probability(score);
        let k = risk::kelly_fraction(p, 3.0);
        assert!((0.0..=25.0).contains(&k));
    }
}
