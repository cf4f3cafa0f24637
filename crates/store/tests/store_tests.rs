use chrono::{Duration, Utc};
use shingo_core::config::DEFAULT_WATCHLIST;
use shingo_core::signal::entity::{
    AlertKind, CloseReason, Direction, IndicatorContext, MarketRegime, Signal, SignalStatus,
    SignalTier,
};
use shingo_core::store::error::StoreError;
use shingo_core::store::port::{SignalStore, WatchlistStore};
use shingo_store::signal::SqliteSignalStore;
use shingo_store::watchlist::SqliteWatchlistStore;

fn sample_signal(symbol: &str, direction: Direction, entry: f64) -> Signal {
    let (stop_loss, take_profit_1, take_profit_2) = match direction {
        Direction::Long => (entry * 0.98, entry * 1.03, entry * 1.06),
        Direction::Short => (entry * 1.02, entry * 0.97, entry * 0.94),
    };
    Signal {
        id: Signal::new_short_id(),
        symbol: symbol.to_string(),
        direction,
        tier: SignalTier::Standard,
        entry_price: entry,
        stop_loss,
        take_profit_1,
        take_profit_2,
        risk_reward_ratio: 3.0,
        recommended_size: 12.5,
        regime: MarketRegime::TrendingUp,
        context: IndicatorContext {
            rsi_4h: 55.0,
            adx_1h: 28.0,
            nearest_pivot: "R1".to_string(),
            nearest_fib: "61.8%".to_string(),
            ..IndicatorContext::default()
        },
        confluence_score: 82,
        confidence_score: 0.82,
        break_even_win_rate: 25.0,
        risk_percent: 2.0,
        reward_percent: 6.0,
        tp1_percent: 3.0,
        tp2_percent: 6.0,
        nearest_level_dist: 0.9,
        validator_score: 78,
        validator_confidence: 70,
        validator_tier: Some(shingo_core::signal::entity::ValidatorTier::Standard),
        validator_reason: "solid confluence".to_string(),
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
    }
}

async fn memory_store() -> SqliteSignalStore {
    SqliteSignalStore::connect("sqlite::memory:")
        .await
        .expect("in-memory store")
}

#[tokio::test]
async fn insert_and_roundtrip_preserves_every_field() {
    let store = memory_store().await;
    let signal = sample_signal("BTCUSDT", Direction::Long, 50000.0);

    let id = store.insert(&signal).await.unwrap();
    assert_eq!(id, signal.id);

    // 1. 反序列化后必须与写入值逐字段相同 (ID 稳定)
    let loaded = store.latest_for_symbol("BTCUSDT").await.unwrap().unwrap();
    assert_eq!(loaded, signal);
}

#[tokio::test]
async fn duplicate_short_id_retries_with_fresh_id() {
    let store = memory_store().await;
    let first = sample_signal("ETHUSDT", Direction::Long, 3000.0);
    store.insert(&first).await.unwrap();

    // 第二条刻意复用同一 ID：存储层必须换新 ID 重试而不是报错
    let mut second = sample_signal("SOLUSDT", Direction::Long, 150.0);
    second.id = first.id.clone();

    let new_id = store.insert(&second).await.unwrap();
    assert_ne!(new_id, first.id);
    assert_eq!(new_id.len(), 5);

    let loaded = store.latest_for_symbol("SOLUSDT").await.unwrap().unwrap();
    assert_eq!(loaded.id, new_id);
}

#[tokio::test]
async fn latest_for_symbol_orders_by_created_at() {
    let store = memory_store().await;

    let mut old = sample_signal("ADAUSDT", Direction::Long, 1.0);
    old.created_at = Utc::now() - Duration::hours(6);
    store.insert(&old).await.unwrap();

    let recent = sample_signal("ADAUSDT", Direction::Long, 1.1);
    store.insert(&recent).await.unwrap();

    let loaded = store.latest_for_symbol("ADAUSDT").await.unwrap().unwrap();
    assert_eq!(loaded.id, recent.id);
}

#[tokio::test]
async fn latest_active_filters_status_and_direction() {
    let store = memory_store().await;

    let mut closed = sample_signal("XRPUSDT", Direction::Long, 1.0);
    closed.status = SignalStatus::Closed;
    closed.closed_at = Some(Utc::now());
    store.insert(&closed).await.unwrap();

    let short = sample_signal("XRPUSDT", Direction::Short, 1.0);
    store.insert(&short).await.unwrap();

    // LONG 只有已关闭的那条：不算 ACTIVE
    assert!(store
        .latest_active("XRPUSDT", Direction::Long)
        .await
        .unwrap()
        .is_none());
    assert!(store
        .latest_active("XRPUSDT", Direction::Short)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn close_transitions_once_and_never_reopens() {
    let store = memory_store().await;
    let signal = sample_signal("LTCUSDT", Direction::Long, 100.0);
    store.insert(&signal).await.unwrap();

    store
        .close(&signal.key(), CloseReason::TpHit, Utc::now(), 6.01)
        .await
        .unwrap();

    let loaded = store.latest_for_symbol("LTCUSDT").await.unwrap().unwrap();
    assert_eq!(loaded.status, SignalStatus::Closed);
    assert_eq!(loaded.close_reason, Some(CloseReason::TpHit));
    assert!((loaded.realized_pnl - 6.01).abs() < 1e-9);
    assert!(loaded.closed_at.is_some());

    // 已关闭的信号不可再次关闭
    let again = store
        .close(&signal.key(), CloseReason::SlHit, Utc::now(), -2.0)
        .await;
    assert!(matches!(again, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn alert_latches_persist() {
    let store = memory_store().await;
    let signal = sample_signal("DOTUSDT", Direction::Long, 10.0);
    store.insert(&signal).await.unwrap();

    store
        .mark_alert_sent(&signal.key(), AlertKind::Reversal, Utc::now())
        .await
        .unwrap();

    let loaded = store.latest_for_symbol("DOTUSDT").await.unwrap().unwrap();
    assert!(loaded.reversal_alert_sent);
    assert!(!loaded.trailing_alert_sent);
    assert!(loaded.last_alert_time.is_some());
}

#[tokio::test]
async fn bulk_close_reports_row_count() {
    let store = memory_store().await;
    store
        .insert(&sample_signal("AUSDT", Direction::Long, 1.0))
        .await
        .unwrap();
    store
        .insert(&sample_signal("BUSDT", Direction::Short, 2.0))
        .await
        .unwrap();

    let closed = store.close_all_active(CloseReason::Manual).await.unwrap();
    assert_eq!(closed, 2);
    assert!(store.all_active().await.unwrap().is_empty());

    // 幂等：再来一次没有可关的行
    assert_eq!(store.close_all_active(CloseReason::Manual).await.unwrap(), 0);
}

#[tokio::test]
async fn closed_since_respects_order_and_limit() {
    let store = memory_store().await;
    let base = Utc::now();

    for (i, symbol) in ["AUSDT", "BUSDT", "CUSDT"].iter().enumerate() {
        let mut signal = sample_signal(symbol, Direction::Long, 1.0);
        signal.status = SignalStatus::Closed;
        signal.close_reason = Some(CloseReason::TpHit);
        signal.closed_at = Some(base + Duration::minutes(i as i64));
        store.insert(&signal).await.unwrap();
    }

    let recent = store
        .closed_since(base - Duration::hours(1), 2)
        .await
        .unwrap();
    assert_eq!(recent.len(), 2);
    // 倒序：最后关闭的排最前
    assert_eq!(recent[0].symbol, "CUSDT");
    assert_eq!(recent[1].symbol, "BUSDT");
}

#[tokio::test]
async fn watchlist_roundtrip_and_validation() {
    let store = SqliteWatchlistStore::connect("sqlite::memory:")
        .await
        .unwrap();

    store.add("btcusdt").await.unwrap();
    assert_eq!(store.symbols().await.unwrap(), vec!["BTCUSDT"]);

    // 计价后缀校验
    assert!(matches!(
        store.add("BTCUSD").await,
        Err(StoreError::Validation(_))
    ));

    store.remove("BTCUSDT").await.unwrap();
    assert!(store.symbols().await.unwrap().is_empty());
}

#[tokio::test]
async fn watchlist_seeding_is_idempotent() {
    let store = SqliteWatchlistStore::connect("sqlite::memory:")
        .await
        .unwrap();

    store.ensure_seeded(DEFAULT_WATCHLIST).await.unwrap();
    let seeded = store.symbols().await.unwrap();
    assert_eq!(seeded.len(), DEFAULT_WATCHLIST.len());

    // 非空时不再播种
    store.remove("BTCUSDT").await.unwrap();
    store.ensure_seeded(DEFAULT_WATCHLIST).await.unwrap();
    assert_eq!(store.symbols().await.unwrap().len(), DEFAULT_WATCHLIST.len() - 1);
}
