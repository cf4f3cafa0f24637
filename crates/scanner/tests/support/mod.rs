#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use shingo_core::common::TimeFrame;
use shingo_core::config::{AppConfig, StrategyConfig};
use shingo_core::market::entity::Candle;
use shingo_core::market::error::MarketError;
use shingo_core::market::port::MarketDataProvider;
use shingo_core::notify::error::NotifyError;
use shingo_core::notify::port::Notifier;
use shingo_core::signal::entity::{
    AlertKind, CloseReason, Direction, IndicatorContext, MarketRegime, Signal, SignalKey,
    SignalStatus, SignalTier, ValidatorTier,
};
use shingo_core::store::error::StoreError;
use shingo_core::store::port::{SignalStore, WatchlistStore};
use shingo_core::validate::entity::Verdict;
use shingo_core::validate::error::ValidateError;
use shingo_core::validate::port::SignalValidator;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

/// 内存信号存储：按端口语义实现，供闸门/监控/周期测试使用。
#[derive(Default)]
pub struct MemorySignalStore {
    pub signals: Mutex<Vec<Signal>>,
}

impl MemorySignalStore {
    pub fn with(signals: Vec<Signal>) -> Self {
        Self {
            signals: Mutex::new(signals),
        }
    }

    pub fn snapshot(&self) -> Vec<Signal> {
        self.signals.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignalStore for MemorySignalStore {
    async fn insert(&self, signal: &Signal) -> Result<String, StoreError> {
        self.signals.lock().unwrap().push(signal.clone());
        Ok(signal.id.clone())
    }

    async fn latest_for_symbol(&self, symbol: &str) -> Result<Option<Signal>, StoreError> {
        Ok(self
            .signals
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.symbol == symbol)
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn latest_active(
        &self,
        symbol: &str,
        direction: Direction,
    ) -> Result<Option<Signal>, StoreError> {
        Ok(self
            .signals
            .lock()
            .unwrap()
            .iter()
            .filter(|s| {
                s.symbol == symbol && s.direction == direction && s.status == SignalStatus::Active
            })
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn all_active(&self) -> Result<Vec<Signal>, StoreError> {
        Ok(self
            .signals
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.status == SignalStatus::Active)
            .cloned()
            .collect())
    }

    async fn created_since(&self, t: DateTime<Utc>) -> Result<Vec<Signal>, StoreError> {
        Ok(self
            .signals
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.created_at >= t)
            .cloned()
            .collect())
    }

    async fn closed_since(&self, t: DateTime<Utc>, limit: u32) -> Result<Vec<Signal>, StoreError> {
        let mut closed: Vec<Signal> = self
            .signals
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.closed_at.map(|c| c >= t).unwrap_or(false))
            .cloned()
            .collect();
        closed.sort_by_key(|s| std::cmp::Reverse(s.closed_at));
        closed.truncate(limit as usize);
        Ok(closed)
    }

    async fn close(
        &self,
        key: &SignalKey,
        reason: CloseReason,
        closed_at: DateTime<Utc>,
        pnl: f64,
    ) -> Result<(), StoreError> {
        let mut signals = self.signals.lock().unwrap();
        for signal in signals.iter_mut() {
            if signal.symbol == key.symbol
                && signal.direction == key.direction
                && signal.created_at == key.created_at
                && signal.status == SignalStatus::Active
            {
                signal.status = SignalStatus::Closed;
                signal.close_reason = Some(reason);
                signal.closed_at = Some(closed_at);
                signal.realized_pnl = pnl;
                return Ok(());
            }
        }
        Err(StoreError::NotFound)
    }

    async fn mark_alert_sent(
        &self,
        key: &SignalKey,
        kind: AlertKind,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut signals = self.signals.lock().unwrap();
        for signal in signals.iter_mut() {
            if signal.symbol == key.symbol
                && signal.direction == key.direction
                && signal.created_at == key.created_at
            {
                match kind {
                    AlertKind::TakeProfit => signal.tp_alert_sent = true,
                    AlertKind::StopLoss => signal.sl_alert_sent = true,
                    AlertKind::Reversal => signal.reversal_alert_sent = true,
                    AlertKind::Trailing => signal.trailing_alert_sent = true,
                }
                signal.last_alert_time = Some(at);
                return Ok(());
            }
        }
        Err(StoreError::NotFound)
    }

    async fn close_all_active(&self, reason: CloseReason) -> Result<u64, StoreError> {
        let mut signals = self.signals.lock().unwrap();
        let mut count = 0;
        let now = Utc::now();
        for signal in signals.iter_mut() {
            if signal.status == SignalStatus::Active {
                signal.status = SignalStatus::Closed;
                signal.close_reason = Some(reason);
                signal.closed_at = Some(now);
                count += 1;
            }
        }
        Ok(count)
    }
}

/// 固定符号列表的关注列表桩。
pub struct StaticWatchlist(pub Vec<String>);

#[async_trait]
impl WatchlistStore for StaticWatchlist {
    async fn symbols(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.0.clone())
    }
    async fn add(&self, _symbol: &str) -> Result<(), StoreError> {
        Ok(())
    }
    async fn remove(&self, _symbol: &str) -> Result<(), StoreError> {
        Ok(())
    }
    async fn ensure_seeded(&self, _defaults: &[&str]) -> Result<(), StoreError> {
        Ok(())
    }
}

/// 固定分数的验证器桩：给每个候选同样的裁决。
pub struct ScriptedValidator {
    pub score: u8,
}

#[async_trait]
impl SignalValidator for ScriptedValidator {
    async fn batch_validate(&self, candidates: &[Signal]) -> Result<Vec<Verdict>, ValidateError> {
        Ok(candidates
            .iter()
            .map(|_| Verdict {
                score: self.score,
                confidence: 80,
                tier: ValidatorTier::from_score(self.score),
                reason: "scripted".to_string(),
            })
            .collect())
    }
}

/// 记录全部消息的通知桩。
#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn subjects(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|(subject, _)| subject.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        self.messages
            .lock()
            .unwrap()
            .push((subject.to_string(), content.to_string()));
        Ok(())
    }
}

/// 行情桩：默认返回轻微锯齿数据；遇到指定符号时 panic，
/// 用于验证工作池的任务级恢复。
pub struct ZigzagProvider {
    pub panic_on: Option<String>,
}

#[async_trait]
impl MarketDataProvider for ZigzagProvider {
    async fn fetch_candles(
        &self,
        symbol: &str,
        _timeframe: TimeFrame,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketError> {
        if self.panic_on.as_deref() == Some(symbol) {
            panic!("injected panic for {}", symbol);
        }

        let base = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        Ok((0..limit.min(200))
            .map(|i| {
                let close = 100.0 + if i % 2 == 0 { 0.1 } else { -0.1 };
                let open = 100.0 - if i % 2 == 0 { 0.1 } else { -0.1 };
                Candle {
                    open_time: base + Duration::minutes(i as i64 * 5),
                    open,
                    high: open.max(close) + 0.05,
                    low: open.min(close) - 0.05,
                    close,
                    volume: 100.0,
                    close_time: base + Duration::minutes(i as i64 * 5 + 5),
                }
            })
            .collect())
    }
}

/// 构造一条可控的 ACTIVE 测试信号。
pub fn make_signal(symbol: &str, direction: Direction, entry: f64, created_at: DateTime<Utc>) -> Signal {
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
        recommended_size: 10.0,
        regime: MarketRegime::TrendingUp,
        context: IndicatorContext::default(),
        confluence_score: 75,
        confidence_score: 0.75,
        break_even_win_rate: 25.0,
        risk_percent: 2.0,
        reward_percent: 6.0,
        tp1_percent: 3.0,
        tp2_percent: 6.0,
        nearest_level_dist: 1.0,
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
        created_at,
        closed_at: None,
    }
}

/// 测试用应用配置。
pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        market_base_url: "http://localhost".to_string(),
        validator_api_keys: vec!["test-key".to_string()],
        validator_models: vec!["test-model".to_string()],
        telegram_bot_token: "token".to_string(),
        telegram_chat_id: "chat".to_string(),
        poll_interval: StdDuration::from_secs(60),
        worker_count: 4,
        cooldown: StdDuration::from_secs(4 * 3600),
        strategy: StrategyConfig::default(),
    }
}
