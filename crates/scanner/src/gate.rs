use chrono::{Duration, Utc};
use shingo_core::signal::entity::Signal;
use shingo_core::store::port::SignalStore;
use std::sync::Arc;
use tracing::warn;

/// # Summary
/// 闸门裁决结果。
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// 放行
    Admit,
    /// 冷却窗口内，剩余时长
    Cooldown { remaining: Duration },
    /// 同向 ACTIVE 信号入场价过近
    DuplicateEntry { diff_pct: f64 },
}

/// # Summary
/// 冷却/去重闸门：按顺序执行两个只读谓词。
///
/// # Invariants
/// - 存储错误时放行并告警：验证器是最终权威，
///   宁可误放也不误杀。
pub struct CooldownGate {
    store: Arc<dyn SignalStore>,
    cooldown: Duration,
    scale_in_pct: f64,
}

impl CooldownGate {
    /// # Arguments
    /// * `store`: 信号存储。
    /// * `cooldown`: 单交易对冷却窗口。
    /// * `scale_in_pct`: 加仓例外的最小入场价偏移 (百分比)。
    pub fn new(store: Arc<dyn SignalStore>, cooldown: std::time::Duration, scale_in_pct: f64) -> Self {
        Self {
            store,
            cooldown: Duration::from_std(cooldown).unwrap_or_else(|_| Duration::hours(4)),
            scale_in_pct,
        }
    }

    /// # Summary
    /// 裁决单个候选信号。
    ///
    /// # Logic
    /// 1. 冷却：该交易对最近一条信号距今不足窗口则压制。
    /// 2. 去重：同 (symbol, direction) 的最近 ACTIVE 信号入场价
    ///    偏差不超过 `scale_in_pct` 则压制；超过视为加仓放行。
    pub async fn admit(&self, candidate: &Signal) -> GateDecision {
        match self.store.latest_for_symbol(&candidate.symbol).await {
            Ok(Some(last)) => {
                let elapsed = Utc::now() - last.created_at;
                if elapsed < self.cooldown {
                    return GateDecision::Cooldown {
                        remaining: self.cooldown - elapsed,
                    };
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(symbol = %candidate.symbol, error = %e, "cooldown check failed, admitting");
            }
        }

        match self
            .store
            .latest_active(&candidate.symbol, candidate.direction)
            .await
        {
            Ok(Some(existing)) => {
                let diff_pct = (existing.entry_price - candidate.entry_price).abs()
                    / existing.entry_price
                    * 100.0;
                if diff_pct <= self.scale_in_pct {
                    return GateDecision::DuplicateEntry { diff_pct };
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(symbol = %candidate.symbol, error = %e, "duplicate check failed, admitting");
            }
        }

        GateDecision::Admit
    }
}
