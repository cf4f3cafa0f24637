use super::error::StoreError;
use crate::signal::entity::{AlertKind, CloseReason, Direction, Signal, SignalKey};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// # Summary
/// 信号持久化接口，负责信号及其生命周期的存取。
///
/// # Invariants
/// - 所有读操作必须有时间上限。
/// - 写操作均为单行更新，不依赖跨行事务；
///   "同 (symbol, direction) 至多一条 ACTIVE" 的约束由冷却/去重闸门保证。
#[async_trait]
pub trait SignalStore: Send + Sync {
    /// # Summary
    /// 插入新信号。
    ///
    /// # Logic
    /// 短 ID 冲突时生成新 ID 重试，重试次数有界。
    ///
    /// # Arguments
    /// * `signal`: 待持久化的信号。
    ///
    /// # Returns
    /// 成功返回最终写入的 ID。
    async fn insert(&self, signal: &Signal) -> Result<String, StoreError>;

    /// # Summary
    /// 按 `created_at` 倒序取指定交易对最近一条信号 (任意状态)。
    async fn latest_for_symbol(&self, symbol: &str) -> Result<Option<Signal>, StoreError>;

    /// # Summary
    /// 按 `created_at` 倒序取指定 (symbol, direction) 最近一条 ACTIVE 信号。
    async fn latest_active(
        &self,
        symbol: &str,
        direction: Direction,
    ) -> Result<Option<Signal>, StoreError>;

    /// # Summary
    /// 取全部 ACTIVE 信号。
    async fn all_active(&self) -> Result<Vec<Signal>, StoreError>;

    /// # Summary
    /// 取 `created_at >= t` 的全部信号。
    async fn created_since(&self, t: DateTime<Utc>) -> Result<Vec<Signal>, StoreError>;

    /// # Summary
    /// 取 `closed_at >= t` 的信号，按 `closed_at` 倒序，数量受 `limit` 约束。
    async fn closed_since(
        &self,
        t: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<Signal>, StoreError>;

    /// # Summary
    /// 关闭指定信号：写入状态、关闭原因、关闭时间与已实现盈亏。
    ///
    /// # Invariants
    /// - 仅作用于 `key` 定位到的 ACTIVE 信号；已关闭的信号不受影响。
    async fn close(
        &self,
        key: &SignalKey,
        reason: CloseReason,
        closed_at: DateTime<Utc>,
        pnl: f64,
    ) -> Result<(), StoreError>;

    /// # Summary
    /// 锁存一次性提醒标记，保证跨周期至多触发一次。
    async fn mark_alert_sent(
        &self,
        key: &SignalKey,
        kind: AlertKind,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// # Summary
    /// 以给定原因批量关闭全部 ACTIVE 信号 (运维重置)。
    ///
    /// # Returns
    /// 实际关闭的行数。
    async fn close_all_active(&self, reason: CloseReason) -> Result<u64, StoreError>;
}

/// # Summary
/// 关注列表持久化接口。
///
/// # Invariants
/// - 交易对必须为大写且以数据源接受的计价后缀结尾。
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// 返回当前激活的交易对列表。
    async fn symbols(&self) -> Result<Vec<String>, StoreError>;

    /// # Summary
    /// 将交易对加入关注列表 (Upsert，保留首次加入时间)。
    async fn add(&self, symbol: &str) -> Result<(), StoreError>;

    /// 将交易对从关注列表移除。
    async fn remove(&self, symbol: &str) -> Result<(), StoreError>;

    /// # Summary
    /// 关注列表为空时写入默认交易对集合。
    async fn ensure_seeded(&self, defaults: &[&str]) -> Result<(), StoreError>;
}
