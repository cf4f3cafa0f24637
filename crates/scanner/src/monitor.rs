use crate::message;
use chrono::{Duration, Utc};
use shingo_core::notify::port::Notifier;
use shingo_core::signal::entity::{AlertKind, CloseReason, Direction, Signal};
use shingo_core::store::port::SignalStore;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 反转预警仅在建仓后的观察窗口内有效。
const REVERSAL_WINDOW_MINUTES: i64 = 5;

/// # Summary
/// 在线信号监控器：用扫描周期顺带产出的现价表
/// 重估全部 ACTIVE 信号 (搭车监控，不做二次抓取)。
///
/// # Invariants
/// - 在调度器线程内、`wait` 之后调用，观察到的是稳定的价格快照。
/// - 终态转换 (TP/SL) 互斥且不可逆；提醒类事件由锁存标记保证至多一次。
pub struct SignalMonitor {
    store: Arc<dyn SignalStore>,
    notifier: Arc<dyn Notifier>,
}

impl SignalMonitor {
    pub fn new(store: Arc<dyn SignalStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// # Summary
    /// 遍历全部 ACTIVE 信号，对拥有新鲜价格的逐一评估转换。
    ///
    /// # Logic
    /// 1. 读取 ACTIVE 信号；存储故障记录后放弃本轮监控。
    /// 2. 价格表中没有对应符号的信号跳过。
    /// 3. 存储更新逐信号串行执行。
    pub async fn check_prices(&self, prices: &HashMap<String, f64>) {
        let signals = match self.store.all_active().await {
            Ok(signals) => signals,
            Err(e) => {
                error!(error = %e, "failed to fetch active signals");
                return;
            }
        };

        if signals.is_empty() {
            return;
        }
        debug!(count = signals.len(), "monitoring active signals");

        for signal in &signals {
            if let Some(price) = prices.get(&signal.symbol) {
                self.check_signal(signal, *price).await;
            }
        }
    }

    /// # Summary
    /// 单信号状态机：终态判定优先，其次一次性提醒。
    ///
    /// # Logic
    /// 1. LONG: `price >= TP2` 关闭为 TP_HIT；`price <= SL` 关闭为 SL_HIT。
    ///    SHORT 镜像。关闭时按方向计算已实现盈亏。
    /// 2. 建仓 5 分钟内不利波动落在 [1%, 2%) 且未锁存 → 反转预警。
    /// 3. 有利波动落在 [3%, 6%) 且未锁存 → 移动止损建议
    ///    (3% 推保本，≥ 4% 锁定 2%)。
    async fn check_signal(&self, signal: &Signal, price: f64) {
        let (tp_hit, sl_hit) = match signal.direction {
            Direction::Long => (price >= signal.take_profit_2, price <= signal.stop_loss),
            Direction::Short => (price <= signal.take_profit_2, price >= signal.stop_loss),
        };

        if tp_hit {
            let pnl = signal.pnl_percent_at(price);
            self.close_signal(signal, CloseReason::TpHit, pnl).await;
            let (subject, content) = message::take_profit_hit(signal, price, pnl);
            self.send(&subject, &content).await;
            self.latch(signal, AlertKind::TakeProfit).await;
            return;
        }

        if sl_hit {
            let pnl = signal.pnl_percent_at(price);
            self.close_signal(signal, CloseReason::SlHit, pnl).await;
            let (subject, content) = message::stop_loss_hit(signal, price, pnl);
            self.send(&subject, &content).await;
            self.latch(signal, AlertKind::StopLoss).await;
            return;
        }

        let move_pct = signal.pnl_percent_at(price);

        // 反转预警：建仓初期的不利波动，到达止损前的最后窗口
        let age = Utc::now() - signal.created_at;
        let adverse = -move_pct;
        if !signal.reversal_alert_sent
            && age < Duration::minutes(REVERSAL_WINDOW_MINUTES)
            && (1.0..2.0).contains(&adverse)
        {
            let (subject, content) = message::reversal_warning(signal, price, adverse);
            self.send(&subject, &content).await;
            self.latch(signal, AlertKind::Reversal).await;
            info!(symbol = %signal.symbol, adverse, "reversal warning sent");
        }

        // 移动止损建议：3% 推保本，4% 起锁定 2%
        if !signal.trailing_alert_sent && (3.0..6.0).contains(&move_pct) {
            let new_stop = if move_pct >= 4.0 {
                match signal.direction {
                    Direction::Long => signal.entry_price * 1.02,
                    Direction::Short => signal.entry_price * 0.98,
                }
            } else {
                signal.entry_price
            };
            let (subject, content) = message::trailing_suggestion(signal, move_pct, new_stop);
            self.send(&subject, &content).await;
            self.latch(signal, AlertKind::Trailing).await;
            info!(symbol = %signal.symbol, profit = move_pct, "trailing stop suggestion sent");
        }
    }

    async fn close_signal(&self, signal: &Signal, reason: CloseReason, pnl: f64) {
        if let Err(e) = self
            .store
            .close(&signal.key(), reason, Utc::now(), pnl)
            .await
        {
            error!(symbol = %signal.symbol, error = %e, "failed to close signal");
            return;
        }
        info!(symbol = %signal.symbol, %reason, pnl, "signal closed");
    }

    async fn latch(&self, signal: &Signal, kind: AlertKind) {
        if let Err(e) = self
            .store
            .mark_alert_sent(&signal.key(), kind, Utc::now())
            .await
        {
            warn!(symbol = %signal.symbol, error = %e, "failed to latch alert flag");
        }
    }

    async fn send(&self, subject: &str, content: &str) {
        if let Err(e) = self.notifier.notify(subject, content).await {
            warn!(error = %e, "failed to send alert");
        }
    }
}
