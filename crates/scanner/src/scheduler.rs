use crate::gate::{CooldownGate, GateDecision};
use crate::message;
use crate::monitor::SignalMonitor;
use crate::pool::WorkerPool;
use futures::FutureExt;
use shingo_core::config::AppConfig;
use shingo_core::notify::port::Notifier;
use shingo_core::store::port::{SignalStore, WatchlistStore};
use shingo_core::validate::port::SignalValidator;
use shingo_strategy::engine::StrategyEngine;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// # Summary
/// 单周期汇总，用于周期结束时的一条结论日志。
#[derive(Debug, Default)]
struct CycleSummary {
    scanned: usize,
    candidates: usize,
    after_cooldown: usize,
    after_validation: usize,
    persisted: usize,
}

/// # Summary
/// 周期调度器：固定间隔驱动完整扫描周期，
/// 保证任意时刻至多一个周期在途。
///
/// # Invariants
/// - `in_cycle` 为真时落下的 tick 被丢弃 (带日志)，不排队。
/// - 周期内任何 panic 在任务启动边界恢复并释放 `in_cycle`。
/// - 单周期内：候选信号与价格快照来自同一轮抓取；
///   验证一次性观察整批幸存者；持久化与通知逐信号串行。
pub struct Scanner {
    cfg: AppConfig,
    engine: Arc<StrategyEngine>,
    signal_store: Arc<dyn SignalStore>,
    watchlist: Arc<dyn WatchlistStore>,
    validator: Arc<dyn SignalValidator>,
    notifier: Arc<dyn Notifier>,
    monitor: SignalMonitor,
    gate: CooldownGate,
    in_cycle: AtomicBool,
}

impl Scanner {
    pub fn new(
        cfg: AppConfig,
        engine: Arc<StrategyEngine>,
        signal_store: Arc<dyn SignalStore>,
        watchlist: Arc<dyn WatchlistStore>,
        validator: Arc<dyn SignalValidator>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        let monitor = SignalMonitor::new(signal_store.clone(), notifier.clone());
        let gate = CooldownGate::new(
            signal_store.clone(),
            cfg.cooldown,
            cfg.strategy.scale_in_pct,
        );
        Arc::new(Self {
            cfg,
            engine,
            signal_store,
            watchlist,
            validator,
            notifier,
            monitor,
            gate,
            in_cycle: AtomicBool::new(false),
        })
    }

    /// # Summary
    /// 启动周期定时器。返回的句柄可被 abort 以停止后续 tick；
    /// 在途周期由 `wait_for_idle` 收尾。
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(this.cfg.poll_interval);
            info!(interval = ?this.cfg.poll_interval, "scheduler started");

            loop {
                ticker.tick().await;

                // 重入保护：上一周期未结束则丢弃本次 tick
                if !this.begin_cycle() {
                    warn!("skipping cycle: previous poll still running");
                    continue;
                }

                let cycle = this.clone();
                tokio::spawn(async move {
                    let outcome = AssertUnwindSafe(cycle.poll_cycle()).catch_unwind().await;
                    if outcome.is_err() {
                        error!("panic recovered in poll cycle");
                    }
                    cycle.end_cycle();
                });
            }
        })
    }

    /// 尝试占用周期槽位；已有周期在途时返回 `false`。
    pub fn begin_cycle(&self) -> bool {
        !self.in_cycle.swap(true, Ordering::SeqCst)
    }

    /// 释放周期槽位。
    pub fn end_cycle(&self) {
        self.in_cycle.store(false, Ordering::SeqCst);
    }

    /// # Summary
    /// 等待在途周期结束，用于优雅停机。
    ///
    /// # Returns
    /// 预算内空闲返回 `true`；超时返回 `false` (调用方强制退出)。
    pub async fn wait_for_idle(&self, budget: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + budget;
        while self.in_cycle.load(Ordering::SeqCst) {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        true
    }

    /// # Summary
    /// 执行一个完整扫描周期。
    ///
    /// # Logic
    /// 1. 读取关注列表；为空则记录并返回。
    /// 2. 构造一次性工作池，分发全部交易对并等待汇聚。
    /// 3. 用本轮价格快照触发搭车监控。
    /// 4. 候选信号依次过冷却/去重闸门。
    /// 5. 幸存者整批送外部验证。
    /// 6. 双阈值过滤 (验证分与汇合分均须超过阈值)，
    ///    合并裁决字段后持久化并通知。
    /// 7. 输出周期汇总。
    pub async fn poll_cycle(&self) {
        info!("polling cycle started");

        let symbols = match self.watchlist.symbols().await {
            Ok(symbols) => symbols,
            Err(e) => {
                error!(error = %e, "failed to fetch watchlist");
                return;
            }
        };
        if symbols.is_empty() {
            warn!("watchlist is empty, nothing to scan");
            return;
        }

        let mut summary = CycleSummary {
            scanned: symbols.len(),
            ..CycleSummary::default()
        };

        // 每周期一个全新的池实例
        let pool = WorkerPool::new(self.cfg.worker_count, self.engine.clone());
        for symbol in &symbols {
            pool.add_job(symbol.clone()).await;
        }
        let (signals, prices) = pool.wait().await;
        summary.candidates = signals.len();

        // 搭车监控：复用本轮抓到的最新收盘价
        if !prices.is_empty() {
            self.monitor.check_prices(&prices).await;
        }

        if signals.is_empty() {
            self.log_summary(&summary);
            return;
        }

        // 冷却/去重过滤
        let mut survivors = Vec::new();
        for signal in signals {
            match self.gate.admit(&signal).await {
                GateDecision::Admit => survivors.push(signal),
                GateDecision::Cooldown { remaining } => {
                    debug!(
                        symbol = %signal.symbol,
                        remaining_minutes = remaining.num_minutes(),
                        "suppressed by cooldown"
                    );
                }
                GateDecision::DuplicateEntry { diff_pct } => {
                    debug!(
                        symbol = %signal.symbol,
                        diff_pct,
                        "suppressed by active duplicate"
                    );
                }
            }
        }
        summary.after_cooldown = survivors.len();

        if survivors.is_empty() {
            self.log_summary(&summary);
            return;
        }

        // 整批外部验证
        info!(count = survivors.len(), "batch validating survivors");
        let verdicts = match self.validator.batch_validate(&survivors).await {
            Ok(verdicts) => verdicts,
            Err(e) => {
                error!(error = %e, "batch validation failed");
                self.log_summary(&summary);
                return;
            }
        };

        let threshold = self.cfg.strategy.min_confluence_score;
        for (mut signal, verdict) in survivors.into_iter().zip(verdicts) {
            // 双阈值：两个分数都必须严格超过
            if verdict.score <= threshold || signal.confluence_score <= threshold {
                debug!(
                    symbol = %signal.symbol,
                    validator = verdict.score,
                    confluence = signal.confluence_score,
                    "rejected by score thresholds"
                );
                continue;
            }
            summary.after_validation += 1;

            signal.validator_score = verdict.score;
            signal.validator_confidence = verdict.confidence;
            signal.validator_tier = Some(verdict.tier);
            signal.validator_reason = verdict.reason;

            match self.signal_store.insert(&signal).await {
                Ok(id) => signal.id = id,
                Err(e) => {
                    warn!(symbol = %signal.symbol, error = %e, "failed to persist signal");
                    continue;
                }
            }

            let (subject, content) = message::new_signal(&signal);
            if let Err(e) = self.notifier.notify(&subject, &content).await {
                warn!(symbol = %signal.symbol, error = %e, "failed to notify signal");
                continue;
            }

            summary.persisted += 1;
        }

        self.log_summary(&summary);
    }

    fn log_summary(&self, summary: &CycleSummary) {
        info!(
            scanned = summary.scanned,
            candidates = summary.candidates,
            after_cooldown = summary.after_cooldown,
            after_validation = summary.after_validation,
            persisted = summary.persisted,
            "polling cycle complete"
        );
    }
}
