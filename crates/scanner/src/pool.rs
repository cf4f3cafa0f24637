use futures::FutureExt;
use shingo_core::signal::entity::Signal;
use shingo_strategy::engine::StrategyEngine;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// 任务队列容量；`add_job` 在队列满时阻塞，形成天然背压。
const JOB_QUEUE_CAPACITY: usize = 100;

/// # Summary
/// 单交易对扫描结果：现价始终上报 (供监控器使用)，信号仅在产出时携带。
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub price: f64,
    pub signal: Option<Signal>,
}

/// # Summary
/// 有界工作池：固定数量的工作协程消费交易对任务，
/// 调用策略引擎并汇聚 `(信号列表, 现价表)`。
///
/// # Invariants
/// - 池为单周期一次性对象：`wait` 消费自身，每周期构造新池。
/// - 结果无顺序保证，消费方必须与顺序无关。
/// - 单任务 panic 在任务边界恢复，不影响其它任务；
///   工作协程 panic 在 join 边界恢复，不阻塞 `wait` 返回。
pub struct WorkerPool {
    jobs_tx: mpsc::Sender<String>,
    results_rx: mpsc::UnboundedReceiver<ScanResult>,
    workers: JoinSet<()>,
}

impl WorkerPool {
    /// # Summary
    /// 构造并立即启动 `workers` 个工作协程。
    ///
    /// # Arguments
    /// * `workers`: 并行度 (最小 1)。
    /// * `engine`: 共享的策略引擎。
    pub fn new(workers: usize, engine: Arc<StrategyEngine>) -> Self {
        let (jobs_tx, jobs_rx) = mpsc::channel::<String>(JOB_QUEUE_CAPACITY);
        // 结果通道无界：发布永不阻塞，wait 统一收割
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let jobs_rx = Arc::new(Mutex::new(jobs_rx));

        let mut set = JoinSet::new();
        let count = workers.max(1);
        for id in 0..count {
            set.spawn(worker_loop(
                id,
                engine.clone(),
                jobs_rx.clone(),
                results_tx.clone(),
            ));
        }
        debug!(workers = count, "worker pool started");

        Self {
            jobs_tx,
            results_rx,
            workers: set,
        }
    }

    /// # Summary
    /// 入队一个交易对任务；队列满时挂起等待。
    pub async fn add_job(&self, symbol: String) {
        if self.jobs_tx.send(symbol).await.is_err() {
            warn!("job queue closed before add_job");
        }
    }

    /// # Summary
    /// 关闭任务队列，等待全部工作协程排空并汇聚结果。
    ///
    /// # Logic
    /// 1. 丢弃发送端关闭队列，工作协程消费完后自然退出。
    /// 2. 在 join 边界回收协程级 panic。
    /// 3. 排空结果通道，按符号聚合现价并收集信号。
    ///
    /// # Returns
    /// `(信号列表, 符号到现价的映射)`。
    pub async fn wait(mut self) -> (Vec<Signal>, HashMap<String, f64>) {
        drop(self.jobs_tx);

        while let Some(joined) = self.workers.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    error!("worker task panicked at join boundary");
                }
            }
        }

        let mut signals = Vec::new();
        let mut prices = HashMap::new();
        while let Some(result) = self.results_rx.recv().await {
            if result.price > 0.0 {
                prices.insert(result.symbol.clone(), result.price);
            }
            if let Some(signal) = result.signal {
                signals.push(signal);
            }
        }

        info!(
            signals = signals.len(),
            prices = prices.len(),
            "worker pool drained"
        );
        (signals, prices)
    }
}

/// # Summary
/// 工作协程主循环：逐个消费任务直到队列关闭。
///
/// # Logic
/// 1. 从共享接收端取任务；队列关闭时退出。
/// 2. 评估调用包裹在 `catch_unwind` 中：panic 记录后跳到下一个任务。
/// 3. 评估错误仅丢弃该交易对，不上抛。
async fn worker_loop(
    id: usize,
    engine: Arc<StrategyEngine>,
    jobs: Arc<Mutex<mpsc::Receiver<String>>>,
    results: mpsc::UnboundedSender<ScanResult>,
) {
    loop {
        let symbol = {
            let mut rx = jobs.lock().await;
            rx.recv().await
        };
        let Some(symbol) = symbol else { break };

        debug!(worker = id, %symbol, "processing");

        let outcome = AssertUnwindSafe(engine.evaluate_symbol(&symbol))
            .catch_unwind()
            .await;

        match outcome {
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(worker = id, %symbol, panic = %message, "panic recovered in job");
            }
            Ok(Err(e)) => {
                warn!(worker = id, %symbol, error = %e, "evaluation failed");
            }
            Ok(Ok(eval)) => {
                let found = eval.signal.is_some();
                let _ = results.send(ScanResult {
                    symbol: symbol.clone(),
                    price: eval.price,
                    signal: eval.signal,
                });
                if found {
                    info!(worker = id, %symbol, "signal found");
                }
            }
        }
    }
    debug!(worker = id, "worker drained");
}
