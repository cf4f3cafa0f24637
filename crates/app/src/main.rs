use shingo_core::config::{AppConfig, DEFAULT_WATCHLIST};
use shingo_core::market::port::MarketDataProvider;
use shingo_core::notify::port::Notifier;
use shingo_core::store::port::{SignalStore, WatchlistStore};
use shingo_core::validate::port::SignalValidator;
use shingo_feed::binance::BinanceProvider;
use shingo_notify::telegram::TelegramNotifier;
use shingo_scanner::scheduler::Scanner;
use shingo_store::signal::SqliteSignalStore;
use shingo_store::watchlist::SqliteWatchlistStore;
use shingo_strategy::engine::StrategyEngine;
use shingo_validator::gemini::GeminiValidator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// 优雅停机预算：在途周期超过该时长则强制退出。
const SHUTDOWN_BUDGET: Duration = Duration::from_secs(30);

/// # Summary
/// 应用启动入口，纯粹的 DI 容器。
/// 负责实例化所有具体适配器并通过 Arc<dyn Trait> 注入扫描器。
///
/// # Logic
/// 1. 初始化全局日志。
/// 2. 加载环境配置；必填项缺失以退出码 1 终止。
/// 3. 实例化基础设施层 (Feed、Store、Notify、Validator)。
/// 4. 实例化领域层 (策略引擎) 与应用层 (扫描调度器)。
/// 5. 挂起等待终止信号；30 秒预算内完成在途周期后退出。
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    info!("Shingo scanner starting...");

    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "configuration error");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cfg).await {
        error!(error = %e, "startup failed");
        std::process::exit(1);
    }
}

async fn run(cfg: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    // 基础设施层
    let market: Arc<dyn MarketDataProvider> =
        Arc::new(BinanceProvider::new(cfg.market_base_url.clone()));

    let signal_store: Arc<dyn SignalStore> =
        Arc::new(SqliteSignalStore::connect(&cfg.database_url).await?);
    let watchlist: Arc<dyn WatchlistStore> =
        Arc::new(SqliteWatchlistStore::connect(&cfg.database_url).await?);
    watchlist.ensure_seeded(DEFAULT_WATCHLIST).await?;

    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
        cfg.telegram_bot_token.clone(),
        cfg.telegram_chat_id.clone(),
    )?);

    let validator: Arc<dyn SignalValidator> = Arc::new(GeminiValidator::new(
        cfg.validator_api_keys.clone(),
        cfg.validator_models.clone(),
    )?);

    // 领域层
    let engine = Arc::new(StrategyEngine::new(market, cfg.strategy.clone()));

    // 应用层
    let scanner = Scanner::new(cfg, engine, signal_store, watchlist, validator, notifier);
    let scheduler = scanner.start();

    info!("all services initialized, scanner running");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    // 停止后续 tick，在途周期在预算内收尾
    scheduler.abort();
    if !scanner.wait_for_idle(SHUTDOWN_BUDGET).await {
        warn!("shutdown budget exceeded, forcing exit");
        std::process::exit(1);
    }

    info!("graceful shutdown complete");
    Ok(())
}
