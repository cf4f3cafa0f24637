use shingo_core::market::error::MarketError;
use thiserror::Error;

/// # Summary
/// 策略评估错误枚举。
///
/// # Invariants
/// - 数据不足不是错误：引擎返回无信号的成功结果。
#[derive(Error, Debug)]
pub enum StrategyError {
    /// 上游行情获取失败
    #[error("Market error: {0}")]
    Market(#[from] MarketError),
}
