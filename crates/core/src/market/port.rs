use crate::common::TimeFrame;
use crate::market::entity::Candle;
use crate::market::error::MarketError;
use async_trait::async_trait;

/// # Summary
/// 市场行情数据提供者接口。
///
/// # Invariants
/// - 必须实现 `Send` 和 `Sync` 以支持跨线程异步调用。
/// - 返回的 K 线按时间升序排列，最后一根为最新。
/// - 不满足 OHLC 约束的行必须在适配器内部丢弃。
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// # Summary
    /// 获取特定交易对最近 `limit` 根 K 线。
    ///
    /// # Logic
    /// 1. 构建数据源请求并在截止时间内执行。
    /// 2. 逐行解析响应，丢弃畸形行并告警。
    /// 3. 若解析后无任何有效行，整次请求视为失败。
    ///
    /// # Arguments
    /// * `symbol`: 交易对代码 (例如: BTCUSDT)。
    /// * `timeframe`: K 线周期。
    /// * `limit`: 请求的 K 线数量上限。
    ///
    /// # Returns
    /// 成功则返回 K 线列表，失败返回 `MarketError`。
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketError>;
}
