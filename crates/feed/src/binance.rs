use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde_json::Value;
use shingo_core::common::TimeFrame;
use shingo_core::market::entity::Candle;
use shingo_core::market::error::MarketError;
use shingo_core::market::port::MarketDataProvider;
use std::time::Duration;
use tracing::{debug, warn};

/// 行情请求的统一截止时间。
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// # Summary
/// Binance 风格 K 线接口的行情提供者实现。
///
/// # Invariants
/// - 使用 `reqwest` 异步客户端进行通讯，固定 10 秒超时。
/// - 畸形行在解析层丢弃；整批无有效行时视为请求失败。
pub struct BinanceProvider {
    // 数据源基础 URL
    base_url: String,
    // 内部使用的 HTTP 客户端
    client: Client,
}

impl BinanceProvider {
    /// # Summary
    /// 创建一个新的 BinanceProvider 实例。
    ///
    /// # Logic
    /// 1. 配置 10 秒请求超时。
    /// 2. 初始化 reqwest 客户端。
    ///
    /// # Arguments
    /// * `base_url`: 数据源基础 URL (例如: https://api.binance.com)。
    ///
    /// # Returns
    /// 返回初始化后的 BinanceProvider。
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    /// # Summary
    /// 抓取 `/api/v3/klines` 并逐行解析为 Candle。
    ///
    /// # Logic
    /// 1. 按 `(symbol, interval, limit)` 构建请求并执行。
    /// 2. 响应为数组的数组；逐行经 `parse_kline_row` 解析，
    ///    畸形行丢弃并告警。
    /// 3. 全部行无效时返回 `MarketError::Empty`。
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketError> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url, symbol, timeframe, limit
        );
        debug!(symbol, %timeframe, limit, "fetching klines");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MarketError::Upstream(format!("{}: {}", status, body)));
        }

        let rows: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| MarketError::Parse(e.to_string()))?;

        let mut candles = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            match parse_kline_row(row) {
                Some(candle) => candles.push(candle),
                None => {
                    warn!(symbol, idx, "skipping malformed kline row");
                }
            }
        }

        if candles.is_empty() {
            return Err(MarketError::Empty);
        }

        debug!(symbol, count = candles.len(), "klines fetched");
        Ok(candles)
    }
}

/// # Summary
/// 解析单行 K 线。
///
/// # Logic
/// 1. 行至少 7 个元素：`(open_time_ms, O, H, L, C, V, close_time_ms)`，
///    数值字段可能以字符串编码。
/// 2. 价格必须为有限正数，并满足 OHLC 几何约束；违例整行丢弃。
///
/// # Returns
/// 合法行返回 `Some(Candle)`。
pub fn parse_kline_row(row: &[Value]) -> Option<Candle> {
    if row.len() < 7 {
        return None;
    }

    let open_time = as_millis(&row[0])?;
    let open = as_f64(&row[1])?;
    let high = as_f64(&row[2])?;
    let low = as_f64(&row[3])?;
    let close = as_f64(&row[4])?;
    let volume = as_f64(&row[5])?;
    let close_time = as_millis(&row[6])?;

    let candle = Candle {
        open_time,
        open,
        high,
        low,
        close,
        volume,
        close_time,
    };

    // 入库前强制 OHLC 不变量，下游所有指标依赖于此
    if !candle.is_valid() {
        return None;
    }

    Some(candle)
}

/// 数值或字符串编码的浮点字段。
fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    }
}

/// 毫秒时间戳字段 (数值或字符串编码)。
fn as_millis(value: &Value) -> Option<DateTime<Utc>> {
    let ms = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }?;
    Utc.timestamp_millis_opt(ms).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(open: &str, high: &str, low: &str, close: &str) -> Vec<Value> {
        json!([
            1700000000000_i64,
            open,
            high,
            low,
            close,
            "1234.5",
            1700000299999_i64,
            "0", 0, "0", "0", "0"
        ])
        .as_array()
        .unwrap()
        .clone()
    }

    #[test]
    fn parses_string_encoded_numerics() {
        let candle = parse_kline_row(&row("100.0", "110.0", "95.0", "105.0")).unwrap();
        assert_eq!(candle.open, 100.0);
        assert_eq!(candle.high, 110.0);
        assert_eq!(candle.low, 95.0);
        assert_eq!(candle.close, 105.0);
        assert_eq!(candle.volume, 1234.5);
    }

    #[test]
    fn rejects_broken_ohlc_relationship() {
        // high 低于 close
        assert!(parse_kline_row(&row("100.0", "102.0", "95.0", "105.0")).is_none());
        // low 高于 open
        assert!(parse_kline_row(&row("90.0", "110.0", "95.0", "105.0")).is_none());
    }

    #[test]
    fn rejects_non_positive_and_non_numeric() {
        assert!(parse_kline_row(&row("0", "110.0", "95.0", "105.0")).is_none());
        assert!(parse_kline_row(&row("abc", "110.0", "95.0", "105.0")).is_none());
    }

    #[test]
    fn rejects_short_rows() {
        let short = json!([1700000000000_i64, "1", "2"]).as_array().unwrap().clone();
        assert!(parse_kline_row(&short).is_none());
    }

    #[test]
    fn accepts_plain_number_fields() {
        let row = json!([
            1700000000000_i64,
            100.0,
            110.0,
            95.0,
            105.0,
            42.0,
            1700000299999_i64
        ])
        .as_array()
        .unwrap()
        .clone();
        let candle = parse_kline_row(&row).unwrap();
        assert_eq!(candle.volume, 42.0);
    }
}
