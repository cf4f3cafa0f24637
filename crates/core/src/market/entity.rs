use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 单根 K 线数据实体，记录特定时段内的行情波动。
///
/// # Invariants
/// - `low <= min(open, close) <= max(open, close) <= high`。
/// - 所有价格字段必须为有限正数。
/// - 序列中最后一根为最新数据。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    // K 线开始时间
    pub open_time: DateTime<Utc>,
    // 开盘价
    pub open: f64,
    // 最高价
    pub high: f64,
    // 最低价
    pub low: f64,
    // 收盘价
    pub close: f64,
    // 成交量
    pub volume: f64,
    // K 线结束时间
    pub close_time: DateTime<Utc>,
}

impl Candle {
    /// # Summary
    /// 校验 OHLC 几何关系与数值有效性。
    ///
    /// # Logic
    /// 1. 所有价格必须为有限正数，成交量必须为有限非负数。
    /// 2. `high` 必须不低于 `open`/`close`，`low` 必须不高于 `open`/`close`。
    ///
    /// # Returns
    /// 满足全部约束时返回 `true`。
    pub fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return false;
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
    }

    /// 收盘价高于开盘价时为阳线。
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// 收盘价低于开盘价时为阴线。
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// 典型价格 (H+L+C)/3，用于 VWAP 与量价分布。
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candle(open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            open_time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            open,
            high,
            low,
            close,
            volume: 100.0,
            close_time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 5, 0).unwrap(),
        }
    }

    #[test]
    fn valid_candle_passes() {
        assert!(candle(10.0, 12.0, 9.0, 11.0).is_valid());
    }

    #[test]
    fn broken_ohlc_relationship_rejected() {
        // high 低于 close
        assert!(!candle(10.0, 10.5, 9.0, 11.0).is_valid());
        // low 高于 open
        assert!(!candle(8.0, 12.0, 9.0, 11.0).is_valid());
    }

    #[test]
    fn non_finite_and_non_positive_rejected() {
        assert!(!candle(f64::NAN, 12.0, 9.0, 11.0).is_valid());
        assert!(!candle(10.0, f64::INFINITY, 9.0, 11.0).is_valid());
        assert!(!candle(0.0, 12.0, 9.0, 11.0).is_valid());
    }
}
