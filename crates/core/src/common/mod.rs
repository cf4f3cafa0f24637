use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// K 线时间周期枚举，定义扫描管线使用的全部时间跨度。
///
/// # Invariants
/// - `Display` 输出必须与行情数据源的 interval 标签一致。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    // 1分钟
    Minute1,
    // 5分钟
    Minute5,
    // 15分钟
    Minute15,
    // 1小时
    Hour1,
    // 4小时
    Hour4,
    // 1日
    Day1,
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "minute1" => Ok(TimeFrame::Minute1),
            "5m" | "minute5" => Ok(TimeFrame::Minute5),
            "15m" | "minute15" => Ok(TimeFrame::Minute15),
            "1h" | "hour1" => Ok(TimeFrame::Hour1),
            "4h" | "hour4" => Ok(TimeFrame::Hour4),
            "1d" | "day1" => Ok(TimeFrame::Day1),
            _ => Err(format!("Unknown TimeFrame: {}", s)),
        }
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeFrame::Minute1 => write!(f, "1m"),
            TimeFrame::Minute5 => write!(f, "5m"),
            TimeFrame::Minute15 => write!(f, "15m"),
            TimeFrame::Hour1 => write!(f, "1h"),
            TimeFrame::Hour4 => write!(f, "4h"),
            TimeFrame::Day1 => write!(f, "1d"),
        }
    }
}

/// # Summary
/// 按价格量级选择小数位数，用于通知与提示词中的价格展示。
///
/// # Logic
/// 价格越小，保留的小数位越多，保证低价币种的可读性。
///
/// # Arguments
/// * `price`: 待格式化的价格。
///
/// # Returns
/// 格式化后的价格字符串。
pub fn format_price(price: f64) -> String {
    let decimals = if price < 0.00001 {
        8
    } else if price < 0.0001 {
        7
    } else if price < 0.001 {
        6
    } else if price < 0.01 {
        5
    } else if price < 0.1 {
        4
    } else if price < 1.0 {
        3
    } else {
        2
    };
    format!("{:.*}", decimals, price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeframe_roundtrip() {
        for tf in [
            TimeFrame::Minute1,
            TimeFrame::Minute5,
            TimeFrame::Minute15,
            TimeFrame::Hour1,
            TimeFrame::Hour4,
            TimeFrame::Day1,
        ] {
            assert_eq!(tf.to_string().parse::<TimeFrame>().unwrap(), tf);
        }
    }

    #[test]
    fn price_decimals_scale_with_magnitude() {
        assert_eq!(format_price(45123.4567), "45123.46");
        assert_eq!(format_price(0.5), "0.500");
        assert_eq!(format_price(0.000012345), "0.0000123");
        assert_eq!(format_price(0.0000012345), "0.00000123");
    }
}
