use shingo_core::market::entity::Candle;

/// 价值区覆盖的成交量占比。
const VALUE_AREA_RATIO: f64 = 0.70;

/// # Summary
/// 单个价格分箱及其成交量。
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileLevel {
    pub price: f64,
    pub volume: f64,
}

/// # Summary
/// 量价分布结果，含控制点 (POC) 与价值区边界。
///
/// # Invariants
/// - `poc` 为成交量最大的分箱中点。
/// - `va_low <= poc <= va_high` (按分箱粒度)。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeProfile {
    pub levels: Vec<ProfileLevel>,
    pub poc: f64,
    pub va_high: f64,
    pub va_low: f64,
}

/// # Summary
/// 在价格区间上做等宽分箱并计算量价分布。
///
/// # Logic
/// 1. 求整段区间的最高/最低价，按 `num_bins` 等分。
/// 2. 每根 K 线的成交量计入其典型价格所在分箱。
/// 3. POC 取成交量最大的分箱；从 POC 向两侧扩展，
///    直到覆盖总量的 70%，得到价值区上下界。
///
/// # Arguments
/// * `candles`: 按时间升序的 K 线序列。
/// * `num_bins`: 分箱数量 (非正时取 50)。
///
/// # Returns
/// 空输入返回默认空分布。
pub fn volume_profile(candles: &[Candle], num_bins: usize) -> VolumeProfile {
    if candles.is_empty() {
        return VolumeProfile::default();
    }

    let num_bins = if num_bins == 0 { 50 } else { num_bins };

    let mut min_price = candles[0].low;
    let mut max_price = candles[0].high;
    let mut total_volume = 0.0;
    for candle in candles {
        min_price = min_price.min(candle.low);
        max_price = max_price.max(candle.high);
        total_volume += candle.volume;
    }

    let range = max_price - min_price;
    if range <= 0.0 {
        // 全部 K 线同价：单一分箱即是 POC 与价值区
        return VolumeProfile {
            levels: vec![ProfileLevel { price: min_price, volume: total_volume }],
            poc: min_price,
            va_high: min_price,
            va_low: min_price,
        };
    }
    let bin_size = range / num_bins as f64;

    let mut bins = vec![0.0; num_bins];
    for candle in candles {
        let idx = ((candle.typical_price() - min_price) / bin_size) as usize;
        bins[idx.min(num_bins - 1)] += candle.volume;
    }

    let mut poc_index = 0;
    let mut max_vol = 0.0;
    let mut levels = Vec::with_capacity(num_bins);
    for (i, vol) in bins.iter().enumerate() {
        levels.push(ProfileLevel {
            price: min_price + i as f64 * bin_size + bin_size / 2.0,
            volume: *vol,
        });
        if *vol > max_vol {
            max_vol = *vol;
            poc_index = i;
        }
    }

    // 从 POC 向两侧贪心扩展到 70% 总量
    let target = total_volume * VALUE_AREA_RATIO;
    let mut covered = max_vol;
    let mut up = poc_index;
    let mut down = poc_index;

    while covered < target {
        let can_up = up < num_bins - 1;
        let can_down = down > 0;
        if !can_up && !can_down {
            break;
        }

        let next_up = if can_up { bins[up + 1] } else { f64::MIN };
        let next_down = if can_down { bins[down - 1] } else { f64::MIN };

        if next_up > next_down {
            covered += next_up;
            up += 1;
        } else {
            covered += next_down;
            down -= 1;
        }
    }

    let center = |i: usize| min_price + i as f64 * bin_size + bin_size / 2.0;

    VolumeProfile {
        levels,
        poc: center(poc_index),
        va_high: center(up),
        va_low: center(down),
    }
}

/// # Summary
/// 现价到 POC 的距离百分比。
pub fn poc_distance(current_price: f64, poc: f64) -> f64 {
    if current_price == 0.0 {
        return 0.0;
    }
    (current_price - poc).abs() / current_price * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candle(low: f64, high: f64, volume: f64) -> Candle {
        Candle {
            open_time: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            open: (low + high) / 2.0,
            high,
            low,
            close: (low + high) / 2.0,
            volume,
            close_time: Utc.with_ymd_and_hms(2026, 1, 1, 4, 0, 0).unwrap(),
        }
    }

    #[test]
    fn poc_lands_on_heaviest_bin() {
        let candles = vec![
            candle(99.0, 101.0, 1000.0), // 典型价 ~100，最大量
            candle(109.0, 111.0, 100.0),
            candle(89.0, 91.0, 50.0),
        ];
        let vp = volume_profile(&candles, 10);
        assert!((vp.poc - 100.0).abs() < 3.0);
    }

    #[test]
    fn value_area_brackets_poc() {
        let candles: Vec<Candle> = (0..50)
            .map(|i| candle(100.0 + (i % 7) as f64, 102.0 + (i % 7) as f64, 10.0 + (i % 3) as f64))
            .collect();
        let vp = volume_profile(&candles, 20);
        assert!(vp.va_low <= vp.poc && vp.poc <= vp.va_high);
    }

    #[test]
    fn empty_input_returns_default() {
        assert_eq!(volume_profile(&[], 10), VolumeProfile::default());
    }

    #[test]
    fn poc_distance_percent() {
        assert!((poc_distance(100.0, 98.0) - 2.0).abs() < 1e-12);
    }
}
