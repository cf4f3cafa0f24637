/// # Summary
/// 枢轴位集合：中枢加三级阻力/支撑。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PivotPoints {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl PivotPoints {
    /// 按由上至下的固定顺序返回 `(名称, 价格)` 对。
    pub fn named_levels(&self) -> [(&'static str, f64); 7] {
        [
            ("R3", self.r3),
            ("R2", self.r2),
            ("R1", self.r1),
            ("Pivot", self.pivot),
            ("S1", self.s1),
            ("S2", self.s2),
            ("S3", self.s3),
        ]
    }
}

/// # Summary
/// 标准枢轴位：`P = (H + L + C) / 3`。
pub fn standard_pivots(high: f64, low: f64, close: f64) -> PivotPoints {
    let pivot = (high + low + close) / 3.0;
    PivotPoints {
        pivot,
        r1: 2.0 * pivot - low,
        r2: pivot + (high - low),
        r3: high + 2.0 * (pivot - low),
        s1: 2.0 * pivot - high,
        s2: pivot - (high - low),
        s3: low - 2.0 * (high - pivot),
    }
}

/// # Summary
/// Woodie 枢轴位：收盘价双倍加权，`P = (H + L + 2C) / 4`。
pub fn woodies_pivots(high: f64, low: f64, close: f64) -> PivotPoints {
    let pivot = (high + low + 2.0 * close) / 4.0;
    PivotPoints {
        pivot,
        r1: 2.0 * pivot - low,
        r2: pivot + (high - low),
        r3: high + 2.0 * (pivot - low),
        s1: 2.0 * pivot - high,
        s2: pivot - (high - low),
        s3: low - 2.0 * (high - pivot),
    }
}

/// # Summary
/// Camarilla 枢轴位：围绕收盘价按波幅比例展开。
pub fn camarilla_pivots(high: f64, low: f64, close: f64) -> PivotPoints {
    let range = high - low;
    PivotPoints {
        pivot: close,
        r1: close + range * 1.1 / 12.0,
        r2: close + range * 1.1 / 6.0,
        r3: close + range * 1.1 / 4.0,
        s1: close - range * 1.1 / 12.0,
        s2: close - range * 1.1 / 6.0,
        s3: close - range * 1.1 / 4.0,
    }
}

/// # Summary
/// 找到距现价最近的枢轴位。
///
/// # Returns
/// `(价格, 名称)`；全部位为 0 时返回 `(0, "")`。
pub fn nearest_pivot_level(current_price: f64, pivots: &PivotPoints) -> (f64, String) {
    let mut min_diff = f64::MAX;
    let mut nearest_price = 0.0;
    let mut nearest_name = "";

    for (name, price) in pivots.named_levels() {
        let diff = (current_price - price).abs();
        if diff < min_diff {
            min_diff = diff;
            nearest_price = price;
            nearest_name = name;
        }
    }

    (nearest_price, nearest_name.to_string())
}

/// # Summary
/// 到任一非零枢轴位的最小距离百分比。
pub fn pivot_distance(price: f64, pivots: &PivotPoints) -> f64 {
    let mut min_dist = 100.0;
    for (_, level) in pivots.named_levels() {
        if level == 0.0 {
            continue;
        }
        let dist = (price - level).abs() / price * 100.0;
        if dist < min_dist {
            min_dist = dist;
        }
    }
    min_dist
}

/// # Summary
/// 现价上方最近的阻力位 (枢轴系阻力)。
///
/// # Returns
/// 上方不存在任何枢轴位时返回 `None`。
pub fn next_resistance(price: f64, pivots: &PivotPoints) -> Option<f64> {
    [pivots.pivot, pivots.r1, pivots.r2, pivots.r3]
        .into_iter()
        .filter(|level| *level > price)
        .min_by(|a, b| a.total_cmp(b))
}

/// # Summary
/// 现价下方最近的支撑位 (枢轴系支撑)。
///
/// # Returns
/// 下方不存在任何非零枢轴位时返回 `None`。
pub fn next_support(price: f64, pivots: &PivotPoints) -> Option<f64> {
    [pivots.pivot, pivots.s1, pivots.s2, pivots.s3]
        .into_iter()
        .filter(|level| *level > 0.0 && *level < price)
        .max_by(|a, b| a.total_cmp(b))
}
