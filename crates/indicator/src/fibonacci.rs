/// 回撤方向：趋势向上时自高点向下回撤，向下时镜像。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwingTrend {
    Up,
    Down,
}

/// # Summary
/// 斐波那契回撤位集合 (0 / 23.6 / 38.2 / 50 / 61.8 / 78.6 / 100)。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FibLevels {
    pub level_0: f64,
    pub level_236: f64,
    pub level_382: f64,
    pub level_500: f64,
    pub level_618: f64,
    pub level_786: f64,
    pub level_100: f64,
}

impl FibLevels {
    /// 按固定顺序返回 `(名称, 价格)` 对。
    pub fn named_levels(&self) -> [(&'static str, f64); 7] {
        [
            ("0%", self.level_0),
            ("23.6%", self.level_236),
            ("38.2%", self.level_382),
            ("50%", self.level_500),
            ("61.8%", self.level_618),
            ("78.6%", self.level_786),
            ("100%", self.level_100),
        ]
    }
}

/// # Summary
/// 由摆动区间计算回撤位。
///
/// # Logic
/// 趋势向上时 0% 锚定高点、100% 锚定低点；趋势向下时镜像。
pub fn retracements(high: f64, low: f64, trend: SwingTrend) -> FibLevels {
    let diff = high - low;

    match trend {
        SwingTrend::Up => FibLevels {
            level_0: high,
            level_236: high - diff * 0.236,
            level_382: high - diff * 0.382,
            level_500: high - diff * 0.5,
            level_618: high - diff * 0.618,
            level_786: high - diff * 0.786,
            level_100: low,
        },
        SwingTrend::Down => FibLevels {
            level_0: low,
            level_236: low + diff * 0.236,
            level_382: low + diff * 0.382,
            level_500: low + diff * 0.5,
            level_618: low + diff * 0.618,
            level_786: low + diff * 0.786,
            level_100: high,
        },
    }
}

/// # Summary
/// 1.618 扩展位。
pub fn extension(high: f64, low: f64, trend: SwingTrend) -> f64 {
    let diff = high - low;
    match trend {
        SwingTrend::Up => high + diff * 0.618,
        SwingTrend::Down => low - diff * 0.618,
    }
}

/// # Summary
/// 找到距现价最近的回撤位。
///
/// # Returns
/// `(价格, 名称)`。
pub fn nearest_fib_level(current_price: f64, levels: &FibLevels) -> (f64, String) {
    let mut min_diff = f64::MAX;
    let mut nearest_price = 0.0;
    let mut nearest_name = "";

    for (name, price) in levels.named_levels() {
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
/// 到任一非零回撤位的最小距离百分比。
/// 0% 与 100% 锚点不参与 (与枢轴距离口径保持一致，只看内部回撤位)。
pub fn fib_distance(price: f64, levels: &FibLevels) -> f64 {
    let inner = [
        levels.level_236,
        levels.level_382,
        levels.level_500,
        levels.level_618,
        levels.level_786,
    ];

    let mut min_dist = 100.0;
    for level in inner {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptrend_anchors_zero_at_high() {
        let levels = retracements(200.0, 100.0, SwingTrend::Up);
        assert_eq!(levels.level_0, 200.0);
        assert_eq!(levels.level_100, 100.0);
        assert!((levels.level_500 - 150.0).abs() < 1e-12);
        assert!((levels.level_618 - 138.2).abs() < 1e-9);
    }

    #[test]
    fn downtrend_mirrors() {
        let levels = retracements(200.0, 100.0, SwingTrend::Down);
        assert_eq!(levels.level_0, 100.0);
        assert_eq!(levels.level_100, 200.0);
        assert!((levels.level_236 - 123.6).abs() < 1e-9);
    }

    #[test]
    fn nearest_fib_picks_minimum_distance() {
        let levels = retracements(200.0, 100.0, SwingTrend::Up);
        let (price, name) = nearest_fib_level(151.0, &levels);
        assert_eq!(name, "50%");
        assert!((price - 150.0).abs() < 1e-12);
    }

    #[test]
    fn extension_projects_beyond_swing() {
        assert!((extension(200.0, 100.0, SwingTrend::Up) - 261.8).abs() < 1e-9);
        assert!((extension(200.0, 100.0, SwingTrend::Down) - 38.2).abs() < 1e-9);
    }
}
