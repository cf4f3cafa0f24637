/// # Summary
/// 计算布林带 (中轨 SMA ± 标准差倍数)。
///
/// # Arguments
/// * `closes`: 按时间升序的收盘价序列。
/// * `period`: 中轨周期。
/// * `std_mult`: 标准差倍数 (常用 2.0)。
///
/// # Returns
/// `(upper, middle, lower)`，均与输入等长，
/// 下标 `period - 1` 之前的位置为 0；数据不足时全部为空。
pub fn bollinger(closes: &[f64], period: usize, std_mult: f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    if period == 0 || closes.len() < period {
        return (Vec::new(), Vec::new(), Vec::new());
    }

    let mut upper = vec![0.0; closes.len()];
    let mut middle = vec![0.0; closes.len()];
    let mut lower = vec![0.0; closes.len()];

    for i in (period - 1)..closes.len() {
        let window = &closes[i + 1 - period..=i];
        let mean = window.iter().sum::<f64>() / period as f64;
        let variance = window.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / period as f64;
        let std = variance.sqrt();

        middle[i] = mean;
        upper[i] = mean + std_mult * std;
        lower[i] = mean - std_mult * std;
    }

    (upper, middle, lower)
}
