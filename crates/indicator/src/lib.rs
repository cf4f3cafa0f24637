//! 纯函数指标库。
//!
//! 全部函数接收按时间升序排列的序列，输入永不被修改；
//! 数据不足时返回中性值 (空序列或 0)，永不 panic。

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod candlestick;
pub mod cvd;
pub mod divergence;
pub mod fibonacci;
pub mod ma;
pub mod macd;
pub mod pivot;
pub mod risk;
pub mod rsi;
pub mod smc;
pub mod stoch_rsi;
pub mod structure;
pub mod volume_profile;
pub mod vwap;
