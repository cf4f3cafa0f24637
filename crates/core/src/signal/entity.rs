use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// 信号短 ID 的字符集 (Base36 大写)。
const ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// 信号短 ID 的固定长度。
const ID_LEN: usize = 5;

/// # Summary
/// 交易信号方向枚举。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "LONG")]
    Long,
    #[serde(rename = "SHORT")]
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LONG" => Ok(Direction::Long),
            "SHORT" => Ok(Direction::Short),
            _ => Err(format!("Unknown Direction: {}", s)),
        }
    }
}

/// # Summary
/// 信号质量层级枚举。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SignalTier {
    #[serde(rename = "STANDARD")]
    Standard,
    #[serde(rename = "PREMIUM")]
    Premium,
}

impl std::fmt::Display for SignalTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalTier::Standard => write!(f, "STANDARD"),
            SignalTier::Premium => write!(f, "PREMIUM"),
        }
    }
}

impl std::str::FromStr for SignalTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STANDARD" => Ok(SignalTier::Standard),
            "PREMIUM" => Ok(SignalTier::Premium),
            _ => Err(format!("Unknown SignalTier: {}", s)),
        }
    }
}

/// # Summary
/// 市场状态 (Regime) 枚举。
///
/// # Invariants
/// - `Choppy` 状态下永不产出信号。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarketRegime {
    #[serde(rename = "TRENDING_UP")]
    TrendingUp,
    #[serde(rename = "TRENDING_DOWN")]
    TrendingDown,
    #[serde(rename = "RANGING")]
    Ranging,
    #[serde(rename = "CHOPPY")]
    Choppy,
}

impl std::fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketRegime::TrendingUp => write!(f, "TRENDING_UP"),
            MarketRegime::TrendingDown => write!(f, "TRENDING_DOWN"),
            MarketRegime::Ranging => write!(f, "RANGING"),
            MarketRegime::Choppy => write!(f, "CHOPPY"),
        }
    }
}

impl std::str::FromStr for MarketRegime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRENDING_UP" => Ok(MarketRegime::TrendingUp),
            "TRENDING_DOWN" => Ok(MarketRegime::TrendingDown),
            "RANGING" => Ok(MarketRegime::Ranging),
            "CHOPPY" => Ok(MarketRegime::Choppy),
            _ => Err(format!("Unknown MarketRegime: {}", s)),
        }
    }
}

/// # Summary
/// 信号生命周期状态。created 之后为 Active，关闭后不可重开。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SignalStatus {
    #[serde(rename = "ACTIVE")]
    Active,
    #[serde(rename = "CLOSED")]
    Closed,
}

impl std::fmt::Display for SignalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalStatus::Active => write!(f, "ACTIVE"),
            SignalStatus::Closed => write!(f, "CLOSED"),
        }
    }
}

impl std::str::FromStr for SignalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(SignalStatus::Active),
            "CLOSED" => Ok(SignalStatus::Closed),
            _ => Err(format!("Unknown SignalStatus: {}", s)),
        }
    }
}

/// # Summary
/// 信号关闭原因枚举。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CloseReason {
    #[serde(rename = "TP_HIT")]
    TpHit,
    #[serde(rename = "SL_HIT")]
    SlHit,
    #[serde(rename = "MANUAL")]
    Manual,
    #[serde(rename = "REVERSED")]
    Reversed,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseReason::TpHit => write!(f, "TP_HIT"),
            CloseReason::SlHit => write!(f, "SL_HIT"),
            CloseReason::Manual => write!(f, "MANUAL"),
            CloseReason::Reversed => write!(f, "REVERSED"),
        }
    }
}

impl std::str::FromStr for CloseReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TP_HIT" => Ok(CloseReason::TpHit),
            "SL_HIT" => Ok(CloseReason::SlHit),
            "MANUAL" => Ok(CloseReason::Manual),
            "REVERSED" => Ok(CloseReason::Reversed),
            _ => Err(format!("Unknown CloseReason: {}", s)),
        }
    }
}

/// # Summary
/// 外部验证器给出的质量层级。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ValidatorTier {
    #[serde(rename = "PREMIUM")]
    Premium,
    #[serde(rename = "STANDARD")]
    Standard,
    #[serde(rename = "REJECT")]
    Reject,
}

impl ValidatorTier {
    /// # Summary
    /// 当验证器响应缺失或给出未知层级时，由分数推导层级。
    ///
    /// # Logic
    /// `>= 90` 为 Premium，`>= 70` 为 Standard，否则 Reject。
    pub fn from_score(score: u8) -> Self {
        if score >= 90 {
            ValidatorTier::Premium
        } else if score >= 70 {
            ValidatorTier::Standard
        } else {
            ValidatorTier::Reject
        }
    }
}

impl std::fmt::Display for ValidatorTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidatorTier::Premium => write!(f, "PREMIUM"),
            ValidatorTier::Standard => write!(f, "STANDARD"),
            ValidatorTier::Reject => write!(f, "REJECT"),
        }
    }
}

impl std::str::FromStr for ValidatorTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PREMIUM" => Ok(ValidatorTier::Premium),
            "STANDARD" => Ok(ValidatorTier::Standard),
            "REJECT" => Ok(ValidatorTier::Reject),
            _ => Err(format!("Unknown ValidatorTier: {}", s)),
        }
    }
}

/// 多空倾向，用于 FVG/OB 归属与背离方向。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Bias {
    #[serde(rename = "BULLISH")]
    Bullish,
    #[serde(rename = "BEARISH")]
    Bearish,
}

impl std::fmt::Display for Bias {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bias::Bullish => write!(f, "BULLISH"),
            Bias::Bearish => write!(f, "BEARISH"),
        }
    }
}

/// 领先标的 (BTC) 的 4h 趋势方向。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LeaderTrend {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
}

/// EMA 快慢线交叉状态。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum TrendState {
    #[serde(rename = "GOLDEN_CROSS")]
    GoldenCross,
    #[serde(rename = "DEATH_CROSS")]
    DeathCross,
    #[default]
    #[serde(rename = "NEUTRAL")]
    Neutral,
}

/// # Summary
/// 市场结构分类 (摆动序列的转换形态)。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarketStructure {
    #[serde(rename = "BULLISH_BOS")]
    BullishBos,
    #[serde(rename = "BEARISH_BOS")]
    BearishBos,
    #[serde(rename = "BULLISH_CHOCH")]
    BullishChoch,
    #[serde(rename = "BEARISH_CHOCH")]
    BearishChoch,
    #[default]
    #[serde(rename = "NEUTRAL")]
    Neutral,
}

/// # Summary
/// 单周期评估产出的全部指标上下文快照。
///
/// # Invariants
/// - 同一信号的快照在生命周期内不可变。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IndicatorContext {
    // RSI 多周期 (长 → 短)
    pub rsi_4h: f64,
    pub rsi_1h: f64,
    pub rsi_15m: f64,
    pub rsi_5m: f64,

    // ADX 多周期
    pub adx_4h: f64,
    pub adx_1h: f64,
    pub adx_15m: f64,

    // 量价
    pub vwap: f64,
    pub current_vol: f64,
    pub avg_vol: f64,

    // MACD (5m)
    pub macd: f64,
    pub macd_signal: f64,
    pub histogram: f64,

    // 最近窗口内的带方向成交量差
    pub order_flow_delta: f64,

    // 日线枢轴位
    pub pivot_point: f64,
    pub pivot_r1: f64,
    pub pivot_r2: f64,
    pub pivot_r3: f64,
    pub pivot_s1: f64,
    pub pivot_s2: f64,
    pub pivot_s3: f64,
    pub nearest_pivot: String,

    // 4h 摆动区间的斐波那契回撤位
    pub fib_0: f64,
    pub fib_236: f64,
    pub fib_382: f64,
    pub fib_500: f64,
    pub fib_618: f64,
    pub fib_786: f64,
    pub fib_100: f64,
    pub nearest_fib: String,

    // 聪明钱特征
    pub fvg_type: Option<Bias>,
    pub ob_type: Option<Bias>,

    // 量价分布
    pub poc: f64,
    pub poc_distance: f64,

    // 领先标的相关性
    pub btc_correlation: Option<LeaderTrend>,

    // 波动率
    pub atr: f64,

    // 市场结构
    pub market_structure: MarketStructure,

    // 补充动量特征
    pub stoch_rsi: f64,
    pub divergence: Option<Bias>,
    pub trend_state: TrendState,
    pub candlestick_pattern: Option<String>,
}

/// # Summary
/// 信号在存储层的定位键。
///
/// # Invariants
/// - `(symbol, direction, created_at)` 在单条 ACTIVE 信号上唯一定位。
#[derive(Debug, Clone, PartialEq)]
pub struct SignalKey {
    pub symbol: String,
    pub direction: Direction,
    pub created_at: DateTime<Utc>,
}

/// 监控过程中可被锁存的一次性提醒种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    TakeProfit,
    StopLoss,
    Reversal,
    Trailing,
}

/// # Summary
/// 交易信号实体。由策略引擎创建，仅由生命周期所有者
/// (监控器或运维批量关闭) 修改。
///
/// # Invariants
/// - LONG: `stop_loss < entry_price < take_profit_1 <= take_profit_2`；SHORT 镜像。
/// - `confluence_score` ∈ [0, 100]，`confidence_score = confluence_score / 100`。
/// - `risk_reward_ratio` 基于 TP2 与 `|entry - stop_loss|` 计算。
/// - 状态一旦变为 Closed 永不重开。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    // 5 字符 Base36 大写短 ID
    pub id: String,
    pub symbol: String,
    pub direction: Direction,
    pub tier: SignalTier,

    // 价格结构
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit_1: f64,
    pub take_profit_2: f64,

    // 风险与仓位
    pub risk_reward_ratio: f64,
    // 建议仓位 (账户百分比)
    pub recommended_size: f64,

    pub regime: MarketRegime,
    pub context: IndicatorContext,

    // 概率字段
    pub confluence_score: u8,
    pub confidence_score: f64,
    pub break_even_win_rate: f64,
    pub risk_percent: f64,
    pub reward_percent: f64,
    pub tp1_percent: f64,
    pub tp2_percent: f64,
    pub nearest_level_dist: f64,

    // 外部验证结果 (验证通过后并入)
    pub validator_score: u8,
    pub validator_confidence: u8,
    pub validator_tier: Option<ValidatorTier>,
    pub validator_reason: String,

    // 生命周期
    pub status: SignalStatus,
    pub close_reason: Option<CloseReason>,
    // 已实现盈亏 (百分比)
    pub realized_pnl: f64,

    // 提醒锁存
    pub tp_alert_sent: bool,
    pub sl_alert_sent: bool,
    pub reversal_alert_sent: bool,
    pub trailing_alert_sent: bool,
    pub last_alert_time: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Signal {
    /// # Summary
    /// 生成 5 字符 Base36 大写短 ID。
    ///
    /// # Logic
    /// 碰撞不在此处处理；存储层在插入冲突时以新 ID 重试。
    pub fn new_short_id() -> String {
        let mut rng = rand::thread_rng();
        (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect()
    }

    /// 存储层定位键。
    pub fn key(&self) -> SignalKey {
        SignalKey {
            symbol: self.symbol.clone(),
            direction: self.direction,
            created_at: self.created_at,
        }
    }

    /// # Summary
    /// 给定现价计算方向感知的盈亏百分比。
    ///
    /// # Logic
    /// LONG: `(price - entry) / entry * 100`；SHORT 取负。
    pub fn pnl_percent_at(&self, price: f64) -> f64 {
        match self.direction {
            Direction::Long => (price - self.entry_price) / self.entry_price * 100.0,
            Direction::Short => (self.entry_price - price) / self.entry_price * 100.0,
        }
    }

    /// 价格结构是否与方向一致 (LONG 递增 / SHORT 递减)。
    pub fn has_consistent_levels(&self) -> bool {
        match self.direction {
            Direction::Long => {
                self.stop_loss < self.entry_price
                    && self.entry_price < self.take_profit_1
                    && self.take_profit_1 <= self.take_profit_2
            }
            Direction::Short => {
                self.stop_loss > self.entry_price
                    && self.entry_price > self.take_profit_1
                    && self.take_profit_1 >= self.take_profit_2
            }
        }
    }
}
