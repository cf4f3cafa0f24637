use std::env;
use std::time::Duration;
use thiserror::Error;

/// 关注列表为空时的默认交易对集合。
pub const DEFAULT_WATCHLIST: &[&str] = &[
    "BTCUSDT", "ETHUSDT", "SOLUSDT", "BNBUSDT", "XRPUSDT", "DOGEUSDT", "ADAUSDT", "AVAXUSDT",
    "TRXUSDT", "LINKUSDT", "DOTUSDT", "MATICUSDT", "LTCUSDT", "SHIBUSDT", "PEPEUSDT",
];

/// 验证服务的静态模型优先级列表 (先到先试)。
pub const DEFAULT_VALIDATOR_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-2.5-pro",
];

/// 关注列表接受的计价货币后缀。
pub const QUOTE_SUFFIX: &str = "USDT";

/// 配置加载错误。
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),
    #[error("Invalid value for {0}: {1}")]
    Invalid(String, String),
}

/// # Summary
/// 策略阈值配置。来源实现存在多个并行变体且阈值互相冲突，
/// 此处采用最严格的一组作为默认值，全部可调。
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    // 最低汇合分数
    pub min_confluence_score: u8,
    // Premium 层级分数线
    pub premium_score: u8,
    // 平均 ADX 低于此值判定为 CHOPPY
    pub choppy_adx: f64,
    // 关键位接近度要求 (百分比)
    pub proximity_pct: f64,
    // 最低风险回报比 (基于 TP2)
    pub min_risk_reward: f64,
    // 加仓例外的最小入场价偏移 (百分比)
    pub scale_in_pct: f64,
    // 领先标的交易对
    pub leader_symbol: String,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            min_confluence_score: 70,
            premium_score: 90,
            choppy_adx: 20.0,
            proximity_pct: 2.0,
            min_risk_reward: 2.0,
            scale_in_pct: 1.5,
            leader_symbol: "BTCUSDT".to_string(),
        }
    }
}

/// # Summary
/// 全局应用配置。进程启动时从环境变量构造一次，
/// 之后作为不可变值注入各构造函数。
///
/// # Invariants
/// - 必填变量缺失时启动失败 (退出码 1)。
/// - 未知环境变量被忽略。
#[derive(Debug, Clone)]
pub struct AppConfig {
    // 信号/关注列表数据库连接串
    pub database_url: String,
    // 行情数据源基础 URL
    pub market_base_url: String,
    // 验证服务凭据池 (有序，逗号分隔)
    pub validator_api_keys: Vec<String>,
    // 验证服务模型优先级列表
    pub validator_models: Vec<String>,
    // 通知机器人令牌
    pub telegram_bot_token: String,
    // 通知目标会话
    pub telegram_chat_id: String,
    // 轮询周期
    pub poll_interval: Duration,
    // 工作协程数量
    pub worker_count: usize,
    // 单交易对冷却窗口
    pub cooldown: Duration,
    // 策略阈值
    pub strategy: StrategyConfig,
}

impl AppConfig {
    /// # Summary
    /// 从环境变量构造配置。
    ///
    /// # Logic
    /// 1. 必填项缺失立即返回 `ConfigError::Missing`。
    /// 2. 数值项解析失败返回 `ConfigError::Invalid`。
    /// 3. 其余项取默认值。
    pub fn from_env() -> Result<Self, ConfigError> {
        let validator_api_keys = required("VALIDATOR_API_KEYS")?
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect::<Vec<_>>();
        if validator_api_keys.is_empty() {
            return Err(ConfigError::Missing("VALIDATOR_API_KEYS".to_string()));
        }

        let validator_models = match env::var("VALIDATOR_MODELS") {
            Ok(v) if !v.trim().is_empty() => v
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            _ => DEFAULT_VALIDATOR_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        };

        Ok(Self {
            database_url: optional("DATABASE_URL", "sqlite://data/shingo.db"),
            market_base_url: optional("MARKET_BASE_URL", "https://api.binance.com"),
            validator_api_keys,
            validator_models,
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: required("TELEGRAM_CHAT_ID")?,
            poll_interval: Duration::from_secs(parse_u64("POLL_INTERVAL_SECS", 60)?),
            worker_count: parse_u64("WORKER_COUNT", 10)? as usize,
            cooldown: Duration::from_secs(parse_u64("COOLDOWN_HOURS", 4)? * 3600),
            strategy: StrategyConfig::default(),
        })
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(key.to_string())),
    }
}

fn optional(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => default.to_string(),
    }
}

fn parse_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::Invalid(key.to_string(), e.to_string())),
        _ => Ok(default),
    }
}
