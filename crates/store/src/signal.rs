use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shingo_core::signal::entity::{
    AlertKind, CloseReason, Direction, IndicatorContext, Signal, SignalKey, SignalStatus,
    SignalTier, ValidatorTier,
};
use shingo_core::store::error::StoreError;
use shingo_core::store::port::SignalStore;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

/// 短 ID 冲突时的重试上限。
const INSERT_ID_RETRIES: usize = 3;

/// # Summary
/// SignalStore 的 SQLite 实现：单表存放信号全量字段，
/// 指标上下文快照以 JSON 列持久化。
///
/// # Invariants
/// - 所有写操作为单行更新，不使用跨行事务。
/// - `id` 列唯一；插入冲突以新 ID 重试，次数有界。
pub struct SqliteSignalStore {
    pool: SqlitePool,
}

impl SqliteSignalStore {
    /// # Summary
    /// 连接数据库并初始化信号表结构。
    ///
    /// # Arguments
    /// * `database_url`: SQLite 连接串。
    ///
    /// # Returns
    /// * `Result<Self, StoreError>` - 存储实例或初始化错误。
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = crate::open_pool(database_url).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS signals (
                id TEXT PRIMARY KEY,
                symbol TEXT NOT NULL,
                direction TEXT NOT NULL,
                tier TEXT NOT NULL,
                entry_price REAL NOT NULL,
                stop_loss REAL NOT NULL,
                take_profit_1 REAL NOT NULL,
                take_profit_2 REAL NOT NULL,
                risk_reward_ratio REAL NOT NULL,
                recommended_size REAL NOT NULL,
                regime TEXT NOT NULL,
                context TEXT NOT NULL,
                confluence_score INTEGER NOT NULL,
                confidence_score REAL NOT NULL,
                break_even_win_rate REAL NOT NULL,
                risk_percent REAL NOT NULL,
                reward_percent REAL NOT NULL,
                tp1_percent REAL NOT NULL,
                tp2_percent REAL NOT NULL,
                nearest_level_dist REAL NOT NULL,
                validator_score INTEGER NOT NULL,
                validator_confidence INTEGER NOT NULL,
                validator_tier TEXT,
                validator_reason TEXT NOT NULL,
                status TEXT NOT NULL,
                close_reason TEXT,
                realized_pnl REAL NOT NULL,
                tp_alert_sent INTEGER NOT NULL,
                sl_alert_sent INTEGER NOT NULL,
                reversal_alert_sent INTEGER NOT NULL,
                trailing_alert_sent INTEGER NOT NULL,
                last_alert_time TEXT,
                created_at TEXT NOT NULL,
                closed_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_signals_symbol_created
                ON signals (symbol, created_at DESC);
            CREATE INDEX IF NOT EXISTS idx_signals_status
                ON signals (status);
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        info!("signal store ready");
        Ok(Self { pool })
    }

    async fn try_insert(&self, signal: &Signal, id: &str) -> Result<(), sqlx::Error> {
        let context = serde_json::to_string(&signal.context)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query(
            r#"
            INSERT INTO signals (
                id, symbol, direction, tier,
                entry_price, stop_loss, take_profit_1, take_profit_2,
                risk_reward_ratio, recommended_size, regime, context,
                confluence_score, confidence_score, break_even_win_rate,
                risk_percent, reward_percent, tp1_percent, tp2_percent,
                nearest_level_dist, validator_score, validator_confidence,
                validator_tier, validator_reason, status, close_reason,
                realized_pnl, tp_alert_sent, sl_alert_sent,
                reversal_alert_sent, trailing_alert_sent, last_alert_time,
                created_at, closed_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(&signal.symbol)
        .bind(signal.direction.to_string())
        .bind(signal.tier.to_string())
        .bind(signal.entry_price)
        .bind(signal.stop_loss)
        .bind(signal.take_profit_1)
        .bind(signal.take_profit_2)
        .bind(signal.risk_reward_ratio)
        .bind(signal.recommended_size)
        .bind(signal.regime.to_string())
        .bind(context)
        .bind(signal.confluence_score as i64)
        .bind(signal.confidence_score)
        .bind(signal.break_even_win_rate)
        .bind(signal.risk_percent)
        .bind(signal.reward_percent)
        .bind(signal.tp1_percent)
        .bind(signal.tp2_percent)
        .bind(signal.nearest_level_dist)
        .bind(signal.validator_score as i64)
        .bind(signal.validator_confidence as i64)
        .bind(signal.validator_tier.map(|t| t.to_string()))
        .bind(&signal.validator_reason)
        .bind(signal.status.to_string())
        .bind(signal.close_reason.map(|r| r.to_string()))
        .bind(signal.realized_pnl)
        .bind(signal.tp_alert_sent)
        .bind(signal.sl_alert_sent)
        .bind(signal.reversal_alert_sent)
        .bind(signal.trailing_alert_sent)
        .bind(signal.last_alert_time)
        .bind(signal.created_at)
        .bind(signal.closed_at)
        .execute(&self.pool)
        .await
        .map(|_| ())
    }
}

#[async_trait]
impl SignalStore for SqliteSignalStore {
    /// # Summary
    /// 插入新信号；短 ID 唯一冲突时以新 ID 重试。
    async fn insert(&self, signal: &Signal) -> Result<String, StoreError> {
        let mut id = signal.id.clone();

        for attempt in 0..=INSERT_ID_RETRIES {
            match self.try_insert(signal, &id).await {
                Ok(()) => {
                    debug!(symbol = %signal.symbol, %id, "signal persisted");
                    return Ok(id);
                }
                Err(e) if is_unique_violation(&e) && attempt < INSERT_ID_RETRIES => {
                    warn!(symbol = %signal.symbol, %id, "short id collision, retrying");
                    id = Signal::new_short_id();
                }
                Err(e) => return Err(StoreError::Database(e.to_string())),
            }
        }

        Err(StoreError::Database("short id retries exhausted".to_string()))
    }

    async fn latest_for_symbol(&self, symbol: &str) -> Result<Option<Signal>, StoreError> {
        sqlx::query("SELECT * FROM signals WHERE symbol = ? ORDER BY created_at DESC LIMIT 1")
            .bind(symbol)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|row| row_to_signal(&row))
            .transpose()
    }

    async fn latest_active(
        &self,
        symbol: &str,
        direction: Direction,
    ) -> Result<Option<Signal>, StoreError> {
        sqlx::query(
            "SELECT * FROM signals
             WHERE symbol = ? AND direction = ? AND status = 'ACTIVE'
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(symbol)
        .bind(direction.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?
        .map(|row| row_to_signal(&row))
        .transpose()
    }

    async fn all_active(&self) -> Result<Vec<Signal>, StoreError> {
        sqlx::query("SELECT * FROM signals WHERE status = 'ACTIVE'")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?
            .iter()
            .map(row_to_signal)
            .collect()
    }

    async fn created_since(&self, t: DateTime<Utc>) -> Result<Vec<Signal>, StoreError> {
        sqlx::query("SELECT * FROM signals WHERE created_at >= ?")
            .bind(t)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?
            .iter()
            .map(row_to_signal)
            .collect()
    }

    async fn closed_since(&self, t: DateTime<Utc>, limit: u32) -> Result<Vec<Signal>, StoreError> {
        sqlx::query(
            "SELECT * FROM signals WHERE closed_at >= ? ORDER BY closed_at DESC LIMIT ?",
        )
        .bind(t)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?
        .iter()
        .map(row_to_signal)
        .collect()
    }

    /// # Summary
    /// 关闭指定 ACTIVE 信号；已关闭的行不受影响 (永不重开)。
    async fn close(
        &self,
        key: &SignalKey,
        reason: CloseReason,
        closed_at: DateTime<Utc>,
        pnl: f64,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE signals
             SET status = 'CLOSED', close_reason = ?, closed_at = ?, realized_pnl = ?
             WHERE symbol = ? AND direction = ? AND created_at = ? AND status = 'ACTIVE'",
        )
        .bind(reason.to_string())
        .bind(closed_at)
        .bind(pnl)
        .bind(&key.symbol)
        .bind(key.direction.to_string())
        .bind(key.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn mark_alert_sent(
        &self,
        key: &SignalKey,
        kind: AlertKind,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let sql = match kind {
            AlertKind::TakeProfit => {
                "UPDATE signals SET tp_alert_sent = 1, last_alert_time = ?
                 WHERE symbol = ? AND direction = ? AND created_at = ?"
            }
            AlertKind::StopLoss => {
                "UPDATE signals SET sl_alert_sent = 1, last_alert_time = ?
                 WHERE symbol = ? AND direction = ? AND created_at = ?"
            }
            AlertKind::Reversal => {
                "UPDATE signals SET reversal_alert_sent = 1, last_alert_time = ?
                 WHERE symbol = ? AND direction = ? AND created_at = ?"
            }
            AlertKind::Trailing => {
                "UPDATE signals SET trailing_alert_sent = 1, last_alert_time = ?
                 WHERE symbol = ? AND direction = ? AND created_at = ?"
            }
        };

        let result = sqlx::query(sql)
            .bind(at)
            .bind(&key.symbol)
            .bind(key.direction.to_string())
            .bind(key.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn close_all_active(&self, reason: CloseReason) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE signals
             SET status = 'CLOSED', close_reason = ?, closed_at = ?
             WHERE status = 'ACTIVE'",
        )
        .bind(reason.to_string())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        let closed = result.rows_affected();
        if closed > 0 {
            info!(closed, %reason, "bulk closed active signals");
        }
        Ok(closed)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

/// # Summary
/// 行到实体的映射。枚举列按稳定字符串解析，上下文列按 JSON 解码。
fn row_to_signal(row: &SqliteRow) -> Result<Signal, StoreError> {
    let codec = |e: String| StoreError::Codec(e);

    let direction: String = get(row, "direction")?;
    let tier: String = get(row, "tier")?;
    let regime: String = get(row, "regime")?;
    let status: String = get(row, "status")?;
    let close_reason: Option<String> = get(row, "close_reason")?;
    let validator_tier: Option<String> = get(row, "validator_tier")?;
    let context_json: String = get(row, "context")?;

    let context: IndicatorContext =
        serde_json::from_str(&context_json).map_err(|e| codec(e.to_string()))?;

    Ok(Signal {
        id: get(row, "id")?,
        symbol: get(row, "symbol")?,
        direction: direction.parse::<Direction>().map_err(codec)?,
        tier: tier.parse::<SignalTier>().map_err(codec)?,
        entry_price: get(row, "entry_price")?,
        stop_loss: get(row, "stop_loss")?,
        take_profit_1: get(row, "take_profit_1")?,
        take_profit_2: get(row, "take_profit_2")?,
        risk_reward_ratio: get(row, "risk_reward_ratio")?,
        recommended_size: get(row, "recommended_size")?,
        regime: regime.parse().map_err(codec)?,
        context,
        confluence_score: get::<i64>(row, "confluence_score")? as u8,
        confidence_score: get(row, "confidence_score")?,
        break_even_win_rate: get(row, "break_even_win_rate")?,
        risk_percent: get(row, "risk_percent")?,
        reward_percent: get(row, "reward_percent")?,
        tp1_percent: get(row, "tp1_percent")?,
        tp2_percent: get(row, "tp2_percent")?,
        nearest_level_dist: get(row, "nearest_level_dist")?,
        validator_score: get::<i64>(row, "validator_score")? as u8,
        validator_confidence: get::<i64>(row, "validator_confidence")? as u8,
        validator_tier: validator_tier
            .map(|t| t.parse::<ValidatorTier>())
            .transpose()
            .map_err(codec)?,
        validator_reason: get(row, "validator_reason")?,
        status: status.parse::<SignalStatus>().map_err(codec)?,
        close_reason: close_reason
            .map(|r| r.parse::<CloseReason>())
            .transpose()
            .map_err(codec)?,
        realized_pnl: get(row, "realized_pnl")?,
        tp_alert_sent: get(row, "tp_alert_sent")?,
        sl_alert_sent: get(row, "sl_alert_sent")?,
        reversal_alert_sent: get(row, "reversal_alert_sent")?,
        trailing_alert_sent: get(row, "trailing_alert_sent")?,
        last_alert_time: get(row, "last_alert_time")?,
        created_at: get(row, "created_at")?,
        closed_at: get(row, "closed_at")?,
    })
}

fn get<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| StoreError::Codec(format!("{}: {}", column, e)))
}
