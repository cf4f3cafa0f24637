use async_trait::async_trait;
use chrono::Utc;
use shingo_core::config::QUOTE_SUFFIX;
use shingo_core::store::error::StoreError;
use shingo_core::store::port::WatchlistStore;
use sqlx::{Row, SqlitePool};
use tracing::info;

/// # Summary
/// WatchlistStore 的 SQLite 实现。
///
/// # Invariants
/// - 交易对统一大写；必须以接受的计价后缀结尾。
/// - Upsert 保留首次加入时间。
pub struct SqliteWatchlistStore {
    pool: SqlitePool,
}

impl SqliteWatchlistStore {
    /// # Summary
    /// 连接数据库并初始化关注列表表结构。
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = crate::open_pool(database_url).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS watchlist (
                symbol TEXT PRIMARY KEY,
                added_at TEXT NOT NULL,
                is_active INTEGER NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl WatchlistStore for SqliteWatchlistStore {
    async fn symbols(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT symbol FROM watchlist WHERE is_active = 1 ORDER BY added_at")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("symbol")
                    .map_err(|e| StoreError::Codec(e.to_string()))
            })
            .collect()
    }

    /// # Summary
    /// 加入交易对 (Upsert)。
    ///
    /// # Logic
    /// 1. 规范化：去空白并转大写。
    /// 2. 校验计价后缀。
    /// 3. 冲突时仅重新激活，保留 `added_at`。
    async fn add(&self, symbol: &str) -> Result<(), StoreError> {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.ends_with(QUOTE_SUFFIX) {
            return Err(StoreError::Validation(format!(
                "symbol must end with {}",
                QUOTE_SUFFIX
            )));
        }

        sqlx::query(
            "INSERT INTO watchlist (symbol, added_at, is_active) VALUES (?, ?, 1)
             ON CONFLICT(symbol) DO UPDATE SET is_active = 1",
        )
        .bind(&symbol)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        info!(%symbol, "added to watchlist");
        Ok(())
    }

    async fn remove(&self, symbol: &str) -> Result<(), StoreError> {
        let symbol = symbol.trim().to_uppercase();
        sqlx::query("DELETE FROM watchlist WHERE symbol = ?")
            .bind(&symbol)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        info!(%symbol, "removed from watchlist");
        Ok(())
    }

    /// # Summary
    /// 列表为空时写入默认交易对集合。
    async fn ensure_seeded(&self, defaults: &[&str]) -> Result<(), StoreError> {
        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM watchlist")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?
            .try_get("n")
            .map_err(|e| StoreError::Codec(e.to_string()))?;

        if count > 0 {
            return Ok(());
        }

        info!(count = defaults.len(), "seeding default watchlist");
        for symbol in defaults {
            self.add(symbol).await?;
        }
        Ok(())
    }
}
