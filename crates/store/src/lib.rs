pub mod signal;
pub mod watchlist;

use shingo_core::store::error::StoreError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// # Summary
/// 按连接串打开 SQLite 连接池。
///
/// # Logic
/// 1. 文件型连接串先确保父目录存在。
/// 2. 开启 `create_if_missing`。
/// 3. 连接池固定单连接：SQLite 单写者模型下避免内部锁竞争，
///    也保证内存库在测试中表结构可见。
pub(crate) async fn open_pool(database_url: &str) -> Result<SqlitePool, StoreError> {
    if let Some(path) = database_url
        .strip_prefix("sqlite://")
        .filter(|p| !p.starts_with(':'))
    {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::InitError(e.to_string()))?;
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StoreError::InitError(e.to_string()))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| StoreError::InitError(e.to_string()))
}
