use thiserror::Error;

/// # Summary
/// 验证适配层错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
#[derive(Error, Debug)]
pub enum ValidateError {
    /// 未配置任何可用凭据
    #[error("No validator credentials configured")]
    NoCredentials,
    /// 网络或传输错误
    #[error("Network error: {0}")]
    Network(String),
    /// 全部模型与凭据组合均告失败
    #[error("All validator models exhausted: {0}")]
    Exhausted(String),
}
