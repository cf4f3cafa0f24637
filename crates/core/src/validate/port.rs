use crate::signal::entity::Signal;
use crate::validate::entity::Verdict;
use crate::validate::error::ValidateError;
use async_trait::async_trait;

/// # Summary
/// 候选信号批量验证接口。
///
/// # Invariants
/// - 返回的裁决列表与输入候选按位置一一对应。
/// - 每个候选在单个周期内至多被验证一次。
/// - 除返回值外不得产生任何副作用。
#[async_trait]
pub trait SignalValidator: Send + Sync {
    /// # Summary
    /// 将整批候选一次性送交外部评分服务。
    ///
    /// # Logic
    /// 1. 将候选的结构化字段嵌入提示词。
    /// 2. 按静态优先级尝试模型，模型内按顺序轮换凭据。
    /// 3. 防御性解析响应 (容忍围栏代码块)；
    ///    不可恢复的解析失败返回统一兜底裁决而非错误。
    ///
    /// # Arguments
    /// * `candidates`: 通过冷却/去重闸门的候选信号。
    ///
    /// # Returns
    /// 与输入等长的裁决列表，或 `ValidateError`。
    async fn batch_validate(&self, candidates: &[Signal]) -> Result<Vec<Verdict>, ValidateError>;
}
