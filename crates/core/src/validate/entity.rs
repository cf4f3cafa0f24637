use crate::signal::entity::ValidatorTier;
use serde::{Deserialize, Serialize};

/// # Summary
/// 外部验证器对单个候选信号的裁决。
///
/// # Invariants
/// - `score` 与 `confidence` 取值范围为 [0, 100]。
/// - 与输入候选按位置一一对应。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    // 验证分数 (0-100)
    pub score: u8,
    // 验证器自评置信度 (0-100)
    pub confidence: u8,
    // 质量层级；缺失时由分数推导
    pub tier: ValidatorTier,
    // 自由文本理由
    pub reason: String,
}

impl Verdict {
    /// # Summary
    /// 响应不可恢复解析失败时的统一兜底裁决。
    ///
    /// # Logic
    /// 分数 50、层级 STANDARD、理由 "parse error"，不使周期失败。
    pub fn parse_fallback() -> Self {
        Verdict {
            score: 50,
            confidence: 0,
            tier: ValidatorTier::Standard,
            reason: "parse error".to_string(),
        }
    }
}
