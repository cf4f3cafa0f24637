use serde::Deserialize;
use shingo_core::signal::entity::ValidatorTier;
use shingo_core::validate::entity::Verdict;

/// # Summary
/// 剥离围栏代码块包装，返回内部文本。
///
/// # Logic
/// 1. 以 "```" 开头时，跳过首行 (可能带语言标签)。
/// 2. 自尾部向前找到闭合围栏并截断。
/// 3. 无围栏时原样返回。
pub fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // 跳过语言标签行
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };

    match body.rfind("```") {
        Some(pos) => body[..pos].trim(),
        None => body.trim(),
    }
}

/// 验证器响应中的单条裁决 (字段均可缺失，防御性解析)。
#[derive(Debug, Deserialize)]
struct RawVerdict {
    #[serde(default)]
    score: i64,
    #[serde(default)]
    confidence: i64,
    #[serde(default)]
    tier: Option<String>,
    #[serde(default)]
    reason: Option<String>,
}

/// # Summary
/// 解析批量响应为与候选等长的裁决列表。
///
/// # Logic
/// 1. 先剥离代码围栏，再按 JSON 数组解析。
/// 2. 不可恢复解析失败：整批返回统一兜底裁决 (分 50 / STANDARD)。
/// 3. 响应条目与候选按位置一一对应；响应短缺的位置
///    保持零分 REJECT (下游阈值自然拒绝)。
/// 4. 层级缺失或未知时由分数推导。
pub fn parse_batch(text: &str, expected: usize) -> Vec<Verdict> {
    let json = extract_json(text);

    let raw: Vec<RawVerdict> = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(_) => return vec![Verdict::parse_fallback(); expected],
    };

    let mut verdicts = vec![
        Verdict {
            score: 0,
            confidence: 0,
            tier: ValidatorTier::Reject,
            reason: String::new(),
        };
        expected
    ];

    for (idx, entry) in raw.into_iter().take(expected).enumerate() {
        let score = entry.score.clamp(0, 100) as u8;
        let tier = entry
            .tier
            .as_deref()
            .map(str::trim)
            .map(str::to_uppercase)
            .and_then(|t| t.parse::<ValidatorTier>().ok())
            .unwrap_or_else(|| ValidatorTier::from_score(score));

        verdicts[idx] = Verdict {
            score,
            confidence: entry.confidence.clamp(0, 100) as u8,
            tier,
            reason: entry.reason.unwrap_or_default(),
        };
    }

    verdicts
}

/// # Summary
/// 可轮换错误的判定谓词：限流或无效凭据换下一把钥匙，
/// 其余错误放弃当前模型。
pub fn is_rotatable(error_text: &str) -> bool {
    const MARKERS: [&str; 6] = [
        "429",
        "quota",
        "expired",
        "API_KEY_INVALID",
        "INVALID_ARGUMENT",
        "RESOURCE_EXHAUSTED",
    ];
    MARKERS.iter().any(|marker| error_text.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fenced_code_block() {
        let fenced = "```json\n[{\"score\": 80}]\n```";
        assert_eq!(extract_json(fenced), "[{\"score\": 80}]");

        let no_lang = "```\n[1, 2]\n```";
        assert_eq!(extract_json(no_lang), "[1, 2]");

        let plain = "[{\"score\": 80}]";
        assert_eq!(extract_json(plain), plain);
    }

    #[test]
    fn parses_well_formed_batch() {
        let text = r#"[
            {"signal": 1, "score": 92, "confidence": 85, "tier": "PREMIUM", "reason": "strong"},
            {"signal": 2, "score": 75, "confidence": 60, "tier": "STANDARD", "reason": "decent"}
        ]"#;
        let verdicts = parse_batch(text, 2);
        assert_eq!(verdicts[0].score, 92);
        assert_eq!(verdicts[0].tier, ValidatorTier::Premium);
        assert_eq!(verdicts[1].reason, "decent");
    }

    #[test]
    fn missing_tier_derived_from_score() {
        let text = r#"[{"score": 95}, {"score": 72}, {"score": 30}]"#;
        let verdicts = parse_batch(text, 3);
        assert_eq!(verdicts[0].tier, ValidatorTier::Premium);
        assert_eq!(verdicts[1].tier, ValidatorTier::Standard);
        assert_eq!(verdicts[2].tier, ValidatorTier::Reject);
    }

    #[test]
    fn unknown_tier_derived_from_score() {
        let text = r#"[{"score": 88, "tier": "AMAZING"}]"#;
        let verdicts = parse_batch(text, 1);
        assert_eq!(verdicts[0].tier, ValidatorTier::Standard);
    }

    #[test]
    fn garbage_returns_uniform_fallback() {
        let verdicts = parse_batch("the market looks great!", 3);
        assert_eq!(verdicts.len(), 3);
        for v in &verdicts {
            assert_eq!(v.score, 50);
            assert_eq!(v.tier, ValidatorTier::Standard);
            assert_eq!(v.reason, "parse error");
        }
    }

    #[test]
    fn short_response_leaves_zero_verdicts() {
        let text = r#"[{"score": 90, "tier": "PREMIUM"}]"#;
        let verdicts = parse_batch(text, 3);
        assert_eq!(verdicts[0].score, 90);
        // 响应短缺的位置保持零分，下游必然拒绝
        assert_eq!(verdicts[1].score, 0);
        assert_eq!(verdicts[1].tier, ValidatorTier::Reject);
    }

    #[test]
    fn out_of_range_scores_clamped() {
        let text = r#"[{"score": 150}, {"score": -20}]"#;
        let verdicts = parse_batch(text, 2);
        assert_eq!(verdicts[0].score, 100);
        assert_eq!(verdicts[1].score, 0);
    }

    #[test]
    fn rotation_predicate_classifies_markers() {
        assert!(is_rotatable("HTTP 429 Too Many Requests"));
        assert!(is_rotatable("quota exceeded for project"));
        assert!(is_rotatable("API_KEY_INVALID: check credentials"));
        assert!(!is_rotatable("500 Internal Server Error"));
        assert!(!is_rotatable("connection reset by peer"));
    }
}
