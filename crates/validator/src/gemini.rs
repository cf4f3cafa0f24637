use crate::parse::{is_rotatable, parse_batch};
use crate::prompt::batch_prompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shingo_core::signal::entity::Signal;
use shingo_core::validate::entity::Verdict;
use shingo_core::validate::error::ValidateError;
use shingo_core::validate::port::SignalValidator;
use std::time::Duration;
use tracing::{debug, info, warn};

/// 默认服务端点。
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// 批量验证请求的截止时间。
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// # Summary
/// Gemini 文本生成接口之上的信号验证适配器。
///
/// # Invariants
/// - 模型按静态优先级依次尝试；单个模型内按顺序轮换凭据。
/// - 限流/无效凭据类错误换下一把钥匙；其余错误放弃当前模型。
/// - 响应按不可信输入对待：防御性解析，
///   不可恢复的解析失败以统一兜底裁决收场，永不使周期失败。
pub struct GeminiValidator {
    api_keys: Vec<String>,
    models: Vec<String>,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiValidator {
    /// # Summary
    /// 创建验证适配器。
    ///
    /// # Arguments
    /// * `api_keys`: 有序凭据池。
    /// * `models`: 有序模型优先级列表。
    ///
    /// # Returns
    /// 凭据或模型列表为空时返回 `ValidateError::NoCredentials`。
    pub fn new(api_keys: Vec<String>, models: Vec<String>) -> Result<Self, ValidateError> {
        let api_keys: Vec<String> = api_keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        if api_keys.is_empty() || models.is_empty() {
            return Err(ValidateError::NoCredentials);
        }

        info!(keys = api_keys.len(), models = models.len(), "validator initialized");

        Ok(Self {
            api_keys,
            models,
            base_url: DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .map_err(|e| ValidateError::Network(e.to_string()))?,
        })
    }

    /// 指向自建端点 (测试用)。
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// # Summary
    /// 对单个 (模型, 凭据) 组合执行一次生成调用。
    ///
    /// # Returns
    /// 成功返回响应正文文本；失败返回含上游错误细节的文本
    /// (供轮换谓词分类)。
    async fn generate(&self, model: &str, api_key: &str, prompt: &str) -> Result<String, String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, model, api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;
        if !status.is_success() {
            return Err(format!("{}: {}", status, body));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| e.to_string())?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err("empty completion".to_string());
        }
        Ok(text)
    }
}

#[async_trait]
impl SignalValidator for GeminiValidator {
    /// # Summary
    /// 整批候选一次调用验证。
    ///
    /// # Logic
    /// 1. 空批直接返回空列表。
    /// 2. 逐模型、逐凭据尝试；可轮换错误换钥匙，其余换模型。
    /// 3. 任一组合成功即防御性解析并返回 (解析失败由
    ///    `parse_batch` 以兜底裁决兜住)。
    /// 4. 全部组合失败返回 `ValidateError::Exhausted`。
    async fn batch_validate(&self, candidates: &[Signal]) -> Result<Vec<Verdict>, ValidateError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let prompt = batch_prompt(candidates);
        info!(
            count = candidates.len(),
            models = self.models.len(),
            "batch validating candidates"
        );

        let mut last_error = String::new();

        for model in &self.models {
            debug!(%model, "trying validator model");

            for (key_index, api_key) in self.api_keys.iter().enumerate() {
                match self.generate(model, api_key, &prompt).await {
                    Ok(text) => {
                        info!(%model, key_index, "validator responded");
                        return Ok(parse_batch(&text, candidates.len()));
                    }
                    Err(error_text) => {
                        warn!(%model, key_index, error = %error_text, "validator call failed");
                        last_error = error_text;
                        if is_rotatable(&last_error) {
                            // 限流或无效凭据：换下一把钥匙
                            continue;
                        }
                        // 其余错误：放弃当前模型
                        break;
                    }
                }
            }
        }

        Err(ValidateError::Exhausted(last_error))
    }
}
