use async_trait::async_trait;
use serde::Serialize;
use shingo_core::notify::error::NotifyError;
use shingo_core::notify::port::Notifier;
use std::time::Duration;

/// 通知请求的截止时间。
const SEND_TIMEOUT_SECS: u64 = 10;

/// # Summary
/// A notifier implementation that sends messages via Telegram Bot API.
///
/// # Invariants
/// * `bot_token` must be valid.
/// * `chat_id` must be accessible by the bot.
pub struct TelegramNotifier {
    /// The Bot API token.
    bot_token: String,
    /// The target Chat ID.
    chat_id: String,
    /// The HTTP client used for requests.
    client: reqwest::Client,
}

/// # Summary
/// Payload structure for Telegram `sendMessage` API.
#[derive(Serialize)]
struct TelegramMessage {
    chat_id: String,
    text: String,
    parse_mode: String,
}

impl TelegramNotifier {
    /// # Summary
    /// Creates a new `TelegramNotifier`.
    ///
    /// # Logic
    /// Initializes the struct with provided credentials and an HTTP client
    /// bounded by a fixed send deadline.
    ///
    /// # Arguments
    /// * `bot_token` - The Telegram Bot API token.
    /// * `chat_id` - The target chat ID to send messages to.
    ///
    /// # Returns
    /// * A new instance, or `NotifyError::Config` when a credential is empty.
    pub fn new(bot_token: String, chat_id: String) -> Result<Self, NotifyError> {
        if bot_token.trim().is_empty() {
            return Err(NotifyError::Config("empty bot token".to_string()));
        }
        if chat_id.trim().is_empty() {
            return Err(NotifyError::Config("empty chat id".to_string()));
        }

        Ok(Self {
            bot_token,
            chat_id,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
                .build()
                .map_err(|e| NotifyError::Config(e.to_string()))?,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    /// # Summary
    /// Sends a notification to the configured Telegram chat.
    ///
    /// # Logic
    /// 1. Constructs the Telegram API URL.
    /// 2. Formats the message with a bold subject and the content.
    /// 3. Sends a POST request to the Telegram API.
    /// 4. Checks the response status and returns success or failure.
    ///
    /// # Arguments
    /// * `subject` - The subject of the notification (formatted as bold).
    /// * `content` - The main content of the notification.
    ///
    /// # Returns
    /// * `Ok(())` if the message was sent successfully.
    /// * `Err(NotifyError)` on network failure or a non-success API status.
    async fn notify(&self, subject: &str, content: &str) -> Result<(), NotifyError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.bot_token);
        let text = format!("<b>{}</b>\n{}", escape_html(subject), escape_html(content));

        let payload = TelegramMessage {
            chat_id: self.chat_id.clone(),
            text,
            parse_mode: "HTML".to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(NotifyError::Platform(format!(
                "Telegram API error: {}",
                error_text
            )));
        }

        Ok(())
    }
}

/// HTML parse mode 下的实体转义。
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_credentials_rejected() {
        assert!(TelegramNotifier::new(String::new(), "chat".to_string()).is_err());
        assert!(TelegramNotifier::new("token".to_string(), " ".to_string()).is_err());
        assert!(TelegramNotifier::new("token".to_string(), "chat".to_string()).is_ok());
    }

    #[test]
    fn html_entities_escaped() {
        assert_eq!(escape_html("R:R > 2.0 & <b>"), "R:R &gt; 2.0 &amp; &lt;b&gt;");
    }
}
