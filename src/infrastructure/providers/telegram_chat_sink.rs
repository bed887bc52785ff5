use crate::domain::errors::ChatSinkError;
use crate::domain::ports::ChatSink;
use async_trait::async_trait;
use reqwest::multipart;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use std::time::Duration;

const PHOTO_TIMEOUT: Duration = Duration::from_secs(10);
const TEXT_TIMEOUT: Duration = Duration::from_secs(5);

/// Telegram Bot API adapter. Sends a chart photo with the alert as its
/// caption; if that call times out or fails, falls back to a plain
/// text message so a slow chart render never swallows the alert.
pub struct TelegramChatSink {
    client: ClientWithMiddleware,
    bot_token: String,
    chat_id: String,
    reply_to: Option<String>,
}

impl TelegramChatSink {
    pub fn new(client: ClientWithMiddleware, bot_token: String, chat_id: String) -> Self {
        Self { client, bot_token, chat_id, reply_to: None }
    }

    /// Threads the next send as a reply to an earlier message, mirroring
    /// the watchlist's `last_message_id` reply-chain behavior.
    pub fn with_reply_to(mut self, message_id: Option<String>) -> Self {
        self.reply_to = message_id;
        self
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{method}", self.bot_token)
    }
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    result: Option<TelegramMessage>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    message_id: i64,
}

fn parse_response(response: TelegramResponse) -> Result<String, ChatSinkError> {
    if !response.ok {
        return Err(ChatSinkError::Rejected {
            reason: response.description.unwrap_or_else(|| "unknown telegram error".to_string()),
        });
    }
    response
        .result
        .map(|m| m.message_id.to_string())
        .ok_or_else(|| ChatSinkError::Rejected { reason: "missing result in telegram response".to_string() })
}

#[async_trait]
impl ChatSink for TelegramChatSink {
    async fn send_photo(&self, caption: &str, image: &[u8]) -> Result<String, ChatSinkError> {
        let mut form = multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "Markdown")
            .part("photo", multipart::Part::bytes(image.to_vec()).file_name("chart.png"));

        if let Some(reply_to) = &self.reply_to {
            form = form.text("reply_to_message_id", reply_to.clone());
        }

        let response = tokio::time::timeout(
            PHOTO_TIMEOUT,
            self.client.post(self.api_url("sendPhoto")).multipart(form).send(),
        )
        .await
        .map_err(|_| ChatSinkError::Timeout { duration_ms: PHOTO_TIMEOUT.as_millis() as u64 })?
        .map_err(|e| ChatSinkError::Rejected { reason: e.to_string() })?;

        let parsed: TelegramResponse = response
            .json()
            .await
            .map_err(|e| ChatSinkError::Rejected { reason: e.to_string() })?;
        parse_response(parsed)
    }

    async fn send_text(&self, text: &str) -> Result<String, ChatSinkError> {
        let mut params = vec![
            ("chat_id", self.chat_id.clone()),
            ("text", text.to_string()),
            ("parse_mode", "Markdown".to_string()),
        ];
        if let Some(reply_to) = &self.reply_to {
            params.push(("reply_to_message_id", reply_to.clone()));
        }

        let response = tokio::time::timeout(
            TEXT_TIMEOUT,
            self.client.post(self.api_url("sendMessage")).form(&params).send(),
        )
        .await
        .map_err(|_| ChatSinkError::Timeout { duration_ms: TEXT_TIMEOUT.as_millis() as u64 })?
        .map_err(|e| ChatSinkError::Rejected { reason: e.to_string() })?;

        let parsed: TelegramResponse = response
            .json()
            .await
            .map_err(|e| ChatSinkError::Rejected { reason: e.to_string() })?;
        parse_response(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_when_ok_is_false() {
        let response = TelegramResponse { ok: false, result: None, description: Some("chat not found".to_string()) };
        let err = parse_response(response).unwrap_err();
        assert!(matches!(err, ChatSinkError::Rejected { reason } if reason == "chat not found"));
    }

    #[test]
    fn extracts_message_id_on_success() {
        let response = TelegramResponse { ok: true, result: Some(TelegramMessage { message_id: 4242 }), description: None };
        let id = parse_response(response).unwrap();
        assert_eq!(id, "4242");
    }

    #[test]
    fn api_url_embeds_token_and_method() {
        let sink = TelegramChatSink::new(
            crate::infrastructure::core::http_client_factory::HttpClientFactory::create_client(TEXT_TIMEOUT),
            "123:abc".to_string(),
            "-100555".to_string(),
        );
        assert_eq!(sink.api_url("sendMessage"), "https://api.telegram.org/bot123:abc/sendMessage");
    }
}
