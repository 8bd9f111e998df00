//! Telegram channel transport using the Bot API `sendMediaGroup` method.
//!
//! An album goes out as one multipart request: each photo is a form part
//! referenced from the `media` JSON array via an `attach://` URL.

use super::{AlbumItem, ChannelTransport};
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

const API_BASE: &str = "https://api.telegram.org";

/// Transport for posting albums to a Telegram chat or channel.
pub struct TelegramTransport {
    token: String,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramTransport {
    pub fn new(token: &str) -> Self {
        Self::with_api_base(token, API_BASE)
    }

    /// Override the API host (used by tests and self-hosted Bot API servers).
    pub fn with_api_base(token: &str, api_base: &str) -> Self {
        Self {
            token: token.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.token)
    }
}

// --- Request types ---

/// Entry in the `media` JSON array. `media` carries an `attach://`
/// reference to the multipart part holding the bytes.
#[derive(Serialize)]
struct InputMediaPhoto {
    #[serde(rename = "type")]
    kind: &'static str,
    media: String,
}

/// Build the `media` array for an album of `count` attached photos.
fn media_list(count: usize) -> Vec<InputMediaPhoto> {
    (0..count)
        .map(|i| InputMediaPhoto {
            kind: "photo",
            media: format!("attach://photo{i}"),
        })
        .collect()
}

// --- Response types ---

#[derive(Deserialize, Default)]
struct ApiError {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Option<ResponseParameters>,
}

#[derive(Deserialize)]
struct ResponseParameters {
    #[serde(default)]
    retry_after: Option<u64>,
}

#[async_trait]
impl ChannelTransport for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send_album(
        &self,
        channel: &str,
        items: Vec<AlbumItem>,
    ) -> Result<(), TransportError> {
        let media = media_list(items.len());
        let media_json = serde_json::to_string(&media).map_err(|e| TransportError::Protocol {
            message: format!("Failed to encode media list: {e}"),
        })?;

        let mut form = Form::new()
            .text("chat_id", channel.to_string())
            .text("media", media_json);
        for (i, item) in items.into_iter().enumerate() {
            form = form.part(
                format!("photo{i}"),
                Part::bytes(item.bytes).file_name(item.file_name),
            );
        }

        let resp = self
            .client
            .post(self.method_url("sendMediaGroup"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network {
                message: e.to_string(),
            })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let body: ApiError = resp.json().await.unwrap_or_default();
        let description = body
            .description
            .unwrap_or_else(|| format!("HTTP {status}"));

        if status.as_u16() == 429 {
            return Err(TransportError::RateLimited {
                retry_after: body.parameters.and_then(|p| p.retry_after),
            });
        }
        if status.is_server_error() {
            return Err(TransportError::Network {
                message: description,
            });
        }
        Err(TransportError::Protocol {
            message: description,
        })
    }
}
