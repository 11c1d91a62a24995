// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::campaign::entity::LogStatus;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::RustBlastResult;
use crate::modules::transport::{
    map_delivery_state, map_request_error, MessageTransport, TransportAttachment,
};
use crate::{raise_error, rustblast_version};
use reqwest::multipart;
use std::time::Duration;
use url::Url;

/// Adapter for a self-hosted Baileys session gateway. Text goes as JSON,
/// attachments as multipart with the raw bytes.
pub struct BaileysClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl BaileysClient {
    pub fn new(server_url: String, api_key: String) -> RustBlastResult<Self> {
        let base_url = Url::parse(&server_url).map_err(|e| {
            raise_error!(
                format!("Invalid Baileys server URL '{}': {}", server_url, e),
                ErrorCode::InvalidParameter
            )
        })?;
        let client = reqwest::ClientBuilder::new()
            .user_agent(rustblast_version!())
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                raise_error!(
                    format!("Failed to build HTTP client: {:#?}", e),
                    ErrorCode::InternalError
                )
            })?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> RustBlastResult<Url> {
        self.base_url.join(path).map_err(|e| {
            raise_error!(
                format!("Invalid Baileys endpoint '{}': {}", path, e),
                ErrorCode::InternalError
            )
        })
    }

    /// Ask the gateway whether its WhatsApp session is currently connected.
    pub async fn session_status(&self) -> RustBlastResult<bool> {
        let response = self
            .client
            .get(self.endpoint("/sessions/status")?)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| map_request_error("Baileys", e))?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| map_request_error("Baileys", e))?;
        Ok(body["data"]["status"].as_str() == Some("connected"))
    }

    /// Tear down the gateway session.
    pub async fn logout(&self) -> RustBlastResult<()> {
        let response = self
            .client
            .post(self.endpoint("/sessions/logout")?)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| map_request_error("Baileys", e))?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| map_request_error("Baileys", e))?;
        ensure_success(&body)?;
        Ok(())
    }
}

impl MessageTransport for BaileysClient {
    async fn send_message(
        &self,
        number: &str,
        text: &str,
        attachment: Option<&TransportAttachment>,
    ) -> RustBlastResult<String> {
        let response = match attachment {
            None => self
                .client
                .post(self.endpoint("/messages/send-text")?)
                .bearer_auth(&self.api_key)
                .json(&serde_json::json!({
                    "number": number,
                    "text": text,
                }))
                .send()
                .await
                .map_err(|e| map_request_error("Baileys", e))?,
            Some(attachment) => {
                let part = multipart::Part::bytes(attachment.bytes.clone())
                    .file_name(attachment.filename.clone())
                    .mime_str(&attachment.mime_type)
                    .map_err(|e| {
                        raise_error!(
                            format!(
                                "Invalid MIME type '{}' for attachment '{}': {}",
                                attachment.mime_type, attachment.filename, e
                            ),
                            ErrorCode::InvalidParameter
                        )
                    })?;
                let form = multipart::Form::new()
                    .text("number", number.to_string())
                    .text("caption", text.to_string())
                    .part("file", part);
                self.client
                    .post(self.endpoint("/messages/send-media")?)
                    .bearer_auth(&self.api_key)
                    .multipart(form)
                    .send()
                    .await
                    .map_err(|e| map_request_error("Baileys", e))?
            }
        };
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| map_request_error("Baileys", e))?;
        parse_send_response(&body)
    }

    async fn fetch_status(&self, provider_message_id: &str) -> RustBlastResult<LogStatus> {
        let response = self
            .client
            .get(self.endpoint(&format!("/messages/{}/status", provider_message_id))?)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| map_request_error("Baileys", e))?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| map_request_error("Baileys", e))?;
        ensure_success(&body)?;
        let state = body["data"]["status"].as_str().ok_or_else(|| {
            raise_error!(
                "Baileys status response is missing the delivery state".into(),
                ErrorCode::ProviderRejected
            )
        })?;
        map_delivery_state(state)
    }
}

fn ensure_success(body: &serde_json::Value) -> RustBlastResult<()> {
    if body["status"].as_str() == Some("success") {
        return Ok(());
    }
    let message = body["message"]
        .as_str()
        .unwrap_or("Baileys gateway rejected the request");
    Err(raise_error!(
        message.to_string(),
        ErrorCode::ProviderRejected
    ))
}

fn parse_send_response(body: &serde_json::Value) -> RustBlastResult<String> {
    ensure_success(body)?;
    body["data"]["id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            raise_error!(
                "Baileys response is missing the message id".into(),
                ErrorCode::ProviderRejected
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_response_extracts_message_id() {
        let body = serde_json::json!({
            "status": "success",
            "data": { "id": "BAE5F4..." },
        });
        assert_eq!(parse_send_response(&body).unwrap(), "BAE5F4...");
    }

    #[test]
    fn gateway_rejection_surfaces_its_message() {
        let body = serde_json::json!({
            "status": "error",
            "message": "session expired",
        });
        let err = parse_send_response(&body).unwrap_err();
        assert_eq!(err.to_string(), "session expired");
    }

    #[test]
    fn missing_message_id_is_an_error() {
        let body = serde_json::json!({ "status": "success", "data": {} });
        assert!(parse_send_response(&body).is_err());
    }
}
