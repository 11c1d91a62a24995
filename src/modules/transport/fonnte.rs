// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::base64_encode;
use crate::modules::campaign::entity::LogStatus;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::RustBlastResult;
use crate::modules::transport::{
    map_delivery_state, map_request_error, MessageTransport, TransportAttachment,
};
use crate::{raise_error, rustblast_version, utc_now};
use std::time::Duration;

const FONNTE_API_BASE: &str = "https://api.fonnte.com";

/// Stateless key-based adapter for the Fonnte cloud API. Attachments travel
/// inline as base64 in the JSON body.
pub struct FonnteClient {
    client: reqwest::Client,
    api_key: String,
}

impl FonnteClient {
    pub fn new(api_key: String) -> RustBlastResult<Self> {
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
        Ok(Self { client, api_key })
    }

    /// Probe the device attached to the API key. True when the provider
    /// reports the device as usable.
    pub async fn check_device(&self) -> RustBlastResult<bool> {
        let response = self
            .client
            .post(format!("{}/device", FONNTE_API_BASE))
            .header("Authorization", &self.api_key)
            .send()
            .await
            .map_err(|e| map_request_error("Fonnte", e))?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| map_request_error("Fonnte", e))?;
        Ok(body["status"].as_bool().unwrap_or(false))
    }
}

impl MessageTransport for FonnteClient {
    async fn send_message(
        &self,
        number: &str,
        text: &str,
        attachment: Option<&TransportAttachment>,
    ) -> RustBlastResult<String> {
        let mut payload = serde_json::json!({
            "target": number,
            "message": text,
        });
        if let Some(attachment) = attachment {
            payload["file"] = serde_json::Value::String(base64_encode!(&attachment.bytes));
            payload["filename"] = serde_json::Value::String(attachment.filename.clone());
        }
        let response = self
            .client
            .post(format!("{}/send", FONNTE_API_BASE))
            .header("Authorization", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| map_request_error("Fonnte", e))?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| map_request_error("Fonnte", e))?;
        parse_send_response(&body)
    }

    async fn fetch_status(&self, provider_message_id: &str) -> RustBlastResult<LogStatus> {
        let response = self
            .client
            .post(format!("{}/get-status", FONNTE_API_BASE))
            .header("Authorization", &self.api_key)
            .json(&serde_json::json!({ "id": provider_message_id }))
            .send()
            .await
            .map_err(|e| map_request_error("Fonnte", e))?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| map_request_error("Fonnte", e))?;
        parse_status_response(&body)
    }
}

/// Logical success is a body-level flag; an HTTP 200 can still carry a
/// rejection.
fn parse_send_response(body: &serde_json::Value) -> RustBlastResult<String> {
    if body["status"].as_bool() == Some(true) {
        let message_id = body["id_log"]
            .as_str()
            .map(str::to_string)
            .or_else(|| body["id"][0].as_str().map(str::to_string))
            .or_else(|| body["id"][0].as_i64().map(|id| id.to_string()))
            .unwrap_or_else(|| format!("local_{}", utc_now!()));
        return Ok(message_id);
    }
    let reason = body["reason"]
        .as_str()
        .or_else(|| body["detail"].as_str())
        .unwrap_or("Fonnte rejected the message without a reason");
    Err(raise_error!(reason.to_string(), ErrorCode::ProviderRejected))
}

fn parse_status_response(body: &serde_json::Value) -> RustBlastResult<LogStatus> {
    if body["status"].as_bool() != Some(true) {
        let reason = body["reason"]
            .as_str()
            .unwrap_or("Fonnte did not return a delivery state");
        return Err(raise_error!(reason.to_string(), ErrorCode::ProviderRejected));
    }
    let state = body["data"][0]["status"]
        .as_str()
        .or_else(|| body["data"]["status"].as_str())
        .ok_or_else(|| {
            raise_error!(
                "Fonnte status response is missing the delivery state".into(),
                ErrorCode::ProviderRejected
            )
        })?;
    map_delivery_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_response_prefers_id_log() {
        let body = serde_json::json!({
            "status": true,
            "id_log": "log-77",
            "id": ["900"],
        });
        assert_eq!(parse_send_response(&body).unwrap(), "log-77");
    }

    #[test]
    fn send_response_falls_back_to_first_id() {
        let body = serde_json::json!({
            "status": true,
            "id": ["900"],
        });
        assert_eq!(parse_send_response(&body).unwrap(), "900");
    }

    #[test]
    fn http_success_with_logical_failure_is_an_error() {
        let body = serde_json::json!({
            "status": false,
            "reason": "target invalid",
        });
        let err = parse_send_response(&body).unwrap_err();
        assert_eq!(err.to_string(), "target invalid");
    }

    #[test]
    fn status_response_maps_delivery_state() {
        let body = serde_json::json!({
            "status": true,
            "data": [{ "status": "delivered" }],
        });
        assert_eq!(parse_status_response(&body).unwrap(), LogStatus::Delivered);
    }
}
