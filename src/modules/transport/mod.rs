// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::campaign::entity::LogStatus;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::{RustBlastError, RustBlastResult};
use crate::modules::settings::transport::{ProviderKind, TransportSettings};
use crate::modules::transport::baileys::BaileysClient;
use crate::modules::transport::fonnte::FonnteClient;
use crate::raise_error;

pub mod baileys;
pub mod fonnte;

/// A single outbound attachment, re-materialized from the blob store right
/// before the send.
#[derive(Clone, Debug)]
pub struct TransportAttachment {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// One provider adapter. Implementations return the provider-assigned message
/// id on success; a logical rejection inside an HTTP-success response is an
/// error like any other.
pub trait MessageTransport {
    fn send_message(
        &self,
        number: &str,
        text: &str,
        attachment: Option<&TransportAttachment>,
    ) -> impl std::future::Future<Output = RustBlastResult<String>> + Send;

    fn fetch_status(
        &self,
        provider_message_id: &str,
    ) -> impl std::future::Future<Output = RustBlastResult<LogStatus>> + Send;
}

pub enum ActiveTransport {
    Fonnte(FonnteClient),
    Baileys(BaileysClient),
}

impl ActiveTransport {
    /// Build the adapter for the currently configured provider. Configuration
    /// problems surface here, before any recipient is touched.
    pub fn from_settings(settings: &TransportSettings) -> RustBlastResult<ActiveTransport> {
        match settings.active_provider {
            ProviderKind::Fonnte => {
                if settings.fonnte_api_key.trim().is_empty() {
                    return Err(raise_error!(
                        "Fonnte API key is not configured. Please set it in Settings.".into(),
                        ErrorCode::MissingConfiguration
                    ));
                }
                Ok(ActiveTransport::Fonnte(FonnteClient::new(
                    settings.fonnte_api_key.clone(),
                )?))
            }
            ProviderKind::Baileys => {
                if !settings.baileys_session_connected {
                    return Err(raise_error!(
                        "Baileys is not connected. Please connect in Settings.".into(),
                        ErrorCode::TransportNotConnected
                    ));
                }
                let server_url = settings.baileys_server_url.clone().ok_or_else(|| {
                    raise_error!(
                        "Baileys server URL is not configured. Please set it in Settings.".into(),
                        ErrorCode::MissingConfiguration
                    )
                })?;
                let api_key = settings.baileys_api_key.clone().ok_or_else(|| {
                    raise_error!(
                        "Baileys API key is not configured. Please set it in Settings.".into(),
                        ErrorCode::MissingConfiguration
                    )
                })?;
                Ok(ActiveTransport::Baileys(BaileysClient::new(
                    server_url, api_key,
                )?))
            }
        }
    }
}

impl MessageTransport for ActiveTransport {
    async fn send_message(
        &self,
        number: &str,
        text: &str,
        attachment: Option<&TransportAttachment>,
    ) -> RustBlastResult<String> {
        match self {
            ActiveTransport::Fonnte(client) => client.send_message(number, text, attachment).await,
            ActiveTransport::Baileys(client) => client.send_message(number, text, attachment).await,
        }
    }

    async fn fetch_status(&self, provider_message_id: &str) -> RustBlastResult<LogStatus> {
        match self {
            ActiveTransport::Fonnte(client) => client.fetch_status(provider_message_id).await,
            ActiveTransport::Baileys(client) => client.fetch_status(provider_message_id).await,
        }
    }
}

pub(crate) fn map_request_error(provider: &str, e: reqwest::Error) -> RustBlastError {
    if e.is_timeout() {
        raise_error!(
            format!("Request to {} timed out: {}", provider, e),
            ErrorCode::ConnectionTimeout
        )
    } else if e.is_connect() {
        raise_error!(
            format!(
                "Could not reach {}: {}. Check the network and provider settings.",
                provider, e
            ),
            ErrorCode::NetworkError
        )
    } else {
        raise_error!(
            format!("Request to {} failed: {}", provider, e),
            ErrorCode::HttpResponseError
        )
    }
}

/// Normalize a provider-reported delivery state string.
pub(crate) fn map_delivery_state(state: &str) -> RustBlastResult<LogStatus> {
    match state.to_ascii_lowercase().as_str() {
        "sent" => Ok(LogStatus::Sent),
        "delivered" => Ok(LogStatus::Delivered),
        "read" => Ok(LogStatus::Read),
        "failed" => Ok(LogStatus::Failed),
        other => Err(raise_error!(
            format!("Unknown delivery state '{}' reported by provider", other),
            ErrorCode::ProviderRejected
        )),
    }
}
