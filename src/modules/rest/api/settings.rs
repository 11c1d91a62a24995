// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::error::code::ErrorCode;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use crate::modules::settings::transport::{TransportSettings, TransportSettingsUpdateRequest};
use crate::modules::transport::baileys::BaileysClient;
use crate::modules::transport::fonnte::FonnteClient;
use crate::raise_error;
use poem_openapi::payload::Json;
use poem_openapi::{Object, OpenApi};

pub struct SettingsApi;

#[derive(Clone, Debug, Eq, PartialEq, Object)]
pub struct ProbeResult {
    pub connected: bool,
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Settings")]
impl SettingsApi {
    /// Retrieve transport settings
    #[oai(path = "/settings", method = "get", operation_id = "get_settings")]
    async fn get_settings(&self) -> ApiResult<Json<TransportSettings>> {
        Ok(Json(TransportSettings::get().await?))
    }

    /// Update transport settings
    #[oai(path = "/settings", method = "post", operation_id = "update_settings")]
    async fn update_settings(
        &self,
        ///Request Body
        payload: Json<TransportSettingsUpdateRequest>,
    ) -> ApiResult<Json<TransportSettings>> {
        TransportSettings::update(payload.0).await?;
        Ok(Json(TransportSettings::get().await?))
    }

    /// Probe the Fonnte device
    ///
    /// Asks Fonnte whether the device behind the configured API key is
    /// usable.
    #[oai(
        path = "/settings/fonnte/check-device",
        method = "post",
        operation_id = "check_fonnte_device"
    )]
    async fn check_fonnte_device(&self) -> ApiResult<Json<ProbeResult>> {
        let settings = TransportSettings::get().await?;
        if settings.fonnte_api_key.trim().is_empty() {
            return Err(raise_error!(
                "Fonnte API key is not configured. Please set it in Settings.".into(),
                ErrorCode::MissingConfiguration
            )
            .into());
        }
        let client = FonnteClient::new(settings.fonnte_api_key)?;
        Ok(Json(ProbeResult {
            connected: client.check_device().await?,
        }))
    }

    /// Probe the Baileys session
    ///
    /// Queries the gateway for its session state and records the result, so
    /// later dispatches see an up-to-date connected flag.
    #[oai(
        path = "/settings/baileys/session-status",
        method = "post",
        operation_id = "check_baileys_session"
    )]
    async fn check_baileys_session(&self) -> ApiResult<Json<ProbeResult>> {
        let client = baileys_client().await?;
        let connected = client.session_status().await?;
        TransportSettings::set_session_connected(connected).await?;
        Ok(Json(ProbeResult { connected }))
    }

    /// Log the Baileys session out
    #[oai(
        path = "/settings/baileys/logout",
        method = "post",
        operation_id = "logout_baileys_session"
    )]
    async fn logout_baileys_session(&self) -> ApiResult<()> {
        let client = baileys_client().await?;
        client.logout().await?;
        TransportSettings::set_session_connected(false).await?;
        Ok(())
    }
}

/// Build a gateway client from stored settings, ignoring the connected flag;
/// probes must work while disconnected.
async fn baileys_client() -> ApiResult<BaileysClient> {
    let settings = TransportSettings::get().await?;
    let server_url = settings.baileys_server_url.ok_or_else(|| {
        raise_error!(
            "Baileys server URL is not configured. Please set it in Settings.".into(),
            ErrorCode::MissingConfiguration
        )
    })?;
    let api_key = settings.baileys_api_key.ok_or_else(|| {
        raise_error!(
            "Baileys API key is not configured. Please set it in Settings.".into(),
            ErrorCode::MissingConfiguration
        )
    })?;
    Ok(BaileysClient::new(server_url, api_key)?)
}
