// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{async_find_impl, upsert_impl};
use crate::modules::error::RustBlastResult;
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};
use std::fmt;

const SETTINGS_KEY: &str = "transport";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Enum)]
pub enum ProviderKind {
    /// Fonnte cloud API, authenticated with a single static API key.
    #[default]
    Fonnte,
    /// Self-hosted Baileys gateway with an externally-tracked session.
    Baileys,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Fonnte => write!(f, "fonnte"),
            ProviderKind::Baileys => write!(f, "baileys"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct PacingSettings {
    /// Base delay between consecutive sends, in seconds.
    pub base_delay_seconds: u64,
    /// Advisory daily send quota. Stored and surfaced, not enforced during dispatch.
    pub daily_quota: u32,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            base_delay_seconds: 4,
            daily_quota: 100,
        }
    }
}

/// Active outbound provider configuration. A single record, replaced wholesale
/// on update and read once per dispatch invocation.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[native_model(id = 6, version = 1)]
#[native_db]
pub struct TransportSettings {
    #[primary_key]
    pub key: String,
    /// Which provider outbound sends go through.
    pub active_provider: ProviderKind,
    /// Fonnte API key.
    pub fonnte_api_key: String,
    /// Base URL of the self-hosted Baileys gateway.
    pub baileys_server_url: Option<String>,
    /// API key for the Baileys gateway, sent as a bearer token.
    pub baileys_api_key: Option<String>,
    /// Whether the Baileys session is currently connected. Maintained by the
    /// session endpoints, never by the dispatch engine.
    pub baileys_session_connected: bool,
    pub pacing: PacingSettings,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct TransportSettingsUpdateRequest {
    pub active_provider: ProviderKind,
    pub fonnte_api_key: String,
    pub baileys_server_url: Option<String>,
    pub baileys_api_key: Option<String>,
    pub baileys_session_connected: Option<bool>,
    pub pacing: Option<PacingSettings>,
}

impl TransportSettings {
    pub async fn get() -> RustBlastResult<TransportSettings> {
        let stored =
            async_find_impl::<TransportSettings>(DB_MANAGER.meta_db(), SETTINGS_KEY.to_string())
                .await?;
        Ok(stored.unwrap_or_else(|| TransportSettings {
            key: SETTINGS_KEY.to_string(),
            pacing: PacingSettings::default(),
            ..Default::default()
        }))
    }

    pub async fn update(request: TransportSettingsUpdateRequest) -> RustBlastResult<()> {
        let current = Self::get().await?;
        let updated = TransportSettings {
            key: SETTINGS_KEY.to_string(),
            active_provider: request.active_provider,
            fonnte_api_key: request.fonnte_api_key,
            baileys_server_url: request.baileys_server_url,
            baileys_api_key: request.baileys_api_key,
            baileys_session_connected: request
                .baileys_session_connected
                .unwrap_or(current.baileys_session_connected),
            pacing: request.pacing.unwrap_or(current.pacing),
        };
        upsert_impl(DB_MANAGER.meta_db(), updated).await
    }

    pub async fn set_session_connected(connected: bool) -> RustBlastResult<()> {
        let mut current = Self::get().await?;
        current.baileys_session_connected = connected;
        upsert_impl(DB_MANAGER.meta_db(), current).await
    }
}
