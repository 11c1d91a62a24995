// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::campaign::entity::{Campaign, LogStatus};
use crate::modules::campaign::progress::PROGRESS_CHANNEL;
use crate::modules::error::RustBlastResult;
use crate::modules::settings::transport::TransportSettings;
use crate::modules::transport::{ActiveTransport, MessageTransport};
use crate::utc_now;
use tracing::warn;

/// Reconcile per-log delivery state with the active provider. Runs on
/// demand, any time after (or even during) dispatch; only touches logs that
/// hold a provider message id and are not already Failed, and never changes
/// the campaign's own status.
pub async fn sync_status(campaign_id: u64) -> RustBlastResult<Campaign> {
    let mut campaign = Campaign::get(campaign_id).await?;
    let settings = TransportSettings::get().await?;
    let transport = ActiveTransport::from_settings(&settings)?;

    let mut changed = false;
    for log in campaign.logs.iter_mut() {
        if log.status == LogStatus::Failed {
            continue;
        }
        let Some(provider_message_id) = log.provider_message_id.clone() else {
            continue;
        };
        match transport.fetch_status(&provider_message_id).await {
            Ok(status) => {
                if status != log.status {
                    log.status = status;
                    log.updated_at = utc_now!();
                    changed = true;
                }
            }
            Err(e) => {
                // A lookup failure leaves the log as-is and moves on.
                warn!(
                    campaign_id,
                    provider_message_id, "delivery state lookup failed: {e}"
                );
            }
        }
    }

    if changed {
        PROGRESS_CHANNEL.publish(&campaign).await?;
    }
    Ok(campaign)
}
