// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::campaign::entity::{
    Campaign, CampaignStatus, ContactSnapshot, LogStatus, SINGLE_RECIPIENT_ID,
};
use crate::modules::campaign::pacing::PacingController;
use crate::modules::campaign::progress::PROGRESS_CHANNEL;
use crate::modules::campaign::render::render_template;
use crate::modules::contact::entity::Contact;
use crate::modules::error::code::ErrorCode;
use crate::modules::filestore::entity::ManagedFile;
use crate::modules::settings::transport::TransportSettings;
use crate::modules::transport::{ActiveTransport, MessageTransport, TransportAttachment};
use crate::{modules::error::RustBlastResult, raise_error, utc_now};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct DispatchOutcome {
    pub sent_count: u64,
    pub failed_count: u64,
}

/// Claim the campaign and walk its recipients in order. The claim is the
/// first store write, so a competing dispatch of the same campaign loses
/// before any message goes out.
pub async fn dispatch(campaign_id: u64) -> RustBlastResult<DispatchOutcome> {
    let campaign = Campaign::claim_sending(campaign_id).await?;
    run_claimed(campaign).await
}

/// Run the send loop for a campaign that has already been claimed.
pub async fn run_claimed(campaign: Campaign) -> RustBlastResult<DispatchOutcome> {
    let settings = TransportSettings::get().await?;
    let pacing = PacingController::new(Duration::from_secs(settings.pacing.base_delay_seconds));
    // A broken configuration is not fatal here: it is replayed per recipient
    // so every remaining log records the same failure.
    let transport = ActiveTransport::from_settings(&settings);
    run(campaign, transport, &pacing).await
}

pub(crate) async fn run<T: MessageTransport>(
    mut campaign: Campaign,
    transport: RustBlastResult<T>,
    pacing: &PacingController,
) -> RustBlastResult<DispatchOutcome> {
    info!(
        campaign_id = campaign.id,
        recipients = campaign.logs.len(),
        "campaign dispatch started"
    );
    PROGRESS_CHANNEL.publish(&campaign).await?;

    let total = campaign.logs.len();
    for idx in 0..total {
        // Pre-marked failures (e.g. no attachment match) are skipped whole,
        // pacing included.
        if campaign.logs[idx].status == LogStatus::Failed {
            continue;
        }

        // Snapshots render and address the message from live directory data
        // when the contact still exists; logs keep the historical copy.
        let contact = match resolve_contact(&campaign.logs[idx].contact).await? {
            Some(contact) => contact,
            None => continue,
        };

        campaign.logs[idx].status = LogStatus::Sending;
        campaign.logs[idx].updated_at = utc_now!();
        PROGRESS_CHANNEL.publish(&campaign).await?;

        match send_one(&campaign, &contact, &transport).await {
            Ok(provider_message_id) => {
                campaign.logs[idx].status = LogStatus::Sent;
                campaign.logs[idx].provider_message_id = Some(provider_message_id);
                campaign.logs[idx].error = None;
            }
            Err(e) => {
                campaign.logs[idx].status = LogStatus::Failed;
                campaign.logs[idx].error = Some(e.to_string());
            }
        }
        campaign.logs[idx].updated_at = utc_now!();
        PROGRESS_CHANNEL.publish(&campaign).await?;

        if idx < total - 1 {
            pacing.pause().await;
        }
    }

    campaign.status = CampaignStatus::Completed;
    campaign.sent_count = count_logs(&campaign, LogStatus::Sent);
    campaign.failed_count = count_logs(&campaign, LogStatus::Failed);
    campaign.updated_at = utc_now!();
    PROGRESS_CHANNEL.publish(&campaign).await?;

    info!(
        campaign_id = campaign.id,
        sent = campaign.sent_count,
        failed = campaign.failed_count,
        "campaign dispatch completed"
    );
    Ok(DispatchOutcome {
        sent_count: campaign.sent_count,
        failed_count: campaign.failed_count,
    })
}

/// Ad-hoc single recipients live only in the log snapshot; everyone else is
/// re-read from the directory. A contact deleted since creation yields None
/// and the recipient is skipped.
async fn resolve_contact(snapshot: &ContactSnapshot) -> RustBlastResult<Option<ContactSnapshot>> {
    if snapshot.id == SINGLE_RECIPIENT_ID {
        return Ok(Some(snapshot.clone()));
    }
    Ok(Contact::get(snapshot.id)
        .await?
        .as_ref()
        .map(ContactSnapshot::from))
}

async fn send_one<T: MessageTransport>(
    campaign: &Campaign,
    contact: &ContactSnapshot,
    transport: &RustBlastResult<T>,
) -> RustBlastResult<String> {
    let transport = transport.as_ref().map_err(Clone::clone)?;
    let text = render_template(&campaign.message, contact);
    let attachment = resolve_attachment(campaign, contact.id).await?;
    transport
        .send_message(&contact.number, &text, attachment.as_ref())
        .await
}

/// Per-contact overrides beat the shared attachment. The bytes are fetched
/// fresh from the blob store for every send; a missing blob fails just this
/// recipient.
async fn resolve_attachment(
    campaign: &Campaign,
    contact_id: u64,
) -> RustBlastResult<Option<TransportAttachment>> {
    let reference = campaign
        .attachment_overrides
        .get(&contact_id.to_string())
        .or(campaign.attachment.as_ref());
    let Some(reference) = reference else {
        return Ok(None);
    };
    let file = ManagedFile::get(reference.file_id).await?.ok_or_else(|| {
        raise_error!(
            format!(
                "File '{}' referenced by the campaign no longer exists",
                reference.name
            ),
            ErrorCode::BlobMissing
        )
    })?;
    let bytes = file.content().await?;
    Ok(Some(TransportAttachment {
        filename: file.name,
        mime_type: file.mime_type,
        bytes,
    }))
}

fn count_logs(campaign: &Campaign, status: LogStatus) -> u64 {
    campaign
        .logs
        .iter()
        .filter(|log| log.status == status)
        .count() as u64
}
