// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::campaign::dispatch::{dispatch, run_claimed, DispatchOutcome};
use crate::modules::campaign::entity::Campaign;
use crate::modules::campaign::matcher::match_attachments;
use crate::modules::campaign::payload::CampaignCreateRequest;
use crate::modules::campaign::progress::PROGRESS_CHANNEL;
use crate::modules::campaign::status::sync_status;
use crate::modules::contact::entity::Contact;
use crate::modules::filestore::entity::ManagedFile;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::DataPage;
use crate::modules::rest::ApiResult;
use futures::stream::BoxStream;
use futures::StreamExt;
use poem::web::Path;
use poem_openapi::param::Query;
use poem_openapi::payload::{EventStream, Json};
use poem_openapi::{Object, OpenApi};
use tokio::sync::broadcast;
use tracing::error;

pub struct CampaignApi;

#[derive(Clone, Debug, Eq, PartialEq, Object)]
pub struct MatchPreviewRequest {
    /// Group whose contacts should be matched against uploaded files.
    pub group: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Object)]
pub struct MatchedFilePreview {
    pub contact_id: u64,
    pub contact_name: String,
    pub file_id: u64,
    pub file_name: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Object)]
pub struct MatchPreview {
    pub matched: Vec<MatchedFilePreview>,
    pub unmatched: Vec<Contact>,
}

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Campaign")]
impl CampaignApi {
    /// Create a new campaign
    ///
    /// Recipients and their per-recipient logs are fixed here; a schedule
    /// timestamp makes the campaign eligible for the scheduler, otherwise it
    /// stays Draft until dispatched explicitly.
    #[oai(path = "/campaign", method = "post", operation_id = "create_campaign")]
    async fn create_campaign(
        &self,
        ///Request Body
        payload: Json<CampaignCreateRequest>,
    ) -> ApiResult<Json<Campaign>> {
        let campaign = payload.0.build().await?;
        campaign.clone().create().await?;
        Ok(Json(campaign))
    }

    /// Retrieve a campaign with its delivery logs
    #[oai(path = "/campaign/:id", method = "get", operation_id = "get_campaign")]
    async fn get_campaign(&self, id: Path<u64>) -> ApiResult<Json<Campaign>> {
        Ok(Json(Campaign::get(id.0).await?))
    }

    /// Delete a campaign
    #[oai(
        path = "/campaign/:id",
        method = "delete",
        operation_id = "remove_campaign"
    )]
    async fn remove_campaign(&self, id: Path<u64>) -> ApiResult<()> {
        Ok(Campaign::delete(id.0).await?)
    }

    /// List campaigns
    #[oai(
        path = "/campaign-list",
        method = "get",
        operation_id = "list_campaigns"
    )]
    async fn list_campaigns(
        &self,
        /// Optional. The page number to retrieve (starting from 1).
        page: Query<Option<u64>>,
        /// Optional. The number of items per page.
        page_size: Query<Option<u64>>,
        /// Optional. Whether to sort the list in descending order.
        desc: Query<Option<bool>>,
    ) -> ApiResult<Json<DataPage<Campaign>>> {
        Ok(Json(
            Campaign::paginate_list(page.0, page_size.0, desc.0).await?,
        ))
    }

    /// Dispatch a campaign now
    ///
    /// Claims the campaign and runs the send loop in the background. The
    /// claim is atomic: dispatching a campaign that is already Sending or
    /// Completed yields a conflict.
    #[oai(
        path = "/campaign/:id/dispatch",
        method = "post",
        operation_id = "dispatch_campaign"
    )]
    async fn dispatch_campaign(&self, id: Path<u64>) -> ApiResult<()> {
        let campaign_id = id.0;
        // Claim synchronously so the caller sees state conflicts, then let
        // the paced send loop run on its own.
        let claimed = Campaign::claim_sending(campaign_id).await?;
        tokio::spawn(async move {
            if let Err(e) = run_claimed(claimed).await {
                error!(campaign_id, "campaign dispatch failed: {e}");
            }
        });
        Ok(())
    }

    /// Dispatch a campaign and wait for completion
    ///
    /// Same as dispatch, but blocks until the last recipient and returns the
    /// aggregated counts. Intended for small campaigns and scripting.
    #[oai(
        path = "/campaign/:id/dispatch-wait",
        method = "post",
        operation_id = "dispatch_campaign_wait"
    )]
    async fn dispatch_campaign_wait(
        &self,
        id: Path<u64>,
    ) -> ApiResult<Json<DispatchOutcome>> {
        Ok(Json(dispatch(id.0).await?))
    }

    /// Re-synchronize delivery state from the provider
    #[oai(
        path = "/campaign/:id/status-sync",
        method = "post",
        operation_id = "sync_campaign_status"
    )]
    async fn sync_campaign_status(&self, id: Path<u64>) -> ApiResult<Json<Campaign>> {
        Ok(Json(sync_status(id.0).await?))
    }

    /// Preview attachment matching for a group
    ///
    /// Shows which contact would get which file, and who would be pre-marked
    /// failed, without creating anything.
    #[oai(
        path = "/campaign/match-preview",
        method = "post",
        operation_id = "preview_attachment_match"
    )]
    async fn preview_attachment_match(
        &self,
        payload: Json<MatchPreviewRequest>,
    ) -> ApiResult<Json<MatchPreview>> {
        let contacts = Contact::list_by_group(&payload.0.group).await?;
        let files = ManagedFile::list_all().await?;
        let contact_names: std::collections::BTreeMap<u64, String> =
            contacts.iter().map(|c| (c.id, c.name.clone())).collect();
        let partition = match_attachments(&contacts, &files);
        Ok(Json(MatchPreview {
            matched: partition
                .matched
                .into_iter()
                .map(|m| MatchedFilePreview {
                    contact_id: m.contact_id,
                    contact_name: contact_names.get(&m.contact_id).cloned().unwrap_or_default(),
                    file_id: m.file.id,
                    file_name: m.file.name,
                })
                .collect(),
            unmatched: partition.unmatched,
        }))
    }

    /// Stream live campaign progress snapshots
    ///
    /// Every event carries a full campaign snapshot; consumers replace their
    /// copy wholesale.
    #[oai(
        path = "/campaign-events",
        method = "get",
        operation_id = "campaign_events"
    )]
    async fn campaign_events(&self) -> EventStream<BoxStream<'static, Campaign>> {
        let receiver = PROGRESS_CHANNEL.subscribe();
        EventStream::new(
            futures::stream::unfold(receiver, |mut rx| async move {
                loop {
                    match rx.recv().await {
                        Ok(campaign) => return Some((campaign, rx)),
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            })
            .boxed(),
        )
    }
}
