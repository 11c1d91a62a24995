// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::contact::entity::Contact;
use crate::modules::database::manager::DB_MANAGER;
use crate::modules::database::{
    delete_impl, filter_by_secondary_key_impl, insert_impl,
    paginate_query_primary_scan_all_impl, secondary_find_impl, update_impl, upsert_impl,
};
use crate::modules::error::code::ErrorCode;
use crate::modules::rest::response::DataPage;
use crate::{modules::error::RustBlastResult, raise_error, utc_now};
use native_db::*;
use native_model::{native_model, Model};
use poem_openapi::{Enum, Object};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contact id recorded in logs for ad-hoc single sends, where no directory
/// contact exists.
pub const SINGLE_RECIPIENT_ID: u64 = 0;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Enum)]
pub enum CampaignStatus {
    #[default]
    Draft,
    Scheduled,
    Sending,
    Completed,
}

impl CampaignStatus {
    pub fn code(&self) -> u8 {
        match self {
            CampaignStatus::Draft => 0,
            CampaignStatus::Scheduled => 1,
            CampaignStatus::Sending => 2,
            CampaignStatus::Completed => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Enum)]
pub enum LogStatus {
    #[default]
    Pending,
    Sending,
    Sent,
    Delivered,
    Read,
    Failed,
}

/// Immutable copy of a contact taken at campaign creation. Later edits to the
/// contact directory never rewrite history recorded here.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct ContactSnapshot {
    pub id: u64,
    pub name: String,
    pub number: String,
    pub group: String,
    pub custom_fields: BTreeMap<String, String>,
}

impl From<&Contact> for ContactSnapshot {
    fn from(contact: &Contact) -> Self {
        Self {
            id: contact.id,
            name: contact.name.clone(),
            number: contact.number.clone(),
            group: contact.group.clone(),
            custom_fields: contact.custom_fields.clone(),
        }
    }
}

/// Reference to a managed file used as an outbound attachment.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct Attachment {
    pub file_id: u64,
    pub name: String,
    pub mime_type: String,
}

/// Per-recipient delivery record. One per recipient, created with the
/// campaign and never added or removed afterwards.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct MessageLog {
    pub contact: ContactSnapshot,
    pub status: LogStatus,
    /// Timestamp (in milliseconds) of the last status change.
    pub updated_at: i64,
    pub error: Option<String>,
    /// Provider-assigned id, used for later delivery-state lookups.
    pub provider_message_id: Option<String>,
}

impl MessageLog {
    pub fn pending(contact: ContactSnapshot) -> Self {
        Self {
            contact,
            status: LogStatus::Pending,
            updated_at: utc_now!(),
            error: None,
            provider_message_id: None,
        }
    }

    pub fn failed(contact: ContactSnapshot, error: &str) -> Self {
        Self {
            contact,
            status: LogStatus::Failed,
            updated_at: utc_now!(),
            error: Some(error.to_string()),
            provider_message_id: None,
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize, Object)]
#[native_model(id = 4, version = 1)]
#[native_db(primary_key(pk -> String), secondary_key(status_code -> u8))]
pub struct Campaign {
    /// The unique identifier of the campaign
    #[secondary_key(unique)]
    pub id: u64,
    pub name: String,
    /// Message template with `{{placeholder}}` markers.
    pub message: String,
    /// Contact ids fixed at creation, one per log, in send order.
    pub recipients: Vec<u64>,
    /// When set, the scheduler dispatches the campaign once this timestamp
    /// (in milliseconds) has passed.
    pub schedule: Option<i64>,
    pub status: CampaignStatus,
    /// One log per recipient. `logs.len() == recipients.len()`, always.
    pub logs: Vec<MessageLog>,
    /// Shared attachment sent to every recipient, unless overridden.
    pub attachment: Option<Attachment>,
    /// Per-contact attachment overrides, keyed by contact id.
    pub attachment_overrides: BTreeMap<String, Attachment>,
    pub sent_count: u64,
    pub failed_count: u64,
    /// Timestamp (in milliseconds) when the campaign was created.
    pub created_at: i64,
    /// Timestamp (in milliseconds) when the campaign was last updated.
    pub updated_at: i64,
}

impl Campaign {
    fn pk(&self) -> String {
        format!("{}_{}", self.created_at, self.id)
    }

    fn status_code(&self) -> u8 {
        self.status.code()
    }

    pub async fn create(self) -> RustBlastResult<()> {
        insert_impl(DB_MANAGER.meta_db(), self).await
    }

    pub async fn save(self) -> RustBlastResult<()> {
        upsert_impl(DB_MANAGER.meta_db(), self).await
    }

    pub async fn get(id: u64) -> RustBlastResult<Campaign> {
        secondary_find_impl(DB_MANAGER.meta_db(), CampaignKey::id, id)
            .await?
            .ok_or_else(|| {
                raise_error!(
                    format!("Campaign with id '{}' not found", id),
                    ErrorCode::ResourceNotFound
                )
            })
    }

    pub async fn paginate_list(
        page: Option<u64>,
        page_size: Option<u64>,
        desc: Option<bool>,
    ) -> RustBlastResult<DataPage<Campaign>> {
        paginate_query_primary_scan_all_impl(DB_MANAGER.meta_db(), page, page_size, desc)
            .await
            .map(DataPage::from)
    }

    /// All campaigns whose schedule has come due.
    pub async fn list_due(now: i64) -> RustBlastResult<Vec<Campaign>> {
        let scheduled: Vec<Campaign> = filter_by_secondary_key_impl(
            DB_MANAGER.meta_db(),
            CampaignKey::status_code,
            CampaignStatus::Scheduled.code(),
        )
        .await?;
        Ok(scheduled
            .into_iter()
            .filter(|c| c.schedule.is_some_and(|at| at <= now))
            .collect())
    }

    /// Claim the campaign for dispatch. The Draft/Scheduled → Sending
    /// transition happens inside a single write transaction, so of two
    /// competing callers exactly one wins; the loser gets a state-conflict
    /// error.
    pub async fn claim_sending(id: u64) -> RustBlastResult<Campaign> {
        let claimed = update_impl(
            DB_MANAGER.meta_db(),
            move |rw| {
                let campaign = rw
                    .get()
                    .secondary::<Campaign>(CampaignKey::id, id)
                    .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                    .ok_or_else(|| {
                        raise_error!(
                            format!("Campaign with id '{}' not found", id),
                            ErrorCode::ResourceNotFound
                        )
                    })?;
                match campaign.status {
                    CampaignStatus::Draft | CampaignStatus::Scheduled => Ok(campaign),
                    other => Err(raise_error!(
                        format!(
                            "Campaign '{}' cannot be dispatched from status {:?}",
                            campaign.name, other
                        ),
                        ErrorCode::CampaignStateConflict
                    )),
                }
            },
            |current| {
                let mut updated = current.clone();
                updated.status = CampaignStatus::Sending;
                updated.updated_at = utc_now!();
                Ok(updated)
            },
        )
        .await?;
        // update_impl hands back the pre-update row; reflect the transition.
        let mut claimed = claimed;
        claimed.status = CampaignStatus::Sending;
        claimed.updated_at = utc_now!();
        Ok(claimed)
    }

    pub async fn delete(id: u64) -> RustBlastResult<()> {
        delete_impl(DB_MANAGER.meta_db(), move |rw| {
            rw.get()
                .secondary::<Campaign>(CampaignKey::id, id)
                .map_err(|e| raise_error!(format!("{:#?}", e), ErrorCode::InternalError))?
                .ok_or_else(|| {
                    raise_error!(
                        format!("Campaign with id '{}' not found", id),
                        ErrorCode::ResourceNotFound
                    )
                })
        })
        .await
    }
}
