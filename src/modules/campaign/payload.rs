// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::id;
use crate::modules::campaign::entity::{
    Attachment, Campaign, CampaignStatus, ContactSnapshot, MessageLog, SINGLE_RECIPIENT_ID,
};
use crate::modules::campaign::matcher::{match_attachments, NO_MATCHING_FILE};
use crate::modules::contact::entity::Contact;
use crate::modules::error::code::ErrorCode;
use crate::modules::filestore::entity::ManagedFile;
use crate::modules::utils::validate_phone_number;
use crate::{modules::error::RustBlastResult, raise_error, utc_now};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Object)]
pub struct CampaignCreateRequest {
    pub name: String,
    /// Message template with `{{placeholder}}` markers.
    pub message: String,
    /// Dispatch time in milliseconds. When set, the campaign is created as
    /// Scheduled and picked up by the scheduler; otherwise it stays Draft
    /// until dispatched explicitly.
    pub schedule: Option<i64>,
    /// Audience: every contact in this group.
    pub group: Option<String>,
    /// Audience: an explicit, ordered list of contact ids.
    pub contact_ids: Option<Vec<u64>>,
    /// Audience: one ad-hoc phone number outside the contact directory.
    pub single_number: Option<String>,
    pub single_name: Option<String>,
    /// Shared attachment sent to every recipient.
    pub attachment_file_id: Option<u64>,
    /// Assign each recipient the first managed file whose name contains the
    /// contact name. Recipients without a match are pre-marked Failed.
    #[oai(default)]
    pub match_files_by_name: bool,
    /// Manual per-contact file assignments (contact id → file id), as
    /// confirmed by the operator after a match preview. They overrule the
    /// name-based match and rescue recipients it left unmatched.
    pub attachment_assignments: Option<BTreeMap<String, u64>>,
}

impl CampaignCreateRequest {
    pub async fn build(self) -> RustBlastResult<Campaign> {
        if self.name.trim().is_empty() {
            return Err(raise_error!(
                "Campaign name must not be empty".into(),
                ErrorCode::InvalidParameter
            ));
        }
        if self.message.trim().is_empty() {
            return Err(raise_error!(
                "Campaign message must not be empty".into(),
                ErrorCode::InvalidParameter
            ));
        }

        let attachment = match self.attachment_file_id {
            None => None,
            Some(file_id) => Some(resolve_file(file_id).await?),
        };

        let mut campaign = Campaign {
            id: id!(64),
            name: self.name,
            message: self.message,
            recipients: vec![],
            schedule: self.schedule,
            status: if self.schedule.is_some() {
                CampaignStatus::Scheduled
            } else {
                CampaignStatus::Draft
            },
            logs: vec![],
            attachment,
            attachment_overrides: Default::default(),
            sent_count: 0,
            failed_count: 0,
            created_at: utc_now!(),
            updated_at: utc_now!(),
        };

        if let Some(number) = self.single_number {
            validate_phone_number(&number)?;
            let snapshot = ContactSnapshot {
                id: SINGLE_RECIPIENT_ID,
                name: self.single_name.unwrap_or_else(|| number.clone()),
                number,
                group: String::new(),
                custom_fields: Default::default(),
            };
            campaign.recipients = vec![SINGLE_RECIPIENT_ID];
            campaign.logs = vec![MessageLog::pending(snapshot)];
            return Ok(campaign);
        }

        let contacts = resolve_audience(self.contact_ids, self.group).await?;
        if contacts.is_empty() {
            return Err(raise_error!(
                "Campaign audience is empty".into(),
                ErrorCode::InvalidParameter
            ));
        }

        campaign.recipients = contacts.iter().map(|c| c.id).collect();
        if self.match_files_by_name {
            let files = ManagedFile::list_all().await?;
            let partition = match_attachments(&contacts, &files);
            for matched in partition.matched {
                campaign.attachment_overrides.insert(
                    matched.contact_id.to_string(),
                    Attachment {
                        file_id: matched.file.id,
                        name: matched.file.name,
                        mime_type: matched.file.mime_type,
                    },
                );
            }
        }
        // Operator-confirmed assignments win over the automatic match and
        // promote otherwise-unmatched recipients.
        for (contact_id, file_id) in self.attachment_assignments.unwrap_or_default() {
            let assigned = resolve_file(file_id).await?;
            campaign.attachment_overrides.insert(contact_id, assigned);
        }
        campaign.logs = contacts
            .iter()
            .map(|contact| {
                let snapshot = ContactSnapshot::from(contact);
                if self.match_files_by_name
                    && !campaign
                        .attachment_overrides
                        .contains_key(&contact.id.to_string())
                {
                    MessageLog::failed(snapshot, NO_MATCHING_FILE)
                } else {
                    MessageLog::pending(snapshot)
                }
            })
            .collect();
        Ok(campaign)
    }
}

async fn resolve_file(file_id: u64) -> RustBlastResult<Attachment> {
    let file = ManagedFile::get(file_id).await?.ok_or_else(|| {
        raise_error!(
            format!("File with id '{}' not found", file_id),
            ErrorCode::ResourceNotFound
        )
    })?;
    Ok(Attachment {
        file_id: file.id,
        name: file.name,
        mime_type: file.mime_type,
    })
}

async fn resolve_audience(
    contact_ids: Option<Vec<u64>>,
    group: Option<String>,
) -> RustBlastResult<Vec<Contact>> {
    if let Some(ids) = contact_ids {
        let mut contacts = Vec::with_capacity(ids.len());
        for id in ids {
            let contact = Contact::get(id).await?.ok_or_else(|| {
                raise_error!(
                    format!("Contact with id '{}' not found", id),
                    ErrorCode::ResourceNotFound
                )
            })?;
            contacts.push(contact);
        }
        return Ok(contacts);
    }
    if let Some(group) = group {
        return Contact::list_by_group(&group).await;
    }
    Err(raise_error!(
        "Campaign audience is required: set 'group', 'contact_ids' or 'single_number'".into(),
        ErrorCode::InvalidParameter
    ))
}
