// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::campaign::dispatch::run;
use crate::modules::campaign::entity::{Campaign, CampaignStatus, LogStatus, MessageLog};
use crate::modules::campaign::matcher::NO_MATCHING_FILE;
use crate::modules::campaign::pacing::PacingController;
use crate::modules::campaign::payload::CampaignCreateRequest;
use crate::modules::contact::entity::{Contact, ContactCreateRequest};
use crate::modules::error::code::ErrorCode;
use crate::modules::error::{RustBlastError, RustBlastResult};
use crate::modules::filestore::blob::FILE_BLOB_STORE;
use crate::modules::filestore::entity::ManagedFile;
use crate::modules::transport::{MessageTransport, TransportAttachment};
use crate::raise_error;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Debug)]
struct SentRecord {
    number: String,
    text: String,
    has_attachment: bool,
}

#[derive(Clone, Default)]
struct MockTransport {
    fail_numbers: HashSet<String>,
    sent: Arc<Mutex<Vec<SentRecord>>>,
}

impl MockTransport {
    fn failing(numbers: &[&str]) -> Self {
        Self {
            fail_numbers: numbers.iter().map(|n| n.to_string()).collect(),
            sent: Default::default(),
        }
    }

    fn records(&self) -> Vec<SentRecord> {
        self.sent.lock().unwrap().clone()
    }
}

impl MessageTransport for MockTransport {
    async fn send_message(
        &self,
        number: &str,
        text: &str,
        attachment: Option<&TransportAttachment>,
    ) -> RustBlastResult<String> {
        self.sent.lock().unwrap().push(SentRecord {
            number: number.to_string(),
            text: text.to_string(),
            has_attachment: attachment.is_some(),
        });
        if self.fail_numbers.contains(number) {
            return Err(raise_error!(
                "target rejected by provider".into(),
                ErrorCode::ProviderRejected
            ));
        }
        Ok(format!("mid-{number}"))
    }

    async fn fetch_status(&self, _provider_message_id: &str) -> RustBlastResult<LogStatus> {
        Ok(LogStatus::Delivered)
    }
}

async fn seed_contact(name: &str, number: &str) -> Contact {
    let contact = Contact::new(ContactCreateRequest {
        name: name.to_string(),
        number: number.to_string(),
        group: None,
        custom_fields: None,
    })
    .unwrap();
    contact.clone().save().await.unwrap();
    contact
}

async fn seed_campaign(message: &str, contact_ids: Vec<u64>) -> Campaign {
    let campaign = CampaignCreateRequest {
        name: "launch".to_string(),
        message: message.to_string(),
        schedule: None,
        group: None,
        contact_ids: Some(contact_ids),
        single_number: None,
        single_name: None,
        attachment_file_id: None,
        match_files_by_name: false,
        attachment_assignments: None,
    }
    .build()
    .await
    .unwrap();
    campaign.clone().create().await.unwrap();
    campaign
}

#[tokio::test]
async fn failed_recipient_does_not_stop_the_run() {
    let a = seed_contact("dispatch_a", "628110000001").await;
    let b = seed_contact("dispatch_b", "628110000002").await;
    let c = seed_contact("dispatch_c", "628110000003").await;
    let campaign = seed_campaign("Hi {{name}}", vec![a.id, b.id, c.id]).await;

    let claimed = Campaign::claim_sending(campaign.id).await.unwrap();
    let transport = MockTransport::failing(&[b.number.as_str()]);
    // A real (if small) base delay keeps consecutive millisecond stamps apart.
    let pacing = PacingController::new(Duration::from_millis(5));
    let outcome = run(claimed, Ok(transport.clone()), &pacing).await.unwrap();

    assert_eq!(outcome.sent_count, 2);
    assert_eq!(outcome.failed_count, 1);

    let stored = Campaign::get(campaign.id).await.unwrap();
    assert_eq!(stored.status, CampaignStatus::Completed);
    assert_eq!(stored.logs.len(), 3);
    assert_eq!(stored.logs[0].status, LogStatus::Sent);
    assert_eq!(
        stored.logs[0].provider_message_id.as_deref(),
        Some("mid-628110000001")
    );
    assert_eq!(stored.logs[1].status, LogStatus::Failed);
    assert_eq!(
        stored.logs[1].error.as_deref(),
        Some("target rejected by provider")
    );
    assert!(stored.logs[1].provider_message_id.is_none());
    assert_eq!(stored.logs[2].status, LogStatus::Sent);
    assert!(stored.logs.iter().all(|log| log.updated_at > 0));
    // Attempts are paced, so the failed log's stamp falls strictly between
    // its neighbors'.
    assert!(stored.logs[0].updated_at < stored.logs[1].updated_at);
    assert!(stored.logs[1].updated_at < stored.logs[2].updated_at);

    // Every recipient was attempted, in creation order.
    let numbers: Vec<String> = transport.records().iter().map(|r| r.number.clone()).collect();
    assert_eq!(
        numbers,
        vec!["628110000001", "628110000002", "628110000003"]
    );
}

#[tokio::test]
async fn pauses_only_between_recipients() {
    let a = seed_contact("pace_a", "628120000001").await;
    let b = seed_contact("pace_b", "628120000002").await;
    let c = seed_contact("pace_c", "628120000003").await;
    let campaign = seed_campaign("hello", vec![a.id, b.id, c.id]).await;

    let claimed = Campaign::claim_sending(campaign.id).await.unwrap();
    let pacing = PacingController::new(Duration::ZERO);
    run(claimed, Ok(MockTransport::default()), &pacing)
        .await
        .unwrap();

    // Three recipients, two gaps.
    assert_eq!(pacing.suspensions(), 2);
}

#[tokio::test]
async fn premarked_failed_logs_are_never_touched() {
    let a = seed_contact("skip_a", "628130000001").await;
    let b = seed_contact("skip_b", "628130000002").await;
    let c = seed_contact("skip_c", "628130000003").await;
    let mut campaign = seed_campaign("hello {{name}}", vec![a.id, b.id, c.id]).await;
    campaign.logs[0] = MessageLog::failed(campaign.logs[0].contact.clone(), NO_MATCHING_FILE);
    campaign.clone().save().await.unwrap();

    let claimed = Campaign::claim_sending(campaign.id).await.unwrap();
    let transport = MockTransport::default();
    let pacing = PacingController::new(Duration::ZERO);
    let outcome = run(claimed, Ok(transport.clone()), &pacing).await.unwrap();

    let stored = Campaign::get(campaign.id).await.unwrap();
    assert_eq!(stored.logs[0].status, LogStatus::Failed);
    assert_eq!(stored.logs[0].error.as_deref(), Some(NO_MATCHING_FILE));
    assert!(stored.logs[0].provider_message_id.is_none());
    assert_eq!(outcome.sent_count, 2);
    assert_eq!(outcome.failed_count, 1);
    // The skipped recipient does not consume a pacing gap either.
    assert_eq!(pacing.suspensions(), 1);
    assert_eq!(transport.records().len(), 2);
}

#[tokio::test]
async fn broken_configuration_fails_every_pending_recipient() {
    let a = seed_contact("cfg_a", "628140000001").await;
    let b = seed_contact("cfg_b", "628140000002").await;
    let campaign = seed_campaign("hello", vec![a.id, b.id]).await;

    let claimed = Campaign::claim_sending(campaign.id).await.unwrap();
    let transport: RustBlastResult<MockTransport> = Err(raise_error!(
        "Fonnte API key is not configured. Please set it in Settings.".into(),
        ErrorCode::MissingConfiguration
    ));
    let pacing = PacingController::new(Duration::ZERO);
    let outcome = run(claimed, transport, &pacing).await.unwrap();

    assert_eq!(outcome.sent_count, 0);
    assert_eq!(outcome.failed_count, 2);
    let stored = Campaign::get(campaign.id).await.unwrap();
    assert_eq!(stored.status, CampaignStatus::Completed);
    for log in &stored.logs {
        assert_eq!(log.status, LogStatus::Failed);
        assert_eq!(
            log.error.as_deref(),
            Some("Fonnte API key is not configured. Please set it in Settings.")
        );
    }
}

#[tokio::test]
async fn a_campaign_can_only_be_claimed_once() {
    let a = seed_contact("claim_a", "628150000001").await;
    let campaign = seed_campaign("hello", vec![a.id]).await;

    let (first, second) = tokio::join!(
        Campaign::claim_sending(campaign.id),
        Campaign::claim_sending(campaign.id)
    );
    let successes = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    let conflict = if first.is_err() { first } else { second };
    match conflict.unwrap_err() {
        RustBlastError::Generic { code, .. } => {
            assert_eq!(code, ErrorCode::CampaignStateConflict)
        }
    }
}

#[tokio::test]
async fn deleted_contacts_are_skipped_and_left_pending() {
    let a = seed_contact("gone_a", "628160000001").await;
    let b = seed_contact("gone_b", "628160000002").await;
    let campaign = seed_campaign("hello", vec![a.id, b.id]).await;
    Contact::delete(a.id).await.unwrap();

    let claimed = Campaign::claim_sending(campaign.id).await.unwrap();
    let transport = MockTransport::default();
    let pacing = PacingController::new(Duration::ZERO);
    let outcome = run(claimed, Ok(transport.clone()), &pacing).await.unwrap();

    let stored = Campaign::get(campaign.id).await.unwrap();
    assert_eq!(stored.status, CampaignStatus::Completed);
    assert_eq!(stored.logs[0].status, LogStatus::Pending);
    assert_eq!(stored.logs[1].status, LogStatus::Sent);
    assert_eq!(outcome.sent_count, 1);
    assert_eq!(outcome.failed_count, 0);
    assert_eq!(transport.records().len(), 1);
}

#[tokio::test]
async fn single_mode_uses_the_embedded_snapshot() {
    let campaign = CampaignCreateRequest {
        name: "one-off".to_string(),
        message: "Hi {{name}}".to_string(),
        schedule: None,
        group: None,
        contact_ids: None,
        single_number: Some("628170000001".to_string()),
        single_name: Some("Dina".to_string()),
        attachment_file_id: None,
        match_files_by_name: false,
        attachment_assignments: None,
    }
    .build()
    .await
    .unwrap();
    assert_eq!(campaign.logs.len(), 1);
    assert_eq!(campaign.recipients.len(), 1);
    campaign.clone().create().await.unwrap();

    let claimed = Campaign::claim_sending(campaign.id).await.unwrap();
    let transport = MockTransport::default();
    let pacing = PacingController::new(Duration::ZERO);
    let outcome = run(claimed, Ok(transport.clone()), &pacing).await.unwrap();

    assert_eq!(outcome.sent_count, 1);
    let records = transport.records();
    assert_eq!(records[0].number, "628170000001");
    assert_eq!(records[0].text, "Hi Dina");
}

#[tokio::test]
async fn missing_blob_fails_only_that_recipient() {
    let a = seed_contact("blob_a", "628180000001").await;
    let b = seed_contact("blob_b", "628180000002").await;
    let file = ManagedFile::upload("promo.pdf".to_string(), vec![1, 2, 3])
        .await
        .unwrap();

    let mut campaign = CampaignCreateRequest {
        name: "with-attachment".to_string(),
        message: "hello".to_string(),
        schedule: None,
        group: None,
        contact_ids: Some(vec![a.id, b.id]),
        single_number: None,
        single_name: None,
        attachment_file_id: Some(file.id),
        match_files_by_name: false,
        attachment_assignments: None,
    }
    .build()
    .await
    .unwrap();
    // Override only the first recipient; its blob then disappears.
    let orphan = ManagedFile::upload("orphan.pdf".to_string(), vec![9]).await.unwrap();
    campaign.attachment_overrides.insert(
        a.id.to_string(),
        crate::modules::campaign::entity::Attachment {
            file_id: orphan.id,
            name: orphan.name.clone(),
            mime_type: orphan.mime_type.clone(),
        },
    );
    campaign.clone().create().await.unwrap();
    FILE_BLOB_STORE.remove(orphan.id).await.unwrap();

    let claimed = Campaign::claim_sending(campaign.id).await.unwrap();
    let transport = MockTransport::default();
    let pacing = PacingController::new(Duration::ZERO);
    let outcome = run(claimed, Ok(transport.clone()), &pacing).await.unwrap();

    let stored = Campaign::get(campaign.id).await.unwrap();
    assert_eq!(stored.logs[0].status, LogStatus::Failed);
    assert!(stored.logs[0]
        .error
        .as_deref()
        .unwrap()
        .contains("missing from the file store"));
    assert_eq!(stored.logs[1].status, LogStatus::Sent);
    assert_eq!(outcome.sent_count, 1);
    assert_eq!(outcome.failed_count, 1);
    // The surviving recipient still got the shared attachment.
    let records = transport.records();
    assert_eq!(records.len(), 1);
    assert!(records[0].has_attachment);
}
