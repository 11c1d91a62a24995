// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::campaign::dispatch::dispatch;
use crate::modules::campaign::entity::Campaign;
use crate::modules::context::RustBlastTask;
use crate::modules::error::code::ErrorCode;
use crate::modules::error::{RustBlastError, RustBlastResult};
use crate::modules::scheduler::periodic::PeriodicTask;
use crate::modules::settings::cli::SETTINGS;
use crate::utc_now;
use std::time::Duration;
use tracing::{debug, error, info};

/// Polls for Scheduled campaigns whose schedule has passed and hands each to
/// the dispatch engine. Double-invocation across overlapping ticks is
/// resolved by the engine's atomic claim: the second caller gets a state
/// conflict, which this task treats as "already taken".
pub struct CampaignSchedulerTask;

impl RustBlastTask for CampaignSchedulerTask {
    fn start() {
        let periodic_task = PeriodicTask::new("campaign-scheduler");

        let task = move |_: Option<u64>| {
            Box::pin(async move { check_due_campaigns().await })
        };

        periodic_task.start(
            task,
            None,
            Duration::from_secs(SETTINGS.rustblast_scheduler_interval_seconds),
            false,
        );
    }
}

async fn check_due_campaigns() -> RustBlastResult<()> {
    let due = Campaign::list_due(utc_now!()).await?;
    for campaign in due {
        info!(
            campaign_id = campaign.id,
            name = %campaign.name,
            "scheduled campaign is due, dispatching"
        );
        tokio::spawn(async move {
            match dispatch(campaign.id).await {
                Ok(outcome) => {
                    info!(
                        campaign_id = campaign.id,
                        sent = outcome.sent_count,
                        failed = outcome.failed_count,
                        "scheduled dispatch finished"
                    );
                }
                Err(RustBlastError::Generic { code, .. })
                    if code == ErrorCode::CampaignStateConflict =>
                {
                    debug!(
                        campaign_id = campaign.id,
                        "campaign already claimed by another dispatcher"
                    );
                }
                Err(e) => {
                    error!(campaign_id = campaign.id, "scheduled dispatch failed: {e}");
                }
            }
        });
    }
    Ok(())
}
