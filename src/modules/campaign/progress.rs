// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::campaign::entity::Campaign;
use crate::modules::error::RustBlastResult;
use std::sync::LazyLock;
use tokio::sync::broadcast;

pub static PROGRESS_CHANNEL: LazyLock<ProgressChannel> = LazyLock::new(ProgressChannel::new);

/// Full-snapshot progress notifications. Every emission carries the whole
/// campaign; consumers replace, never merge.
pub struct ProgressChannel {
    sender: broadcast::Sender<Campaign>,
}

impl ProgressChannel {
    fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Campaign> {
        self.sender.subscribe()
    }

    /// Persist the campaign, then emit the snapshot. A store failure
    /// propagates; a missing subscriber does not.
    pub async fn publish(&self, campaign: &Campaign) -> RustBlastResult<()> {
        campaign.clone().save().await?;
        let _ = self.sender.send(campaign.clone());
        Ok(())
    }
}
