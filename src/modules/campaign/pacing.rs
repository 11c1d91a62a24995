// Copyright © 2025 rustblast.dev
// Licensed under RustBlast License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Inter-send delay applied between consecutive recipients. The base delay
/// comes from settings; up to a second of random jitter is added so sends do
/// not fire on an exact metronome.
pub struct PacingController {
    base_delay: Duration,
    suspensions: AtomicU32,
}

impl PacingController {
    pub fn new(base_delay: Duration) -> Self {
        Self {
            base_delay,
            suspensions: AtomicU32::new(0),
        }
    }

    pub async fn pause(&self) {
        let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
        self.suspensions.fetch_add(1, Ordering::Relaxed);
        tokio::time::sleep(self.base_delay + jitter).await;
    }

    /// How many pauses have been taken so far.
    pub fn suspensions(&self) -> u32 {
        self.suspensions.load(Ordering::Relaxed)
    }
}
