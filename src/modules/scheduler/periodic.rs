use crate::modules::{common::signal::SIGNAL_MANAGER, error::RustBlastResult};
use std::{future::Future, time::Duration};
use tracing::{info, warn};

/// Fixed-interval background task, stopped by the process-wide shutdown
/// broadcast.
pub struct PeriodicTask {
    name: String,
}

impl PeriodicTask {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
        }
    }

    pub fn start<F, T>(self, task: T, param: Option<u64>, interval: Duration, run_immediately: bool)
    where
        T: Fn(Option<u64>) -> F + Send + Sync + 'static,
        F: Future<Output = RustBlastResult<()>> + Send + 'static,
    {
        info!("Task '{}' started", &self.name);
        let name = self.name;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(interval);
            let mut shutdown = SIGNAL_MANAGER.subscribe();

            if !run_immediately {
                interval.tick().await; // discard first immediate tick
            }

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if let Err(e) = task(param).await {
                            warn!("Task '{}' failed: {:?}", name, e);
                        }
                    }
                    _ = shutdown.recv() => {
                        info!("Task '{}' shutting down due to shutdown signal", name);
                        break;
                    }
                }
            }

            info!("Task '{}' stopped", name);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn runs_the_task_on_every_tick() {
        let counter = Arc::new(AtomicU32::new(0));
        let ticks = counter.clone();
        PeriodicTask::new("tick-counter").start(
            move |_| {
                let ticks = ticks.clone();
                async move {
                    ticks.fetch_add(1, Ordering::Relaxed);
                    Ok(())
                }
            },
            None,
            Duration::from_millis(10),
            true,
        );
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(counter.load(Ordering::Relaxed) >= 2);
    }
}
