//! Background refresh scheduler.
//!
//! Spawns a loop that triggers a cache refresh every interval. The refresh
//! service enforces mutual exclusion itself, so a tick that lands while a
//! manual refresh is running turns into a no-op rejection.

use std::sync::Arc;
use std::time::Duration;

use dealboard_core::RefreshService;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Type alias for task handle to avoid complexity warnings
type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Configuration for the refresh scheduler
#[derive(Debug, Clone)]
pub struct RefreshSchedulerConfig {
    /// Interval between refresh attempts
    pub interval: Duration,
}

impl Default for RefreshSchedulerConfig {
    fn default() -> Self {
        Self { interval: Duration::from_secs(dealboard_domain::constants::CACHE_TTL_SECS) }
    }
}

/// Interval-based scheduler driving periodic cache refreshes.
pub struct RefreshScheduler {
    service: Arc<RefreshService>,
    config: RefreshSchedulerConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
}

impl RefreshScheduler {
    pub fn new(service: Arc<RefreshService>, config: RefreshSchedulerConfig) -> Self {
        Self {
            service,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Start the scheduler. Returns an error if it is already running.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(interval_secs = self.config.interval.as_secs(), "starting refresh scheduler");

        // New token each start so the scheduler can restart after stop()
        self.cancellation_token = CancellationToken::new();

        let service = Arc::clone(&self.service);
        let interval = self.config.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::refresh_loop(service, interval, cancel).await;
        });

        *self.task_handle.lock().await = Some(handle);
        Ok(())
    }

    /// Stop the scheduler gracefully, awaiting the background task.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("stopping refresh scheduler");
        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = Duration::from_secs(5);
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|err| SchedulerError::TaskJoinFailed(err.to_string()))?;
        }

        info!("refresh scheduler stopped");
        Ok(())
    }

    /// A scheduler is running if it has an active task handle that hasn't
    /// finished.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn refresh_loop(
        service: Arc<RefreshService>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("refresh loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {
                    if service.is_refreshing() {
                        debug!("refresh already in flight, skipping tick");
                        continue;
                    }
                    let outcome = service.refresh().await;
                    if !outcome.success {
                        warn!(message = %outcome.message, "scheduled refresh did not complete");
                    }
                }
            }
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        // Best-effort cancel; the join handle is detached.
        self.cancellation_token.cancel();
    }
}
