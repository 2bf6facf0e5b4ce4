//! Cache refresh state machine.
//!
//! One sync cycle: acquire the exclusive refresh guard, fetch every relevant
//! pipeline from the upstream CRM in parallel, deduplicate by deal id,
//! normalize, atomically replace the cache contents, update the metadata
//! singleton, release the guard. Aggregation reads keep seeing the prior
//! snapshot until the replace transaction commits.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use dealboard_domain::constants::{CACHE_TTL_SECS, DEAL_CACHE_NAME, SYNC_PIPELINE_IDS};
use dealboard_domain::{CacheMetadata, CacheStatus, RefreshOutcome, Result, SyncStatus};
use tracing::{error, info, warn};

use crate::cache::normalize::normalize_deal;
use crate::ports::{CacheMetadataRepository, CrmGateway, DealRepository, ReferenceRepository};

/// Refresh behaviour knobs, injectable for tests.
#[derive(Debug, Clone)]
pub struct RefreshServiceConfig {
    /// Snapshot age beyond which the cache reports stale
    pub cache_ttl: Duration,
    /// Upstream pipelines fetched per cycle
    pub pipeline_ids: Vec<i64>,
}

impl Default for RefreshServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(CACHE_TTL_SECS),
            pipeline_ids: SYNC_PIPELINE_IDS.to_vec(),
        }
    }
}

/// Orchestrates cache refresh cycles and answers status queries.
///
/// The refresh guard is owned per instance (not module-global) so tests can
/// run independent services side by side. At most one refresh runs at a time;
/// a second caller is rejected immediately, never queued.
pub struct RefreshService {
    gateway: Arc<dyn CrmGateway>,
    deals: Arc<dyn DealRepository>,
    metadata: Arc<dyn CacheMetadataRepository>,
    reference: Arc<dyn ReferenceRepository>,
    refreshing: AtomicBool,
    config: RefreshServiceConfig,
}

/// Resets the refresh guard on every exit path, including panics and early
/// returns from failed upstream fetches.
struct GuardRelease<'a>(&'a AtomicBool);

impl Drop for GuardRelease<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RefreshService {
    pub fn new(
        gateway: Arc<dyn CrmGateway>,
        deals: Arc<dyn DealRepository>,
        metadata: Arc<dyn CacheMetadataRepository>,
        reference: Arc<dyn ReferenceRepository>,
        config: RefreshServiceConfig,
    ) -> Self {
        Self { gateway, deals, metadata, reference, refreshing: AtomicBool::new(false), config }
    }

    /// Live value of the refresh guard.
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    /// Run one refresh cycle. Returns immediately with a rejection outcome if
    /// a refresh is already in flight; that rejection has no side effects.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("refresh rejected: already in progress");
            return RefreshOutcome::rejected();
        }
        let _release = GuardRelease(&self.refreshing);

        let started = Instant::now();
        if let Err(err) = self.mark_in_progress().await {
            error!(error = %err, "failed to record refresh start");
            return RefreshOutcome::failed(err);
        }

        match self.run_sync().await {
            Ok(total_records) => {
                let duration_ms = elapsed_ms(started);
                if let Err(err) = self.mark_finished(SyncStatus::Success, None, total_records, duration_ms).await
                {
                    error!(error = %err, "failed to record refresh success");
                    return RefreshOutcome::failed(err);
                }
                info!(total_records, duration_ms, "cache refresh completed");
                RefreshOutcome::completed(total_records, duration_ms)
            }
            Err(err) => {
                // Prior cache rows are untouched: delete+insert runs inside
                // one transaction in the repository.
                let duration_ms = elapsed_ms(started);
                warn!(error = %err, duration_ms, "cache refresh failed");
                let prior_count = self.deals.count().await.unwrap_or(0);
                if let Err(meta_err) = self
                    .mark_finished(SyncStatus::Error, Some(err.to_string()), prior_count, duration_ms)
                    .await
                {
                    error!(error = %meta_err, "failed to record refresh error");
                }
                RefreshOutcome::failed(err)
            }
        }
    }

    /// Current cache status. An `InProgress` row without a live guard means
    /// the prior sync was interrupted by a process restart; it is reported as
    /// `Stale` rather than trusted.
    pub async fn status(&self) -> Result<CacheStatus> {
        let meta = self.metadata.get(DEAL_CACHE_NAME).await?;
        // Read the guard after the metadata fetch: a refresh that starts
        // while the fetch is in flight writes `InProgress` first, so reading
        // the guard afterwards cannot mistake a live sync for an interrupted
        // one.
        let is_refreshing = self.is_refreshing();
        let Some(meta) = meta else {
            return Ok(CacheStatus {
                status: SyncStatus::NeverSynced,
                last_sync_at: None,
                total_records: 0,
                last_error: None,
                sync_duration_ms: None,
                is_stale: true,
                is_refreshing,
            });
        };

        if meta.last_sync_status == SyncStatus::InProgress && !is_refreshing {
            return Ok(CacheStatus {
                status: SyncStatus::Stale,
                last_sync_at: meta.last_sync_at,
                total_records: meta.total_records,
                last_error: meta.last_sync_error,
                sync_duration_ms: meta.sync_duration_ms,
                is_stale: true,
                is_refreshing: false,
            });
        }

        let is_stale = meta
            .last_sync_at
            .map_or(true, |at| {
                let age = Utc::now().signed_duration_since(at);
                age.num_seconds() > self.config.cache_ttl.as_secs() as i64
            });

        Ok(CacheStatus {
            status: meta.last_sync_status,
            last_sync_at: meta.last_sync_at,
            total_records: meta.total_records,
            last_error: meta.last_sync_error,
            sync_duration_ms: meta.sync_duration_ms,
            is_stale,
            is_refreshing,
        })
    }

    /// Called once at process start. Blocks until first data is available if
    /// the cache is empty; otherwise triggers a background refresh when the
    /// snapshot is stale.
    pub async fn ensure_warm(self: &Arc<Self>) -> Result<()> {
        let status = self.status().await?;

        if status.status == SyncStatus::NeverSynced || status.total_records == 0 {
            info!("cache empty, running initial refresh synchronously");
            let outcome = self.refresh().await;
            if !outcome.success {
                warn!(message = %outcome.message, "initial refresh did not complete");
            }
            return Ok(());
        }

        if status.is_stale && !status.is_refreshing {
            info!("cache stale, triggering background refresh");
            let service = Arc::clone(self);
            tokio::spawn(async move {
                let outcome = service.refresh().await;
                if !outcome.success {
                    warn!(message = %outcome.message, "background refresh did not complete");
                }
            });
        }

        Ok(())
    }

    async fn run_sync(&self) -> Result<i64> {
        let pipeline_fetches = self
            .config
            .pipeline_ids
            .iter()
            .map(|&id| self.gateway.fetch_pipeline_deals(id));

        let (pipeline_pages, users, (countries, origins)) = tokio::try_join!(
            futures::future::try_join_all(pipeline_fetches),
            self.gateway.fetch_users(),
            self.gateway.fetch_field_options(),
        )?;

        // Dedup across pipelines: first occurrence wins.
        let mut seen = HashSet::new();
        let mut normalized = Vec::new();
        for raw in pipeline_pages.into_iter().flatten() {
            if seen.insert(raw.id) {
                normalized.push(normalize_deal(&raw));
            }
        }

        let inserted = self.deals.replace_all(&normalized).await?;

        self.reference.replace_users(&users).await?;
        self.reference.replace_field_options("country", &countries).await?;
        self.reference.replace_field_options("origin", &origins).await?;

        Ok(inserted as i64)
    }

    async fn mark_in_progress(&self) -> Result<()> {
        let prior = self.metadata.get(DEAL_CACHE_NAME).await?;
        let total_records = prior.map_or(0, |m| m.total_records);
        self.metadata
            .upsert(&CacheMetadata {
                cache_name: DEAL_CACHE_NAME.to_string(),
                last_sync_at: Some(Utc::now()),
                last_sync_status: SyncStatus::InProgress,
                last_sync_error: None,
                total_records,
                sync_duration_ms: None,
            })
            .await
    }

    async fn mark_finished(
        &self,
        status: SyncStatus,
        error: Option<String>,
        total_records: i64,
        duration_ms: i64,
    ) -> Result<()> {
        self.metadata
            .upsert(&CacheMetadata {
                cache_name: DEAL_CACHE_NAME.to_string(),
                last_sync_at: Some(Utc::now()),
                last_sync_status: status,
                last_sync_error: error,
                total_records,
                sync_duration_ms: Some(duration_ms),
            })
            .await
    }
}

fn elapsed_ms(started: Instant) -> i64 {
    i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX)
}
