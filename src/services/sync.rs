// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Paginated synchronization with the remote API.
//!
//! Pages are requested strictly one after another; each page is merged into
//! the store before the next request goes out. A short page (fewer than
//! [`PER_PAGE`] records, including an empty one) ends the chain. Errors abort
//! the current chain and are returned to the caller; nothing is retried.
//!
//! Activity sync uses a high-water mark: on the first page the latest stored
//! `start_date` becomes the `after=` filter for every page of that run.

use crate::db::SharedStore;
use crate::error::{AppError, Result};
use crate::models::{Activity, Effort, ResourceState, Segment, StreamOwner};
use crate::services::strava::{FitnessApi, PER_PAGE};
use crate::time_utils::{format_utc_rfc3339, to_epoch_seconds};
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Default number of detail fetches in flight at once.
const DEFAULT_DETAIL_CONCURRENCY: usize = 4;

/// Coarse progress of a full update pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Connecting,
    Connected,
    ConnectFailed,
    Error(String),
    GettingStats,
    /// All-time ride count reported by Strava
    AthleteStats(u64),
    /// Activities seen for the first time in this pass
    NewActivities(usize),
    /// Activities queued for a detailed refresh
    UpdatingActivities(usize),
    UpdateComplete,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Connecting => write!(f, "Connecting to Strava"),
            SyncStatus::Connected => write!(f, "Connected"),
            SyncStatus::ConnectFailed => write!(f, "Unable to connect"),
            SyncStatus::Error(detail) => write!(f, "Unable to get update: {}", detail),
            SyncStatus::GettingStats => write!(f, "Getting athlete stats"),
            SyncStatus::AthleteStats(count) => write!(f, "{} rides on Strava", count),
            SyncStatus::NewActivities(count) => write!(f, "{} new activities", count),
            SyncStatus::UpdatingActivities(count) => write!(f, "Updating {} activities", count),
            SyncStatus::UpdateComplete => write!(f, "Update complete"),
        }
    }
}

/// Outcome of an activity list sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivitySyncSummary {
    pub pages: u32,
    /// Records merged into the store
    pub upserted: usize,
    /// Records whose id was not in the store before this run
    pub new_activities: usize,
    /// Records rejected by the upsert layer
    pub skipped: usize,
}

/// Outcome of a batch of detailed-activity fetches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailRefreshSummary {
    pub total: usize,
    /// Fetches that ran to completion, successful or not
    pub completed: usize,
    pub failed: usize,
    /// Items never started because the stop flag was set
    pub stopped: usize,
}

/// Outcome of a full update pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub athlete_id: u64,
    pub activities: ActivitySyncSummary,
    pub details: DetailRefreshSummary,
}

/// Drives every remote fetch and merges the results into the shared store.
pub struct SyncService {
    api: Arc<dyn FitnessApi>,
    store: SharedStore,
    detail_concurrency: usize,
    /// High-water mark for the activity sync in progress
    cursor: Option<DateTime<Utc>>,
    /// Fire-and-forget segment follow-ups, kept so callers can await them
    follow_ups: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl SyncService {
    pub fn new(api: Arc<dyn FitnessApi>, store: SharedStore) -> Self {
        Self {
            api,
            store,
            detail_concurrency: DEFAULT_DETAIL_CONCURRENCY,
            cursor: None,
            follow_ups: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Bound the number of detail fetches in flight (minimum 1).
    pub fn with_detail_concurrency(mut self, concurrency: usize) -> Self {
        self.detail_concurrency = concurrency.max(1);
        self
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Current sync cursor; `None` outside of an activity sync.
    pub fn cursor(&self) -> Option<DateTime<Utc>> {
        self.cursor
    }

    // ─── Activities ──────────────────────────────────────────────

    /// Page through the athlete's activities newer than the stored
    /// high-water mark.
    ///
    /// `on_page` receives every upserted activity with `finished = false`,
    /// then a final `(None, true)` once a short page ends the sync.
    pub async fn sync_activities<F>(&mut self, mut on_page: F) -> Result<ActivitySyncSummary>
    where
        F: FnMut(Option<&Activity>, bool),
    {
        let mut summary = ActivitySyncSummary::default();
        let mut page = 1;

        loop {
            if page == 1 {
                self.cursor = self.store.lock().await.latest_activity_start();
            }
            let after = self.cursor.map(to_epoch_seconds);

            tracing::info!(
                page,
                after = ?self.cursor.map(format_utc_rfc3339),
                "Requesting activity page"
            );

            let records = match self.api.list_activities(after, page, PER_PAGE).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::error!(page, error = %e, "Activity page failed, stopping sync");
                    return Err(e);
                }
            };
            summary.pages = page;

            {
                let mut store = self.store.lock().await;
                for record in &records {
                    let is_new = record.id.is_some_and(|id| store.activity(id).is_none());
                    match store.upsert_activity(record) {
                        Ok(activity) => {
                            summary.upserted += 1;
                            if is_new {
                                summary.new_activities += 1;
                            }
                            on_page(Some(activity), false);
                        }
                        Err(e) => {
                            summary.skipped += 1;
                            tracing::warn!(page, error = %e, "Skipping activity record");
                        }
                    }
                }
            }

            if records.len() < PER_PAGE as usize {
                tracing::info!(
                    pages = summary.pages,
                    upserted = summary.upserted,
                    new = summary.new_activities,
                    "Activity sync complete"
                );
                self.cursor = None;
                on_page(None, true);
                return Ok(summary);
            }

            page += 1;
        }
    }

    /// Refresh one activity to `detailed`, ingesting its segment efforts.
    pub async fn get_detailed_activity(&self, activity_id: u64) -> Result<()> {
        let remote = self.api.get_activity(activity_id).await?;
        let mut store = self.store.lock().await;
        let activity = store.upsert_activity(&remote)?;
        tracing::debug!(
            activity_id,
            efforts = activity.effort_ids.len(),
            "Detailed activity stored"
        );
        Ok(())
    }

    /// Fetch detail for each activity independently.
    ///
    /// One failure does not stop the batch. `on_progress(completed, total)`
    /// fires after every finished fetch. `stop` is checked before each fetch
    /// starts; fetches already in flight run to completion.
    pub async fn refresh_detailed_activities<F>(
        &self,
        activity_ids: Vec<u64>,
        stop: &AtomicBool,
        mut on_progress: F,
    ) -> DetailRefreshSummary
    where
        F: FnMut(usize, usize),
    {
        let total = activity_ids.len();
        let mut summary = DetailRefreshSummary {
            total,
            ..Default::default()
        };

        let mut fetches = stream::iter(activity_ids)
            .map(|activity_id| async move {
                if stop.load(Ordering::Relaxed) {
                    return None;
                }
                let result = self.get_detailed_activity(activity_id).await;
                Some((activity_id, result))
            })
            .buffer_unordered(self.detail_concurrency);

        while let Some(outcome) = fetches.next().await {
            match outcome {
                None => summary.stopped += 1,
                Some((activity_id, result)) => {
                    if let Err(e) = result {
                        summary.failed += 1;
                        tracing::warn!(activity_id, error = %e, "Detailed activity fetch failed");
                    }
                    summary.completed += 1;
                    on_progress(summary.completed, total);
                }
            }
        }

        tracing::info!(
            total,
            completed = summary.completed,
            failed = summary.failed,
            stopped = summary.stopped,
            "Detailed activity refresh finished"
        );
        summary
    }

    // ─── Segments & Efforts ──────────────────────────────────────

    /// Page through the athlete's starred segments.
    ///
    /// After each page `on_page` receives every segment gathered so far.
    /// Segments lacking detail or streams get a background follow-up fetch
    /// that does not hold up paging; see [`SyncService::wait_for_follow_ups`].
    pub async fn sync_starred_segments<F>(&self, mut on_page: F) -> Result<Vec<Segment>>
    where
        F: FnMut(&[Segment]),
    {
        let mut segments = Vec::new();
        let mut page = 1;

        loop {
            tracing::info!(page, "Requesting starred segment page");
            let records = match self.api.list_starred_segments(page, PER_PAGE).await {
                Ok(records) => records,
                Err(e) => {
                    tracing::error!(page, error = %e, "Starred segment page failed");
                    return Err(e);
                }
            };

            let mut follow_ups = Vec::new();
            {
                let mut store = self.store.lock().await;
                for record in &records {
                    let segment = match store.upsert_segment(record) {
                        Ok(segment) => segment.clone(),
                        Err(e) => {
                            tracing::warn!(page, error = %e, "Skipping segment record");
                            continue;
                        }
                    };
                    let needs_detail = !segment.resource_state.is_detailed();
                    let needs_streams =
                        store.streams(StreamOwner::Segment(segment.id)).is_empty();
                    if needs_detail || needs_streams {
                        follow_ups.push((segment.id, needs_detail, needs_streams));
                    }
                    segments.push(segment);
                }
            }

            for (segment_id, needs_detail, needs_streams) in follow_ups {
                self.spawn_segment_follow_up(segment_id, needs_detail, needs_streams)
                    .await;
            }

            on_page(&segments);

            if records.len() < PER_PAGE as usize {
                tracing::info!(count = segments.len(), "Starred segment sync complete");
                return Ok(segments);
            }
            page += 1;
        }
    }

    async fn spawn_segment_follow_up(
        &self,
        segment_id: u64,
        needs_detail: bool,
        needs_streams: bool,
    ) {
        let api = Arc::clone(&self.api);
        let store = Arc::clone(&self.store);

        let handle = tokio::spawn(async move {
            if needs_detail {
                if let Err(e) = fetch_segment(api.as_ref(), &store, segment_id).await {
                    tracing::warn!(segment_id, error = %e, "Segment detail follow-up failed");
                }
            }
            if needs_streams {
                if let Err(e) =
                    fetch_streams(api.as_ref(), &store, StreamOwner::Segment(segment_id)).await
                {
                    tracing::warn!(segment_id, error = %e, "Segment stream follow-up failed");
                }
            }
        });

        self.follow_ups.lock().await.push(handle);
    }

    /// Wait for every background follow-up spawned so far.
    pub async fn wait_for_follow_ups(&self) {
        let handles = std::mem::take(&mut *self.follow_ups.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "Follow-up task did not finish");
            }
        }
    }

    /// Refresh one segment to `detailed`.
    pub async fn get_segment(&self, segment_id: u64) -> Result<()> {
        fetch_segment(self.api.as_ref(), &self.store, segment_id).await
    }

    /// Page through the athlete's efforts on a segment.
    ///
    /// After each page `on_page` receives every effort gathered so far. Once
    /// the last page is in, the segment is marked as fully retrieved and its
    /// effort count recounted.
    pub async fn efforts_for_segment<F>(
        &self,
        segment_id: u64,
        mut on_page: F,
    ) -> Result<Vec<Effort>>
    where
        F: FnMut(&[Effort]),
    {
        let mut efforts = Vec::new();
        let mut page = 1;

        loop {
            tracing::info!(segment_id, page, "Requesting segment effort page");
            let records = match self
                .api
                .list_segment_efforts(segment_id, page, PER_PAGE)
                .await
            {
                Ok(records) => records,
                Err(e) => {
                    tracing::error!(segment_id, page, error = %e, "Segment effort page failed");
                    return Err(e);
                }
            };

            {
                let mut store = self.store.lock().await;
                for record in &records {
                    match store.upsert_effort(record) {
                        Ok(effort) => efforts.push(effort.clone()),
                        Err(e) => {
                            tracing::warn!(segment_id, page, error = %e, "Skipping effort record")
                        }
                    }
                }

                if records.len() < PER_PAGE as usize {
                    if let Some(segment) = store.segment_mut(segment_id) {
                        segment.all_efforts_retrieved = true;
                        segment.effort_count = segment.effort_ids.len() as u32;
                    }
                }
            }

            on_page(&efforts);

            if records.len() < PER_PAGE as usize {
                tracing::info!(
                    segment_id,
                    count = efforts.len(),
                    "Segment effort sync complete"
                );
                return Ok(efforts);
            }
            page += 1;
        }
    }

    // ─── Streams ─────────────────────────────────────────────────

    /// Fetch and store the streams for an owner, recomputing derived series.
    /// Returns the number of raw streams stored.
    pub async fn fetch_streams(&self, owner: StreamOwner) -> Result<usize> {
        fetch_streams(self.api.as_ref(), &self.store, owner).await
    }

    // ─── Full update ─────────────────────────────────────────────

    /// Connect, report stats, sync new activities, then bring every stored
    /// activity up to `detailed`.
    pub async fn run_update<F>(&mut self, stop: &AtomicBool, mut status: F) -> Result<UpdateSummary>
    where
        F: FnMut(SyncStatus),
    {
        status(SyncStatus::Connecting);
        let athlete = match self.api.get_athlete().await {
            Ok(athlete) => athlete,
            Err(e) => {
                tracing::error!(error = %e, "Unable to connect to Strava");
                status(SyncStatus::ConnectFailed);
                return Err(e);
            }
        };
        status(SyncStatus::Connected);
        tracing::info!(athlete_id = athlete.id, "Connected to Strava");

        status(SyncStatus::GettingStats);
        match self.api.get_athlete_stats(athlete.id).await {
            Ok(stats) => status(SyncStatus::AthleteStats(stats.all_ride_totals.count)),
            Err(e) => tracing::warn!(error = %e, "Athlete stats unavailable, continuing"),
        }

        let activities = match self.sync_activities(|_, _| {}).await {
            Ok(summary) => summary,
            Err(e) => {
                status(SyncStatus::Error(e.to_string()));
                return Err(e);
            }
        };
        status(SyncStatus::NewActivities(activities.new_activities));

        let pending = self
            .store
            .lock()
            .await
            .activities_below(ResourceState::Detailed);
        status(SyncStatus::UpdatingActivities(pending.len()));

        let details = self
            .refresh_detailed_activities(pending, stop, |completed, total| {
                tracing::debug!(completed, total, "Detailed activity progress");
            })
            .await;

        status(SyncStatus::UpdateComplete);
        Ok(UpdateSummary {
            athlete_id: athlete.id,
            activities,
            details,
        })
    }
}

/// Fetch a segment's detail and merge it.
async fn fetch_segment(api: &dyn FitnessApi, store: &SharedStore, segment_id: u64) -> Result<()> {
    let remote = api.get_segment(segment_id).await?;
    store.lock().await.upsert_segment(&remote)?;
    Ok(())
}

/// Fetch an owner's streams and ingest them.
async fn fetch_streams(
    api: &dyn FitnessApi,
    store: &SharedStore,
    owner: StreamOwner,
) -> Result<usize> {
    if !store.lock().await.owner_exists(owner) {
        return Err(AppError::NotFound(format!("Stream owner {}", owner)));
    }
    let remote = api.get_streams(owner, owner.requested_types()).await?;
    store.lock().await.ingest_streams(owner, &remote)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(SyncStatus::AthleteStats(12).to_string(), "12 rides on Strava");
        assert_eq!(
            SyncStatus::Error("HTTP 500".to_string()).to_string(),
            "Unable to get update: HTTP 500"
        );
    }
}
