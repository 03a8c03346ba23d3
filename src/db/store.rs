// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory entity store with JSON snapshot persistence.
//!
//! Entities live in id-keyed maps and refer to each other by id:
//! - Activities, segments and efforts keyed by Strava numeric id
//! - Maps keyed by Strava map id (a string)
//! - Streams keyed by `(owner, stream_type)`
//!
//! Nothing is ever deleted from the store by the sync pipeline.

use crate::error::AppError;
use crate::models::{Activity, Effort, Map, ResourceState, Segment, Stream, StreamOwner, StreamType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Store shared between the orchestrator and its spawned follow-up fetches.
///
/// All mutation goes through this one lock; it is never held across a
/// remote API call.
pub type SharedStore = Arc<Mutex<EntityStore>>;

/// Arena of mirrored entities.
#[derive(Debug, Default)]
pub struct EntityStore {
    pub(crate) activities: HashMap<u64, Activity>,
    pub(crate) segments: HashMap<u64, Segment>,
    pub(crate) efforts: HashMap<u64, Effort>,
    pub(crate) maps: HashMap<String, Map>,
    pub(crate) streams: HashMap<StreamOwner, BTreeMap<StreamType, Stream>>,
    /// Counter for maps that arrived without a remote id
    pub(crate) unidentified_maps: u64,
    dirty: bool,
}

/// On-disk form of the store.
#[derive(Serialize, Deserialize, Default)]
struct Snapshot {
    #[serde(default)]
    activities: Vec<Activity>,
    #[serde(default)]
    segments: Vec<Segment>,
    #[serde(default)]
    efforts: Vec<Effort>,
    #[serde(default)]
    maps: Vec<Map>,
    #[serde(default)]
    streams: Vec<Stream>,
    #[serde(default)]
    unidentified_maps: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a store for sharing with the sync service.
    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    // ─── Persistence ─────────────────────────────────────────────

    /// Load a snapshot from disk. A missing file yields an empty store.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No store snapshot, starting empty");
            return Ok(Self::new());
        }

        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Database(format!("Failed to read {}: {}", path.display(), e)))?;
        let snapshot: Snapshot = serde_json::from_str(&json).map_err(|e| {
            AppError::Database(format!("Corrupt snapshot {}: {}", path.display(), e))
        })?;

        let mut store = Self::new();
        store.unidentified_maps = snapshot.unidentified_maps;
        store.activities = snapshot.activities.into_iter().map(|a| (a.id, a)).collect();
        store.segments = snapshot.segments.into_iter().map(|s| (s.id, s)).collect();
        store.efforts = snapshot.efforts.into_iter().map(|e| (e.id, e)).collect();
        store.maps = snapshot.maps.into_iter().map(|m| (m.id.clone(), m)).collect();
        for stream in snapshot.streams {
            store
                .streams
                .entry(stream.owner)
                .or_default()
                .insert(stream.stream_type, stream);
        }

        tracing::info!(
            path = %path.display(),
            activities = store.activities.len(),
            segments = store.segments.len(),
            efforts = store.efforts.len(),
            "Loaded store snapshot"
        );
        Ok(store)
    }

    /// Write all entities to disk and clear the pending-changes flag.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), AppError> {
        let path = path.as_ref();
        let snapshot = Snapshot {
            activities: sorted_by_key(self.activities.values(), |a| a.id),
            segments: sorted_by_key(self.segments.values(), |s| s.id),
            efforts: sorted_by_key(self.efforts.values(), |e| e.id),
            maps: sorted_by_key(self.maps.values(), |m| m.id.clone()),
            streams: {
                let mut owners: Vec<_> = self.streams.keys().copied().collect();
                owners.sort();
                owners
                    .iter()
                    .flat_map(|owner| self.streams[owner].values().cloned())
                    .collect()
            },
            unidentified_maps: self.unidentified_maps,
        };

        let json = serde_json::to_string(&snapshot)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode snapshot: {}", e)))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Database(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
        std::fs::write(path, json)
            .map_err(|e| AppError::Database(format!("Failed to write {}: {}", path.display(), e)))?;

        self.dirty = false;
        tracing::debug!(path = %path.display(), "Saved store snapshot");
        Ok(())
    }

    /// Whether anything changed since the last load or save.
    pub fn has_pending_changes(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    // ─── Lookups ─────────────────────────────────────────────────

    pub fn activity(&self, id: u64) -> Option<&Activity> {
        self.activities.get(&id)
    }

    pub fn segment(&self, id: u64) -> Option<&Segment> {
        self.segments.get(&id)
    }

    /// Mutable segment access, e.g. for flags maintained by the sync layer.
    pub fn segment_mut(&mut self, id: u64) -> Option<&mut Segment> {
        self.dirty = true;
        self.segments.get_mut(&id)
    }

    pub fn effort(&self, id: u64) -> Option<&Effort> {
        self.efforts.get(&id)
    }

    pub fn map(&self, id: &str) -> Option<&Map> {
        self.maps.get(id)
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn effort_count(&self) -> usize {
        self.efforts.len()
    }

    pub fn map_count(&self) -> usize {
        self.maps.len()
    }

    /// Activities ordered by id.
    pub fn activities(&self) -> Vec<&Activity> {
        let mut all: Vec<_> = self.activities.values().collect();
        all.sort_by_key(|a| a.id);
        all
    }

    /// Segments ordered by id.
    pub fn segments(&self) -> Vec<&Segment> {
        let mut all: Vec<_> = self.segments.values().collect();
        all.sort_by_key(|s| s.id);
        all
    }

    /// Latest start date among stored activities (the sync high-water mark).
    pub fn latest_activity_start(&self) -> Option<DateTime<Utc>> {
        self.activities.values().filter_map(|a| a.start_date).max()
    }

    /// Ids of activities whose resource state is below `state`, ordered by id.
    pub fn activities_below(&self, state: ResourceState) -> Vec<u64> {
        let mut ids: Vec<u64> = self
            .activities
            .values()
            .filter(|a| a.resource_state < state)
            .map(|a| a.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Efforts of an activity, ordered by id.
    pub fn efforts_for_activity(&self, activity_id: u64) -> Vec<&Effort> {
        self.activities
            .get(&activity_id)
            .map(|a| a.effort_ids.iter().filter_map(|id| self.efforts.get(id)).collect())
            .unwrap_or_default()
    }

    /// Efforts on a segment, ordered by id.
    pub fn efforts_for_segment(&self, segment_id: u64) -> Vec<&Effort> {
        self.segments
            .get(&segment_id)
            .map(|s| s.effort_ids.iter().filter_map(|id| self.efforts.get(id)).collect())
            .unwrap_or_default()
    }

    // ─── Streams ─────────────────────────────────────────────────

    /// Whether the owning entity exists in the store.
    pub fn owner_exists(&self, owner: StreamOwner) -> bool {
        match owner {
            StreamOwner::Activity(id) => self.activities.contains_key(&id),
            StreamOwner::Segment(id) => self.segments.contains_key(&id),
            StreamOwner::Effort(id) => self.efforts.contains_key(&id),
        }
    }

    /// All streams attached to an owner, ordered by type.
    pub fn streams(&self, owner: StreamOwner) -> Vec<&Stream> {
        self.streams
            .get(&owner)
            .map(|by_type| by_type.values().collect())
            .unwrap_or_default()
    }

    pub fn stream(&self, owner: StreamOwner, stream_type: StreamType) -> Option<&Stream> {
        self.streams.get(&owner)?.get(&stream_type)
    }

    /// Attach a stream to its owner, replacing any stream of the same type.
    pub(crate) fn attach_stream(&mut self, stream: Stream) -> &Stream {
        self.dirty = true;
        let by_type = self.streams.entry(stream.owner).or_default();
        let stream_type = stream.stream_type;
        by_type.insert(stream_type, stream);
        &by_type[&stream_type]
    }
}

fn sorted_by_key<'a, T, K, F>(items: impl Iterator<Item = &'a T>, key: F) -> Vec<T>
where
    T: Clone + 'a,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut out: Vec<T> = items.cloned().collect();
    out.sort_by_key(|item| key(item));
    out
}
