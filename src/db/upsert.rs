// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Get-or-create and merge of remote records into the entity store.
//!
//! Every upsert follows the same shape:
//! 1. Look up the local record by remote id, creating a bare one if absent
//! 2. Copy scalar fields from the remote record (last write wins)
//! 3. Merge the resource state (see [`ResourceState::merge`])
//! 4. Resolve nested records (maps, segment efforts, parent segments)
//!
//! Remote ids are validated before anything is written, so a malformed
//! record fails without touching sibling records.

use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::models::effort::average_speed;
use crate::models::{Activity, Effort, Map, ResourceState, Segment};
use crate::services::strava::{
    latlng_from, StravaActivity, StravaEffort, StravaMap, StravaSegment,
};

impl EntityStore {
    /// Merge a remote activity (summary or detailed) into the store.
    ///
    /// Embedded segment efforts are only ingested while the local activity
    /// is below `detailed`; once detailed, its efforts are authoritative and
    /// only scalar fields are refreshed.
    pub fn upsert_activity(&mut self, remote: &StravaActivity) -> Result<&Activity> {
        let id = remote.id.ok_or(AppError::MissingId("activity"))?;

        let was_detailed = self
            .activities
            .get(&id)
            .is_some_and(|a| a.resource_state.is_detailed());

        if !was_detailed {
            for effort in &remote.segment_efforts {
                validate_effort(effort, Some(id))?;
            }
        }

        let map_id = match &remote.map {
            Some(map) => Some(self.upsert_map(map).id.clone()),
            None => None,
        };

        self.mark_dirty();
        let activity = self
            .activities
            .entry(id)
            .or_insert_with(|| Activity::new(id));

        activity.name = remote.name.clone().unwrap_or_default();
        activity.activity_type = remote
            .activity_type
            .as_ref()
            .or(remote.sport_type.as_ref())
            .cloned()
            .unwrap_or_default();
        activity.distance = remote.distance.unwrap_or_default();
        activity.moving_time = remote.moving_time.unwrap_or_default();
        activity.elapsed_time = remote.elapsed_time.unwrap_or_default();
        activity.total_elevation_gain = remote.total_elevation_gain.unwrap_or_default();
        activity.elev_high = remote.elev_high;
        activity.elev_low = remote.elev_low;
        activity.start_date = remote.start_date;
        activity.start_date_local = remote.start_date_local.clone();
        activity.timezone = remote.timezone.clone();
        activity.start_latlng = latlng_from(remote.start_latlng.as_ref());
        activity.end_latlng = latlng_from(remote.end_latlng.as_ref());
        activity.average_speed = remote.average_speed;
        activity.max_speed = remote.max_speed;
        activity.average_watts = remote.average_watts;
        activity.weighted_average_watts = remote.weighted_average_watts;
        activity.kilojoules = remote.kilojoules;
        activity.average_heartrate = remote.average_heartrate;
        activity.max_heartrate = remote.max_heartrate;
        activity.average_cadence = remote.average_cadence;
        activity.resource_state = activity.resource_state.merge(remote.resource_state);
        activity.map_id = map_id;

        if was_detailed {
            if !remote.segment_efforts.is_empty() {
                tracing::debug!(
                    activity_id = id,
                    efforts = remote.segment_efforts.len(),
                    "Activity already detailed, skipping embedded efforts"
                );
            }
        } else {
            for effort in &remote.segment_efforts {
                self.upsert_effort_for_activity(effort, id)?;
            }
        }

        tracing::debug!(activity_id = id, "Activity upserted");
        Ok(&self.activities[&id])
    }

    /// Merge a remote segment into the store.
    pub fn upsert_segment(&mut self, remote: &StravaSegment) -> Result<&Segment> {
        let id = remote.id.ok_or(AppError::MissingId("segment"))?;

        let map_id = match &remote.map {
            Some(map) => Some(self.upsert_map(map).id.clone()),
            None => None,
        };

        self.mark_dirty();
        let segment = self.segments.entry(id).or_insert_with(|| Segment::new(id));
        apply_segment_fields(segment, remote);
        segment.map_id = map_id;

        tracing::debug!(segment_id = id, "Segment upserted");
        Ok(&self.segments[&id])
    }

    /// Merge a remote effort whose parent activity is named in the record
    /// itself (as returned by the segment effort listing).
    ///
    /// An activity that is not yet stored is created at `meta` level.
    pub fn upsert_effort(&mut self, remote: &StravaEffort) -> Result<&Effort> {
        validate_effort(remote, None)?;
        let activity_ref = remote
            .activity
            .as_ref()
            .ok_or(AppError::MissingId("effort activity"))?;
        let activity_id = activity_ref.id.ok_or(AppError::MissingId("effort activity"))?;

        self.mark_dirty();
        let activity = self
            .activities
            .entry(activity_id)
            .or_insert_with(|| Activity::new(activity_id));
        activity.resource_state = activity
            .resource_state
            .merge(activity_ref.resource_state.or(Some(ResourceState::Meta)));

        self.upsert_effort_for_activity(remote, activity_id)
    }

    /// Merge a remote effort owned by `activity_id`, creating its segment if
    /// needed and keeping the segment's effort count in step.
    fn upsert_effort_for_activity(
        &mut self,
        remote: &StravaEffort,
        activity_id: u64,
    ) -> Result<&Effort> {
        validate_effort(remote, Some(activity_id))?;
        let id = remote.id.ok_or(AppError::MissingId("effort"))?;
        let remote_segment = remote
            .segment
            .as_ref()
            .ok_or(AppError::MissingId("effort segment"))?;
        let segment_id = remote_segment.id.ok_or(AppError::MissingId("effort segment"))?;

        let segment_existed = self.segments.contains_key(&segment_id);
        if !segment_existed {
            self.upsert_segment(remote_segment)?;
        }

        let previous = self.efforts.get(&id).map(|e| (e.activity_id, e.segment_id));

        self.mark_dirty();
        let effort = self
            .efforts
            .entry(id)
            .or_insert_with(|| Effort::new(id, activity_id, segment_id));

        effort.name = remote.name.clone().unwrap_or_default();
        effort.activity_id = activity_id;
        effort.segment_id = segment_id;
        effort.distance = remote.distance.unwrap_or_default();
        effort.moving_time = remote.moving_time.unwrap_or_default();
        effort.elapsed_time = remote.elapsed_time.unwrap_or_default();
        effort.start_date = remote.start_date;
        effort.start_date_local = remote.start_date_local.clone();
        effort.average_cadence = remote.average_cadence;
        effort.average_watts = remote.average_watts;
        effort.average_heartrate = remote.average_heartrate;
        effort.max_heartrate = remote.max_heartrate;
        effort.average_speed = average_speed(effort.distance, effort.elapsed_time);
        effort.kom_rank = remote.kom_rank;
        effort.pr_rank = remote.pr_rank;
        effort.start_index = remote.start_index;
        effort.end_index = remote.end_index;
        effort.resource_state = effort.resource_state.merge(remote.resource_state);

        if let Some((old_activity_id, old_segment_id)) = previous {
            self.detach_effort(id, old_activity_id, old_segment_id, activity_id, segment_id);
        }

        if let Some(activity) = self.activities.get_mut(&activity_id) {
            activity.effort_ids.insert(id);
        }

        if let Some(segment) = self.segments.get_mut(&segment_id) {
            segment.effort_ids.insert(id);
            segment.effort_count = if segment_existed {
                segment.effort_ids.len() as u32
            } else {
                1
            };
        }

        tracing::debug!(effort_id = id, activity_id, segment_id, "Effort upserted");
        Ok(&self.efforts[&id])
    }

    /// Drop effort `id` from owners it no longer belongs to, recounting a
    /// segment that loses it.
    fn detach_effort(
        &mut self,
        id: u64,
        old_activity_id: u64,
        old_segment_id: u64,
        activity_id: u64,
        segment_id: u64,
    ) {
        if old_activity_id == activity_id && old_segment_id == segment_id {
            return;
        }
        if old_activity_id != activity_id {
            if let Some(activity) = self.activities.get_mut(&old_activity_id) {
                activity.effort_ids.remove(&id);
            }
        }
        if old_segment_id != segment_id {
            if let Some(segment) = self.segments.get_mut(&old_segment_id) {
                segment.effort_ids.remove(&id);
                segment.effort_count = segment.effort_ids.len() as u32;
            }
        }
        tracing::debug!(
            effort_id = id,
            old_activity_id,
            old_segment_id,
            "Effort moved to new owner"
        );
    }

    /// Merge remote map geometry.
    ///
    /// A map without an id cannot be matched later; it is stored as an empty
    /// record under a locally generated id and a warning is logged.
    pub fn upsert_map(&mut self, remote: &StravaMap) -> &Map {
        self.mark_dirty();

        let Some(id) = remote.id.clone() else {
            self.unidentified_maps += 1;
            let local_id = format!("unidentified-{}", self.unidentified_maps);
            tracing::warn!(map_id = %local_id, "Remote map has no id, storing empty record");
            return self
                .maps
                .entry(local_id.clone())
                .or_insert_with(|| Map::new(local_id));
        };

        let map = self.maps.entry(id.clone()).or_insert_with(|| Map::new(id));
        if remote.polyline.is_some() {
            map.polyline = remote.polyline.clone();
        }
        if remote.summary_polyline.is_some() {
            map.summary_polyline = remote.summary_polyline.clone();
        }
        map.resource_state = map.resource_state.merge(remote.resource_state);
        map
    }
}

fn apply_segment_fields(segment: &mut Segment, remote: &StravaSegment) {
    segment.name = remote.name.clone().unwrap_or_default();
    segment.activity_type = remote.activity_type.clone();
    segment.distance = remote.distance.unwrap_or_default();
    segment.average_grade = remote.average_grade.unwrap_or_default();
    segment.maximum_grade = remote.maximum_grade.unwrap_or_default();
    segment.elevation_high = remote.elevation_high;
    segment.elevation_low = remote.elevation_low;
    segment.total_elevation_gain = remote.total_elevation_gain;
    segment.start_latlng = latlng_from(remote.start_latlng.as_ref());
    segment.end_latlng = latlng_from(remote.end_latlng.as_ref());
    segment.climb_category = remote.climb_category;
    segment.city = remote.city.clone();
    segment.state = remote.state.clone();
    segment.country = remote.country.clone();
    segment.starred = remote.starred.unwrap_or_default();
    segment.athlete_count = remote.athlete_count;
    if let Some(count) = remote
        .athlete_segment_stats
        .as_ref()
        .and_then(|stats| stats.effort_count)
    {
        segment.effort_count = count;
    }
    segment.resource_state = segment.resource_state.merge(remote.resource_state);
}

/// Check the ids an effort needs before anything is written.
///
/// `activity_id` is `Some` when the owning activity is already known from
/// context; otherwise the record must name its activity.
fn validate_effort(remote: &StravaEffort, activity_id: Option<u64>) -> Result<()> {
    remote.id.ok_or(AppError::MissingId("effort"))?;
    remote
        .segment
        .as_ref()
        .and_then(|s| s.id)
        .ok_or(AppError::MissingId("effort segment"))?;
    if activity_id.is_none() {
        remote
            .activity
            .as_ref()
            .and_then(|a| a.id)
            .ok_or(AppError::MissingId("effort activity"))?;
    }
    Ok(())
}
