// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use strava_mirror::error::{AppError, Result};
use strava_mirror::models::{ResourceState, StreamOwner};
use strava_mirror::services::strava::{
    FitnessApi, StravaActivity, StravaAthlete, StravaAthleteStats, StravaEffort, StravaMap,
    StravaMetaRef, StravaSegment, StravaStream, StravaTotals,
};

/// A request seen by [`FakeApi`].
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Athlete,
    AthleteStats(u64),
    ListActivities { after: Option<i64>, page: u32 },
    Activity(u64),
    ListStarredSegments { page: u32 },
    Segment(u64),
    ListSegmentEfforts { segment_id: u64, page: u32 },
    Streams(StreamOwner, String),
}

/// Scripted in-memory stand-in for the Strava API.
///
/// List endpoints page through the configured records; anything not
/// configured answers with an error.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeApi {
    pub athlete_id: Option<u64>,
    pub ride_count: u64,
    /// Summary activities, newest last
    pub activities: Vec<StravaActivity>,
    pub detailed_activities: HashMap<u64, StravaActivity>,
    pub starred_segments: Vec<StravaSegment>,
    pub detailed_segments: HashMap<u64, StravaSegment>,
    pub segment_efforts: HashMap<u64, Vec<StravaEffort>>,
    pub streams: HashMap<StreamOwner, Vec<StravaStream>>,
    /// Activity list page that answers with an error
    pub failing_activity_page: Option<u32>,
    /// Activity ids whose detail fetch fails
    pub failing_activity_ids: HashSet<u64>,
    pub calls: Mutex<Vec<Call>>,
}

#[allow(dead_code)]
impl FakeApi {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn page_of<T: Clone>(items: &[T], page: u32, per_page: u32) -> Vec<T> {
    let start = ((page.max(1) - 1) * per_page) as usize;
    items
        .iter()
        .skip(start)
        .take(per_page as usize)
        .cloned()
        .collect()
}

fn server_error() -> AppError {
    AppError::StravaApi("HTTP 500 Internal Server Error: boom".to_string())
}

#[async_trait]
impl FitnessApi for FakeApi {
    async fn get_athlete(&self) -> Result<StravaAthlete> {
        self.record(Call::Athlete);
        match self.athlete_id {
            Some(id) => Ok(StravaAthlete {
                id,
                firstname: Some("Test".to_string()),
                lastname: Some("Rider".to_string()),
            }),
            None => Err(AppError::StravaApi(
                AppError::STRAVA_TOKEN_ERROR.to_string(),
            )),
        }
    }

    async fn get_athlete_stats(&self, athlete_id: u64) -> Result<StravaAthleteStats> {
        self.record(Call::AthleteStats(athlete_id));
        Ok(StravaAthleteStats {
            all_ride_totals: StravaTotals {
                count: self.ride_count,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    async fn list_activities(
        &self,
        after: Option<i64>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaActivity>> {
        self.record(Call::ListActivities { after, page });
        if self.failing_activity_page == Some(page) {
            return Err(server_error());
        }
        let newer: Vec<StravaActivity> = self
            .activities
            .iter()
            .filter(|a| match (after, a.start_date) {
                (Some(after), Some(start)) => start.timestamp() > after,
                _ => true,
            })
            .cloned()
            .collect();
        Ok(page_of(&newer, page, per_page))
    }

    async fn get_activity(&self, activity_id: u64) -> Result<StravaActivity> {
        self.record(Call::Activity(activity_id));
        if self.failing_activity_ids.contains(&activity_id) {
            return Err(server_error());
        }
        self.detailed_activities
            .get(&activity_id)
            .cloned()
            .ok_or_else(|| AppError::StravaApi("HTTP 404 Not Found: activity".to_string()))
    }

    async fn list_starred_segments(&self, page: u32, per_page: u32) -> Result<Vec<StravaSegment>> {
        self.record(Call::ListStarredSegments { page });
        Ok(page_of(&self.starred_segments, page, per_page))
    }

    async fn get_segment(&self, segment_id: u64) -> Result<StravaSegment> {
        self.record(Call::Segment(segment_id));
        self.detailed_segments
            .get(&segment_id)
            .cloned()
            .ok_or_else(|| AppError::StravaApi("HTTP 404 Not Found: segment".to_string()))
    }

    async fn list_segment_efforts(
        &self,
        segment_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaEffort>> {
        self.record(Call::ListSegmentEfforts { segment_id, page });
        let efforts = self
            .segment_efforts
            .get(&segment_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Ok(page_of(efforts, page, per_page))
    }

    async fn get_streams(
        &self,
        owner: StreamOwner,
        requested_types: &str,
    ) -> Result<Vec<StravaStream>> {
        self.record(Call::Streams(owner, requested_types.to_string()));
        self.streams
            .get(&owner)
            .cloned()
            .ok_or_else(|| AppError::StravaApi("HTTP 404 Not Found: streams".to_string()))
    }
}

// ─── Record builders ─────────────────────────────────────────────

#[allow(dead_code)]
pub fn date(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .expect("valid test date")
        .with_timezone(&Utc)
}

/// Summary-level activity starting `id` minutes after 2024-01-01T00:00Z.
#[allow(dead_code)]
pub fn summary_activity(id: u64) -> StravaActivity {
    StravaActivity {
        id: Some(id),
        resource_state: Some(ResourceState::Summary),
        name: Some(format!("Ride {}", id)),
        activity_type: Some("Ride".to_string()),
        distance: Some(10_000.0 + id as f64),
        moving_time: Some(1800),
        elapsed_time: Some(2000),
        start_date: Some(date("2024-01-01T00:00:00Z") + chrono::Duration::minutes(id as i64)),
        start_latlng: Some(vec![37.33, -122.06]),
        end_latlng: Some(vec![37.40, -122.10]),
        map: Some(StravaMap {
            id: Some(format!("a{}", id)),
            summary_polyline: Some("_p~iF~ps|U_ulLnnqC".to_string()),
            resource_state: Some(ResourceState::Summary),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Detailed version of [`summary_activity`] carrying the given efforts.
#[allow(dead_code)]
pub fn detailed_activity(id: u64, efforts: Vec<StravaEffort>) -> StravaActivity {
    StravaActivity {
        resource_state: Some(ResourceState::Detailed),
        segment_efforts: efforts,
        ..summary_activity(id)
    }
}

#[allow(dead_code)]
pub fn summary_segment(id: u64) -> StravaSegment {
    StravaSegment {
        id: Some(id),
        resource_state: Some(ResourceState::Summary),
        name: Some(format!("Climb {}", id)),
        activity_type: Some("Ride".to_string()),
        distance: Some(2500.0),
        average_grade: Some(6.5),
        maximum_grade: Some(11.0),
        starred: Some(true),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn detailed_segment(id: u64) -> StravaSegment {
    StravaSegment {
        resource_state: Some(ResourceState::Detailed),
        map: Some(StravaMap {
            id: Some(format!("s{}", id)),
            polyline: Some("_p~iF~ps|U_ulLnnqC_mqNvxq`@".to_string()),
            resource_state: Some(ResourceState::Detailed),
            ..Default::default()
        }),
        ..summary_segment(id)
    }
}

/// Effort on `segment_id` within `activity_id`.
#[allow(dead_code)]
pub fn effort(id: u64, activity_id: u64, segment_id: u64) -> StravaEffort {
    StravaEffort {
        id: Some(id),
        resource_state: Some(ResourceState::Detailed),
        name: Some(format!("Climb {}", segment_id)),
        activity: Some(StravaMetaRef {
            id: Some(activity_id),
            resource_state: Some(ResourceState::Meta),
        }),
        segment: Some(summary_segment(segment_id)),
        distance: Some(2500.0),
        moving_time: Some(480),
        elapsed_time: Some(500),
        start_date: Some(date("2024-01-01T00:10:00Z")),
        average_watts: Some(250.0),
        start_index: Some(100),
        end_index: Some(600),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn stream(key: &str, values: &[f64]) -> StravaStream {
    StravaStream {
        stream_type: Some(key.to_string()),
        series_type: Some("distance".to_string()),
        original_size: Some(values.len()),
        resolution: Some("high".to_string()),
        data: values.iter().map(|v| serde_json::json!(v)).collect(),
    }
}
