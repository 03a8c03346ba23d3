// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client and remote record types.
//!
//! Handles:
//! - Athlete lookup (connection check) and all-time ride stats
//! - Paginated activity, starred-segment and segment-effort listings
//! - Detailed activity and segment fetches
//! - Stream fetches for activities, segments and efforts
//! - Rate limit and token error classification
//!
//! Remote records keep every field optional so that a sparse response is
//! surfaced as a missing value (or a `MissingId` error in the upsert layer)
//! instead of a decode failure.

use crate::error::{AppError, Result};
use crate::models::{LatLng, ResourceState, StreamOwner};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Records requested per page on every paginated endpoint.
pub const PER_PAGE: u32 = 100;

/// Remote fitness API consumed by the sync orchestrator.
///
/// Every call is a single request; failures are returned, never retried.
#[async_trait]
pub trait FitnessApi: Send + Sync {
    /// The authenticated athlete.
    async fn get_athlete(&self) -> Result<StravaAthlete>;

    /// All-time, recent and year-to-date totals for an athlete.
    async fn get_athlete_stats(&self, athlete_id: u64) -> Result<StravaAthleteStats>;

    /// One page of the athlete's activities, optionally only those started
    /// after `after` (epoch seconds).
    async fn list_activities(
        &self,
        after: Option<i64>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaActivity>>;

    /// Detailed activity including all segment efforts.
    async fn get_activity(&self, activity_id: u64) -> Result<StravaActivity>;

    async fn list_starred_segments(&self, page: u32, per_page: u32) -> Result<Vec<StravaSegment>>;

    async fn get_segment(&self, segment_id: u64) -> Result<StravaSegment>;

    /// One page of the athlete's efforts on a segment.
    async fn list_segment_efforts(
        &self,
        segment_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaEffort>>;

    /// Streams for an owner; `requested_types` is a comma-separated key list.
    async fn get_streams(
        &self,
        owner: StreamOwner,
        requested_types: &str,
    ) -> Result<Vec<StravaStream>>;
}

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl StravaClient {
    /// Create a client for the given API root and bearer token.
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }

    /// Generic GET request with query parameters and a JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, "Strava GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()));
            }

            if status.as_u16() == 401 {
                return Err(AppError::StravaApi(
                    AppError::STRAVA_TOKEN_ERROR.to_string(),
                ));
            }

            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl FitnessApi for StravaClient {
    async fn get_athlete(&self) -> Result<StravaAthlete> {
        self.get_json("/athlete", &[]).await
    }

    async fn get_athlete_stats(&self, athlete_id: u64) -> Result<StravaAthleteStats> {
        self.get_json(&format!("/athletes/{}/stats", athlete_id), &[])
            .await
    }

    async fn list_activities(
        &self,
        after: Option<i64>,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaActivity>> {
        let mut query = vec![
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        if let Some(after) = after {
            query.push(("after", after.to_string()));
        }
        self.get_json("/athlete/activities", &query).await
    }

    async fn get_activity(&self, activity_id: u64) -> Result<StravaActivity> {
        self.get_json(
            &format!("/activities/{}", activity_id),
            &[("include_all_efforts", "true".to_string())],
        )
        .await
    }

    async fn list_starred_segments(&self, page: u32, per_page: u32) -> Result<Vec<StravaSegment>> {
        self.get_json(
            "/segments/starred",
            &[
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    async fn get_segment(&self, segment_id: u64) -> Result<StravaSegment> {
        self.get_json(&format!("/segments/{}", segment_id), &[])
            .await
    }

    async fn list_segment_efforts(
        &self,
        segment_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<StravaEffort>> {
        self.get_json(
            "/segment_efforts",
            &[
                ("segment_id", segment_id.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    async fn get_streams(
        &self,
        owner: StreamOwner,
        requested_types: &str,
    ) -> Result<Vec<StravaStream>> {
        let path = match owner {
            StreamOwner::Activity(id) => format!("/activities/{}/streams", id),
            StreamOwner::Segment(id) => format!("/segments/{}/streams", id),
            StreamOwner::Effort(id) => format!("/segment_efforts/{}/streams", id),
        };

        let keyed: BTreeMap<String, StravaStream> = self
            .get_json(
                &path,
                &[
                    ("keys", requested_types.to_string()),
                    ("key_by_type", "true".to_string()),
                ],
            )
            .await?;

        Ok(streams_from_keyed(keyed))
    }
}

/// Flatten a `key_by_type=true` response, filling each stream's type from its key.
pub fn streams_from_keyed(keyed: BTreeMap<String, StravaStream>) -> Vec<StravaStream> {
    keyed
        .into_iter()
        .map(|(key, mut stream)| {
            stream.stream_type.get_or_insert(key);
            stream
        })
        .collect()
}

/// Authenticated athlete profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StravaAthlete {
    pub id: u64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
}

/// Athlete totals from `/athletes/{id}/stats`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StravaAthleteStats {
    #[serde(default)]
    pub all_ride_totals: StravaTotals,
    #[serde(default)]
    pub recent_ride_totals: StravaTotals,
    #[serde(default)]
    pub ytd_ride_totals: StravaTotals,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StravaTotals {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub moving_time: u64,
    #[serde(default)]
    pub elevation_gain: f64,
}

/// Activity record, summary or detailed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StravaActivity {
    pub id: Option<u64>,
    pub resource_state: Option<ResourceState>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub activity_type: Option<String>,
    pub sport_type: Option<String>,
    pub distance: Option<f64>,
    pub moving_time: Option<u64>,
    pub elapsed_time: Option<u64>,
    pub total_elevation_gain: Option<f64>,
    pub elev_high: Option<f64>,
    pub elev_low: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    pub start_date_local: Option<String>,
    pub timezone: Option<String>,
    pub start_latlng: Option<Vec<f64>>,
    pub end_latlng: Option<Vec<f64>>,
    pub average_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub average_watts: Option<f64>,
    pub weighted_average_watts: Option<f64>,
    pub kilojoules: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub average_cadence: Option<f64>,
    pub map: Option<StravaMap>,
    /// Present on detailed activities only
    #[serde(default)]
    pub segment_efforts: Vec<StravaEffort>,
}

/// Polyline geometry attached to activities and segments.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StravaMap {
    pub id: Option<String>,
    pub resource_state: Option<ResourceState>,
    pub polyline: Option<String>,
    pub summary_polyline: Option<String>,
}

/// Segment record, summary or detailed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StravaSegment {
    pub id: Option<u64>,
    pub resource_state: Option<ResourceState>,
    pub name: Option<String>,
    pub activity_type: Option<String>,
    pub distance: Option<f64>,
    pub average_grade: Option<f64>,
    pub maximum_grade: Option<f64>,
    pub elevation_high: Option<f64>,
    pub elevation_low: Option<f64>,
    pub total_elevation_gain: Option<f64>,
    pub start_latlng: Option<Vec<f64>>,
    pub end_latlng: Option<Vec<f64>>,
    pub climb_category: Option<i32>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub starred: Option<bool>,
    pub athlete_count: Option<u64>,
    pub athlete_segment_stats: Option<StravaAthleteSegmentStats>,
    pub map: Option<StravaMap>,
}

/// The authenticated athlete's own history on a segment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StravaAthleteSegmentStats {
    pub effort_count: Option<u32>,
    pub pr_elapsed_time: Option<u64>,
    pub pr_date: Option<String>,
}

/// Segment effort record.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StravaEffort {
    pub id: Option<u64>,
    pub resource_state: Option<ResourceState>,
    pub name: Option<String>,
    pub activity: Option<StravaMetaRef>,
    pub segment: Option<StravaSegment>,
    pub distance: Option<f64>,
    pub moving_time: Option<u64>,
    pub elapsed_time: Option<u64>,
    pub start_date: Option<DateTime<Utc>>,
    pub start_date_local: Option<String>,
    pub average_cadence: Option<f64>,
    pub average_watts: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub kom_rank: Option<u32>,
    pub pr_rank: Option<u32>,
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
}

/// Meta-level reference to another record (`{"id": 1, "resource_state": 1}`).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StravaMetaRef {
    pub id: Option<u64>,
    pub resource_state: Option<ResourceState>,
}

/// One stream from a streams response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StravaStream {
    #[serde(rename = "type")]
    pub stream_type: Option<String>,
    pub series_type: Option<String>,
    pub original_size: Option<usize>,
    pub resolution: Option<String>,
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

impl StravaStream {
    /// Sample values as doubles. `null` samples read as `0.0`; a stream with
    /// non-scalar samples (`latlng`, `moving`) yields `None`.
    pub fn numeric_data(&self) -> Option<Vec<f64>> {
        self.data
            .iter()
            .map(|v| match v {
                serde_json::Value::Null => Some(0.0),
                other => other.as_f64(),
            })
            .collect()
    }
}

/// Convert Strava's `[lat, lng]` pair (which may be empty) into a coordinate.
pub fn latlng_from(pair: Option<&Vec<f64>>) -> Option<LatLng> {
    match pair.map(Vec::as_slice) {
        Some([lat, lng]) => Some(LatLng {
            lat: *lat,
            lng: *lng,
        }),
        _ => None,
    }
}
