// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Mirrored Strava activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{LatLng, ResourceState};

/// Locally stored activity record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID
    pub id: u64,
    pub name: String,
    /// Activity type tag (Ride, VirtualRide, Run, ...)
    pub activity_type: String,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: u64,
    /// Elapsed time in seconds
    pub elapsed_time: u64,
    pub total_elevation_gain: f64,
    pub elev_high: Option<f64>,
    pub elev_low: Option<f64>,
    pub start_date: Option<DateTime<Utc>>,
    /// Local wall-clock start time as reported by Strava
    pub start_date_local: Option<String>,
    pub timezone: Option<String>,
    pub start_latlng: Option<LatLng>,
    pub end_latlng: Option<LatLng>,
    /// Meters per second
    pub average_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub average_watts: Option<f64>,
    pub weighted_average_watts: Option<f64>,
    pub kilojoules: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub average_cadence: Option<f64>,
    pub resource_state: ResourceState,
    pub map_id: Option<String>,
    pub effort_ids: BTreeSet<u64>,
}

impl Activity {
    /// Bare record created on first sight of an id.
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}
