// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Mirrored Strava segment.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{LatLng, ResourceState};

/// Locally stored segment record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Strava segment ID
    pub id: u64,
    pub name: String,
    pub activity_type: Option<String>,
    /// Distance in meters
    pub distance: f64,
    /// Percent
    pub average_grade: f64,
    pub maximum_grade: f64,
    pub elevation_high: Option<f64>,
    pub elevation_low: Option<f64>,
    pub total_elevation_gain: Option<f64>,
    pub start_latlng: Option<LatLng>,
    pub end_latlng: Option<LatLng>,
    pub climb_category: Option<i32>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub starred: bool,
    pub athlete_count: Option<u64>,
    /// Cached number of the athlete's efforts on this segment
    pub effort_count: u32,
    /// Set once every effort on the segment has been paged in
    pub all_efforts_retrieved: bool,
    pub resource_state: ResourceState,
    pub map_id: Option<String>,
    pub effort_ids: BTreeSet<u64>,
}

impl Segment {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }
}
