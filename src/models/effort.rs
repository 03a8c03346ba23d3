// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! One traversal of a segment within an activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::ResourceState;

/// Locally stored segment effort.
///
/// `activity_id` and `segment_id` always refer to records present in the
/// same store; the upsert layer creates the segment if needed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Effort {
    /// Strava segment effort ID
    pub id: u64,
    pub name: String,
    pub activity_id: u64,
    pub segment_id: u64,
    /// Distance in meters
    pub distance: f64,
    pub moving_time: u64,
    pub elapsed_time: u64,
    pub start_date: Option<DateTime<Utc>>,
    pub start_date_local: Option<String>,
    pub average_cadence: Option<f64>,
    pub average_watts: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    /// `distance / elapsed_time` in meters per second, 0 when no time elapsed
    pub average_speed: f64,
    pub kom_rank: Option<u32>,
    pub pr_rank: Option<u32>,
    /// Sample index range within the parent activity's streams
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
    pub resource_state: ResourceState,
}

impl Effort {
    pub fn new(id: u64, activity_id: u64, segment_id: u64) -> Self {
        Self {
            id,
            activity_id,
            segment_id,
            ..Default::default()
        }
    }
}

/// Average speed over an effort; zero elapsed time gives 0.
pub fn average_speed(distance: f64, elapsed_time: u64) -> f64 {
    if elapsed_time == 0 {
        0.0
    } else {
        distance / elapsed_time as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_speed() {
        assert_eq!(average_speed(1000.0, 200), 5.0);
        assert_eq!(average_speed(1000.0, 0), 0.0);
    }
}
