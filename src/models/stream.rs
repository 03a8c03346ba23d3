// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw and derived per-sample time series.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stream type vocabulary. The first seven are fetched from Strava, the
/// last three are computed locally from pairs of raw streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamType {
    VelocitySmooth,
    Heartrate,
    Watts,
    Cadence,
    Time,
    Distance,
    Altitude,
    GearRatio,
    CumulativePower,
    CumulativeHeartrate,
}

impl StreamType {
    /// Strava stream key for this type.
    pub fn key(self) -> &'static str {
        match self {
            StreamType::VelocitySmooth => "velocity_smooth",
            StreamType::Heartrate => "heartrate",
            StreamType::Watts => "watts",
            StreamType::Cadence => "cadence",
            StreamType::Time => "time",
            StreamType::Distance => "distance",
            StreamType::Altitude => "altitude",
            StreamType::GearRatio => "gear_ratio",
            StreamType::CumulativePower => "cumulative_power",
            StreamType::CumulativeHeartrate => "cumulative_heartrate",
        }
    }

    /// Parse a Strava stream key. Keys outside the vocabulary (`latlng`,
    /// `moving`, `temp`, ...) return `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "velocity_smooth" => Some(StreamType::VelocitySmooth),
            "heartrate" => Some(StreamType::Heartrate),
            "watts" => Some(StreamType::Watts),
            "cadence" => Some(StreamType::Cadence),
            "time" => Some(StreamType::Time),
            "distance" => Some(StreamType::Distance),
            "altitude" => Some(StreamType::Altitude),
            "gear_ratio" => Some(StreamType::GearRatio),
            "cumulative_power" => Some(StreamType::CumulativePower),
            "cumulative_heartrate" => Some(StreamType::CumulativeHeartrate),
            _ => None,
        }
    }

    /// Derived series are computed locally and never requested remotely.
    pub fn is_derived(self) -> bool {
        matches!(
            self,
            StreamType::GearRatio | StreamType::CumulativePower | StreamType::CumulativeHeartrate
        )
    }

    /// Types where a zero reading is a real measurement rather than a gap.
    pub fn zero_is_meaningful(self) -> bool {
        matches!(self, StreamType::Watts | StreamType::Cadence)
    }
}

impl fmt::Display for StreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The entity a stream hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum StreamOwner {
    Activity(u64),
    Segment(u64),
    Effort(u64),
}

impl StreamOwner {
    /// Comma-separated stream keys requested from Strava for this owner kind.
    pub fn requested_types(&self) -> &'static str {
        match self {
            StreamOwner::Activity(_) | StreamOwner::Segment(_) => ACTIVITY_STREAM_TYPES,
            StreamOwner::Effort(_) => EFFORT_STREAM_TYPES,
        }
    }
}

impl fmt::Display for StreamOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamOwner::Activity(id) => write!(f, "activity {}", id),
            StreamOwner::Segment(id) => write!(f, "segment {}", id),
            StreamOwner::Effort(id) => write!(f, "effort {}", id),
        }
    }
}

/// Streams requested for activities and segments.
pub const ACTIVITY_STREAM_TYPES: &str = "distance,altitude";

/// Streams requested for segment efforts.
pub const EFFORT_STREAM_TYPES: &str = "watts,heartrate,time,cadence,velocity_smooth,distance";

/// A stored series. At most one exists per `(owner, stream_type)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    pub owner: StreamOwner,
    pub stream_type: StreamType,
    /// Axis the series was sampled against ("distance" or "time")
    pub series_type: String,
    /// Sample count before any server-side downsampling
    pub original_size: usize,
    pub values: Vec<f64>,
}

impl Stream {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
