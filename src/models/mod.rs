// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the local mirror.

pub mod activity;
pub mod effort;
pub mod map;
pub mod resource_state;
pub mod segment;
pub mod stream;

pub use activity::Activity;
pub use effort::Effort;
pub use map::Map;
pub use resource_state::ResourceState;
pub use segment::Segment;
pub use stream::{Stream, StreamOwner, StreamType};

use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}
