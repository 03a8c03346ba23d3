// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

use serde::{Deserialize, Serialize};

use crate::models::ResourceState;

/// Route geometry shared by activities and segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Map {
    /// Strava map ID (e.g. "a1234567" or "s229781")
    pub id: String,
    /// Full-resolution encoded polyline
    pub polyline: Option<String>,
    /// Reduced encoded polyline from list endpoints
    pub summary_polyline: Option<String>,
    pub resource_state: ResourceState,
}

impl Map {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}
