// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Completeness marker for locally mirrored entities.

use serde::{Deserialize, Serialize};

/// How much of an entity's remote detail has been ingested.
///
/// Strava reports this as an integer (`1` meta, `2` summary, `3` detailed)
/// on every record it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ResourceState {
    #[default]
    Undefined = 0,
    Meta = 1,
    Summary = 2,
    Detailed = 3,
}

impl ResourceState {
    /// Combine the locally held state with the state of an incoming record.
    ///
    /// `meta` only ever replaces `undefined`, `summary` replaces anything
    /// but `detailed`, and `detailed` always wins. An absent (or
    /// `undefined`) incoming state leaves `self` untouched.
    pub fn merge(self, incoming: Option<ResourceState>) -> ResourceState {
        match incoming {
            None | Some(ResourceState::Undefined) => self,
            Some(ResourceState::Meta) => {
                if self == ResourceState::Undefined {
                    ResourceState::Meta
                } else {
                    self
                }
            }
            Some(ResourceState::Summary) => {
                if self == ResourceState::Detailed {
                    self
                } else {
                    ResourceState::Summary
                }
            }
            Some(ResourceState::Detailed) => ResourceState::Detailed,
        }
    }

    pub fn is_detailed(self) -> bool {
        self == ResourceState::Detailed
    }
}

impl TryFrom<u8> for ResourceState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ResourceState::Undefined),
            1 => Ok(ResourceState::Meta),
            2 => Ok(ResourceState::Summary),
            3 => Ok(ResourceState::Detailed),
            other => Err(format!("unknown resource_state {}", other)),
        }
    }
}

impl From<ResourceState> for u8 {
    fn from(state: ResourceState) -> Self {
        state as u8
    }
}
