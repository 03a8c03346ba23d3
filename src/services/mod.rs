// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - remote API, stream processing and sync.

pub mod resample;
pub mod strava;
pub mod streams;
pub mod sync;

pub use resample::{resample, resample_streams, ResampleError, ResampledPoint};
pub use strava::{FitnessApi, StravaClient, PER_PAGE};
pub use sync::{SyncService, SyncStatus};
