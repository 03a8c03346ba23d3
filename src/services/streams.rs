// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stream storage and derived-series computation.
//!
//! Raw streams arrive from Strava per owner. Three series are derived
//! locally whenever their inputs are present with matching lengths:
//! - `gear_ratio` = `velocity_smooth / cadence` (0 where cadence is 0)
//! - `cumulative_power` = running sum of `watts * dt` (joules)
//! - `cumulative_heartrate` = running sum of `heartrate * dt / 60` (beat-minutes)

use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::models::{Stream, StreamOwner, StreamType};
use crate::services::strava::StravaStream;

impl EntityStore {
    /// Create or replace the stream of `stream_type` on `owner`.
    pub fn upsert_stream(
        &mut self,
        owner: StreamOwner,
        stream_type: StreamType,
        series_type: &str,
        original_size: usize,
        values: Vec<f64>,
    ) -> Result<&Stream> {
        if !self.owner_exists(owner) {
            return Err(AppError::NotFound(format!("Stream owner {}", owner)));
        }

        Ok(self.attach_stream(Stream {
            owner,
            stream_type,
            series_type: series_type.to_string(),
            original_size,
            values,
        }))
    }

    /// Store a batch of remote streams for `owner`, then recompute the
    /// derived series. Returns the number of raw streams stored.
    pub fn ingest_streams(&mut self, owner: StreamOwner, remote: &[StravaStream]) -> Result<usize> {
        let mut stored = 0;

        for stream in remote {
            let Some(key) = stream.stream_type.as_deref() else {
                tracing::debug!(owner = %owner, "Skipping stream without a type");
                continue;
            };
            let Some(stream_type) = StreamType::from_key(key).filter(|t| !t.is_derived()) else {
                tracing::debug!(owner = %owner, stream = key, "Skipping unsupported stream type");
                continue;
            };
            let Some(values) = stream.numeric_data() else {
                tracing::debug!(owner = %owner, stream = key, "Skipping non-numeric stream");
                continue;
            };

            let original_size = stream.original_size.unwrap_or(values.len());
            let series_type = stream.series_type.as_deref().unwrap_or("distance");
            self.upsert_stream(owner, stream_type, series_type, original_size, values)?;
            stored += 1;
        }

        let derived = self.derive_streams(owner)?;
        tracing::debug!(owner = %owner, stored, derived, "Streams ingested");
        Ok(stored)
    }

    /// Recompute every derived series whose inputs are present on `owner`.
    /// Returns the number of derived streams written.
    pub fn derive_streams(&mut self, owner: StreamOwner) -> Result<usize> {
        let mut pending = Vec::new();

        if let Some((speed, cadence)) =
            self.stream_pair(owner, StreamType::VelocitySmooth, StreamType::Cadence)
        {
            pending.push((
                StreamType::GearRatio,
                speed.series_type.clone(),
                gear_ratio(&speed.values, &cadence.values),
            ));
        }
        if let Some((watts, time)) = self.stream_pair(owner, StreamType::Watts, StreamType::Time) {
            pending.push((
                StreamType::CumulativePower,
                watts.series_type.clone(),
                cumulative_power(&watts.values, &time.values),
            ));
        }
        if let Some((heartrate, time)) =
            self.stream_pair(owner, StreamType::Heartrate, StreamType::Time)
        {
            pending.push((
                StreamType::CumulativeHeartrate,
                heartrate.series_type.clone(),
                cumulative_heartrate(&heartrate.values, &time.values),
            ));
        }

        let count = pending.len();
        for (stream_type, series_type, values) in pending {
            let size = values.len();
            self.upsert_stream(owner, stream_type, &series_type, size, values)?;
        }
        Ok(count)
    }

    /// Both streams, when present on `owner` with equal lengths.
    fn stream_pair(
        &self,
        owner: StreamOwner,
        first: StreamType,
        second: StreamType,
    ) -> Option<(&Stream, &Stream)> {
        let a = self.stream(owner, first)?;
        let b = self.stream(owner, second)?;
        if a.len() != b.len() {
            tracing::debug!(
                owner = %owner,
                first = %first,
                second = %second,
                "Stream lengths differ, not deriving"
            );
            return None;
        }
        Some((a, b))
    }
}

/// Speed divided by cadence per sample, 0 where cadence is 0.
pub fn gear_ratio(speed: &[f64], cadence: &[f64]) -> Vec<f64> {
    speed
        .iter()
        .zip(cadence)
        .map(|(&s, &c)| if c != 0.0 { s / c } else { 0.0 })
        .collect()
}

/// Per-sample time deltas; the first sample has no predecessor and gets 0.
pub fn time_deltas(time: &[f64]) -> Vec<f64> {
    std::iter::once(0.0)
        .chain(time.windows(2).map(|w| w[1] - w[0]))
        .take(time.len())
        .collect()
}

/// Running sum of `watts[i] * dt[i]`, in joules.
pub fn cumulative_power(watts: &[f64], time: &[f64]) -> Vec<f64> {
    running_sum(watts.iter().zip(time_deltas(time)).map(|(&w, dt)| w * dt))
}

/// Running sum of `heartrate[i] * dt[i] / 60`, in beat-minutes.
pub fn cumulative_heartrate(heartrate: &[f64], time: &[f64]) -> Vec<f64> {
    running_sum(
        heartrate
            .iter()
            .zip(time_deltas(time))
            .map(|(&hr, dt)| hr * dt / 60.0),
    )
}

fn running_sum(increments: impl Iterator<Item = f64>) -> Vec<f64> {
    increments
        .scan(0.0, |total, inc| {
            *total += inc;
            Some(*total)
        })
        .collect()
}
