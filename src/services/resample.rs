// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resample a stream onto a uniform grid over another stream's domain.
//!
//! The axis stream (usually `distance`) is rebased to start at 0 and the
//! value stream is linearly interpolated at every `unit_increment` step from
//! 0 up to the rebased axis maximum. Before the first axis sample the first
//! value is held, past the last axis sample the last value is held. Value
//! samples missing at the end of a short value stream read as 0.

use crate::db::EntityStore;
use crate::error::{AppError, Result};
use crate::models::{Stream, StreamOwner, StreamType};
use serde::Serialize;

/// One resampled point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResampledPoint {
    /// `output_index * unit_increment`
    pub axis: f64,
    pub value: f64,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ResampleError {
    #[error("Axis stream is empty")]
    EmptyAxis,

    #[error("Unit increment must be positive and finite, got {0}")]
    InvalidIncrement(f64),

    #[error("Resampled stream would exceed {} points", MAX_RESAMPLED_POINTS)]
    TooManyPoints,
}

/// Upper bound on output points for a single resample.
pub const MAX_RESAMPLED_POINTS: usize = 1_000_000;

/// Resample `value_stream` against `axis_stream` at `unit_increment` spacing.
pub fn resample(
    value_stream: &Stream,
    axis_stream: &Stream,
    unit_increment: f64,
) -> std::result::Result<Vec<ResampledPoint>, ResampleError> {
    resample_values(
        value_stream.stream_type,
        &value_stream.values,
        &axis_stream.values,
        unit_increment,
    )
}

/// Slice-level form of [`resample`]. `value_type` decides whether zero
/// values are kept (power, cadence) or dropped as gaps.
pub fn resample_values(
    value_type: StreamType,
    values: &[f64],
    axis: &[f64],
    unit_increment: f64,
) -> std::result::Result<Vec<ResampledPoint>, ResampleError> {
    let Some(&origin) = axis.first() else {
        return Err(ResampleError::EmptyAxis);
    };
    if !unit_increment.is_finite() || unit_increment <= 0.0 {
        return Err(ResampleError::InvalidIncrement(unit_increment));
    }

    // Axis positions in grid units, starting at 0.
    let grid_axis: Vec<f64> = axis
        .iter()
        .map(|a| (a - origin) / unit_increment)
        .collect();
    let max = grid_axis.iter().copied().fold(0.0_f64, f64::max);
    // Tolerate rounding so that e.g. 0.3 / 0.1 still reaches index 3.
    let last = (max + 1e-9).floor();
    if !last.is_finite() || last >= MAX_RESAMPLED_POINTS as f64 {
        return Err(ResampleError::TooManyPoints);
    }
    let last_index = last as usize;
    let capacity = last_index
        .checked_add(1)
        .ok_or(ResampleError::TooManyPoints)?;

    let value_at = |i: usize| values.get(i).copied().unwrap_or(0.0);
    let keep_zero = value_type.zero_is_meaningful();

    let mut points = Vec::with_capacity(capacity);
    let mut segment = 0;
    for index in 0..=last_index {
        let x = index as f64;
        let value = interpolate(&grid_axis, &value_at, &mut segment, x);
        if value == 0.0 && !keep_zero {
            continue;
        }
        points.push(ResampledPoint {
            axis: index as f64 * unit_increment,
            value,
        });
    }
    Ok(points)
}

/// Linear interpolation at `x`, advancing `segment` monotonically.
fn interpolate(
    grid_axis: &[f64],
    value_at: &impl Fn(usize) -> f64,
    segment: &mut usize,
    x: f64,
) -> f64 {
    let last = grid_axis.len() - 1;
    if x <= grid_axis[0] {
        return value_at(0);
    }
    if x >= grid_axis[last] {
        return value_at(last);
    }

    while *segment < last && grid_axis[*segment + 1] <= x {
        *segment += 1;
    }
    let m = *segment;
    if m >= last {
        return value_at(last);
    }

    let (x0, x1) = (grid_axis[m], grid_axis[m + 1]);
    let (y0, y1) = (value_at(m), value_at(m + 1));
    if x1 <= x0 {
        return y0;
    }
    y0 + (x - x0) / (x1 - x0) * (y1 - y0)
}

/// Resample two streams stored on the same owner.
pub fn resample_streams(
    store: &EntityStore,
    owner: StreamOwner,
    value_type: StreamType,
    axis_type: StreamType,
    unit_increment: f64,
) -> Result<Vec<ResampledPoint>> {
    let values = store
        .stream(owner, value_type)
        .ok_or_else(|| AppError::NotFound(format!("{} stream for {}", value_type, owner)))?;
    let axis = store
        .stream(owner, axis_type)
        .ok_or_else(|| AppError::NotFound(format!("{} stream for {}", axis_type, owner)))?;
    Ok(resample(values, axis, unit_increment)?)
}
