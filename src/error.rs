// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the store, the API client and the
//! sync orchestrator.

use crate::services::resample::ResampleError;

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Transport failure, non-success HTTP status, or undecodable response body.
    #[error("Strava API error: {0}")]
    StravaApi(String),

    /// A remote record arrived without the identifier needed to store it.
    #[error("Remote {0} record is missing its id")]
    MissingId(&'static str),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Resample error: {0}")]
    Resample(#[from] ResampleError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when Strava answers with HTTP 429.
    pub const STRAVA_RATE_LIMIT: &'static str = "Rate limit exceeded";

    /// Message used when Strava rejects the access token (HTTP 401).
    pub const STRAVA_TOKEN_ERROR: &'static str = "Invalid or expired access token";

    /// Whether this error means the access token is no longer usable.
    pub fn is_strava_token_error(&self) -> bool {
        match self {
            AppError::StravaApi(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("token") || msg.contains("invalid")
            }
            _ => false,
        }
    }

    /// Whether this error is Strava's rate limiter pushing back.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::StravaApi(msg) if msg == Self::STRAVA_RATE_LIMIT)
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
