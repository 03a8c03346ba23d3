// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use strava_mirror::error::AppError;
use strava_mirror::services::ResampleError;

#[test]
fn test_is_strava_token_error_matches() {
    let err = AppError::StravaApi("Token expired".to_string());
    assert!(err.is_strava_token_error());

    let err = AppError::StravaApi("Invalid access token".to_string());
    assert!(err.is_strava_token_error());

    let err = AppError::StravaApi(AppError::STRAVA_TOKEN_ERROR.to_string());
    assert!(err.is_strava_token_error());
}

#[test]
fn test_is_strava_token_error_no_match() {
    let err = AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string());
    assert!(!err.is_strava_token_error());

    let err = AppError::StravaApi("HTTP 500 Internal Server Error".to_string());
    assert!(!err.is_strava_token_error());

    let err = AppError::MissingId("activity");
    assert!(!err.is_strava_token_error());
}

#[test]
fn test_is_rate_limited() {
    assert!(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()).is_rate_limited());
    assert!(!AppError::StravaApi("HTTP 503".to_string()).is_rate_limited());
}

#[test]
fn test_error_messages() {
    assert_eq!(
        AppError::MissingId("effort segment").to_string(),
        "Remote effort segment record is missing its id"
    );
    let err: AppError = ResampleError::EmptyAxis.into();
    assert_eq!(err.to_string(), "Resample error: Axis stream is empty");
}
