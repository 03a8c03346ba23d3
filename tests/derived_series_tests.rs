// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stream store and derived-series tests.

use strava_mirror::db::EntityStore;
use strava_mirror::error::AppError;
use strava_mirror::models::{StreamOwner, StreamType};

mod common;
use common::{detailed_activity, effort, stream};

const EFFORT: StreamOwner = StreamOwner::Effort(100);

fn store_with_effort() -> EntityStore {
    let mut store = EntityStore::new();
    store
        .upsert_activity(&detailed_activity(1, vec![effort(100, 1, 500)]))
        .unwrap();
    store
}

fn values(store: &EntityStore, stream_type: StreamType) -> Vec<f64> {
    store
        .stream(EFFORT, stream_type)
        .unwrap_or_else(|| panic!("{} stream missing", stream_type))
        .values
        .clone()
}

#[test]
fn test_cumulative_power_from_watts_and_time() {
    let mut store = store_with_effort();
    store
        .ingest_streams(
            EFFORT,
            &[
                stream("watts", &[100.0, 200.0, 150.0]),
                stream("time", &[0.0, 1.0, 3.0]),
            ],
        )
        .unwrap();

    assert_eq!(values(&store, StreamType::CumulativePower), vec![0.0, 200.0, 500.0]);
}

#[test]
fn test_gear_ratio_from_speed_and_cadence() {
    let mut store = store_with_effort();
    store
        .ingest_streams(
            EFFORT,
            &[
                stream("velocity_smooth", &[2.0, 4.0]),
                stream("cadence", &[0.0, 2.0]),
            ],
        )
        .unwrap();

    assert_eq!(values(&store, StreamType::GearRatio), vec![0.0, 2.0]);
}

#[test]
fn test_cumulative_heartrate_minutes() {
    let mut store = store_with_effort();
    store
        .ingest_streams(
            EFFORT,
            &[
                stream("heartrate", &[120.0, 180.0, 60.0]),
                stream("time", &[0.0, 60.0, 120.0]),
            ],
        )
        .unwrap();

    assert_eq!(
        values(&store, StreamType::CumulativeHeartrate),
        vec![0.0, 180.0, 240.0]
    );
}

#[test]
fn test_missing_prerequisites_skip_derivation() {
    let mut store = store_with_effort();
    let stored = store
        .ingest_streams(
            EFFORT,
            &[
                stream("watts", &[100.0, 200.0]),
                stream("velocity_smooth", &[5.0, 6.0]),
            ],
        )
        .unwrap();

    assert_eq!(stored, 2);
    assert!(store.stream(EFFORT, StreamType::CumulativePower).is_none());
    assert!(store.stream(EFFORT, StreamType::GearRatio).is_none());
    assert!(store.stream(EFFORT, StreamType::CumulativeHeartrate).is_none());
}

#[test]
fn test_length_mismatch_skips_derivation() {
    let mut store = store_with_effort();
    store
        .ingest_streams(
            EFFORT,
            &[
                stream("watts", &[100.0, 200.0, 300.0]),
                stream("time", &[0.0, 1.0]),
            ],
        )
        .unwrap();

    assert!(store.stream(EFFORT, StreamType::CumulativePower).is_none());
}

#[test]
fn test_reingest_replaces_streams_and_derived() {
    let mut store = store_with_effort();
    store
        .ingest_streams(
            EFFORT,
            &[stream("watts", &[100.0, 100.0]), stream("time", &[0.0, 1.0])],
        )
        .unwrap();
    store
        .ingest_streams(
            EFFORT,
            &[stream("watts", &[300.0, 300.0]), stream("time", &[0.0, 2.0])],
        )
        .unwrap();

    assert_eq!(values(&store, StreamType::Watts), vec![300.0, 300.0]);
    assert_eq!(values(&store, StreamType::CumulativePower), vec![0.0, 600.0]);

    let types: Vec<StreamType> = store.streams(EFFORT).iter().map(|s| s.stream_type).collect();
    assert_eq!(
        types,
        vec![StreamType::Watts, StreamType::Time, StreamType::CumulativePower]
    );
}

#[test]
fn test_unsupported_streams_are_skipped() {
    let mut store = store_with_effort();
    let mut latlng = stream("latlng", &[]);
    latlng.data = vec![serde_json::json!([37.0, -122.0])];

    let stored = store
        .ingest_streams(
            EFFORT,
            &[latlng, stream("grade_smooth", &[1.0]), stream("distance", &[0.0])],
        )
        .unwrap();

    assert_eq!(stored, 1);
    assert_eq!(store.streams(EFFORT).len(), 1);
}

#[test]
fn test_remote_derived_type_is_not_trusted() {
    let mut store = store_with_effort();
    let stored = store
        .ingest_streams(EFFORT, &[stream("gear_ratio", &[9.0])])
        .unwrap();

    assert_eq!(stored, 0);
    assert!(store.stream(EFFORT, StreamType::GearRatio).is_none());
}

#[test]
fn test_upsert_stream_metadata() {
    let mut store = store_with_effort();
    let owner = StreamOwner::Activity(1);

    store
        .upsert_stream(owner, StreamType::Altitude, "distance", 5000, vec![10.0, 11.0])
        .unwrap();
    let stream = store
        .upsert_stream(owner, StreamType::Altitude, "time", 6000, vec![12.0])
        .unwrap();

    assert_eq!(stream.series_type, "time");
    assert_eq!(stream.original_size, 6000);
    assert_eq!(stream.values, vec![12.0]);
    assert_eq!(store.streams(owner).len(), 1);
}

#[test]
fn test_stream_for_unknown_owner() {
    let mut store = EntityStore::new();
    let err = store
        .upsert_stream(StreamOwner::Segment(9), StreamType::Distance, "distance", 1, vec![0.0])
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
