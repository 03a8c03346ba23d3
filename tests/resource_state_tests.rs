// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Resource state merge table.
//!
//! The merge is deliberately not a plain `max`: an incoming `meta` record
//! only upgrades `undefined`, and `summary` never replaces `detailed`.

use strava_mirror::models::ResourceState::{self, Detailed, Meta, Summary, Undefined};

const ALL: [ResourceState; 4] = [Undefined, Meta, Summary, Detailed];

#[test]
fn test_absent_incoming_keeps_current() {
    for current in ALL {
        assert_eq!(current.merge(None), current, "merge({:?}, None)", current);
    }
}

#[test]
fn test_incoming_meta() {
    assert_eq!(Undefined.merge(Some(Meta)), Meta);
    assert_eq!(Meta.merge(Some(Meta)), Meta);
    assert_eq!(Summary.merge(Some(Meta)), Summary);
    assert_eq!(Detailed.merge(Some(Meta)), Detailed);
}

#[test]
fn test_incoming_summary() {
    assert_eq!(Undefined.merge(Some(Summary)), Summary);
    assert_eq!(Meta.merge(Some(Summary)), Summary);
    assert_eq!(Summary.merge(Some(Summary)), Summary);
    assert_eq!(Detailed.merge(Some(Summary)), Detailed);
}

#[test]
fn test_incoming_detailed_always_wins() {
    for current in ALL {
        assert_eq!(current.merge(Some(Detailed)), Detailed);
    }
}

#[test]
fn test_incoming_undefined_is_ignored() {
    for current in ALL {
        assert_eq!(current.merge(Some(Undefined)), current);
    }
}

#[test]
fn test_merge_never_decreases() {
    for current in ALL {
        for incoming in ALL {
            assert!(
                current.merge(Some(incoming)) >= current,
                "merge({:?}, {:?}) went backwards",
                current,
                incoming
            );
        }
    }
}
