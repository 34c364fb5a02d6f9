// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, LifecycleStatus};
use std::str::FromStr;

#[test]
fn test_started_can_finish() {
    assert!(LifecycleStatus::Started.can_transition_to(LifecycleStatus::Finished));
    assert!(
        LifecycleStatus::Started
            .validate_transition(LifecycleStatus::Finished)
            .is_ok()
    );
}

#[test]
fn test_finished_is_terminal() {
    assert!(LifecycleStatus::Finished.is_terminal());
    assert!(!LifecycleStatus::Started.is_terminal());

    let result = LifecycleStatus::Finished.validate_transition(LifecycleStatus::Started);
    match result {
        Err(DomainError::InvalidStatusTransition { from, to, reason }) => {
            assert_eq!(from, "FINISHED");
            assert_eq!(to, "STARTED");
            assert!(reason.contains("terminal"));
        }
        other => panic!("Expected InvalidStatusTransition, got {other:?}"),
    }
}

#[test]
fn test_self_transitions_are_rejected() {
    assert!(!LifecycleStatus::Started.can_transition_to(LifecycleStatus::Started));
    assert!(!LifecycleStatus::Finished.can_transition_to(LifecycleStatus::Finished));
}

#[test]
fn test_status_string_round_trip() {
    for status in [LifecycleStatus::Started, LifecycleStatus::Finished] {
        assert_eq!(LifecycleStatus::from_str(status.as_str()).unwrap(), status);
    }
    assert_eq!(
        LifecycleStatus::from_str("started"),
        Err(DomainError::InvalidStatus(String::from("started")))
    );
}
