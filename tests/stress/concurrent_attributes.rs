//! Concurrency test: many threads mutating and reading one `Identity`.
//!
//! Validates that the identity's guard keeps the attribute set consistent
//! and that batch mutations are observed all-or-nothing by readers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use attribute_access::{AccessError, Identity};

#[test]
fn stress_50_threads_granting_distinct_attributes() {
    let identity = Arc::new(Identity::new("shared"));

    let mut handles = Vec::new();
    for thread_id in 0..50 {
        let identity = Arc::clone(&identity);
        handles.push(thread::spawn(move || {
            for i in 0..40 {
                identity
                    .grant_attribute(&format!("t{thread_id}-a{i}"))
                    .expect("distinct attributes never collide");
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(identity.attribute_count(), 2_000);
}

#[test]
fn stress_racing_grants_of_same_attribute_succeed_once() {
    let identity = Arc::new(Identity::new("contended"));

    let mut handles = Vec::new();
    for _ in 0..32 {
        let identity = Arc::clone(&identity);
        handles.push(thread::spawn(move || identity.grant_attribute("admin").is_ok()));
    }

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1, "exactly one grant may win");
    assert_eq!(identity.attribute_count(), 1);
}

#[test]
fn stress_readers_never_observe_partial_batches() {
    const BATCH: [&str; 4] = ["read", "write", "admin", "audit"];

    let identity = Arc::new(Identity::new("batched"));
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let identity = Arc::clone(&identity);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for _ in 0..2_000 {
                identity.grant_attributes(&BATCH).unwrap();
                identity.revoke_attributes(&BATCH).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let mut readers = Vec::new();
    for _ in 0..8 {
        let identity = Arc::clone(&identity);
        let done = Arc::clone(&done);
        readers.push(thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                let count = identity.attribute_count();
                assert!(
                    count == 0 || count == BATCH.len(),
                    "observed a partial batch of {count} attributes"
                );
            }
        }));
    }

    writer.join().unwrap();
    for r in readers {
        r.join().unwrap();
    }
    assert_eq!(identity.attribute_count(), 0);
}

#[test]
fn stress_concurrent_revokes_fail_once_absent() {
    let identity = Arc::new(Identity::new("revoked"));
    identity.grant_attribute("token").unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let identity = Arc::clone(&identity);
        handles.push(thread::spawn(move || identity.revoke_attribute("token")));
    }

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let not_granted = results
        .iter()
        .filter(|r| matches!(r, Err(AccessError::NotGranted { .. })))
        .count();

    assert_eq!(ok, 1);
    assert_eq!(not_granted, 15);
    assert!(!identity.has_attribute("token"));
}
