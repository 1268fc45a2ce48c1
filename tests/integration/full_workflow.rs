//! Integration test: full end-to-end workflow.
//!
//! Tests the complete lifecycle:
//! 1. Register identities
//! 2. Delegate attributes in batches
//! 3. Authenticate against granted attributes
//! 4. Revoke attributes and verify access is denied
//! 5. Persist through a file ledger and reload

use attribute_access::{
    AccessControlService, AccessError, FileLedger, Identity, LedgerBackend, LedgerIdentityStore,
    MemoryLedger, Operation, ServiceResult, TransactionContext,
};

fn service() -> AccessControlService {
    AccessControlService::new(LedgerIdentityStore::new())
}

/// Run `f` in its own transaction and commit only if it succeeds.
fn in_tx<B, T>(
    ledger: &B,
    f: impl FnOnce(&mut dyn TransactionContext) -> ServiceResult<T>,
) -> ServiceResult<T>
where
    B: LedgerBackend,
{
    let mut tx = ledger.begin();
    let value = f(&mut tx)?;
    tx.commit().expect("commit should succeed");
    Ok(value)
}

#[test]
fn full_workflow_register_delegate_revoke() {
    let ledger = MemoryLedger::new();
    let svc = service();

    // ── Step 1: Register ───────────────────────────────────────────────
    in_tx(&ledger, |ctx| svc.register_user(ctx, "alice")).expect("register alice");
    assert_eq!(ledger.keys(), vec!["alice".to_string()]);

    // ── Step 2: Delegate ───────────────────────────────────────────────
    in_tx(&ledger, |ctx| svc.delegate_attributes(ctx, "alice", "read;write"))
        .expect("delegate read;write");

    // ── Step 3: Authenticate ───────────────────────────────────────────
    in_tx(&ledger, |ctx| svc.authenticate(ctx, "alice", "read")).expect("alice can read");

    // ── Step 4: Revoke and re-check ────────────────────────────────────
    in_tx(&ledger, |ctx| svc.revoke_attributes(ctx, "alice", "read")).expect("revoke read");

    let err = in_tx(&ledger, |ctx| svc.authenticate(ctx, "alice", "read")).unwrap_err();
    assert_eq!(err.operation, Operation::Authenticate);
    assert!(matches!(err.kind(), AccessError::AccessDenied { .. }));

    in_tx(&ledger, |ctx| svc.authenticate(ctx, "alice", "write")).expect("alice can still write");
}

#[test]
fn full_workflow_authenticate_tracks_latest_commit() {
    let ledger = MemoryLedger::new();
    let svc = service();

    let err = in_tx(&ledger, |ctx| svc.authenticate(ctx, "bob", "deploy")).unwrap_err();
    assert!(err.kind().is_not_found(), "never registered: {err}");

    in_tx(&ledger, |ctx| svc.register_user(ctx, "bob")).unwrap();
    assert!(in_tx(&ledger, |ctx| svc.authenticate(ctx, "bob", "deploy")).is_err());

    // A delegation that is never committed is invisible.
    {
        let mut tx = ledger.begin();
        svc.delegate_attributes(&mut tx, "bob", "deploy").unwrap();
    }
    assert!(in_tx(&ledger, |ctx| svc.authenticate(ctx, "bob", "deploy")).is_err());

    in_tx(&ledger, |ctx| svc.delegate_attributes(ctx, "bob", "deploy")).unwrap();
    in_tx(&ledger, |ctx| svc.authenticate(ctx, "bob", "deploy")).unwrap();
}

#[test]
fn full_workflow_failed_batch_discards_partial_grants() {
    let ledger = MemoryLedger::new();
    let svc = service();

    in_tx(&ledger, |ctx| svc.register_user(ctx, "carol")).unwrap();
    in_tx(&ledger, |ctx| svc.delegate_attributes(ctx, "carol", "write")).unwrap();
    let revision = ledger.revision();

    let err = in_tx(&ledger, |ctx| {
        svc.delegate_attributes(ctx, "carol", "read;write;admin")
    })
    .unwrap_err();
    assert!(matches!(
        err.kind(),
        AccessError::AlreadyGranted { attribute, .. } if attribute == "write"
    ));
    assert_eq!(ledger.revision(), revision, "no write may reach the ledger");

    let carol = in_tx(&ledger, |ctx| svc.inspect(ctx, "carol")).unwrap();
    assert_eq!(carol.attributes(), vec!["write".to_string()]);
}

#[test]
fn full_workflow_file_ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let svc = service();

    {
        let ledger = FileLedger::open(&path);
        in_tx(&ledger, |ctx| svc.register_user(ctx, "dave")).unwrap();
        in_tx(&ledger, |ctx| svc.delegate_attributes(ctx, "dave", "ops;audit")).unwrap();
    }

    let ledger = FileLedger::open(&path);
    in_tx(&ledger, |ctx| svc.authenticate(ctx, "dave", "ops")).unwrap();
    in_tx(&ledger, |ctx| svc.authenticate(ctx, "dave", "audit")).unwrap();
    assert_eq!(ledger.keys().unwrap(), vec!["dave".to_string()]);
    assert_eq!(ledger.revision().unwrap(), 2);
}

#[test]
fn full_workflow_record_round_trip_through_ledger() {
    let ledger = MemoryLedger::new();
    let svc = service();

    in_tx(&ledger, |ctx| svc.register_user(ctx, "erin")).unwrap();
    in_tx(&ledger, |ctx| svc.delegate_attributes(ctx, "erin", "c;a;b")).unwrap();

    let raw = ledger.committed("erin").expect("erin is stored");
    let fresh = Identity::new("placeholder");
    fresh.deserialize(&raw).unwrap();

    assert_eq!(fresh.id().as_str(), "erin");
    assert_eq!(
        fresh.attributes(),
        vec!["a".to_string(), "b".to_string(), "c".to_string()]
    );
}
