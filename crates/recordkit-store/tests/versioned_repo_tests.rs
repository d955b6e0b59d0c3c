// Integration tests for versioned identity
// Every update appends a new row; exactly one row per logical id is current.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{policy_repo, policy_statements, setup_db, Policy, TestDb};
use proptest::prelude::*;
use recordkit_core::{ExErrorKind, Repository, ResultStatus, StatementSet};
use recordkit_store::SqliteRepository;

fn created_policy(db: &TestDb) -> Policy {
    policy_repo(db)
        .create(&Policy::for_holder("Ada", 100.0))
        .unwrap()
        .into_entity()
        .unwrap()
}

fn current_rows(db: &TestDb, guid: &str) -> i64 {
    db.count(&format!(
        "SELECT COUNT(*) FROM Policy WHERE PolicyGuid = '{}' AND IsCurrent = 1",
        guid
    ))
}

fn all_rows(db: &TestDb, guid: &str) -> i64 {
    db.count(&format!(
        "SELECT COUNT(*) FROM Policy WHERE PolicyGuid = '{}'",
        guid
    ))
}

#[test]
fn test_create_starts_version_chain() {
    let db = setup_db();

    let created = created_policy(&db);

    assert!(created.policy_id.unwrap() > 0);
    assert!(!created.policy_guid.is_empty());
    assert_eq!(created.record_version, 1.0);
    assert!(created.is_current);
    assert_eq!(all_rows(&db, &created.policy_guid), 1);
}

#[test]
fn test_update_appends_next_version() {
    // Given: A freshly created policy at version 1
    let db = setup_db();
    let repo = policy_repo(&db);
    let v1 = created_policy(&db);

    // When: The premium changes
    let result = repo
        .update(&Policy {
            premium: 120.0,
            ..v1.clone()
        })
        .unwrap();

    // Then: Version 2 is current and version 1 is superseded
    assert_eq!(result.status, ResultStatus::Success);
    let v2 = result.entity.unwrap();
    assert_eq!(v2.record_version, 2.0);
    assert!(v2.is_current);
    assert_eq!(v2.premium, 120.0);
    assert_eq!(v2.policy_guid, v1.policy_guid);
    assert_ne!(v2.policy_id, v1.policy_id);

    let old = repo.fetch(&v1).unwrap().into_entity().unwrap();
    assert!(!old.is_current);
    assert_eq!(old.premium, 100.0);
    assert_eq!(current_rows(&db, &v1.policy_guid), 1);
    assert_eq!(all_rows(&db, &v1.policy_guid), 2);
}

#[test]
fn test_stale_second_caller_rejected() {
    // Given: Two callers both read version 1
    let db = setup_db();
    let repo = policy_repo(&db);
    let v1 = created_policy(&db);
    let first = Policy {
        holder: "First".into(),
        ..v1.clone()
    };
    let second = Policy {
        holder: "Second".into(),
        ..v1.clone()
    };

    // When: The first caller updates, then the second tries with its stale copy
    assert!(repo.update(&first).unwrap().is_success());
    let result = repo.update(&second).unwrap();

    // Then: The second update is rejected and nothing else changed
    assert!(result.is_error());
    assert_eq!(result.fault_kind(), Some(ExErrorKind::StaleVersion));
    assert!(result.message.contains("not current"));
    assert_eq!(all_rows(&db, &v1.policy_guid), 2);
    assert_eq!(current_rows(&db, &v1.policy_guid), 1);
    assert_eq!(
        db.count("SELECT COUNT(*) FROM Policy WHERE Holder = 'Second'"),
        0
    );
}

#[test]
fn test_update_of_unknown_record_not_found() {
    let db = setup_db();
    let repo = policy_repo(&db);

    let result = repo
        .update(&Policy {
            policy_guid: "no-such-guid".into(),
            record_version: 1.0,
            is_current: true,
            ..Policy::for_holder("Nobody", 1.0)
        })
        .unwrap();

    assert_eq!(result.fault_kind(), Some(ExErrorKind::NotFound));
    assert!(result.message.contains("record not found"));
    assert_eq!(db.count("SELECT COUNT(*) FROM Policy"), 0);
}

#[test]
fn test_update_affecting_nothing_rolls_back() {
    let db = setup_db();
    let v1 = created_policy(&db);
    let statements = StatementSet::builder()
        .create(policy_statements().create_statement())
        .fetch(policy_statements().fetch_statement())
        .update("UPDATE Policy SET Holder = $Holder WHERE 1 = 0")
        .delete(policy_statements().delete_statement())
        .find(policy_statements().find_statement())
        .build()
        .unwrap();
    let repo = SqliteRepository::<Policy, _>::new(&db.provider, statements);

    let result = repo.update(&v1).unwrap();

    assert_eq!(result.fault_kind(), Some(ExErrorKind::NoRowsAffected));
    assert!(result.message.contains("update failed"));
    assert_eq!(all_rows(&db, &v1.policy_guid), 1);
}

#[test]
fn test_missing_next_version_reported() {
    // Given: An update statement that retires the row without appending one
    let db = setup_db();
    let v1 = created_policy(&db);
    let statements = StatementSet::builder()
        .create(policy_statements().create_statement())
        .fetch(policy_statements().fetch_statement())
        .update(
            "UPDATE Policy SET IsCurrent = 0 \
             WHERE PolicyGuid = $PolicyGuid AND PolicyRecordVersion = $PolicyRecordVersion",
        )
        .delete(policy_statements().delete_statement())
        .find(policy_statements().find_statement())
        .build()
        .unwrap();
    let repo = SqliteRepository::<Policy, _>::new(&db.provider, statements);

    // When / Then: The engine cannot find version 2
    let result = repo.update(&v1).unwrap();
    assert!(result.is_error());
    assert_eq!(result.fault_kind(), Some(ExErrorKind::NotFound));
    assert!(result.message.contains("unable to find new record version"));
    assert_eq!(result.entity.unwrap().record_version, 2.0);
}

#[test]
fn test_concurrent_updates_from_same_version() {
    // Given: Two threads holding the same version
    let db = setup_db();
    let v1 = created_policy(&db);

    // When: Both update at once
    let outcomes: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["Left", "Right"]
            .into_iter()
            .map(|holder| {
                let entity = Policy {
                    holder: holder.to_string(),
                    ..v1.clone()
                };
                let db = &db;
                scope.spawn(move || policy_repo(db).update(&entity).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Then: Exactly one wins, the other sees a stale version
    let wins = outcomes.iter().filter(|r| r.is_success()).count();
    let stale = outcomes
        .iter()
        .filter(|r| r.fault_kind() == Some(ExErrorKind::StaleVersion))
        .count();
    assert_eq!((wins, stale), (1, 1));
    assert_eq!(current_rows(&db, &v1.policy_guid), 1);
    assert_eq!(all_rows(&db, &v1.policy_guid), 2);
}

#[test]
fn test_delete_removes_single_version_row() {
    let db = setup_db();
    let repo = policy_repo(&db);
    let v1 = created_policy(&db);
    let v2 = repo.update(&v1).unwrap().into_entity().unwrap();

    assert!(repo.delete(&v1).unwrap().is_success());

    assert_eq!(all_rows(&db, &v1.policy_guid), 1);
    assert!(repo.fetch(&v2).unwrap().is_success());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_n_updates_leave_one_current_row(n in 1usize..6) {
        let db = setup_db();
        let repo = policy_repo(&db);
        let mut latest = created_policy(&db);

        for step in 0..n {
            latest.premium += 10.0 * (step as f64 + 1.0);
            latest = repo.update(&latest).unwrap().into_entity().unwrap();
        }

        prop_assert_eq!(latest.record_version, n as f64 + 1.0);
        prop_assert!(latest.is_current);
        prop_assert_eq!(current_rows(&db, &latest.policy_guid), 1);
        prop_assert_eq!(
            db.count(&format!(
                "SELECT COUNT(*) FROM Policy WHERE PolicyGuid = '{}' AND IsCurrent = 0",
                latest.policy_guid
            )),
            n as i64
        );
    }
}
