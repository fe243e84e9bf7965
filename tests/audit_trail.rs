//! End-to-end tests for audited commits
//!
//! Every test drives a real JSON store in a temp directory through the
//! commit hook and checks what ended up on disk.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tempfile::TempDir;
use uuid::Uuid;

use change_audit::audit::{
    Action, AnonymousActor, CapabilityRegistry, CommitHook, Entity, EntityDescriptor, FieldDef,
    FieldSnapshot, FixedActor, FixedClock, SensitivityPolicy, UnitOfWork, ANONYMOUS_ACTOR,
};
use change_audit::config::Settings;
use change_audit::models::{default_registry, Book, Car, Money};
use change_audit::services::{AuditLogService, BookService, BookUpdate, CarService};
use change_audit::storage::Store;
use change_audit::AuditError;

fn temp_store() -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::at(temp_dir.path().join("store.json"));
    (temp_dir, store)
}

fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap())
}

/// Auditable type flagged sensitive as a whole
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Patient {
    id: Uuid,
    name: String,
    ward: String,
}

const PATIENT_FIELDS: &[FieldDef] = &[
    FieldDef::plain("ID"),
    FieldDef::plain("Name"),
    FieldDef::plain("Ward"),
];

impl Entity for Patient {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor::new("Patient", "Patients")
        .auditable()
        .type_sensitive()
        .id_field("ID")
        .fields(PATIENT_FIELDS);

    fn key(&self) -> Uuid {
        self.id
    }

    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::new()
            .with("ID", self.id)
            .with("Name", self.name.as_str())
            .with("Ward", self.ward.as_str())
    }
}

/// Auditable type with a float that may not be encodable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Reading {
    id: Uuid,
    value: f64,
}

const READING_FIELDS: &[FieldDef] = &[FieldDef::plain("ID"), FieldDef::plain("Value")];

impl Entity for Reading {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor::new("Reading", "Readings")
        .auditable()
        .id_field("ID")
        .fields(READING_FIELDS);

    fn key(&self) -> Uuid {
        self.id
    }

    fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::new()
            .with("ID", self.id)
            .with("Value", self.value)
    }
}

fn registry_with(policy: SensitivityPolicy) -> CapabilityRegistry {
    CapabilityRegistry::builder(policy)
        .register::<Book>()
        .register::<Car>()
        .register::<Patient>()
        .register::<Reading>()
        .build()
        .unwrap()
}

#[test]
fn test_sensitive_price_change_is_masked() {
    let (_dir, store) = temp_store();
    let registry = default_registry(&Settings::default()).unwrap();
    let actor = FixedActor::new("alice");
    let clock = fixed_clock();
    let hook = CommitHook::new(&registry, &actor, &clock);
    let service = BookService::new(&store, &hook);

    let mut book = Book::new("Dune");
    book.price = Money::from_cents(1000);
    let book = service.create(book).unwrap();

    let update = BookUpdate {
        price: Some(Money::from_cents(1200)),
        ..Default::default()
    };
    service.update(book.id, update).unwrap();

    let log = store.audit_log().unwrap();
    assert_eq!(log.len(), 2);

    let modified = &log[1];
    assert_eq!(modified.action, Action::Modified);
    assert_eq!(modified.entity_name, "Book");
    assert_eq!(modified.entity_id, book.key());
    assert_eq!(modified.changed_by, "alice");
    assert_eq!(
        modified.details,
        r#"[{"Price":{"old_value":"****","new_value":"****"}}]"#
    );
    assert!(!modified.details.contains("10.00"));
    assert!(!modified.details.contains("12.00"));
}

#[test]
fn test_car_mutations_are_never_audited() {
    let (_dir, store) = temp_store();
    let clock = fixed_clock();

    for policy in [
        SensitivityPolicy::PerFieldMasking,
        SensitivityPolicy::EntireTypeExclusion,
    ] {
        let registry = registry_with(policy);
        let hook = CommitHook::new(&registry, &AnonymousActor, &clock);
        let service = CarService::new(&store, &hook);

        let car = service.create(Car::new("Volvo", "240")).unwrap();
        service.delete(car.id).unwrap();
    }

    assert!(store.audit_log().unwrap().is_empty());
    assert_eq!(store.load().unwrap().version, 4);
}

#[test]
fn test_creation_records_only_non_default_fields() {
    let (_dir, store) = temp_store();
    let registry = registry_with(SensitivityPolicy::PerFieldMasking);
    let clock = fixed_clock();
    let hook = CommitHook::new(&registry, &AnonymousActor, &clock);

    let book = BookService::new(&store, &hook)
        .create(Book::new("Dune"))
        .unwrap();

    let log = store.audit_log().unwrap();
    assert_eq!(log.len(), 1);
    let entry = &log[0];
    assert_eq!(entry.action, Action::Created);
    assert_eq!(entry.entity_id, book.key());
    assert_eq!(entry.changed_by, ANONYMOUS_ACTOR);
    assert_eq!(entry.change_date, clock.0);

    let changes = entry.changes().unwrap();
    assert_eq!(changes.field_names(), vec!["Title"]);
    let title = changes.get("Title").unwrap();
    assert_eq!(title.old_value, json!(""));
    assert_eq!(title.new_value, json!("Dune"));
}

#[test]
fn test_deletion_is_recorded_with_empty_details() {
    let (_dir, store) = temp_store();
    let registry = registry_with(SensitivityPolicy::PerFieldMasking);
    let clock = fixed_clock();
    let hook = CommitHook::new(&registry, &AnonymousActor, &clock);
    let service = BookService::new(&store, &hook);

    let book = service.create(Book::new("Dune")).unwrap();
    service.delete(book.id).unwrap();

    let log = store.audit_log().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].action, Action::Deleted);
    assert_eq!(log[1].entity_id, book.key());
    assert_eq!(log[1].details, "[]");
    assert!(store.get::<Book>(book.key()).unwrap().is_none());
}

#[test]
fn test_one_actor_and_timestamp_per_commit() {
    let (_dir, store) = temp_store();
    let registry = registry_with(SensitivityPolicy::PerFieldMasking);
    let actor = FixedActor::new("bob");
    let clock = fixed_clock();
    let hook = CommitHook::new(&registry, &actor, &clock);

    let mut session = store.begin().unwrap();
    session.add(&Book::new("Dune")).unwrap();
    session.add(&Book::new("Emma")).unwrap();
    session.add(&Car::new("Saab", "900")).unwrap();
    let summary = hook.commit(session).unwrap();

    assert_eq!(summary.created, 3);
    assert_eq!(summary.audit_entries, 2);

    let log = store.audit_log().unwrap();
    assert_eq!(log.len(), 2);
    assert!(log.iter().all(|e| e.changed_by == "bob"));
    assert!(log.iter().all(|e| e.change_date == clock.0));
    assert_ne!(log[0].id, log[1].id);
    assert_eq!(store.list::<Car>().unwrap().len(), 1);
}

#[test]
fn test_type_sensitive_entity_under_each_policy() {
    let clock = fixed_clock();
    let patient = Patient {
        id: Uuid::new_v4(),
        name: "Ada".into(),
        ward: "East".into(),
    };

    // Masking: audited, every changed value redacted
    let (_dir, store) = temp_store();
    let registry = registry_with(SensitivityPolicy::PerFieldMasking);
    let hook = CommitHook::new(&registry, &AnonymousActor, &clock);
    let mut session = store.begin().unwrap();
    session.add(&patient).unwrap();
    hook.commit(session).unwrap();

    let log = store.audit_log().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(
        log[0].details,
        r#"[{"Name":{"old_value":"****","new_value":"****"}},{"Ward":{"old_value":"****","new_value":"****"}}]"#
    );

    // Exclusion: the mutation is written, no entry is
    let (_dir, store) = temp_store();
    let registry = registry_with(SensitivityPolicy::EntireTypeExclusion);
    let hook = CommitHook::new(&registry, &AnonymousActor, &clock);
    let mut session = store.begin().unwrap();
    session.add(&patient).unwrap();
    let summary = hook.commit(session).unwrap();

    assert_eq!(summary.created, 1);
    assert!(store.audit_log().unwrap().is_empty());
    assert!(store.get::<Patient>(patient.id).unwrap().is_some());
}

#[test]
fn test_conflicting_commit_writes_nothing() {
    let (_dir, store) = temp_store();
    let registry = registry_with(SensitivityPolicy::PerFieldMasking);
    let clock = fixed_clock();
    let hook = CommitHook::new(&registry, &AnonymousActor, &clock);

    let mut first = store.begin().unwrap();
    let mut second = store.begin().unwrap();
    first.add(&Book::new("Dune")).unwrap();
    let late = Book::new("Emma");
    second.add(&late).unwrap();

    hook.commit(first).unwrap();
    let err = hook.commit(second).unwrap_err();

    assert!(matches!(
        err,
        AuditError::Conflict {
            expected: 0,
            found: 1
        }
    ));
    assert_eq!(store.load().unwrap().version, 1);
    assert_eq!(store.audit_log().unwrap().len(), 1);
    assert!(store.get::<Book>(late.key()).unwrap().is_none());
}

#[test]
fn test_concurrent_commits_never_lose_an_accepted_write() {
    const WRITERS: usize = 4;
    const ROUNDS: usize = 10;

    let (_dir, store) = temp_store();

    let accepted: usize = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..WRITERS)
            .map(|writer| {
                let store = store.clone();
                scope.spawn(move || {
                    let registry = registry_with(SensitivityPolicy::PerFieldMasking);
                    let clock = fixed_clock();
                    let hook = CommitHook::new(&registry, &AnonymousActor, &clock);

                    let mut accepted = 0;
                    for round in 0..ROUNDS {
                        let mut session = store.begin().unwrap();
                        session
                            .add(&Book::new(format!("Book {writer}-{round}")))
                            .unwrap();
                        match hook.commit(session) {
                            Ok(_) => accepted += 1,
                            Err(AuditError::Conflict { .. }) => {}
                            Err(e) => panic!("unexpected commit failure: {e}"),
                        }
                    }
                    accepted
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).sum()
    });

    assert!(accepted > 0);
    assert_eq!(store.audit_log().unwrap().len(), accepted);
    assert_eq!(store.list::<Book>().unwrap().len(), accepted);
    assert_eq!(store.load().unwrap().version, accepted as u64);
}

#[test]
fn test_unencodable_value_aborts_the_whole_commit() {
    let (_dir, store) = temp_store();
    let registry = registry_with(SensitivityPolicy::PerFieldMasking);
    let clock = fixed_clock();
    let hook = CommitHook::new(&registry, &AnonymousActor, &clock);

    let book = Book::new("Dune");
    let reading = Reading {
        id: Uuid::new_v4(),
        value: f64::INFINITY,
    };

    let mut session = store.begin().unwrap();
    session.add(&book).unwrap();
    session.add(&reading).unwrap();
    let err = hook.commit(session).unwrap_err();

    assert!(matches!(err, AuditError::Serialization(_)));
    assert_eq!(store.load().unwrap().version, 0);
    assert!(store.audit_log().unwrap().is_empty());
    assert!(store.get::<Book>(book.key()).unwrap().is_none());
    assert!(!store.path().exists());
}

#[test]
fn test_dropped_session_is_rolled_back() {
    let (_dir, store) = temp_store();

    let mut session = store.begin().unwrap();
    session.add(&Book::new("Dune")).unwrap();
    assert!(session.has_changes());
    drop(session);

    assert_eq!(store.load().unwrap().version, 0);
    assert!(store.list::<Book>().unwrap().is_empty());
}

#[test]
fn test_empty_commit_leaves_store_untouched() {
    let (_dir, store) = temp_store();
    let registry = registry_with(SensitivityPolicy::PerFieldMasking);
    let clock = fixed_clock();
    let hook = CommitHook::new(&registry, &AnonymousActor, &clock);

    let session = store.begin().unwrap();
    assert!(session.pending_mutations().unwrap().is_empty());
    let summary = hook.commit(session).unwrap();

    assert!(summary.is_empty());
    assert_eq!(summary.audit_entries, 0);
    assert!(!store.path().exists());
}

#[test]
fn test_history_of_a_book() {
    let (_dir, store) = temp_store();
    let registry = registry_with(SensitivityPolicy::PerFieldMasking);
    let actor = FixedActor::new("carol");
    let clock = fixed_clock();
    let hook = CommitHook::new(&registry, &actor, &clock);
    let service = BookService::new(&store, &hook);

    let book = service.create(Book::new("Dune")).unwrap();
    let update = BookUpdate {
        author: Some("Frank Herbert".into()),
        pages: Some(412),
        ..Default::default()
    };
    service.update(book.id, update).unwrap();

    let history = AuditLogService::new(&store).history(book.key()).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, Action::Created);

    let changes = history[1].changes().unwrap();
    assert_eq!(changes.field_names(), vec!["Author", "Pages"]);
    assert_eq!(changes.get("Pages").unwrap().old_value, json!(0));
    assert_eq!(changes.get("Pages").unwrap().new_value, json!(412));
}
