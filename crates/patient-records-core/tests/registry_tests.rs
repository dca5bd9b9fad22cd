//! Registry behavior over each storage backend.

use std::sync::Arc;

use patient_records_core::registry::{PATIENTS_FILE, USERS_FILE};
use patient_records_core::store::load_or_empty;
use patient_records_core::{
    Document, DocumentStore, ErrorKind, JsonFileStore, MemoryStore, PatientRegistry,
};
use serde_json::{json, Value};
use tempfile::TempDir;

fn patient(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Ravi Kumar",
        "city": "Delhi",
        "age": 30,
        "gender": "male",
        "height": 1.75,
        "weight": 70.0
    })
}

fn signup_form(email: &str) -> Value {
    json!({
        "name": "Sara Ali",
        "email": email,
        "password": "s3cretpw",
        "city": "Karachi",
        "age": 27,
        "gender": "female",
        "height": 1.62,
        "weight": 55
    })
}

fn shared_registry() -> (Arc<MemoryStore>, Arc<MemoryStore>, PatientRegistry) {
    let patients = Arc::new(MemoryStore::new("patients"));
    let users = Arc::new(MemoryStore::new("users"));
    let registry = PatientRegistry::new(patients.clone(), users.clone());
    (patients, users, registry)
}

// =============================================================================
// Create / read
// =============================================================================

#[test]
fn test_create_returns_derived_attributes() {
    let registry = PatientRegistry::in_memory();
    let view = registry.create(&patient("P001")).unwrap();

    assert_eq!(view.derived.bmi, 22.86);
    let value = serde_json::to_value(&view).unwrap();
    assert_eq!(value["verdict"], "Normal");
    assert_eq!(value["city_tier"], 1);
    assert_eq!(value["id"], "P001");
}

#[test]
fn test_duplicate_create_leaves_storage_unchanged() {
    let (patients, _users, registry) = shared_registry();
    registry.create(&patient("P001")).unwrap();
    let before = patients.snapshot().unwrap();

    let mut second = patient("P001");
    second["name"] = json!("Somebody Else");
    let err = registry.create(&second).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(patients.snapshot().unwrap(), before);
}

#[test]
fn test_invalid_create_collects_issues() {
    let registry = PatientRegistry::in_memory();
    let err = registry
        .create(&json!({"id": "P001", "name": "", "age": 150, "height": -1}))
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    let fields: Vec<_> = err.issues().iter().map(|i| i.field.as_str()).collect();
    for expected in ["name", "age", "height", "city", "gender", "weight"] {
        assert!(fields.contains(&expected), "missing issue for {expected}: {fields:?}");
    }
    assert!(registry.list().unwrap().is_empty());
}

#[test]
fn test_senior_without_emergency_contact_is_rejected() {
    let registry = PatientRegistry::in_memory();
    let mut raw = patient("P001");
    raw["age"] = json!(65);

    let err = registry.create(&raw).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);
    assert_eq!(err.rule(), Some("emergency_contact_required"));

    raw["contact_detail"] = json!({"emergency": "+92-300-0000000"});
    registry.create(&raw).unwrap();
}

#[test]
fn test_persisted_derived_fields_are_ignored() {
    let mut doc = Document::new();
    doc.insert(
        "P001".into(),
        json!({
            "name": "Legacy",
            "city": "Pune",
            "age": 40,
            "gender": "other",
            "height": 1.75,
            "weight": 70,
            "bmi": 99.0,
            "verdict": "Obese"
        }),
    );
    let registry =
        PatientRegistry::new(MemoryStore::with_document("patients", doc), MemoryStore::new("users"));

    let view = registry.get("P001").unwrap();
    assert_eq!(view.derived.bmi, 22.86);
    assert_eq!(serde_json::to_value(&view).unwrap()["verdict"], "Normal");
}

#[test]
fn test_senior_record_without_emergency_contact_stays_readable() {
    let mut doc = Document::new();
    doc.insert(
        "P001".into(),
        json!({
            "name": "Old Record",
            "city": "Delhi",
            "age": 70,
            "gender": "male",
            "height": 1.7,
            "weight": 70.0
        }),
    );
    let registry =
        PatientRegistry::new(MemoryStore::with_document("patients", doc), MemoryStore::new("users"));

    assert_eq!(registry.get("P001").unwrap().patient.age, 70);
    assert_eq!(registry.list().unwrap().len(), 1);
    assert_eq!(registry.sorted("weight", "asc").unwrap().len(), 1);

    // Any other edit still has to satisfy the rule on the merged record.
    let err = registry.update("P001", &json!({"weight": 72})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);

    let repaired = registry
        .update(
            "P001",
            &json!({"contact_detail": {"emergency": "+91-98100-00000"}}),
        )
        .unwrap();
    assert!(repaired.patient.has_emergency_contact());
    assert!(registry.get("P001").unwrap().patient.has_emergency_contact());
}

// =============================================================================
// Update
// =============================================================================

#[test]
fn test_update_recomputes_derived() {
    let registry = PatientRegistry::in_memory();
    registry.create(&patient("P001")).unwrap();

    let view = registry.update("P001", &json!({"weight": 80})).unwrap();
    assert_eq!(view.patient.weight, 80.0);
    assert_eq!(view.derived.bmi, 26.12);
    assert_eq!(view.patient.name, "Ravi Kumar");
    assert_eq!(registry.get("P001").unwrap(), view);
}

#[test]
fn test_update_cannot_change_identifier() {
    let registry = PatientRegistry::in_memory();
    registry.create(&patient("P001")).unwrap();

    let view = registry
        .update("P001", &json!({"id": "P999", "city": "Mumbai"}))
        .unwrap();
    assert_eq!(view.patient.id, "P001");
    assert_eq!(registry.get("P999").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_failed_update_leaves_storage_unchanged() {
    let (patients, _users, registry) = shared_registry();
    registry.create(&patient("P001")).unwrap();
    let before = patients.snapshot().unwrap();

    let err = registry.update("P001", &json!({"age": 65})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BusinessRule);
    assert_eq!(patients.snapshot().unwrap(), before);

    let err = registry.update("P001", &json!({"height": 0})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(patients.snapshot().unwrap(), before);
}

#[test]
fn test_update_unknown_patient() {
    let registry = PatientRegistry::in_memory();
    let err = registry.update("P404", &json!({"weight": 60})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_update_fails_when_store_unreadable() {
    let (patients, _users, registry) = shared_registry();
    registry.create(&patient("P001")).unwrap();
    patients.fail_loads(true);

    let err = registry.update("P001", &json!({"weight": 60})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert!(registry.list().unwrap().is_empty());
}

// =============================================================================
// Delete
// =============================================================================

#[test]
fn test_delete() {
    let registry = PatientRegistry::in_memory();
    registry.create(&patient("P001")).unwrap();
    registry.create(&patient("P002")).unwrap();

    registry.delete("P001").unwrap();
    let ids: Vec<_> = registry
        .list()
        .unwrap()
        .into_iter()
        .map(|v| v.patient.id)
        .collect();
    assert_eq!(ids, vec!["P002"]);

    assert_eq!(registry.delete("P001").unwrap_err().kind(), ErrorKind::NotFound);
}

// =============================================================================
// Sorting
// =============================================================================

#[test]
fn test_sort_by_bmi() {
    let registry = PatientRegistry::in_memory();
    for (id, weight) in [("P001", 30.0), ("P002", 18.0), ("P003", 24.0)] {
        let mut raw = patient(id);
        raw["height"] = json!(1.0);
        raw["weight"] = json!(weight);
        registry.create(&raw).unwrap();
    }

    let ids = |views: Vec<patient_records_core::PatientView>| -> Vec<String> {
        views.into_iter().map(|v| v.patient.id).collect()
    };
    assert_eq!(
        ids(registry.sorted("bmi", "asc").unwrap()),
        vec!["P002", "P003", "P001"]
    );
    assert_eq!(
        ids(registry.sorted("bmi", "desc").unwrap()),
        vec!["P001", "P003", "P002"]
    );
}

#[test]
fn test_sort_rejects_unknown_field_and_order() {
    let registry = PatientRegistry::in_memory();
    assert_eq!(
        registry.sorted("age", "asc").unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        registry.sorted("height", "sideways").unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
}

// =============================================================================
// Signup / login
// =============================================================================

#[test]
fn test_signup_allocates_next_identifier() {
    let registry = PatientRegistry::in_memory();
    registry.create(&patient("P001")).unwrap();
    registry.create(&patient("P007")).unwrap();
    registry.create(&patient("X099")).unwrap();

    let outcome = registry.signup(&signup_form("sara@example.com")).unwrap();
    assert_eq!(outcome.patient_id, "P008");
    assert_eq!(outcome.patient.patient.email.as_deref(), Some("sara@example.com"));
    assert_eq!(registry.get("P008").unwrap().patient.name, "Sara Ali");
}

#[test]
fn test_signup_then_login() {
    let (_patients, users, registry) = shared_registry();
    let outcome = registry.signup(&signup_form("  Sara@Example.com ")).unwrap();

    let stored = users.snapshot().unwrap();
    let credential = &stored[&outcome.patient_id];
    assert_eq!(credential["email"], "sara@example.com");
    assert_ne!(credential["secret_hash"], "s3cretpw");

    let login = registry
        .login(&json!({"email": "SARA@example.com", "password": "s3cretpw"}))
        .unwrap();
    assert_eq!(login.patient_id, outcome.patient_id);
    assert_eq!(login.name, "Sara Ali");
}

#[test]
fn test_update_does_not_change_login_email() {
    let (patients, users, registry) = shared_registry();
    let outcome = registry.signup(&signup_form("sara@example.com")).unwrap();
    let id = outcome.patient_id;

    let view = registry
        .update(&id, &json!({"email": "other@example.com", "city": "Lahore"}))
        .unwrap();
    assert_eq!(view.patient.city, "Lahore");
    assert_eq!(view.patient.email.as_deref(), Some("sara@example.com"));
    assert_eq!(patients.snapshot().unwrap()[&id]["email"], "sara@example.com");
    assert_eq!(users.snapshot().unwrap()[&id]["email"], "sara@example.com");

    let login = registry
        .login(&json!({"email": "sara@example.com", "password": "s3cretpw"}))
        .unwrap();
    assert_eq!(login.patient_id, id);
}

#[test]
fn test_login_failures_are_indistinguishable() {
    let registry = PatientRegistry::in_memory();
    registry.signup(&signup_form("sara@example.com")).unwrap();

    let wrong_password = registry
        .login(&json!({"email": "sara@example.com", "password": "nottheone"}))
        .unwrap_err();
    let unknown_email = registry
        .login(&json!({"email": "nobody@example.com", "password": "s3cretpw"}))
        .unwrap_err();

    assert_eq!(wrong_password.kind(), ErrorKind::Unauthorized);
    assert_eq!(unknown_email.kind(), ErrorKind::Unauthorized);
    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
}

#[test]
fn test_duplicate_email_rejected() {
    let registry = PatientRegistry::in_memory();
    registry.signup(&signup_form("sara@example.com")).unwrap();

    let err = registry.signup(&signup_form("SARA@example.com")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(registry.list().unwrap().len(), 1);
}

#[test]
fn test_signup_validation() {
    let registry = PatientRegistry::in_memory();
    let mut form = signup_form("not-an-email");
    form["password"] = json!("short");

    let err = registry.signup(&form).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let fields: Vec<_> = err.issues().iter().map(|i| i.field.as_str()).collect();
    assert!(fields.contains(&"email"));
    assert!(fields.contains(&"password"));
}

#[test]
fn test_signup_rolls_back_when_credential_save_fails() {
    let (patients, users, registry) = shared_registry();
    registry.create(&patient("P001")).unwrap();
    let before = patients.snapshot().unwrap();

    users.fail_saves(true);
    let err = registry.signup(&signup_form("sara@example.com")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Storage);
    assert_eq!(patients.snapshot().unwrap(), before);
    assert!(users.snapshot().unwrap().is_empty());

    users.fail_saves(false);
    let outcome = registry.signup(&signup_form("sara@example.com")).unwrap();
    assert_eq!(outcome.patient_id, "P002");
}

// =============================================================================
// Backends
// =============================================================================

#[test]
fn test_json_dir_backend_persists_across_instances() {
    let dir = TempDir::new().unwrap();
    {
        let registry = PatientRegistry::open_json_dir(dir.path());
        registry.create(&patient("P001")).unwrap();
        registry.signup(&signup_form("sara@example.com")).unwrap();
    }

    let patients = JsonFileStore::new(dir.path().join(PATIENTS_FILE));
    let stored = load_or_empty(&patients);
    assert!(stored["P001"].get("id").is_none());
    assert!(stored["P001"].get("bmi").is_none());
    assert!(dir.path().join(USERS_FILE).exists());

    let reopened = PatientRegistry::open_json_dir(dir.path());
    assert_eq!(reopened.list().unwrap().len(), 2);
    reopened
        .login(&json!({"email": "sara@example.com", "password": "s3cretpw"}))
        .unwrap();
}

#[test]
fn test_json_dir_unreadable_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(PATIENTS_FILE), "not json").unwrap();

    let registry = PatientRegistry::open_json_dir(dir.path());
    assert!(registry.list().unwrap().is_empty());
    assert_eq!(
        registry.create(&patient("P001")).unwrap_err().kind(),
        ErrorKind::Storage
    );
}

#[test]
fn test_sqlite_backend() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.db");
    {
        let registry = PatientRegistry::open_sqlite(&path).unwrap();
        registry.create(&patient("P001")).unwrap();
        registry.signup(&signup_form("sara@example.com")).unwrap();
        registry.update("P001", &json!({"city": "Mumbai"})).unwrap();
    }

    let reopened = PatientRegistry::open_sqlite(&path).unwrap();
    assert_eq!(reopened.get("P001").unwrap().patient.city, "Mumbai");
    assert_eq!(reopened.list().unwrap().len(), 2);
    reopened
        .login(&json!({"email": "sara@example.com", "password": "s3cretpw"}))
        .unwrap();
}

#[test]
fn test_concurrent_signups_get_distinct_identifiers() {
    let registry = Arc::new(PatientRegistry::in_memory());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                registry
                    .signup(&signup_form(&format!("user{i}@example.com")))
                    .unwrap()
                    .patient_id
            })
        })
        .collect();

    let mut ids: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    assert_eq!(registry.list().unwrap().len(), 8);
}

#[test]
fn test_store_trait_object_is_usable() {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new("patients"));
    let registry = PatientRegistry::new(store.clone(), MemoryStore::new("users"));
    registry.create(&patient("P001")).unwrap();
    assert_eq!(store.load().unwrap().len(), 1);
}
