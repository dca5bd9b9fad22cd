//! Patient registry: the record pipeline wired to storage.
//!
//! Create:  raw → field validation → business rules → id guard → persist
//! Update:  raw payload → partial validation → merge → full revalidation → persist
//! Signup:  form → email guard → id allocation → patient pipeline → persist both documents
//!
//! Every load → mutate → persist sequence runs under one exclusive lock, so
//! identifier allocation and duplicate checks cannot race, and no update is lost.

mod guard;
mod ids;
mod reconcile;
mod secret;
mod sort;

pub use guard::*;
pub use ids::*;
pub use reconcile::*;
pub use secret::*;
pub use sort::*;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::{RecordError, RecordResult};
use crate::models::{
    normalize_email, Credential, LoginForm, Patient, PatientUpdate, PatientView, SignUpForm,
};
use crate::store::{
    load_or_empty, Document, DocumentStore, JsonFileStore, MemoryStore, SqliteStore, StoreError,
};

/// File name of the patient document in a data directory.
pub const PATIENTS_FILE: &str = "patient.json";
/// File name of the credential document in a data directory.
pub const USERS_FILE: &str = "users.json";
/// SQLite database file name in a data directory.
pub const SQLITE_FILE: &str = "records.db";

struct Stores {
    patients: Box<dyn DocumentStore>,
    credentials: Box<dyn DocumentStore>,
}

/// Result of a successful signup.
#[derive(Debug, Clone, Serialize)]
pub struct SignupOutcome {
    pub patient_id: String,
    pub patient: PatientView,
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub patient_id: String,
    pub name: String,
}

/// Thread-safe registry over the patient and credential documents.
pub struct PatientRegistry {
    stores: Mutex<Stores>,
}

impl PatientRegistry {
    pub fn new<P, C>(patients: P, credentials: C) -> Self
    where
        P: DocumentStore + 'static,
        C: DocumentStore + 'static,
    {
        Self {
            stores: Mutex::new(Stores {
                patients: Box::new(patients),
                credentials: Box::new(credentials),
            }),
        }
    }

    /// Registry backed by in-memory documents (for testing).
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new("patients"), MemoryStore::new("users"))
    }

    /// `patient.json` and `users.json` inside `dir`.
    pub fn open_json_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self::new(
            JsonFileStore::new(dir.join(PATIENTS_FILE)),
            JsonFileStore::new(dir.join(USERS_FILE)),
        )
    }

    /// Both documents in one SQLite database at `path`.
    pub fn open_sqlite<P: AsRef<Path>>(path: P) -> RecordResult<Self> {
        let patients = SqliteStore::open(path, "patients")?;
        let credentials = patients.sibling("users");
        Ok(Self::new(patients, credentials))
    }

    fn lock(&self) -> RecordResult<MutexGuard<'_, Stores>> {
        Ok(self.stores.lock()?)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All decodable records with freshly computed derived attributes, in
    /// insertion order.
    pub fn list(&self) -> RecordResult<Vec<PatientView>> {
        let stores = self.lock()?;
        let document = load_or_empty(stores.patients.as_ref());
        Ok(decode_all(stores.patients.name(), document.iter()))
    }

    /// One record by identifier.
    pub fn get(&self, id: &str) -> RecordResult<PatientView> {
        let stores = self.lock()?;
        let document = load_or_empty(stores.patients.as_ref());
        let record = ensure_present(&document, id)?;
        Ok(decode(stores.patients.name(), id, record)?.view())
    }

    /// Records ordered by `sort_by` (`height`, `weight`, `bmi`) and `order` (`asc`, `desc`).
    pub fn sorted(&self, sort_by: &str, order: &str) -> RecordResult<Vec<PatientView>> {
        let key = SortKey::parse(sort_by, order)?;
        let stores = self.lock()?;
        let document = load_or_empty(stores.patients.as_ref());
        Ok(decode_all(stores.patients.name(), key.sort(document.iter())))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Validate and insert a new record; the identifier comes from the input.
    pub fn create(&self, raw: &Value) -> RecordResult<PatientView> {
        let mut patient =
            Patient::from_raw(raw).inspect_err(|e| debug!("create rejected: {e}"))?;

        let stores = self.lock()?;
        let mut document = stores.patients.load()?;
        ensure_absent(&document, &patient.id)?;

        let now = timestamp();
        patient.created_at = Some(now.clone());
        patient.updated_at = Some(now);

        document.insert(patient.id.clone(), Value::Object(patient.to_stored()?));
        stores.patients.save(&document)?;

        info!(id = %patient.id, "patient created");
        Ok(patient.view())
    }

    /// Merge a partial payload into an existing record.
    ///
    /// Either the merged record replaces the stored one, or nothing is written.
    pub fn update(&self, id: &str, raw_payload: &Value) -> RecordResult<PatientView> {
        let update = PatientUpdate::from_raw(raw_payload)?;

        let stores = self.lock()?;
        let mut document = stores.patients.load()?;
        let existing = decode(stores.patients.name(), id, ensure_present(&document, id)?)?;

        let mut merged = reconcile(&existing, &update)
            .inspect_err(|e| debug!(id, "update rejected: {e}"))?;
        merged.updated_at = Some(timestamp());

        document.insert(id.to_string(), Value::Object(merged.to_stored()?));
        stores.patients.save(&document)?;

        info!(id, "patient updated");
        Ok(merged.view())
    }

    /// Remove a record and any credential bound to the same identifier.
    pub fn delete(&self, id: &str) -> RecordResult<()> {
        let stores = self.lock()?;
        let mut patients = stores.patients.load()?;
        ensure_present(&patients, id)?;
        let previous = patients.clone();
        patients.shift_remove(id);

        let mut credentials = stores.credentials.load()?;
        if credentials.shift_remove(id).is_some() {
            save_pair(&stores, &patients, &previous, &credentials)?;
        } else {
            stores.patients.save(&patients)?;
        }

        info!(id, "patient deleted");
        Ok(())
    }

    /// Register a credential and create its patient profile under a newly
    /// allocated identifier.
    pub fn signup(&self, raw_form: &Value) -> RecordResult<SignupOutcome> {
        let form = SignUpForm::from_raw(raw_form)?;
        let email = normalize_email(&form.email);
        let secret_hash = hash_secret(&form.password)?;

        let stores = self.lock()?;
        let mut credentials = stores.credentials.load()?;
        let mut patients = stores.patients.load()?;
        ensure_email_available(&credentials, &email)?;

        let id = next_patient_id(
            patients
                .keys()
                .chain(credentials.keys())
                .map(String::as_str),
        );
        ensure_absent(&patients, &id)?;

        let now = timestamp();
        let mut patient = Patient::from_raw(&json!({
            "id": id,
            "name": form.name,
            "city": form.city,
            "age": form.age,
            "gender": form.gender,
            "height": form.height,
            "weight": form.weight,
            "smoker": form.smoker,
            "email": email,
            "contact_detail": form.contact_detail,
            "allergies": form.allergies,
        }))
        .inspect_err(|e| debug!("signup rejected: {e}"))?;
        patient.created_at = Some(now.clone());
        patient.updated_at = Some(now.clone());

        let credential = Credential {
            id: id.clone(),
            name: form.name,
            email,
            secret_hash,
            created_at: Some(now),
        };

        let previous = patients.clone();
        patients.insert(id.clone(), Value::Object(patient.to_stored()?));
        credentials.insert(id.clone(), serde_json::to_value(&credential)?);
        save_pair(&stores, &patients, &previous, &credentials)?;

        info!(id = %id, "signup completed");
        Ok(SignupOutcome {
            patient_id: id,
            patient: patient.view(),
        })
    }

    /// Check an email/secret pair. Failure never reveals which part was wrong.
    pub fn login(&self, raw_form: &Value) -> RecordResult<LoginOutcome> {
        let form = LoginForm::from_raw(raw_form)?;
        let email = normalize_email(&form.email);

        let credential = {
            let stores = self.lock()?;
            let credentials = load_or_empty(stores.credentials.as_ref());
            find_credential(&credentials, &email)
        };

        match credential {
            Some(c) if verify_secret(&form.password, &c.secret_hash) => {
                info!(id = %c.id, "login succeeded");
                Ok(LoginOutcome {
                    patient_id: c.id,
                    name: c.name,
                })
            }
            _ => {
                debug!("login rejected");
                Err(RecordError::Unauthorized)
            }
        }
    }
}

/// Persist the patient document, then the credential document. If the second
/// save fails the first is rolled back to `previous_patients`.
fn save_pair(
    stores: &Stores,
    patients: &Document,
    previous_patients: &Document,
    credentials: &Document,
) -> RecordResult<()> {
    stores.patients.save(patients)?;
    if let Err(e) = stores.credentials.save(credentials) {
        if let Err(rollback) = stores.patients.save(previous_patients) {
            warn!(
                document = stores.patients.name(),
                "rollback after failed credential save also failed: {rollback}"
            );
        }
        return Err(e.into());
    }
    Ok(())
}

fn decode(name: &str, id: &str, record: &Value) -> RecordResult<Patient> {
    let corrupt = |reason: String| StoreError::Corrupt {
        name: name.to_string(),
        id: id.to_string(),
        reason,
    };
    let body = record
        .as_object()
        .ok_or_else(|| corrupt("record is not a JSON object".into()))?;
    Patient::from_stored(id, body).map_err(|e| corrupt(e.to_string()).into())
}

fn decode_all<'a, I>(name: &str, records: I) -> Vec<PatientView>
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    records
        .into_iter()
        .filter_map(|(id, record)| match decode(name, id, record) {
            Ok(patient) => Some(patient.view()),
            Err(e) => {
                warn!("skipping stored record: {e}");
                None
            }
        })
        .collect()
}

fn find_credential(credentials: &Document, email: &str) -> Option<Credential> {
    credentials.values().find_map(|value| {
        match serde_json::from_value::<Credential>(value.clone()) {
            Ok(c) if normalize_email(&c.email) == email => Some(c),
            Ok(_) => None,
            Err(e) => {
                warn!("skipping unreadable credential: {e}");
                None
            }
        }
    })
}

fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
