//! Existence and uniqueness checks run before a mutation is accepted.

use serde_json::Value;

use crate::error::{RecordError, RecordResult};
use crate::models::normalize_email;
use crate::store::Document;

/// Create must not reuse an identifier.
pub fn ensure_absent(patients: &Document, id: &str) -> RecordResult<()> {
    if patients.contains_key(id) {
        return Err(RecordError::Conflict(format!("Patient {} already exists", id)));
    }
    Ok(())
}

/// Read, update and delete need the identifier to exist.
pub fn ensure_present<'a>(patients: &'a Document, id: &str) -> RecordResult<&'a Value> {
    patients
        .get(id)
        .ok_or_else(|| RecordError::NotFound(format!("Patient {}", id)))
}

/// Signup must not reuse an email. Both sides are compared normalized.
pub fn ensure_email_available(credentials: &Document, email: &str) -> RecordResult<()> {
    let wanted = normalize_email(email);
    let taken = credentials
        .values()
        .filter_map(|c| c.get("email").and_then(Value::as_str))
        .any(|existing| normalize_email(existing) == wanted);

    if taken {
        return Err(RecordError::Conflict("Email already registered".into()));
    }
    Ok(())
}
