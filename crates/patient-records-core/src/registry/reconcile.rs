//! Merge of partial updates into stored records.

use crate::error::RecordResult;
use crate::models::{Patient, PatientUpdate};

/// Overlay the present fields of `update` on a copy of `existing`, then push
/// the merged record back through field validation and business rules.
///
/// The identifier always comes from `existing`. `existing` is never modified,
/// so a rejected merge leaves the caller's copy untouched.
pub fn reconcile(existing: &Patient, update: &PatientUpdate) -> RecordResult<Patient> {
    let mut merged = existing.clone();

    if let Some(name) = &update.name {
        merged.name = name.clone();
    }
    if let Some(city) = &update.city {
        merged.city = city.clone();
    }
    if let Some(age) = update.age {
        merged.age = age;
    }
    if let Some(gender) = update.gender {
        merged.gender = gender;
    }
    if let Some(height) = update.height {
        merged.height = height;
    }
    if let Some(weight) = update.weight {
        merged.weight = weight;
    }
    if let Some(smoker) = update.smoker {
        merged.smoker = smoker;
    }
    if let Some(contact_detail) = &update.contact_detail {
        merged.contact_detail = Some(contact_detail.clone());
    }
    if let Some(allergies) = &update.allergies {
        merged.allergies = Some(allergies.clone());
    }

    Patient::from_raw(&serde_json::to_value(&merged)?)
}
