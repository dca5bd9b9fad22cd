//! Cross-field business rules.
//!
//! Rules run strictly after field validation and strictly before derived
//! attributes are computed, so a derived value can never mask a violation.

use thiserror::Error;

use crate::models::Patient;

/// Patients strictly older than this need an emergency contact.
pub const SENIOR_AGE_THRESHOLD: u32 = 60;

/// Key in `contact_detail` that holds the emergency contact.
pub const EMERGENCY_CONTACT_KEY: &str = "emergency";

pub const EMERGENCY_CONTACT_RULE: &str = "emergency_contact_required";

/// A rule spanning several fields was violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Business rule '{rule}' violated: {message}")]
pub struct BusinessRuleError {
    pub rule: &'static str,
    pub message: String,
}

/// A named predicate over an individually-valid record.
pub struct BusinessRule {
    pub name: &'static str,
    /// Returns a message when the record violates the rule.
    pub check: fn(&Patient) -> Option<String>,
}

pub static PATIENT_RULES: &[BusinessRule] = &[BusinessRule {
    name: EMERGENCY_CONTACT_RULE,
    check: senior_needs_emergency_contact,
}];

fn senior_needs_emergency_contact(patient: &Patient) -> Option<String> {
    if patient.age > SENIOR_AGE_THRESHOLD && !patient.has_emergency_contact() {
        Some(format!(
            "Patient older than {} must have an emergency contact",
            SENIOR_AGE_THRESHOLD
        ))
    } else {
        None
    }
}

/// Evaluate every rule in order; the first violation wins.
pub fn check_rules(patient: &Patient) -> Result<(), BusinessRuleError> {
    for rule in PATIENT_RULES {
        if let Some(message) = (rule.check)(patient) {
            return Err(BusinessRuleError {
                rule: rule.name,
                message,
            });
        }
    }
    Ok(())
}
