//! Credential models: the authentication anchor for a patient profile.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Gender;
use crate::error::RecordResult;
use crate::schema::{ValidationError, LOGIN_SCHEMA, SIGNUP_SCHEMA};

/// Stored login record, keyed by the patient identifier it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credential {
    pub id: String,
    pub name: String,
    /// Normalized with [`normalize_email`]
    pub email: String,
    /// Argon2id PHC string; the clear secret is never stored
    pub secret_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Trim and lower-case an email before storage or comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Signup request: credential fields plus the patient profile.
#[derive(Clone, Deserialize)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub city: String,
    pub age: u32,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
    #[serde(default)]
    pub smoker: bool,
    #[serde(default)]
    pub contact_detail: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub allergies: Option<Vec<String>>,
}

impl SignUpForm {
    pub fn from_raw(raw: &Value) -> RecordResult<Self> {
        let normalized = SIGNUP_SCHEMA.validate(raw)?;
        serde_json::from_value(Value::Object(normalized))
            .map_err(|e| ValidationError::single(SIGNUP_SCHEMA.name, e.to_string()).into())
    }
}

impl fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("city", &self.city)
            .field("age", &self.age)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn from_raw(raw: &Value) -> RecordResult<Self> {
        let normalized = LOGIN_SCHEMA.validate(raw)?;
        serde_json::from_value(Value::Object(normalized))
            .map_err(|e| ValidationError::single(LOGIN_SCHEMA.name, e.to_string()).into())
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
