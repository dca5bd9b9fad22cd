//! Patient models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::derived::DerivedAttributes;
use crate::error::RecordResult;
use crate::schema::{
    check_rules, ValidationError, EMERGENCY_CONTACT_KEY, PATIENT_SCHEMA, PATIENT_UPDATE_SCHEMA,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// A patient's stored profile.
///
/// Derived attributes (BMI and friends) are never fields here; see
/// [`Patient::derived`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// `P` + zero-padded number; immutable after creation
    pub id: String,
    pub name: String,
    /// Free text, used for the city-tier lookup
    pub city: String,
    pub age: u32,
    pub gender: Gender,
    /// Height in meters
    pub height: f64,
    /// Weight in kilograms
    pub weight: f64,
    #[serde(default)]
    pub smoker: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_detail: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Patient {
    /// Create a patient with the required fields. Not validated.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        city: impl Into<String>,
        age: u32,
        gender: Gender,
        height: f64,
        weight: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            city: city.into(),
            age,
            gender,
            height,
            weight,
            smoker: false,
            email: None,
            contact_detail: None,
            allergies: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Run the full pipeline over raw input: field validation, then business rules.
    pub fn from_raw(raw: &Value) -> RecordResult<Self> {
        let patient = Self::from_fields(raw)?;
        check_rules(&patient)?;
        Ok(patient)
    }

    /// Decode a stored record. The document key is the identifier; any `id`
    /// inside the record body is ignored.
    ///
    /// Only field validation applies. Records written before a business rule
    /// existed stay readable and can be brought into line by an update.
    pub fn from_stored(id: &str, record: &Map<String, Value>) -> RecordResult<Self> {
        let mut raw = record.clone();
        raw.insert("id".into(), Value::String(id.to_string()));
        Self::from_fields(&Value::Object(raw))
    }

    fn from_fields(raw: &Value) -> RecordResult<Self> {
        let normalized = PATIENT_SCHEMA.validate(raw)?;
        serde_json::from_value(Value::Object(normalized))
            .map_err(|e| ValidationError::single(PATIENT_SCHEMA.name, e.to_string()).into())
    }

    /// Record body as persisted: every field except the identifier.
    pub fn to_stored(&self) -> RecordResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(mut map) => {
                map.shift_remove("id");
                Ok(map)
            }
            other => Err(crate::RecordError::Internal(format!(
                "patient serialized to {} instead of an object",
                other
            ))),
        }
    }

    /// True when `contact_detail` holds a non-blank emergency entry.
    pub fn has_emergency_contact(&self) -> bool {
        self.contact_detail
            .as_ref()
            .and_then(|c| c.get(EMERGENCY_CONTACT_KEY))
            .is_some_and(|v| !v.trim().is_empty())
    }

    /// Recompute derived attributes from the current field values.
    pub fn derived(&self) -> DerivedAttributes {
        DerivedAttributes::compute(self)
    }

    /// Record plus freshly computed derived attributes.
    pub fn view(&self) -> PatientView {
        PatientView {
            patient: self.clone(),
            derived: self.derived(),
        }
    }
}

/// Partial update: only present fields take part in the merge.
///
/// `email` is not updatable here; it mirrors the login credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatientUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoker: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_detail: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
}

impl PatientUpdate {
    /// Validate the present fields of a raw payload. `id` is never read.
    pub fn from_raw(raw: &Value) -> RecordResult<Self> {
        let normalized = PATIENT_UPDATE_SCHEMA.validate_partial(raw)?;
        serde_json::from_value(Value::Object(normalized)).map_err(|e| {
            ValidationError::single(PATIENT_UPDATE_SCHEMA.name, e.to_string()).into()
        })
    }
}

/// Read model: the record flattened together with its derived attributes.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PatientView {
    #[serde(flatten)]
    pub patient: Patient,
    #[serde(flatten)]
    pub derived: DerivedAttributes,
}
