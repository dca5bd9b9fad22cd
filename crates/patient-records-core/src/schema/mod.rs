//! Declarative record validation.
//!
//! Field constraints are data: a [`Schema`] is a static table of
//! [`FieldSpec`]s interpreted by one generic validator. Cross-field business
//! rules live in [`rules`] and only ever see individually-valid records.
//!
//! Pipeline: raw JSON object → coercion → bound checks → typed record → rules

mod fields;
mod patient;
mod rules;

pub use fields::*;
pub use patient::*;
pub use rules::*;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// A single field-level problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Raw input failed field validation. Carries every issue found, not just the first.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Validation failed: {}", describe(.issues))]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue::new(field, message)],
        }
    }

    /// The issue reported for `field`, if any.
    pub fn issue_for(&self, field: &str) -> Option<&FieldIssue> {
        self.issues.iter().find(|i| i.field == field)
    }
}

fn describe(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// A named table of field constraints.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    /// Validate a complete record. Missing required fields are errors.
    ///
    /// Returns the normalized object: coerced values, schema field order,
    /// unknown keys dropped.
    pub fn validate(&self, raw: &Value) -> ValidationResult<Map<String, Value>> {
        self.run(raw, false)
    }

    /// Validate only the keys present in `raw` (update payloads).
    pub fn validate_partial(&self, raw: &Value) -> ValidationResult<Map<String, Value>> {
        self.run(raw, true)
    }

    fn run(&self, raw: &Value, partial: bool) -> ValidationResult<Map<String, Value>> {
        let object = raw.as_object().ok_or_else(|| {
            ValidationError::single(self.name, "expected a JSON object")
        })?;

        let mut normalized = Map::new();
        let mut issues = Vec::new();

        for spec in self.fields {
            match object.get(spec.name) {
                None | Some(Value::Null) => {
                    if spec.required && !partial {
                        issues.push(FieldIssue::new(spec.name, "field required"));
                    }
                }
                Some(value) => match spec.check(value) {
                    Ok(v) => {
                        normalized.insert(spec.name.to_string(), v);
                    }
                    Err(message) => issues.push(FieldIssue::new(spec.name, message)),
                },
            }
        }

        if issues.is_empty() {
            Ok(normalized)
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static TEST_SCHEMA: Schema = Schema {
        name: "test",
        fields: &[
            FieldSpec {
                name: "label",
                kind: FieldKind::Text,
                required: true,
                min_len: Some(2),
                ..FieldSpec::UNCONSTRAINED
            },
            FieldSpec {
                name: "count",
                kind: FieldKind::Integer,
                required: true,
                lower: Some(Bound::Exclusive(0.0)),
                ..FieldSpec::UNCONSTRAINED
            },
            FieldSpec {
                name: "note",
                kind: FieldKind::Text,
                ..FieldSpec::UNCONSTRAINED
            },
        ],
    };

    #[test]
    fn test_validate_ok_and_drops_unknown_keys() {
        let out = TEST_SCHEMA
            .validate(&json!({"label": "ab", "count": "3", "extra": true}))
            .unwrap();
        assert_eq!(out.get("count"), Some(&json!(3)));
        assert!(out.get("extra").is_none());
        assert!(out.get("note").is_none());
    }

    #[test]
    fn test_reports_every_issue() {
        let err = TEST_SCHEMA.validate(&json!({"label": "a"})).unwrap_err();
        assert_eq!(err.issues.len(), 2);
        assert!(err.issue_for("label").is_some());
        assert_eq!(err.issue_for("count").unwrap().message, "field required");
    }

    #[test]
    fn test_null_counts_as_absent() {
        let err = TEST_SCHEMA
            .validate(&json!({"label": "ab", "count": null}))
            .unwrap_err();
        assert_eq!(err.issue_for("count").unwrap().message, "field required");

        let out = TEST_SCHEMA
            .validate(&json!({"label": "ab", "count": 1, "note": null}))
            .unwrap();
        assert!(out.get("note").is_none());
    }

    #[test]
    fn test_partial_skips_missing_required() {
        let out = TEST_SCHEMA.validate_partial(&json!({"count": 5})).unwrap();
        assert_eq!(out.len(), 1);

        let err = TEST_SCHEMA.validate_partial(&json!({"count": 0})).unwrap_err();
        assert!(err.issue_for("count").is_some());
    }

    #[test]
    fn test_non_object_rejected() {
        let err = TEST_SCHEMA.validate(&json!([1, 2])).unwrap_err();
        assert_eq!(err.issues[0].field, "test");
    }

    #[test]
    fn test_display_lists_fields() {
        let err = TEST_SCHEMA.validate(&json!({})).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("label: field required"));
        assert!(text.contains("count: field required"));
    }
}
