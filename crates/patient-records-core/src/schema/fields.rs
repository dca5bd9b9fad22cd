//! Field specs, value coercion and bound checks.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Number, Value};

/// Value domain of a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    Integer,
    Real,
    Boolean,
    /// Closed set of string values (case-sensitive)
    Choice(&'static [&'static str]),
    Email,
    /// Mapping of string keys to string values
    TextMap,
    /// List of strings
    TextList,
}

/// Numeric bound; exclusivity is declared per field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Exclusive(f64),
    Inclusive(f64),
}

/// Constraints for one field.
///
/// `lower`/`upper` apply to numeric kinds, `min_len`/`max_len` to text
/// (characters), lists and maps (entries).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
    pub min_len: Option<usize>,
    pub max_len: Option<usize>,
}

impl FieldSpec {
    /// Base for struct-update syntax in static schema tables.
    pub const UNCONSTRAINED: FieldSpec = FieldSpec {
        name: "",
        kind: FieldKind::Text,
        required: false,
        lower: None,
        upper: None,
        min_len: None,
        max_len: None,
    };

    /// Coerce `value` into this field's domain, then check its bounds.
    pub fn check(&self, value: &Value) -> Result<Value, String> {
        let coerced = coerce(self.kind, value)?;
        self.check_bounds(&coerced)?;
        Ok(coerced)
    }

    fn check_bounds(&self, value: &Value) -> Result<(), String> {
        if let Some(n) = value.as_f64() {
            if let Some(lower) = self.lower {
                match lower {
                    Bound::Exclusive(b) if n <= b => {
                        return Err(format!("must be greater than {}", b))
                    }
                    Bound::Inclusive(b) if n < b => {
                        return Err(format!("must be greater than or equal to {}", b))
                    }
                    _ => {}
                }
            }
            if let Some(upper) = self.upper {
                match upper {
                    Bound::Exclusive(b) if n >= b => {
                        return Err(format!("must be less than {}", b))
                    }
                    Bound::Inclusive(b) if n > b => {
                        return Err(format!("must be less than or equal to {}", b))
                    }
                    _ => {}
                }
            }
        }

        let (len, unit) = match value {
            Value::String(s) => (s.chars().count(), "characters"),
            Value::Array(items) => (items.len(), "items"),
            Value::Object(entries) => (entries.len(), "entries"),
            _ => return Ok(()),
        };
        if let Some(min) = self.min_len {
            if len < min {
                return Err(format!("must have at least {} {}", min, unit));
            }
        }
        if let Some(max) = self.max_len {
            if len > max {
                return Err(format!("must have at most {} {}", max, unit));
            }
        }
        Ok(())
    }
}

/// Normalize a raw value into the representation `kind` expects.
///
/// Numeric strings become numbers here, before any bound is checked.
pub fn coerce(kind: FieldKind, value: &Value) -> Result<Value, String> {
    match kind {
        FieldKind::Text => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err("expected a string".into()),
        },
        FieldKind::Integer => coerce_integer(value)
            .map(Value::from)
            .ok_or_else(|| "expected an integer".into()),
        FieldKind::Real => coerce_real(value)
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| "expected a number".into()),
        FieldKind::Boolean => coerce_bool(value)
            .map(Value::Bool)
            .ok_or_else(|| "expected a boolean".into()),
        FieldKind::Choice(options) => match value {
            Value::String(s) if options.contains(&s.as_str()) => Ok(value.clone()),
            _ => Err(format!("expected one of: {}", options.join(", "))),
        },
        FieldKind::Email => match value {
            Value::String(s) if is_email(s.trim()) => Ok(Value::String(s.trim().to_string())),
            Value::String(_) => Err("value is not a valid email address".into()),
            _ => Err("expected a string".into()),
        },
        FieldKind::TextMap => match value {
            Value::Object(entries) if entries.values().all(Value::is_string) => {
                Ok(value.clone())
            }
            _ => Err("expected a mapping of strings to strings".into()),
        },
        FieldKind::TextList => match value {
            Value::Array(items) if items.iter().all(Value::is_string) => Ok(value.clone()),
            _ => Err("expected a list of strings".into()),
        },
    }
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            let whole = f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64;
            whole.then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_real(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

const EMAIL_PATTERN: &str = r"^[^@\s]+@([^@\s.]+\.)+[^@\s.]+$";

/// Shape check only: one `@`, non-empty local part, dotted domain, no whitespace.
pub fn is_email(candidate: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"))
        .is_match(candidate)
}
