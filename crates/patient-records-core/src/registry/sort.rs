//! Sort key resolution for stored records.

use std::cmp::Ordering;
use std::str::FromStr;

use serde_json::Value;

use crate::derived::bmi;
use crate::error::{RecordError, RecordResult};

/// Fields a listing may be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Height,
    Weight,
    /// Derived; computed per record, never read from storage
    Bmi,
}

impl FromStr for SortField {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "height" => Ok(SortField::Height),
            "weight" => Ok(SortField::Weight),
            "bmi" => Ok(SortField::Bmi),
            other => Err(RecordError::InvalidArgument(format!(
                "Invalid sort_by field: {} (expected height, weight or bmi)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(RecordError::InvalidArgument(
                "Order must be 'asc' or 'desc'".into(),
            )),
        }
    }
}

/// A resolved sort request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortKey {
    /// Resolve request tokens, rejecting anything outside the allow-lists.
    pub fn parse(field: &str, order: &str) -> RecordResult<Self> {
        Ok(Self {
            field: field.parse()?,
            order: order.parse()?,
        })
    }

    /// Sort value of one stored record body. Missing or unusable fields sort as zero.
    pub fn value_of(&self, record: &Value) -> f64 {
        match self.field {
            SortField::Height => number(record, "height").unwrap_or(0.0),
            SortField::Weight => number(record, "weight").unwrap_or(0.0),
            SortField::Bmi => match (number(record, "weight"), number(record, "height")) {
                (Some(weight), Some(height)) if height > 0.0 => bmi(weight, height),
                _ => 0.0,
            },
        }
    }

    /// Stable sort: ties keep their input (insertion) order in both directions.
    pub fn sort<'a, I>(&self, records: I) -> Vec<(&'a String, &'a Value)>
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let mut keyed: Vec<(f64, (&'a String, &'a Value))> = records
            .into_iter()
            .map(|entry| (self.value_of(entry.1), entry))
            .collect();

        keyed.sort_by(|a, b| self.compare(a.0, b.0));
        keyed.into_iter().map(|(_, entry)| entry).collect()
    }

    fn compare(&self, a: f64, b: f64) -> Ordering {
        match self.order {
            SortOrder::Ascending => a.total_cmp(&b),
            SortOrder::Descending => b.total_cmp(&a),
        }
    }
}

/// Numeric field value; numeric strings count, like in field validation.
fn number(record: &Value, field: &str) -> Option<f64> {
    let value = match record.get(field)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}
