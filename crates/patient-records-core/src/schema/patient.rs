//! Schema tables for patient records and credential forms.

use super::{Bound, FieldKind, FieldSpec, Schema};

pub const GENDERS: &[&str] = &["male", "female", "other"];

const ID: FieldSpec = FieldSpec {
    name: "id",
    kind: FieldKind::Text,
    required: true,
    min_len: Some(1),
    max_len: Some(32),
    ..FieldSpec::UNCONSTRAINED
};

const NAME: FieldSpec = FieldSpec {
    name: "name",
    kind: FieldKind::Text,
    required: true,
    min_len: Some(1),
    ..FieldSpec::UNCONSTRAINED
};

const CITY: FieldSpec = FieldSpec {
    name: "city",
    kind: FieldKind::Text,
    required: true,
    min_len: Some(1),
    ..FieldSpec::UNCONSTRAINED
};

const AGE: FieldSpec = FieldSpec {
    name: "age",
    kind: FieldKind::Integer,
    required: true,
    lower: Some(Bound::Exclusive(0.0)),
    upper: Some(Bound::Exclusive(120.0)),
    ..FieldSpec::UNCONSTRAINED
};

const GENDER: FieldSpec = FieldSpec {
    name: "gender",
    kind: FieldKind::Choice(GENDERS),
    required: true,
    ..FieldSpec::UNCONSTRAINED
};

/// Meters.
const HEIGHT: FieldSpec = FieldSpec {
    name: "height",
    kind: FieldKind::Real,
    required: true,
    lower: Some(Bound::Exclusive(0.0)),
    ..FieldSpec::UNCONSTRAINED
};

/// Kilograms.
const WEIGHT: FieldSpec = FieldSpec {
    name: "weight",
    kind: FieldKind::Real,
    required: true,
    lower: Some(Bound::Exclusive(0.0)),
    ..FieldSpec::UNCONSTRAINED
};

const SMOKER: FieldSpec = FieldSpec {
    name: "smoker",
    kind: FieldKind::Boolean,
    ..FieldSpec::UNCONSTRAINED
};

const EMAIL: FieldSpec = FieldSpec {
    name: "email",
    kind: FieldKind::Email,
    ..FieldSpec::UNCONSTRAINED
};

const CONTACT_DETAIL: FieldSpec = FieldSpec {
    name: "contact_detail",
    kind: FieldKind::TextMap,
    ..FieldSpec::UNCONSTRAINED
};

const ALLERGIES: FieldSpec = FieldSpec {
    name: "allergies",
    kind: FieldKind::TextList,
    ..FieldSpec::UNCONSTRAINED
};

const CREATED_AT: FieldSpec = FieldSpec {
    name: "created_at",
    kind: FieldKind::Text,
    ..FieldSpec::UNCONSTRAINED
};

const UPDATED_AT: FieldSpec = FieldSpec {
    name: "updated_at",
    kind: FieldKind::Text,
    ..FieldSpec::UNCONSTRAINED
};

const PASSWORD: FieldSpec = FieldSpec {
    name: "password",
    kind: FieldKind::Text,
    required: true,
    min_len: Some(6),
    ..FieldSpec::UNCONSTRAINED
};

/// Full patient record.
pub static PATIENT_SCHEMA: Schema = Schema {
    name: "patient",
    fields: &[
        ID,
        NAME,
        CITY,
        AGE,
        GENDER,
        HEIGHT,
        WEIGHT,
        SMOKER,
        EMAIL,
        CONTACT_DETAIL,
        ALLERGIES,
        CREATED_AT,
        UPDATED_AT,
    ],
};

/// Fields an update payload may carry. Identifier, email and timestamps are
/// not among them.
pub static PATIENT_UPDATE_SCHEMA: Schema = Schema {
    name: "patient_update",
    fields: &[
        NAME,
        CITY,
        AGE,
        GENDER,
        HEIGHT,
        WEIGHT,
        SMOKER,
        CONTACT_DETAIL,
        ALLERGIES,
    ],
};

pub static SIGNUP_SCHEMA: Schema = Schema {
    name: "signup",
    fields: &[
        FieldSpec {
            min_len: Some(2),
            ..NAME
        },
        FieldSpec {
            required: true,
            ..EMAIL
        },
        PASSWORD,
        CITY,
        AGE,
        GENDER,
        HEIGHT,
        WEIGHT,
        SMOKER,
        CONTACT_DETAIL,
        ALLERGIES,
    ],
};

pub static LOGIN_SCHEMA: Schema = Schema {
    name: "login",
    fields: &[
        FieldSpec {
            required: true,
            ..EMAIL
        },
        PASSWORD,
    ],
};
