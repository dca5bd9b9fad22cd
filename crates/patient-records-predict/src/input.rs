//! Insurance premium input and its feature row.

use patient_records_core::derived::{raw_bmi, AgeGroup, CityTier, LifestyleRisk};
use patient_records_core::schema::{Bound, FieldKind, FieldSpec, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::PredictResult;

pub const OCCUPATIONS: &[&str] = &[
    "retired",
    "freelancer",
    "student",
    "government_job",
    "business_owner",
    "unemployed",
    "private_job",
];

pub static PREMIUM_INPUT_SCHEMA: Schema = Schema {
    name: "premium_input",
    fields: &[
        FieldSpec {
            name: "age",
            kind: FieldKind::Integer,
            required: true,
            lower: Some(Bound::Exclusive(0.0)),
            upper: Some(Bound::Exclusive(120.0)),
            ..FieldSpec::UNCONSTRAINED
        },
        FieldSpec {
            name: "weight",
            kind: FieldKind::Real,
            required: true,
            lower: Some(Bound::Exclusive(0.0)),
            ..FieldSpec::UNCONSTRAINED
        },
        FieldSpec {
            name: "height",
            kind: FieldKind::Real,
            required: true,
            lower: Some(Bound::Exclusive(0.0)),
            upper: Some(Bound::Exclusive(2.5)),
            ..FieldSpec::UNCONSTRAINED
        },
        FieldSpec {
            name: "income_lpa",
            kind: FieldKind::Real,
            required: true,
            lower: Some(Bound::Exclusive(0.0)),
            ..FieldSpec::UNCONSTRAINED
        },
        FieldSpec {
            name: "smoker",
            kind: FieldKind::Boolean,
            required: true,
            ..FieldSpec::UNCONSTRAINED
        },
        FieldSpec {
            name: "city",
            kind: FieldKind::Text,
            required: true,
            ..FieldSpec::UNCONSTRAINED
        },
        FieldSpec {
            name: "occupation",
            kind: FieldKind::Choice(OCCUPATIONS),
            required: true,
            ..FieldSpec::UNCONSTRAINED
        },
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occupation {
    Retired,
    Freelancer,
    Student,
    GovernmentJob,
    BusinessOwner,
    Unemployed,
    PrivateJob,
}

/// Applicant data submitted for a premium estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumInput {
    pub age: u32,
    /// Kilograms
    pub weight: f64,
    /// Meters
    pub height: f64,
    /// Income in lakhs per annum
    pub income_lpa: f64,
    pub smoker: bool,
    pub city: String,
    pub occupation: Occupation,
}

impl PremiumInput {
    /// Validate raw input against [`PREMIUM_INPUT_SCHEMA`].
    pub fn from_raw(raw: &Value) -> PredictResult<Self> {
        let normalized = PREMIUM_INPUT_SCHEMA.validate(raw)?;
        Ok(serde_json::from_value(Value::Object(normalized))?)
    }

    /// Unrounded BMI; the model was trained on it that way.
    pub fn bmi(&self) -> f64 {
        raw_bmi(self.weight, self.height)
    }

    pub fn lifestyle_risk(&self) -> LifestyleRisk {
        LifestyleRisk::assess(self.smoker, self.bmi())
    }

    pub fn age_group(&self) -> AgeGroup {
        AgeGroup::from_age(self.age)
    }

    pub fn city_tier(&self) -> CityTier {
        CityTier::for_city(&self.city)
    }

    pub fn features(&self) -> FeatureRow {
        FeatureRow {
            age: self.age,
            weight: self.weight,
            height: self.height,
            income_lpa: self.income_lpa,
            smoker: u8::from(self.smoker),
            city_tier: self.city_tier().number(),
            occupation: self.occupation,
            bmi: self.bmi(),
            lifestyle_risk: self.lifestyle_risk(),
            age_group: self.age_group(),
        }
    }
}

/// One model input row, in the column order the model expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub age: u32,
    pub weight: f64,
    pub height: f64,
    pub income_lpa: f64,
    /// 0 or 1
    pub smoker: u8,
    /// 1, 2 or 3
    pub city_tier: u8,
    pub occupation: Occupation,
    pub bmi: f64,
    pub lifestyle_risk: LifestyleRisk,
    pub age_group: AgeGroup,
}
