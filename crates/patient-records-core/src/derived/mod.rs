//! Derived attribute calculator.
//!
//! Pure functions over a validated record. Nothing here is ever persisted:
//! every read recomputes from the current field values.
//!
//! - BMI: `weight / height²`, rounded to 2 decimal places
//! - Verdict: BMI bands (<18.5, <25, <30, else obese)
//! - Lifestyle risk: smoker flag combined with BMI (>30 high, >25 medium)
//! - Age group: <18 young, <45 adult, else senior
//! - City tier: static membership lists, tier 3 otherwise

mod cities;

pub use cities::*;

use serde::Serialize;

use crate::models::Patient;

/// Unrounded body mass index. `height` must be positive.
pub fn raw_bmi(weight: f64, height: f64) -> f64 {
    weight / (height * height)
}

/// Body mass index rounded to 2 decimal places.
pub fn bmi(weight: f64, height: f64) -> f64 {
    round2(raw_bmi(weight, height))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BmiVerdict {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiVerdict {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiVerdict::Underweight
        } else if bmi < 25.0 {
            BmiVerdict::Normal
        } else if bmi < 30.0 {
            BmiVerdict::Overweight
        } else {
            BmiVerdict::Obese
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifestyleRisk {
    Low,
    Medium,
    High,
}

impl LifestyleRisk {
    /// Non-smokers are always low risk.
    pub fn assess(smoker: bool, bmi: f64) -> Self {
        if smoker && bmi > 30.0 {
            LifestyleRisk::High
        } else if smoker && bmi > 25.0 {
            LifestyleRisk::Medium
        } else {
            LifestyleRisk::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifestyleRisk::Low => "low",
            LifestyleRisk::Medium => "medium",
            LifestyleRisk::High => "high",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Young,
    Adult,
    Senior,
}

impl AgeGroup {
    pub fn from_age(age: u32) -> Self {
        if age < 18 {
            AgeGroup::Young
        } else if age < 45 {
            AgeGroup::Adult
        } else {
            AgeGroup::Senior
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgeGroup::Young => "young",
            AgeGroup::Adult => "adult",
            AgeGroup::Senior => "senior",
        }
    }
}

/// Serialized as its number (1, 2 or 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub enum CityTier {
    Tier1,
    Tier2,
    Tier3,
}

impl CityTier {
    /// Exact, case-sensitive membership lookup.
    pub fn for_city(city: &str) -> Self {
        if TIER_1_CITIES.contains(&city) {
            CityTier::Tier1
        } else if TIER_2_CITIES.contains(&city) {
            CityTier::Tier2
        } else {
            CityTier::Tier3
        }
    }

    pub fn number(self) -> u8 {
        match self {
            CityTier::Tier1 => 1,
            CityTier::Tier2 => 2,
            CityTier::Tier3 => 3,
        }
    }
}

impl From<CityTier> for u8 {
    fn from(tier: CityTier) -> Self {
        tier.number()
    }
}

/// Everything computed from a record's fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedAttributes {
    pub bmi: f64,
    pub verdict: BmiVerdict,
    pub lifestyle_risk: LifestyleRisk,
    pub age_group: AgeGroup,
    pub city_tier: CityTier,
}

impl DerivedAttributes {
    /// Compute from a record that passed field validation and business rules.
    pub fn compute(patient: &Patient) -> Self {
        let bmi = bmi(patient.weight, patient.height);
        Self {
            bmi,
            verdict: BmiVerdict::from_bmi(bmi),
            lifestyle_risk: LifestyleRisk::assess(patient.smoker, bmi),
            age_group: AgeGroup::from_age(patient.age),
            city_tier: CityTier::for_city(&patient.city),
        }
    }
}
