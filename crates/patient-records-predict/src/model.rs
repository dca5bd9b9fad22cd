//! Premium category models.

use patient_records_core::derived::{AgeGroup, LifestyleRisk};
use patient_records_core::ValidationError;
use thiserror::Error;

use crate::input::FeatureRow;

/// Prediction errors.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Model error: {0}")]
    Model(String),
}

pub type PredictResult<T> = Result<T, PredictError>;

pub const LOW: &str = "Low";
pub const MEDIUM: &str = "Medium";
pub const HIGH: &str = "High";

/// Anything that maps a feature row to a premium category label.
pub trait PremiumModel: Send + Sync {
    fn name(&self) -> &str;

    fn predict(&self, row: &FeatureRow) -> PredictResult<String>;
}

/// Deterministic points-based baseline, used when no trained model is wired in.
///
/// One point per lifestyle risk step, one for the senior age group, one for
/// income above [`RuleModel::high_income_lpa`]. Zero points is `Low`, one is
/// `Medium`, two or more is `High`.
#[derive(Debug, Clone)]
pub struct RuleModel {
    pub high_income_lpa: f64,
}

impl Default for RuleModel {
    fn default() -> Self {
        Self {
            high_income_lpa: 20.0,
        }
    }
}

impl RuleModel {
    fn points(&self, row: &FeatureRow) -> u32 {
        let lifestyle = match row.lifestyle_risk {
            LifestyleRisk::Low => 0,
            LifestyleRisk::Medium => 1,
            LifestyleRisk::High => 2,
        };
        let age = u32::from(row.age_group == AgeGroup::Senior);
        let income = u32::from(row.income_lpa > self.high_income_lpa);
        lifestyle + age + income
    }
}

impl PremiumModel for RuleModel {
    fn name(&self) -> &str {
        "rule-baseline"
    }

    fn predict(&self, row: &FeatureRow) -> PredictResult<String> {
        if !row.bmi.is_finite() {
            return Err(PredictError::Model(format!("non-finite bmi: {}", row.bmi)));
        }
        let label = match self.points(row) {
            0 => LOW,
            1 => MEDIUM,
            _ => HIGH,
        };
        Ok(label.to_string())
    }
}
