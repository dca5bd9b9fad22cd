//! Insurance premium prediction.
//!
//! Validates applicant input, derives the model's feature row with the same
//! calculators the patient records use, and hands it to a [`PremiumModel`].

pub mod input;
pub mod model;

pub use input::*;
pub use model::*;
