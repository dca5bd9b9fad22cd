//! Domain models for the patient records system.

mod credential;
mod patient;

pub use credential::*;
pub use patient::*;
