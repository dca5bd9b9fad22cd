//! Patient Records Core Library
//!
//! Validation, derived attributes and update reconciliation for patient
//! records, over a pluggable document store.
//!
//! # Architecture
//!
//! ```text
//!   raw record / signup form            partial update payload
//!            │                                   │
//!            ▼                                   ▼
//!   ┌─────────────────┐                ┌───────────────────┐
//!   │ Field Validator │                │ Partial Validator │
//!   │ (schema tables) │                └─────────┬─────────┘
//!   └────────┬────────┘                          │
//!            ▼                                   ▼
//!   ┌─────────────────┐     merge      ┌───────────────────┐
//!   │ Business Rules  │◀───────────────│    Reconciler     │
//!   └────────┬────────┘  (revalidate)  └───────────────────┘
//!            ▼
//!   ┌─────────────────┐
//!   │ Identity / Dup  │  (under the registry write lock)
//!   │     Guards      │
//!   └────────┬────────┘
//!            ▼
//!      DocumentStore  ──read──▶  Derived Attributes (recomputed per read)
//! ```
//!
//! # Core Principle
//!
//! **Derived attributes are never trusted from storage.** BMI, verdict,
//! lifestyle risk, age group and city tier are recomputed on every read.
//!
//! # Modules
//!
//! - [`schema`]: Field specs, generic validator, business rules
//! - [`models`]: Domain types (Patient, PatientUpdate, Credential, forms)
//! - [`derived`]: Derived attribute calculator
//! - [`store`]: Document stores (JSON file, SQLite, in-memory)
//! - [`registry`]: Reconciler, identity allocator, guards, sorting, and the
//!   [`PatientRegistry`] facade

pub mod derived;
pub mod error;
pub mod models;
pub mod registry;
pub mod schema;
pub mod store;

// Re-export commonly used types
pub use derived::{AgeGroup, BmiVerdict, CityTier, DerivedAttributes, LifestyleRisk};
pub use error::{ErrorKind, RecordError, RecordResult};
pub use models::{Credential, Gender, LoginForm, Patient, PatientUpdate, PatientView, SignUpForm};
pub use registry::{
    next_patient_id, reconcile, LoginOutcome, PatientRegistry, SignupOutcome, SortField, SortKey,
    SortOrder,
};
pub use schema::{BusinessRuleError, FieldIssue, Schema, ValidationError};
pub use store::{Document, DocumentStore, JsonFileStore, MemoryStore, SqliteStore, StoreError};
