//! Payload normalization subsystem.
//!
//! # Data Flow
//! ```text
//! Request body (serde_json::Value, any shape)
//!     → shape.rs (classify: which of the known shapes is it?)
//!     → normalizer.rs (one candidate per record, in order)
//!     → record.rs (canonical EmailRecord / ClassificationRecord, or ValidationError)
//! ```
//!
//! # Design Decisions
//! - Shape detection happens once, in a single ordered match
//! - Invalid candidates are flagged, never dropped
//! - Pure functions only; no I/O

pub mod normalizer;
pub mod record;
pub mod shape;

pub use normalizer::{normalize, Candidate};
pub use record::{CanonicalRecord, ClassificationRecord, EmailRecord, ValidationError};
pub use shape::{resolve_sender, ClassificationKey, PayloadShape};
