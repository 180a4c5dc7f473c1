//! Student domain model.
//!
//! # Responsibility
//! - Define the canonical record and its error map.
//! - Normalize raw spreadsheet rows into canonical records.
//! - Validate canonical records with one shared rule set.
//!
//! # Invariants
//! - Normalization never rejects input; validation never mutates it.

pub mod normalize;
pub mod student;
pub mod validate;
