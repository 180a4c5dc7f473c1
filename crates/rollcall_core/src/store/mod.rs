//! In-memory roster state.
//!
//! # Responsibility
//! - Own the valid/invalid collections as one explicit state object.
//! - Funnel every create/edit/re-validate through reconciliation rules.
//!
//! # Invariants
//! - The two collections are disjoint and ids are unique across both.

pub mod roster_store;
