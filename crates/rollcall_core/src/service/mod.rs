//! Roster use-case services.
//!
//! # Responsibility
//! - Orchestrate store mutations, persistence and io adapters into
//!   user-action level APIs.
//! - Keep host/UI layers decoupled from storage details.
//!
//! # Invariants
//! - Every mutation persists afterwards; persistence failure never rolls
//!   back the in-memory change.

pub mod roster_service;
