//! Persistence gateway for roster snapshots.
//!
//! # Responsibility
//! - Define the key-value contract the service persists through.
//! - Keep SQLite and JSON details out of store/service code.
//!
//! # Invariants
//! - Both collections are stored under fixed keys with no schema version.
//! - A missing key reads back as an empty collection.

pub mod roster_repo;
