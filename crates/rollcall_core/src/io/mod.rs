//! Adapters between the roster and outside formats.
//!
//! # Responsibility
//! - Read spreadsheet bytes into raw rows.
//! - Write record subsets to spreadsheet bytes.
//! - Compose bulk `mailto:` links for the host mail handler.
//!
//! # Invariants
//! - Adapters never touch the store; callers decide what to do with output.

pub mod export;
pub mod import;
pub mod mailto;
