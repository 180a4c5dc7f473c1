//! Query/view layer over the valid collection.
//!
//! # Responsibility
//! - Derive filtered, sorted projections for table/card/chart views.
//! - Compute header stats, filter options and chart distributions.
//! - Track row selection for bulk actions.
//!
//! # Invariants
//! - Everything here is read-only with respect to the store.

pub mod selection;
pub mod stats;
pub mod view;
