//! Presentation-side projections over note lists.
//!
//! # Responsibility
//! - Group notes into display order with date headers.
//! - Project a single note for the detail screen.
//!
//! # Invariants
//! - Everything here is pure; no store or clock access.

pub mod detail;
pub mod grouping;
