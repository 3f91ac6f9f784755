//! Domain model for notes.
//!
//! # Responsibility
//! - Define the canonical note record, its defaults and validation rules.
//! - Keep flag transitions (pin/favorite/archive) next to the data they touch.
//!
//! # Invariants
//! - Every persisted note is identified by a store-assigned `NoteId`.
//! - Deletion is a hard delete; archiving is the soft "hide" state.

pub mod note;
