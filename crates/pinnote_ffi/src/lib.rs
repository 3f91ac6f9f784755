//! Flutter-facing FFI bindings for the PinNote core.

pub mod api;
