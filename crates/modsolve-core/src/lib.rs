//! Core data types for the modsolve resolution engine.
//!
//! This crate defines the types shared by every other modsolve crate:
//! module inventory records, lifecycle states, dependency cycles, and the
//! unified error type.
//!
//! This crate is intentionally free of I/O and graph machinery.

pub mod cycle;
pub mod errors;
pub mod module;
