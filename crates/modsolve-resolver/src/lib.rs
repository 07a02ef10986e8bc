//! Module dependency resolution engine: graph model, all-simple-cycles
//! detection, deterministic installation ordering, structural diagnostics,
//! and automated repair planning.
//!
//! The engine is synchronous and purely in-memory: the inventory is handed
//! in fully materialized, results come back fully materialized, and every
//! resolution session owns its own [`graph::DependencyGraph`].

pub mod cycles;
pub mod diagnose;
pub mod graph;
pub mod order;
pub mod repair;
