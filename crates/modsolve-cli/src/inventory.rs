//! Inventory loading and writing: JSON module records on disk, a
//! [`DependencyGraph`] in memory. All file I/O lives here, outside the
//! engine.

use std::path::Path;

use modsolve_core::errors::SolveError;
use modsolve_core::module::ModuleRecord;
use modsolve_resolver::graph::DependencyGraph;

/// Load an inventory file and build its dependency graph.
pub fn load(path: &Path, strict: bool) -> Result<DependencyGraph, SolveError> {
    let data = std::fs::read_to_string(path)?;
    let records: Vec<ModuleRecord> =
        serde_json::from_str(&data).map_err(|e| SolveError::Inventory {
            message: format!("{}: {e}", path.display()),
        })?;
    tracing::debug!("loaded {} modules from {}", records.len(), path.display());
    DependencyGraph::from_inventory(&records, strict)
}

/// Write the graph's current modules back out as an inventory file.
pub fn save(path: &Path, graph: &DependencyGraph) -> Result<(), SolveError> {
    let records = graph.to_inventory();
    let json = serde_json::to_string_pretty(&records).map_err(|e| SolveError::Generic {
        message: format!("failed to serialize inventory: {e}"),
    })?;
    std::fs::write(path, json)?;
    Ok(())
}
