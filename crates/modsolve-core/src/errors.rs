use miette::Diagnostic;
use thiserror::Error;

use crate::cycle::Cycle;

/// Unified error type for all modsolve operations.
#[derive(Debug, Error, Diagnostic)]
pub enum SolveError {
    /// A request or declaration referenced a module absent from the inventory.
    #[error("unknown module '{name}'")]
    #[diagnostic(help("requests are rejected wholesale; fix the inventory or the target list"))]
    UnknownModule { name: String },

    /// The working subgraph contains one or more dependency cycles.
    #[error("dependency cycle detected ({count} cycle{plural})", count = .cycles.len(), plural = if .cycles.len() == 1 { "" } else { "s" })]
    #[diagnostic(help("run the repair planner to break the cycles before ordering"))]
    CyclicDependency { cycles: Vec<Cycle> },

    /// Strict inventory construction saw the same module name twice.
    #[error("duplicate module '{name}' in inventory")]
    DuplicateModule { name: String },

    /// Cycle enumeration exceeded the caller's step budget.
    #[error("traversal exceeded the configured budget of {limit} steps")]
    #[diagnostic(help("raise the budget, or repair the graph; dense graphs have exponentially many simple cycles"))]
    ResourceExhausted { limit: u64 },

    /// I/O operation failed (inventory loading and writing only; the engine
    /// itself performs no I/O).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed inventory data.
    #[error("Inventory error: {message}")]
    #[diagnostic(help("the inventory must be a JSON array of {{name, state, dependencies}} records"))]
    Inventory { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `Result` with a [`SolveError`].
pub type SolveResult<T> = Result<T, SolveError>;
