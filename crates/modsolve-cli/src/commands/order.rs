//! Handler for `modsolve order`.

use std::path::Path;

use miette::Result;
use modsolve_core::errors::SolveError;
use modsolve_resolver::cycles::ResolutionBudget;
use modsolve_resolver::order;

use crate::inventory;

pub fn exec(
    path: &Path,
    strict: bool,
    budget: ResolutionBudget,
    targets: &[String],
    json: bool,
) -> Result<()> {
    let graph = inventory::load(path, strict)?;
    let plan = order::installation_order(&graph, targets, budget)?;

    if json {
        let rendered = serde_json::to_string_pretty(&plan).map_err(|e| SolveError::Generic {
            message: format!("failed to serialize order: {e}"),
        })?;
        println!("{rendered}");
        return Ok(());
    }

    if plan.is_empty() {
        println!("Nothing pending installation or upgrade.");
        return Ok(());
    }
    for (i, module) in plan.iter().enumerate() {
        println!("{:3}. {module}", i + 1);
    }
    Ok(())
}
