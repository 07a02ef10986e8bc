//! Handler for `modsolve repair`.
//!
//! Dry-run by default: lists the deterministic edit plan. With `--apply`
//! the edits are applied, the graph is re-validated, and the repaired
//! inventory can be written back out with `--output`.

use std::path::Path;

use miette::Result;
use modsolve_core::errors::SolveError;
use modsolve_resolver::cycles::ResolutionBudget;
use modsolve_resolver::repair;

use crate::inventory;
use crate::status::{status, status_warn};

pub fn exec(
    path: &Path,
    strict: bool,
    budget: ResolutionBudget,
    apply: bool,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let mut graph = inventory::load(path, strict)?;

    if !apply {
        let edits = repair::plan(&graph, budget)?;
        if json {
            let rendered =
                serde_json::to_string_pretty(&edits).map_err(|e| SolveError::Generic {
                    message: format!("failed to serialize plan: {e}"),
                })?;
            println!("{rendered}");
        } else if edits.is_empty() {
            println!("No repairs needed.");
        } else {
            println!("Proposed repairs ({}):", edits.len());
            for edit in &edits {
                println!("  would {edit}");
            }
            println!("Re-run with --apply to apply them.");
        }
        return Ok(());
    }

    let outcome = repair::apply(&mut graph, budget)?;
    if json {
        let rendered =
            serde_json::to_string_pretty(&outcome).map_err(|e| SolveError::Generic {
                message: format!("failed to serialize outcome: {e}"),
            })?;
        println!("{rendered}");
    } else if outcome.applied.is_empty() {
        println!("No repairs needed.");
    } else {
        println!("Applied repairs ({}):", outcome.applied.len());
        for edit in &outcome.applied {
            println!("  {edit}");
        }
    }

    if let Some(out) = output {
        inventory::save(out, &graph)?;
        status("Writing", &format!("{}", out.display()));
    }

    if !outcome.is_fully_repaired() {
        for cycle in &outcome.unresolved_cycles {
            status_warn("Unresolved", &format!("cycle {cycle}"));
        }
        for missing in &outcome.unresolved_missing {
            status_warn(
                "Unresolved",
                &format!("missing dependency {} -> {}", missing.module, missing.dependency),
            );
        }
        let remaining = outcome.unresolved_cycles.len() + outcome.unresolved_missing.len();
        return Err(SolveError::Generic {
            message: format!("{remaining} fault(s) remain unresolved after repair"),
        }
        .into());
    }
    Ok(())
}
