//! Handler for `modsolve report`.
//!
//! Renders the full dependency analysis: module totals by state, structural
//! faults, hotspot flags, and the recommended installation order.

use std::path::Path;

use miette::Result;
use modsolve_core::errors::SolveError;
use modsolve_resolver::cycles::ResolutionBudget;
use modsolve_resolver::diagnose::{self, Thresholds};
use modsolve_resolver::order;

use crate::inventory;
use crate::status::status;

/// How many order entries to print before truncating (without --verbose).
const MAX_LISTED_ORDER: usize = 20;

pub fn exec(
    path: &Path,
    strict: bool,
    budget: ResolutionBudget,
    thresholds: Thresholds,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let graph = inventory::load(path, strict)?;
    let report = diagnose::analyze(&graph, thresholds, budget)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&report).map_err(|e| SolveError::Generic {
                message: format!("failed to serialize report: {e}"),
            })?;
        println!("{rendered}");
    } else {
        status(
            "Analyzing",
            &format!("{} ({} modules)", path.display(), graph.len()),
        );

        println!("Total modules: {}", graph.len());
        for (state, count) in graph.state_counts() {
            println!("  {state}: {count}");
        }
        println!();
        print!("{report}");
        println!();

        match order::installation_order(&graph, &[], budget) {
            Ok(plan) if plan.is_empty() => {
                println!("Nothing pending installation or upgrade.");
            }
            Ok(plan) => {
                println!("Recommended installation order:");
                let shown = if verbose { plan.len() } else { MAX_LISTED_ORDER };
                for (i, module) in plan.iter().take(shown).enumerate() {
                    println!("{:3}. {module}", i + 1);
                }
                if plan.len() > shown {
                    println!("     ... and {} more modules", plan.len() - shown);
                }
            }
            Err(SolveError::CyclicDependency { .. }) => {
                println!("Cannot determine installation order until cycles are repaired.");
            }
            Err(SolveError::UnknownModule { name }) => {
                println!("Cannot determine installation order: unknown module '{name}'.");
            }
            Err(other) => return Err(other.into()),
        }
    }

    let critical = report.critical_count();
    if critical > 0 {
        return Err(SolveError::Generic {
            message: format!("{critical} critical dependency issue(s) require attention"),
        }
        .into());
    }
    Ok(())
}
