//! Command dispatch and handler modules.

mod order;
mod repair;
mod report;

use miette::Result;
use modsolve_resolver::cycles::ResolutionBudget;
use modsolve_resolver::diagnose::Thresholds;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let Cli {
        command,
        inventory,
        strict,
        max_steps,
        verbose,
    } = cli;
    let budget = ResolutionBudget::new(max_steps);

    match command {
        Command::Report {
            fan_out,
            fan_in,
            json,
        } => report::exec(
            &inventory,
            strict,
            budget,
            Thresholds { fan_out, fan_in },
            json,
            verbose,
        ),
        Command::Order { targets, json } => order::exec(&inventory, strict, budget, &targets, json),
        Command::Repair {
            apply,
            output,
            json,
        } => repair::exec(&inventory, strict, budget, apply, output.as_deref(), json),
    }
}
