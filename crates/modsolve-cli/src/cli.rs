//! CLI argument definitions for modsolve.
//!
//! Uses `clap` derive macros to define the full command surface. Each
//! command corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use modsolve_resolver::cycles::ResolutionBudget;

#[derive(Parser, Debug)]
#[command(
    name = "modsolve",
    version,
    about = "Module dependency analysis, ordering, and repair",
    long_about = "modsolve analyzes a module inventory for dependency faults (cycles, \
                  missing dependencies, fan-in/fan-out hotspots), computes deterministic \
                  installation orders, and plans or applies automated repairs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Inventory file: a JSON array of {name, state, dependencies} records
    #[arg(short, long, global = true, default_value = "inventory.json")]
    pub inventory: PathBuf,

    /// Treat a duplicate module name in the inventory as an error
    #[arg(long, global = true)]
    pub strict: bool,

    /// Traversal step budget for cycle enumeration
    #[arg(long, global = true, default_value_t = ResolutionBudget::DEFAULT_MAX_STEPS)]
    pub max_steps: u64,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze the inventory and print a full dependency report
    Report {
        /// Dependency count above which a module is flagged
        #[arg(long, default_value_t = 10)]
        fan_out: usize,
        /// Dependent count above which an installed module is flagged
        #[arg(long, default_value_t = 5)]
        fan_in: usize,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute the installation order for the given targets
    Order {
        /// Target modules; empty means every module pending install/upgrade
        targets: Vec<String>,
        /// Emit the order as JSON
        #[arg(long)]
        json: bool,
    },

    /// Propose (and optionally apply) repairs for structural faults
    Repair {
        /// Apply the proposed edits instead of only listing them
        #[arg(long)]
        apply: bool,
        /// Write the repaired inventory to this file (with --apply)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Emit the edits and outcome as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
