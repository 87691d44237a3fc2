mod dates;
mod headers;
mod utils;

use std::process::exit;

use batchinfer::data_structs::BatchAssignment;
use batchinfer::error::EvidenceError;
use clap::{
    Parser,
    Subcommand,
};
use console::style;
use dates::DatesArgs;
use headers::HeadersArgs;
use itertools::Itertools;
use log::info;
use utils::UtilsArgs;
use wild::ArgsOs;

#[derive(Parser, Debug)]
#[command(
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    long_about = None,)]
struct Cli {
    #[command(subcommand)]
    command: MainMenu,
}

#[derive(Subcommand, Debug)]
enum MainMenu {
    /// Cluster microarray samples by the scan dates of their raw files.
    Dates {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  DatesArgs,
    },

    /// Cluster sequencing samples by instrument, run, flowcell and lane.
    Headers {
        #[clap(flatten)]
        utils: UtilsArgs,
        #[clap(flatten)]
        args:  HeadersArgs,
    },
}

/// Writes a successful assignment, or prints the reason detection failed
/// and exits with a non-zero status.
pub(crate) fn report_outcome(
    outcome: Result<BatchAssignment, EvidenceError>,
    utils: &UtilsArgs,
) -> anyhow::Result<()> {
    match outcome {
        Ok(assignment) => {
            info!(
                "{} batch(es) by {}: {}",
                assignment.n_batches(),
                assignment.method(),
                assignment.labels().iter().join(", ")
            );
            if !assignment.unassigned().is_empty() {
                eprintln!(
                    "{} samples without a signal: {}",
                    style(assignment.unassigned().len()).yellow(),
                    assignment.unassigned().iter().join(", ")
                );
            }
            utils.write_assignment(&assignment)
        },
        Err(err) => {
            eprintln!(
                "Batch detection failed ({}): {}",
                style(err.kind()).red(),
                err.reason()
            );
            exit(2);
        },
    }
}

fn main() -> anyhow::Result<()> {
    let args: ArgsOs = wild::args_os();
    let cli = Cli::parse_from(args);

    match cli.command {
        MainMenu::Dates { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
        MainMenu::Headers { utils, args } => {
            utils.setup()?;
            args.run(&utils)?;
        },
    }
    Ok(())
}
