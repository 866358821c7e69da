//! Command-line interface for querying the compounding twin.
//!
//! Every command builds the twin from the global `--seed`, `--rows`,
//! `--trees` and `--model` options, runs one query, and returns a
//! [`Summary`] that [`render_summary`] prints as tab-separated text.

mod commands;

pub use commands::{
    Cli, CliError, Command, FeatureSchema, InputArgs, ModelChoice, PredictionSummary,
    ReportSummary, ResponseSchema, SchemaSummary, Summary, SweepCommand, TwinArgs,
    render_summary, run_cli,
};

#[cfg(test)]
mod test_helpers;
