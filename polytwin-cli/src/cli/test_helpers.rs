//! Small helpers shared across CLI tests.
//!
//! The suites build a deliberately small twin so each case stays fast, and
//! render summaries to strings for assertions.

use super::{Cli, CliError, Command, Summary, TwinArgs, render_summary, run_cli};

pub(super) const SMALL_ROWS: usize = 120;
pub(super) const SMALL_TREES: usize = 10;

pub(super) fn small_twin() -> TwinArgs {
    TwinArgs {
        rows: SMALL_ROWS,
        trees: SMALL_TREES,
        ..TwinArgs::default()
    }
}

pub(super) fn small_cli(command: Command) -> Cli {
    Cli {
        twin: small_twin(),
        command,
    }
}

pub(super) fn run_cli_expecting_error(cli: Cli, panic_msg: &str) -> CliError {
    match run_cli(cli) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

pub(super) fn render_to_string(summary: &Summary) -> String {
    let mut buffer = Vec::new();
    if let Err(err) = render_summary(summary, &mut buffer) {
        panic!("rendering into memory cannot fail: {err}");
    }
    match String::from_utf8(buffer) {
        Ok(text) => text,
        Err(err) => panic!("rendered output must be UTF-8: {err}"),
    }
}
