//! The Switchboard binary.
//!
//! Switchboard is a small HTTP function for AWS Lambda. It loads a bundle of JSON configuration
//! documents once per cold start and serves them alongside two greeting routes. Deployed as the
//! `bootstrap` executable of a custom Lambda runtime, it needs no wrapper script.
//!
//! Without a subcommand, the binary serves requests. Inside the Lambda execution environment it
//! attaches to the Lambda runtime API, elsewhere it starts a local HTTP server:
//!
//! ```text
//! $ switchboard run --mode http --port 3000
//! ```
//!
//! See `switchboard --help` for the remaining commands.

mod cli;
mod cliapp;
mod setup;

use std::process;

use switchboard_server::ColdStart;

pub fn main() {
    // Recorded before anything else to measure the full boot duration.
    let cold_start = ColdStart::now();

    let exit_code = match cli::execute(cold_start) {
        Ok(()) => 0,
        Err(err) => {
            switchboard_log::ensure_error(&err);
            1
        }
    };

    process::exit(exit_code);
}
