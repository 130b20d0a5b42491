//! UTAPI is a utilization tracking service for object storage: it ingests
//! per-operation events into a Redis-backed metric space and answers signed
//! `ListMetrics` queries over arbitrary time ranges.
//!
//! # Workspace Crates
//!
//! The service is split into the following workspace crates:
//!
//!  - `utapi`: Main entry point and command line interface.
//!  - `utapi-auth`: AWS SigV4 signature verification.
//!  - `utapi-common`: Timestamps and interval arithmetic.
//!  - `utapi-config`: Configuration for the CLI and server.
//!  - `utapi-log`: Logging setup and facade.
//!  - `utapi-metrics`: The metric accounting engine.
//!  - `utapi-redis`: Pooled Redis datastore adapter.
//!  - `utapi-server`: Endpoints and services.

mod cli;
mod cliapp;
mod setup;

use std::process;

pub fn main() {
    let exit_code = match cli::execute() {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };

    process::exit(exit_code);
}
