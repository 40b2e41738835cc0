// client/src/lib.rs

//! Terminal client for the prescription API: the same forms and reports the
//! web front end offers, as `rxtrack` subcommands.

pub mod api;
pub mod commands;
pub mod render;

pub use api::{ApiClient, ClientError, DEFAULT_API_URL};
pub use commands::{failure_notice, handle_command, CliArgs, RxCommand};
