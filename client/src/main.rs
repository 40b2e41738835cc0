// client/src/main.rs

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;

use rx_client::{failure_notice, handle_command, ApiClient, CliArgs};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = CliArgs::parse();
    let client = ApiClient::new(args.api_url.as_str()).context("Failed to build HTTP client")?;

    match handle_command(&client, args.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            debug!("Request to {} failed: {:?}", client.base_url(), err);
            eprintln!("{}", failure_notice(&err, client.base_url()));
            Ok(ExitCode::FAILURE)
        }
    }
}
