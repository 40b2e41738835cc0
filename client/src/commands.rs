// client/src/commands.rs

// Command-line arguments and subcommands for the rxtrack client.
use clap::{Args, Parser, Subcommand};
use log::info;

use rx_models::{PrescriptionPayload, ReportRequest, Scalar};

use crate::api::{ApiClient, ClientError, DEFAULT_API_URL};
use crate::render;

#[derive(Debug, Parser)]
#[command(name = "rxtrack")]
#[command(version = "0.1.0")]
#[command(about = "Track prescriptions, doctors and reports through the prescription API")]
pub struct CliArgs {
    /// Base URL of the API, including the `/api` prefix.
    #[arg(long, global = true, env = "RXTRACK_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,
    #[command(subcommand)]
    pub command: RxCommand,
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum RxCommand {
    /// List every prescription
    List,
    /// List doctors with their prescription counts
    Doctors,
    /// Add a prescription
    Add(PrescriptionArgs),
    /// Replace every field of a prescription
    Update {
        id: String,
        #[command(flatten)]
        fields: PrescriptionArgs,
    },
    /// Delete a prescription
    Delete { id: String },
    /// Filter prescriptions and summarize them
    Report(ReportArgs),
    /// Show the values the report can be filtered by
    Filters,
    /// Check that the API is up
    Health,
}

#[derive(Debug, Args, PartialEq)]
pub struct PrescriptionArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long)]
    pub last_name: String,
    #[arg(long = "prescription")]
    pub prescription_name: String,
    #[arg(long)]
    pub amount: String,
    #[arg(long = "patient")]
    pub patient_name: String,
    #[arg(long = "ssn")]
    pub patient_ssn: String,
}

impl From<PrescriptionArgs> for PrescriptionPayload {
    fn from(args: PrescriptionArgs) -> Self {
        PrescriptionPayload {
            first_name: Some(Scalar::from(args.first_name)),
            last_name: Some(Scalar::from(args.last_name)),
            amount: Some(Scalar::from(args.amount)),
            patient_name: Some(Scalar::from(args.patient_name)),
            patient_ssn: Some(Scalar::from(args.patient_ssn)),
            prescription_name: Some(Scalar::from(args.prescription_name)),
        }
    }
}

#[derive(Debug, Default, Args, PartialEq)]
pub struct ReportArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    /// Doctor id, as printed by `filters`
    #[arg(long)]
    pub doctor: Option<String>,
    /// Case-insensitive part of the prescription name
    #[arg(long)]
    pub name: Option<String>,
}

impl From<ReportArgs> for ReportRequest {
    fn from(args: ReportArgs) -> Self {
        ReportRequest {
            start_date: args.start.map(Scalar::from),
            end_date: args.end.map(Scalar::from),
            doctor_id: args.doctor.map(Scalar::from),
            prescription_name: args.name.map(Scalar::from),
        }
    }
}

/// Runs one subcommand and returns what should be printed.
pub async fn handle_command(client: &ApiClient, command: RxCommand) -> Result<String, ClientError> {
    match command {
        RxCommand::List => {
            let prescriptions = client.list_prescriptions().await?;
            Ok(render::prescriptions_table(&prescriptions))
        }
        RxCommand::Doctors => {
            let doctors = client.list_doctors().await?;
            Ok(render::doctors_table(&doctors))
        }
        RxCommand::Add(fields) => {
            let created = client.create_prescription(&fields.into()).await?;
            info!("Created prescription {}", created.id);
            Ok(format!(
                "Created prescription {} ({}) for {}",
                created.id,
                created.prescription_name,
                created.doctor_display_name()
            ))
        }
        RxCommand::Update { id, fields } => {
            let updated = client.update_prescription(&id, &fields.into()).await?;
            Ok(format!(
                "Updated prescription {} ({}) for {}",
                updated.id,
                updated.prescription_name,
                updated.doctor_display_name()
            ))
        }
        RxCommand::Delete { id } => client.delete_prescription(&id).await,
        RxCommand::Report(args) => {
            let report = client.report(&args.into()).await?;
            Ok(render::report(&report))
        }
        RxCommand::Filters => {
            let filters = client.report_filters().await?;
            Ok(render::filters(&filters))
        }
        RxCommand::Health => {
            let health = client.health().await?;
            Ok(format!(
                "API at {} is {} (storage: {})",
                client.base_url(),
                health["status"].as_str().unwrap_or("unknown"),
                health["storage"].as_str().unwrap_or("unknown")
            ))
        }
    }
}

/// The one line printed to stderr when a command fails. Server messages for
/// rejected requests are shown as-is; anything else points at the debug log.
pub fn failure_notice(err: &ClientError, api_url: &str) -> String {
    if err.is_user_facing() {
        err.to_string()
    } else {
        format!("Request to {} failed. Set RUST_LOG=debug for details.", api_url)
    }
}
