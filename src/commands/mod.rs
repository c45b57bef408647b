//! CLI command definitions and dispatch.

pub mod backup;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod status;
pub mod theme;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::warn;

use clinicdesk_auth::{AuditOutcome, AuditReport};
use clinicdesk_core::config::AppConfig;
use clinicdesk_core::error::AppError;

use crate::app::App;
use crate::output::{self, OutputFormat};

/// How long to wait for login audits before exiting.
const AUDIT_WAIT: Duration = Duration::from_secs(3);

/// ClinicDesk — dental clinic dashboard operator tool
#[derive(Debug, Parser)]
#[command(name = "clinicdesk", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding `default.toml` and environment overlays
    #[arg(short, long, default_value = "config")]
    pub config_dir: PathBuf,

    /// Environment overlay to apply (`config/<env>.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sign in with a password or start an OAuth sign-in
    Login(login::LoginArgs),
    /// Sign out and clear the local session
    Logout,
    /// Show the current identity, role and access
    Status,
    /// Re-run the role lookup for the current identity
    Refresh,
    /// Show or change the theme preference
    Theme(theme::ThemeArgs),
    /// Export clinic tables to JSON files (admin only)
    Backup(backup::BackupArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        let app = App::new(config);
        let mut reports = app.auth.audit_reports();
        let result = match &self.command {
            Commands::Login(args) => login::execute(args, &app, self.format).await,
            Commands::Logout => logout::execute(&app).await,
            Commands::Status => status::execute(&app, self.format).await,
            Commands::Refresh => refresh::execute(&app, self.format).await,
            Commands::Theme(args) => theme::execute(args, &app, self.format).await,
            Commands::Backup(args) => backup::execute(args, &app, self.format).await,
        };
        settle_audits(&app, &mut reports).await;
        app.auth.shutdown().await;
        result
    }
}

/// Gives detached login audits a moment to finish and reports failures.
///
/// Any command that starts the auth service may have dispatched one.
async fn settle_audits(app: &App, reports: &mut broadcast::Receiver<AuditReport>) {
    if !app.auth.settle_audits(AUDIT_WAIT).await {
        warn!("Exiting with login audits still running");
        output::print_warning("Login audit still pending");
    }

    loop {
        match reports.try_recv() {
            Ok(AuditReport {
                email,
                outcome: AuditOutcome::Failed(error),
            }) => output::print_warning(&format!("Login audit for {email} failed: {error}")),
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
