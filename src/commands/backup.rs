//! Backup command: exports each configured table to a JSON file.
//!
//! Layout: `<output>/<timestamp>/<table>.json` plus `manifest.json`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;
use tracing::{info, warn};

use clinicdesk_auth::Feature;
use clinicdesk_core::error::{AppError, ErrorKind};
use clinicdesk_core::traits::DataClient;

use crate::app::App;
use crate::output::{self, OutputFormat};

/// Arguments for the backup command
#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Output directory (defaults to `backup.output_dir`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Result of exporting one table.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct TableExport {
    /// Table name
    pub table: String,
    /// Rows written
    pub rows: usize,
    /// `ok` or the error message
    pub status: String,
}

/// Summary written as `manifest.json`.
#[derive(Debug, Clone, Serialize)]
pub struct BackupManifest {
    /// When the export started.
    pub created_at: DateTime<Utc>,
    /// Directory holding the exported files.
    pub directory: PathBuf,
    /// Per-table results, in export order.
    pub tables: Vec<TableExport>,
}

impl BackupManifest {
    /// Tables that could not be exported.
    pub fn failures(&self) -> usize {
        self.tables.iter().filter(|t| t.status != "ok").count()
    }
}

/// Export `tables` into a new timestamped directory under `root`.
///
/// A table that cannot be read is recorded in the manifest and skipped;
/// failing to write a file aborts the run.
pub async fn export_tables(
    data: &dyn DataClient,
    tables: &[String],
    root: &Path,
    now: DateTime<Utc>,
) -> Result<BackupManifest, AppError> {
    let directory = root.join(now.format("%Y-%m-%dT%H-%M-%SZ").to_string());
    tokio::fs::create_dir_all(&directory).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to create '{}': {e}", directory.display()),
            e,
        )
    })?;

    let mut exports = Vec::with_capacity(tables.len());
    for table in tables {
        let export = match data.fetch_all(table).await {
            Ok(rows) => {
                write_json(&directory.join(format!("{table}.json")), &rows).await?;
                info!(table = %table, rows = rows.len(), "Table exported");
                TableExport {
                    table: table.clone(),
                    rows: rows.len(),
                    status: "ok".to_string(),
                }
            }
            Err(e) => {
                warn!(table = %table, error = %e, "Table export failed");
                TableExport {
                    table: table.clone(),
                    rows: 0,
                    status: e.to_string(),
                }
            }
        };
        exports.push(export);
    }

    let manifest = BackupManifest {
        created_at: now,
        directory: directory.clone(),
        tables: exports,
    };
    write_json(&directory.join("manifest.json"), &manifest).await?;
    Ok(manifest)
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), AppError> {
    let json = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, json).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to write '{}': {e}", path.display()),
            e,
        )
    })
}

/// Execute the backup command
pub async fn execute(args: &BackupArgs, app: &App, format: OutputFormat) -> Result<(), AppError> {
    app.auth.start().await;
    app.auth.require(Feature::DataBackup)?;

    let root = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&app.config.backup.output_dir));
    let manifest = export_tables(
        app.data.as_ref(),
        &app.config.backup.tables,
        &root,
        Utc::now(),
    )
    .await?;

    output::print_list(&manifest.tables, format);
    match manifest.failures() {
        0 => output::print_success(&format!(
            "Backup written to {}",
            manifest.directory.display()
        )),
        n => output::print_warning(&format!(
            "Backup written to {} with {n} failed table(s)",
            manifest.directory.display()
        )),
    }
    Ok(())
}
