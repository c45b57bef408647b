//! Theme preference commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use clinicdesk_core::error::AppError;
use clinicdesk_entity::theme::Theme;
use clinicdesk_theme::ThemeStore;

use crate::app::App;
use crate::output::{self, OutputFormat};

/// Arguments for theme commands
#[derive(Debug, Args)]
pub struct ThemeArgs {
    /// Theme subcommand
    #[command(subcommand)]
    pub command: ThemeCommand,
}

/// Theme subcommands
#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// Show the current theme
    Get,
    /// Set the theme
    Set {
        /// `light` or `dark`
        theme: Theme,
    },
    /// Switch between light and dark
    Toggle,
}

/// Theme display row
#[derive(Debug, Serialize, Tabled)]
struct ThemeRow {
    /// Current theme
    theme: String,
    /// Active style markers
    markers: String,
}

impl ThemeRow {
    fn from_store(store: &ThemeStore) -> Self {
        Self {
            theme: store.theme().to_string(),
            markers: store.markers().iter().collect::<Vec<_>>().join(" "),
        }
    }
}

/// Execute theme commands
pub async fn execute(args: &ThemeArgs, app: &App, format: OutputFormat) -> Result<(), AppError> {
    let store = app.theme_store();
    store.mount().await;

    match &args.command {
        ThemeCommand::Get => {}
        ThemeCommand::Set { theme } => {
            store.set_theme(*theme).await?;
            output::print_success(&format!("Theme set to {theme}"));
        }
        ThemeCommand::Toggle => {
            let theme = store.toggle_theme().await?;
            output::print_success(&format!("Theme switched to {theme}"));
        }
    }

    output::print_item(&ThemeRow::from_store(&store), format);
    Ok(())
}
