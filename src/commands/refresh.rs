//! Role refresh command.

use clinicdesk_core::error::AppError;

use crate::app::App;
use crate::output::{self, OutputFormat};

/// Execute the refresh command
pub async fn execute(app: &App, format: OutputFormat) -> Result<(), AppError> {
    app.auth.start().await;
    if app.auth.identity().await.is_none() {
        output::print_warning("Not signed in");
        return Ok(());
    }

    let state = app.auth.refresh_user_role().await;
    output::print_success(&format!("Role refreshed: {}", state.role));
    super::status::print_status(&app.auth, format);
    Ok(())
}
