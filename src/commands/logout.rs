//! Logout command.

use clinicdesk_core::error::AppError;

use crate::app::App;
use crate::output;

/// Execute the logout command
pub async fn execute(app: &App) -> Result<(), AppError> {
    app.auth.start().await;
    let email = app.auth.identity().await.and_then(|i| i.email);

    // Local state is cleared even if this fails.
    app.auth.sign_out().await?;

    match email {
        Some(email) => output::print_success(&format!("Signed out {email}")),
        None => output::print_success("No active session"),
    }
    Ok(())
}
