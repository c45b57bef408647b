//! Login command: password sign-in or OAuth redirect.

use clap::Args;

use clinicdesk_core::error::AppError;

use crate::app::App;
use crate::output::{self, OutputFormat};

/// Arguments for the login command
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (password sign-in)
    #[arg(long, requires = "password", conflicts_with = "provider")]
    pub email: Option<String>,

    /// Account password (password sign-in)
    #[arg(long, requires = "email")]
    pub password: Option<String>,

    /// OAuth provider name (defaults to the configured provider)
    #[arg(long)]
    pub provider: Option<String>,
}

/// Execute the login command
pub async fn execute(args: &LoginArgs, app: &App, format: OutputFormat) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&args.email, &args.password) else {
        let redirect = app
            .auth
            .sign_in_with_provider(args.provider.as_deref())
            .await?;
        output::print_kv("Provider", &redirect.provider);
        output::print_kv("Authorize URL", &redirect.url);
        println!("Open the URL in a browser to finish signing in.");
        return Ok(());
    };

    app.auth.sign_in_with_password(email, password).await?;
    let snapshot = app.auth.start().await;
    output::print_success(&format!("Signed in as {}", email.trim()));

    if !snapshot.is_authorized() {
        output::print_warning("This account is not authorized to use the dashboard");
    }

    super::status::print_status(&app.auth, format);
    Ok(())
}
