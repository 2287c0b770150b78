//! Password reset commands.

use super::{prompt_password, Client};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use auth_service::{PasswordChange, PasswordResetConfirmation};

/// Mail a reset link to `email`.
pub async fn password_forgot(client: &Client, email: &str, format: OutputFormat) -> Result<()> {
    let message = client.auth.request_password_reset(email).await?;
    output::print_success(&message, format);
    Ok(())
}

/// Check whether a reset token is still usable.
pub async fn password_check_token(client: &Client, token: &str, format: OutputFormat) -> Result<()> {
    client.auth.validate_reset_token(token).await?;
    output::print_success("Token is valid", format);
    Ok(())
}

/// Set a new password with a reset token.
pub async fn password_confirm(client: &Client, token: &str, format: OutputFormat) -> Result<()> {
    let new_password = read_new_password()?;
    client
        .auth
        .confirm_password_reset(&PasswordResetConfirmation {
            token: token.to_string(),
            new_password,
        })
        .await?;
    output::print_success("Password updated", format);
    Ok(())
}

/// Change the password of the signed-in user.
pub async fn password_change(client: &Client, format: OutputFormat) -> Result<()> {
    let current_password = prompt_password("Current password: ")?;
    let new_password = read_new_password()?;
    client
        .auth
        .reset_password(&PasswordChange {
            current_password,
            new_password,
        })
        .await?;
    output::print_success("Password changed", format);
    Ok(())
}

fn read_new_password() -> Result<String> {
    let new_password = prompt_password("New password: ")?;
    let repeated = prompt_password("Repeat new password: ")?;
    if new_password != repeated {
        anyhow::bail!("Passwords do not match");
    }
    Ok(new_password)
}
