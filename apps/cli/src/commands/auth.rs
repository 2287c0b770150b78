//! Authentication commands.

use super::{prompt, prompt_password, Client};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use auth_service::{Credentials, Registration, UserProfile};

fn print_profile(profile: &UserProfile, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            output::print_row("User", &profile.display_name());
            output::print_row("Email", &profile.email);
            output::print_row("User ID", &profile.id.to_string());
            output::print_row("Type", profile.user_type.as_deref().unwrap_or("unknown"));
        }
        OutputFormat::Json => output::print_json(profile),
    }
}

/// Sign in with email and password, then show the profile.
pub async fn login(client: &Client, email: Option<&str>, format: OutputFormat) -> Result<()> {
    let email = match email {
        Some(email) => email.to_string(),
        None => prompt("Email: ")?,
    };
    if email.is_empty() {
        anyhow::bail!("Email is required");
    }
    let password = prompt_password("Password: ")?;

    let outcome = client.auth.login(&Credentials::new(&email, password)).await?;
    if format == OutputFormat::Text {
        println!("{}", outcome.message.as_deref().unwrap_or("Logged in"));
    }

    let profile = client.auth.me().await?;
    print_profile(&profile, format);
    Ok(())
}

/// Sign out.
pub async fn logout(client: &Client, format: OutputFormat) -> Result<()> {
    client.auth.logout().await?;
    output::print_success("Logged out successfully", format);
    Ok(())
}

/// Show the signed-in user.
pub async fn me(client: &Client, format: OutputFormat) -> Result<()> {
    let profile = client.auth.me().await?;
    print_profile(&profile, format);
    Ok(())
}

/// Renew the session immediately.
pub async fn refresh(client: &Client, format: OutputFormat) -> Result<()> {
    client.auth.refresh().await?;
    output::print_success("Session renewed", format);
    Ok(())
}

/// Create an account; the backend sends an activation email.
pub async fn register(
    client: &Client,
    email: &str,
    first_name: &str,
    last_name: &str,
    format: OutputFormat,
) -> Result<()> {
    let password = prompt_password("Password: ")?;
    let confirm_password = prompt_password("Confirm password: ")?;

    let profile = client
        .auth
        .register(&Registration {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            password,
            confirm_password,
        })
        .await?;

    match format {
        OutputFormat::Text => println!(
            "Registered {}. Check your inbox for the activation link.",
            profile.email
        ),
        OutputFormat::Json => output::print_json(&profile),
    }
    Ok(())
}
