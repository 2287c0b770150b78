//! CLI command implementations.

mod api;
mod auth;
mod password;
mod resources;

pub use api::{probe, request};
pub use auth::{login, logout, me, refresh, register};
pub use password::{password_change, password_check_token, password_confirm, password_forgot};
pub use resources::{
    account_delete, account_export, cart_add, cart_clear, cart_remove, cart_save, cart_show,
    dish_delete, dish_show, dishes_list, ingredients_list, list_delete, list_items, list_set,
    lists_show,
};

use crate::output::{self, OutputFormat};
use anyhow::Result;
use auth_service::{AuthService, Credentials};
use pantry_api::PantryApi;
use pantry_config_and_utils::Config;
use session_gateway::{Gateway, ReqwestTransport, SessionLossCallback, TransportConfig};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

/// One gateway per process: the auth and resource services share its
/// cookie store and renewal coordinator.
pub struct Client {
    pub config: Config,
    pub gateway: Gateway,
    pub auth: AuthService,
    pub api: PantryApi,
}

impl Client {
    /// Build the HTTP stack described by `config`.
    pub fn connect(config: Config) -> Result<Self> {
        let base_url = config.api_base_url()?;
        let transport = ReqwestTransport::new(
            TransportConfig::new(base_url.clone()).with_timeout(config.request_timeout()),
        )?;
        let gateway = Gateway::new(Arc::new(transport), config.gateway_config());
        debug!(base_url = %base_url, "Gateway ready");

        Ok(Self {
            auth: AuthService::new(gateway.clone()),
            api: PantryApi::new(gateway.clone()),
            gateway,
            config,
        })
    }

    /// Notice printed once the session is gone for good.
    pub fn session_loss_notice(&self, format: OutputFormat) -> SessionLossCallback {
        let sign_in_path = self.config.sign_in_path.clone();
        Arc::new(move || {
            output::print_error(
                &format!("Session expired. Sign in again: navigate to {}", sign_in_path),
                format,
            );
        })
    }

    /// Sign in when credentials are given, then bind `on_loss`.
    ///
    /// The listener goes in only after a successful sign-in, so bad
    /// credentials surface as a login error rather than a lost session.
    pub async fn start_session(
        &self,
        sign_in: Option<(&str, String)>,
        on_loss: SessionLossCallback,
    ) -> Result<()> {
        if let Some((email, password)) = sign_in {
            debug!(email, "Signing in before command");
            self.auth.login(&Credentials::new(email, password)).await?;
        }
        self.gateway.signal().set_listener(on_loss);
        Ok(())
    }
}

/// Password for a sign-in before the command: `PANTRY_PASSWORD` or a prompt.
pub fn sign_in_password() -> Result<String> {
    match std::env::var("PANTRY_PASSWORD") {
        Ok(password) if !password.is_empty() => Ok(password),
        _ => prompt_password("Password: "),
    }
}

/// Read a line from stdin after printing `label`.
fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

/// Read a password without echo; empty input is an error.
fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(label)?;
    if password.is_empty() {
        anyhow::bail!("Password is required");
    }
    Ok(password)
}
