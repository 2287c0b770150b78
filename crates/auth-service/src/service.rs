//! Authentication calls routed through the session gateway.

use crate::error::{AuthError, AuthResult};
use crate::types::{
    Credentials, LoginOutcome, PasswordChange, PasswordResetConfirmation, Registration,
    UserProfile,
};
use session_gateway::{ApiRequest, ApiResponse, Gateway, GatewayError};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::{debug, info, warn};
use url::form_urlencoded;

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Client for the `/auth/*` endpoints.
#[derive(Clone)]
pub struct AuthService {
    gateway: Gateway,
}

impl AuthService {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Sign in. The backend sets the session cookies on success.
    ///
    /// Bad credentials surface as [`AuthError::InvalidCredentials`], even
    /// when the backend's 401 first sent the gateway through a renewal.
    pub async fn login(&self, credentials: &Credentials) -> AuthResult<LoginOutcome> {
        let request = ApiRequest::post("/auth/login").json(credentials)?;
        let response = match self.gateway.perform(request).await {
            Ok(response) => response,
            Err(GatewayError::SessionLost) => {
                // An explicit sign-in attempt is already the re-authentication path
                self.gateway.signal().reset();
                return Err(AuthError::InvalidCredentials);
            }
            Err(err) => return Err(err.into()),
        };

        let response = expect_success("login", response)?;

        let outcome: LoginOutcome = if response.body().is_empty() {
            LoginOutcome {
                success: true,
                message: None,
            }
        } else {
            response.json()?
        };
        if !outcome.success {
            return Err(AuthError::InvalidCredentials);
        }

        self.gateway.signal().reset();
        info!(email = %credentials.email, "Signed in");
        Ok(outcome)
    }

    /// Sign out; the backend clears the session cookies.
    pub async fn logout(&self) -> AuthResult<()> {
        let response = self.gateway.perform(ApiRequest::post("/auth/logout")).await?;
        expect_success("logout", response)?;
        info!("Signed out");
        Ok(())
    }

    /// Create an account. The backend mails an activation link.
    pub async fn register(&self, registration: &Registration) -> AuthResult<UserProfile> {
        if registration.password != registration.confirm_password {
            return Err(AuthError::InvalidInput("Passwords do not match".into()));
        }

        let request = ApiRequest::post("/auth/register").json(registration)?;
        let response = self.gateway.perform(request).await?;
        let profile: UserProfile = expect_success("register", response)?.json()?;
        info!(user_id = profile.id, "Registered account");
        Ok(profile)
    }

    /// Profile of the signed-in user.
    pub async fn me(&self) -> AuthResult<UserProfile> {
        let response = self.gateway.perform(ApiRequest::get("/auth/me")).await?;
        Ok(expect_success("me", response)?.json()?)
    }

    /// Renew the session now, sharing any renewal already in flight.
    pub async fn refresh(&self) -> AuthResult<()> {
        self.gateway.refresh_session().await?;
        Ok(())
    }

    /// Ask for a reset link. The backend answers the same whether or not
    /// the email is registered.
    pub async fn request_password_reset(&self, email: &str) -> AuthResult<String> {
        let request = ApiRequest::post("/auth/reset-password")
            .json(&serde_json::json!({ "email": email }))?;
        let response = self.gateway.perform(request).await?;
        Ok(expect_success("request_password_reset", response)?.text())
    }

    /// Check a reset token before asking for the new password.
    pub async fn validate_reset_token(&self, token: &str) -> AuthResult<()> {
        let query: String = form_urlencoded::byte_serialize(token.as_bytes()).collect();
        let request = ApiRequest::get(format!("/auth/reset-password?token={}", query));
        let response = self.gateway.perform(request).await?;
        expect_success("validate_reset_token", response)?;
        Ok(())
    }

    /// Set a new password using a mailed reset token.
    pub async fn confirm_password_reset(
        &self,
        confirmation: &PasswordResetConfirmation,
    ) -> AuthResult<()> {
        let request = ApiRequest::post("/auth/reset-password/confirm").json(confirmation)?;
        let response = self.gateway.perform(request).await?;
        expect_success("confirm_password_reset", response)?;
        Ok(())
    }

    /// Change the password of the signed-in user.
    pub async fn reset_password(&self, change: &PasswordChange) -> AuthResult<()> {
        let request = ApiRequest::put("/auth/reset-password").json(change)?;
        let response = self.gateway.perform(request).await?;
        expect_success("reset_password", response)?;
        Ok(())
    }
}

fn expect_success(operation: &'static str, response: ApiResponse) -> AuthResult<ApiResponse> {
    if response.is_success() {
        debug!(operation, status = response.status(), "Auth call succeeded");
        return Ok(response);
    }

    let body = response.text();
    warn!(
        operation,
        status = response.status(),
        body_summary = %summarize_response_body(&body),
        "Auth call failed"
    );
    Err(AuthError::Api {
        status: response.status(),
        body,
    })
}
