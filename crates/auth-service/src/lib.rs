//! Authentication endpoints of the Pantry API.
//!
//! Every call is routed through a [`session_gateway::Gateway`], so an
//! expired session is renewed transparently before the call is retried.

mod error;
mod service;
mod types;

pub use error::{AuthError, AuthResult};
pub use service::AuthService;
pub use types::{
    Credentials, LoginOutcome, PasswordChange, PasswordResetConfirmation, Registration,
    UserProfile,
};
