//! Authentication error types.

use thiserror::Error;

use crate::firebase::FirebaseError;

/// Errors that can occur when signing an operator in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] cafe_pos_core::EmailError),

    /// Wrong password, unknown account or malformed email at the provider.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The federated prompt was dismissed or returned no credential.
    #[error("federated sign-in cancelled")]
    FederatedCancelled,

    /// The provider refused the federated credential.
    #[error("federated sign-in rejected: {0}")]
    FederatedRejected(String),

    /// The account exists but is disabled.
    #[error("user disabled")]
    UserDisabled,

    /// The refresh token was revoked or has expired; the operator must sign
    /// in again.
    #[error("session expired")]
    SessionExpired,

    /// The provider is throttling this account.
    #[error("too many attempts")]
    TooManyAttempts,

    /// Transport or unexpected provider failure.
    #[error("provider error: {0}")]
    Provider(#[from] FirebaseError),
}

impl AuthError {
    /// Short code carried in the login redirect (`/auth/login?error=...`).
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) | Self::InvalidCredentials => "credentials",
            Self::FederatedCancelled | Self::FederatedRejected(_) => "google",
            Self::UserDisabled => "disabled",
            Self::TooManyAttempts => "throttled",
            Self::SessionExpired => "session",
            Self::Provider(_) => "unavailable",
        }
    }

    /// Whether the failure is on our side (or the provider's) rather than the
    /// operator's.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

/// Operator-facing text for a login error code.
///
/// Unknown codes yield `None` so a tampered query string renders no banner.
#[must_use]
pub fn login_message(code: &str) -> Option<&'static str> {
    match code {
        "credentials" => Some("Login failed. Check your email and password."),
        "google" => Some("Failed to sign in with Google."),
        "disabled" => Some("This account has been disabled. Contact the store manager."),
        "throttled" => Some("Too many attempts. Please wait a moment and try again."),
        "unavailable" => Some("Sign-in is unavailable right now. Please try again."),
        "session" => Some("Your session has expired. Please sign in again."),
        _ => None,
    }
}
