//! Operator authentication boundary.
//!
//! The identity provider owns accounts, passwords and token issuance. The POS
//! hands it credentials and gets back an [`OperatorSession`] or an
//! [`AuthError`]; it never sees password hashes.

mod error;

pub use error::{AuthError, login_message};

use async_trait::async_trait;

use cafe_pos_core::OperatorSession;

/// Signs operators in and out.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email/password pair
    /// and `AuthError::Provider` if the provider cannot be reached.
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<OperatorSession, AuthError>;

    /// Sign in with a federated (Google) ID token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::FederatedCancelled` for an empty credential and
    /// `AuthError::FederatedRejected` if the provider refuses it.
    async fn sign_in_with_federated(&self, credential: &str)
    -> Result<OperatorSession, AuthError>;

    /// Exchange the session's refresh token for a new ID token.
    ///
    /// The returned session keeps the operator's identity and carries the new
    /// tokens and expiry.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::SessionExpired` if the refresh token is missing,
    /// revoked or expired.
    async fn refresh(&self, session: &OperatorSession) -> Result<OperatorSession, AuthError>;

    /// End the operator's session at the provider.
    ///
    /// Sign-out must always succeed locally, so this is infallible; providers
    /// log their own failures.
    async fn sign_out(&self, session: &OperatorSession);
}
