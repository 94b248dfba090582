//! Identity Toolkit client (operator sign-in) and Secure Token client (ID
//! token refresh).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use cafe_pos_core::{Email, OperatorId, OperatorSession};

use super::{FirebaseError, send_json};
use crate::config::FirebaseConfig;
use crate::services::auth::{AuthError, AuthProvider};

const IDENTITY_TOOLKIT_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

/// Token lifetime assumed when the response omits `expiresIn`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// Firebase Identity Toolkit REST client.
///
/// Cheaply cloneable; clones share the underlying HTTP connection pool.
#[derive(Clone)]
pub struct IdentityToolkitClient {
    inner: Arc<IdentityToolkitClientInner>,
}

struct IdentityToolkitClientInner {
    client: reqwest::Client,
    api_key: SecretString,
    /// Sent as `requestUri` on IdP sign-in; must be an authorized domain.
    request_uri: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordSignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpSignInRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
    return_idp_credential: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

/// Secure Token `grant_type=refresh_token` response. Unlike Identity Toolkit,
/// this endpoint answers in `snake_case`.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    user_id: String,
}

impl RefreshResponse {
    fn apply(
        self,
        session: &OperatorSession,
        now: DateTime<Utc>,
    ) -> Result<OperatorSession, AuthError> {
        if self.user_id != session.operator_id.as_str() {
            return Err(AuthError::SessionExpired);
        }
        Ok(OperatorSession {
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at: now + Duration::seconds(token_lifetime(self.expires_in.as_deref())),
            ..session.clone()
        })
    }
}

/// Seconds until expiry from an `expiresIn` string.
fn token_lifetime(expires_in: Option<&str>) -> i64 {
    expires_in
        .and_then(|secs| secs.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
}

impl SignInResponse {
    fn into_session(self, now: DateTime<Utc>) -> Result<OperatorSession, AuthError> {
        let email = self
            .email
            .as_deref()
            .ok_or_else(|| AuthError::FederatedRejected("account has no email".to_string()))?;
        let lifetime = token_lifetime(self.expires_in.as_deref());

        Ok(OperatorSession {
            operator_id: OperatorId::new(self.local_id),
            email: Email::parse(email)?,
            display_name: self.display_name.filter(|name| !name.is_empty()),
            id_token: self.id_token,
            refresh_token: self.refresh_token,
            expires_at: now + Duration::seconds(lifetime),
        })
    }
}

impl IdentityToolkitClient {
    /// Create a client for the project in `config`.
    ///
    /// `request_uri` is the public URL of the sales screen.
    #[must_use]
    pub fn new(config: &FirebaseConfig, request_uri: &Url) -> Self {
        Self {
            inner: Arc::new(IdentityToolkitClientInner {
                client: reqwest::Client::new(),
                api_key: config.api_key.clone(),
                request_uri: request_uri.to_string(),
            }),
        }
    }

    fn endpoint(&self, method: &str) -> Result<Url, FirebaseError> {
        let mut url = Url::parse(&format!("{IDENTITY_TOOLKIT_BASE}/accounts:{method}"))?;
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        Ok(url)
    }

    fn refresh_endpoint(&self) -> Result<Url, FirebaseError> {
        let mut url = Url::parse(SECURE_TOKEN_URL)?;
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        Ok(url)
    }

    async fn sign_in<B: Serialize + Sync>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<SignInResponse, FirebaseError> {
        let url = self.endpoint(method)?;
        send_json(self.inner.client.post(url).json(body)).await
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitClient {
    #[instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<OperatorSession, AuthError> {
        // Reject obviously malformed input before spending a provider call.
        let email = Email::parse(email)?;

        let request = PasswordSignInRequest {
            email: email.as_str(),
            password,
            return_secure_token: true,
        };
        let response = self
            .sign_in("signInWithPassword", &request)
            .await
            .map_err(password_error)?;

        response.into_session(Utc::now())
    }

    #[instrument(skip(self, credential))]
    async fn sign_in_with_federated(
        &self,
        credential: &str,
    ) -> Result<OperatorSession, AuthError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AuthError::FederatedCancelled);
        }

        let post_body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("id_token", credential)
            .append_pair("providerId", "google.com")
            .finish();
        let request = IdpSignInRequest {
            post_body,
            request_uri: &self.inner.request_uri,
            return_secure_token: true,
            return_idp_credential: true,
        };
        let response = self
            .sign_in("signInWithIdp", &request)
            .await
            .map_err(federated_error)?;

        response.into_session(Utc::now())
    }

    #[instrument(skip_all, fields(operator_id = %session.operator_id))]
    async fn refresh(&self, session: &OperatorSession) -> Result<OperatorSession, AuthError> {
        if !session.can_refresh() {
            return Err(AuthError::SessionExpired);
        }

        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("refresh_token", &session.refresh_token)
            .finish();
        let request = self
            .inner
            .client
            .post(self.refresh_endpoint()?)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body);
        let response: RefreshResponse = send_json(request).await.map_err(refresh_error)?;

        tracing::debug!("ID token refreshed");
        response.apply(session, Utc::now())
    }

    #[instrument(skip_all, fields(operator_id = %session.operator_id))]
    async fn sign_out(&self, session: &OperatorSession) {
        // ID tokens are stateless; the REST API has no revoke call for them.
        // Dropping the token from the session is the whole sign-out.
        tracing::debug!("Operator token discarded");
    }
}

/// Map an `accounts:signInWithPassword` failure.
fn password_error(err: FirebaseError) -> AuthError {
    let code = err.api_code().map(str::to_owned);
    match code.as_deref() {
        Some(
            "EMAIL_NOT_FOUND"
            | "INVALID_PASSWORD"
            | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_EMAIL"
            | "MISSING_PASSWORD",
        ) => AuthError::InvalidCredentials,
        Some("USER_DISABLED") => AuthError::UserDisabled,
        Some("TOO_MANY_ATTEMPTS_TRY_LATER") => AuthError::TooManyAttempts,
        _ => AuthError::Provider(err),
    }
}

/// Map an `accounts:signInWithIdp` failure.
fn federated_error(err: FirebaseError) -> AuthError {
    let code = err.api_code().map(str::to_owned);
    match code.as_deref() {
        Some("USER_DISABLED") => AuthError::UserDisabled,
        Some("TOO_MANY_ATTEMPTS_TRY_LATER") => AuthError::TooManyAttempts,
        Some(
            code @ ("INVALID_IDP_RESPONSE"
            | "INVALID_CREDENTIAL_OR_PROVIDER_ID"
            | "FEDERATED_USER_ID_ALREADY_LINKED"
            | "OPERATION_NOT_ALLOWED"),
        ) => AuthError::FederatedRejected(code.to_string()),
        _ => AuthError::Provider(err),
    }
}

/// Map a Secure Token refresh failure.
fn refresh_error(err: FirebaseError) -> AuthError {
    let code = err.api_code().map(str::to_owned);
    match code.as_deref() {
        Some(
            "TOKEN_EXPIRED"
            | "INVALID_REFRESH_TOKEN"
            | "USER_NOT_FOUND"
            | "MISSING_REFRESH_TOKEN"
            | "INVALID_GRANT_TYPE",
        ) => AuthError::SessionExpired,
        Some("USER_DISABLED") => AuthError::UserDisabled,
        Some("TOO_MANY_ATTEMPTS_TRY_LATER") => AuthError::TooManyAttempts,
        _ => AuthError::Provider(err),
    }
}
