//! Firebase REST clients.
//!
//! # APIs
//!
//! ## Identity Toolkit
//! - `accounts:signInWithPassword` - email/password sign-in
//! - `accounts:signInWithIdp` - Google ID token exchange
//!
//! ## Firestore
//! - `documents/{collection}` - list product documents (paged)
//!
//! Both clients authenticate the project with the web API key (`key=` query
//! parameter). Firestore calls additionally carry the operator's ID token so
//! security rules see the signed-in user.

mod firestore;
mod identity;

pub use firestore::FirestoreClient;
pub use identity::IdentityToolkitClient;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur when calling Firebase REST APIs.
#[derive(Debug, Error)]
pub enum FirebaseError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with an error envelope.
    #[error("API error (HTTP {status}): {code}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error code from the envelope (e.g. `INVALID_LOGIN_CREDENTIALS`).
        code: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl FirebaseError {
    /// The envelope error code, if the API returned one.
    #[must_use]
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// `{"error": {"code": 400, "message": "...", "status": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Build a [`FirebaseError::Api`] from a non-success response body.
///
/// Identity Toolkit puts a machine code in `message`, sometimes followed by
/// ` : human text`; Firestore puts it in `status`.
fn api_error(status: u16, body: &str) -> FirebaseError {
    let code = serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| format!("HTTP_{status}"),
        |envelope| {
            let message = envelope
                .error
                .message
                .split(" : ")
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            match envelope.error.status {
                Some(status) if message.is_empty() || message.contains(' ') => status,
                _ => message,
            }
        },
    );
    FirebaseError::Api { status, code }
}

/// Send a request and decode a JSON body, mapping error envelopes.
async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, FirebaseError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let err = api_error(status.as_u16(), &body);
        tracing::debug!(
            status = %status,
            error = %err,
            "Firebase API returned non-success status"
        );
        return Err(err);
    }

    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse Firebase response"
            );
            Err(FirebaseError::Parse(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_toolkit_code() {
        let body = r#"{"error":{"code":400,"message":"INVALID_LOGIN_CREDENTIALS","errors":[]}}"#;
        let err = api_error(400, body);
        assert_eq!(err.api_code(), Some("INVALID_LOGIN_CREDENTIALS"));
    }

    #[test]
    fn test_identity_toolkit_code_with_detail() {
        let body = r#"{"error":{"code":400,"message":"TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled."}}"#;
        let err = api_error(400, body);
        assert_eq!(err.api_code(), Some("TOO_MANY_ATTEMPTS_TRY_LATER"));
    }

    #[test]
    fn test_firestore_status_code() {
        let body = r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#;
        let err = api_error(403, body);
        assert_eq!(err.api_code(), Some("PERMISSION_DENIED"));
        assert_eq!(err.to_string(), "API error (HTTP 403): PERMISSION_DENIED");
    }

    #[test]
    fn test_non_json_body() {
        let err = api_error(502, "<html>Bad Gateway</html>");
        assert_eq!(err.api_code(), Some("HTTP_502"));
    }
}
