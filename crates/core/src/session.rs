//! Signed-in state of a terminal.
//!
//! The identity provider owns the session lifecycle; the POS only needs to
//! know whether a cashier is signed in and who it is. [`SessionState`] makes
//! both cases explicit so every consumer has to handle the anonymous one.

use core::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, OperatorId};

/// ID tokens this close to expiry are refreshed before use.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// An authenticated cashier.
///
/// `Debug` redacts both tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorSession {
    pub operator_id: OperatorId,
    pub email: Email,
    pub display_name: Option<String>,
    /// Provider-issued ID token, forwarded to the catalog store.
    pub id_token: String,
    /// Long-lived token exchanged for a new ID token when this one expires.
    #[serde(default)]
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl OperatorSession {
    /// Whether the ID token is past its expiry at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the ID token expires within [`TOKEN_REFRESH_MARGIN_SECS`] of
    /// `now` and should be exchanged first.
    #[must_use]
    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= self.expires_at
    }

    /// Whether the provider issued a refresh token for this session.
    #[must_use]
    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }

    /// Name to greet the operator with.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}

impl fmt::Debug for OperatorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorSession")
            .field("operator_id", &self.operator_id)
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Whether a terminal is signed in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "operator", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(OperatorSession),
}
