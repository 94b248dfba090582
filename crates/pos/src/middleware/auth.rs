//! Session gate extractors.
//!
//! The sales screen is only reachable with an authenticated operator in the
//! session. ID tokens close to expiry are refreshed on the way in, so a
//! signed-in operator stays signed in until logout or session idle timeout.
//! An operator whose token has expired and cannot be refreshed is sent back
//! to the login page.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_sessions::Session;

use cafe_pos_core::{OperatorSession, SessionState};

use super::htmx::{HX_REDIRECT, is_htmx_request};
use crate::models::{ScreenId, session_keys};
use crate::screens::ScreenRegistry;
use crate::services::AuthProvider;
use crate::state::AppState;

/// Login page path.
pub const LOGIN_PATH: &str = "/auth/login";

/// Login page path explaining that the previous session expired.
const LOGIN_EXPIRED_PATH: &str = "/auth/login?error=session";

/// Extractor that requires a signed-in operator.
///
/// If nobody is signed in, redirects to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn sales_screen(
///     RequireOperator(operator): RequireOperator,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", operator.label())
/// }
/// ```
pub struct RequireOperator(pub OperatorSession);

/// Error returned when an operator is required but none is signed in.
pub enum AuthRejection {
    /// Redirect to login page (for full page requests).
    RedirectToLogin { expired: bool },
    /// Ask HTMX to navigate to the login page (for fragment requests).
    HtmxRedirect { expired: bool },
    /// The session layer is missing from the stack.
    SessionUnavailable,
}

impl AuthRejection {
    const fn location(expired: bool) -> &'static str {
        if expired { LOGIN_EXPIRED_PATH } else { LOGIN_PATH }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { expired } => {
                Redirect::to(Self::location(expired)).into_response()
            }
            Self::HtmxRedirect { expired } => (
                StatusCode::UNAUTHORIZED,
                [(HX_REDIRECT, Self::location(expired))],
            )
                .into_response(),
            Self::SessionUnavailable => {
                tracing::error!("Session layer missing from request extensions");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl FromRequestParts<AppState> for RequireOperator {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::SessionUnavailable)?;

        let expired = match resolve_operator(session, state.auth()).await {
            Gate::Active(operator) => return Ok(Self(operator)),
            Gate::Expired => true,
            Gate::Anonymous => false,
        };

        if is_htmx_request(&parts.headers) {
            Err(AuthRejection::HtmxRedirect { expired })
        } else {
            Err(AuthRejection::RedirectToLogin { expired })
        }
    }
}

/// Extractor that optionally gets the signed-in operator.
///
/// Unlike `RequireOperator`, this does not reject the request if nobody is
/// signed in.
pub struct OptionalOperator(pub Option<OperatorSession>);

impl FromRequestParts<AppState> for OptionalOperator {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let operator = match parts.extensions.get::<Session>() {
            Some(session) => match resolve_operator(session, state.auth()).await {
                Gate::Active(operator) => Some(operator),
                Gate::Expired | Gate::Anonymous => None,
            },
            None => None,
        };

        Ok(Self(operator))
    }
}

/// Outcome of checking a terminal's session.
enum Gate {
    Active(OperatorSession),
    /// Signed in, but the token expired and could not be refreshed.
    Expired,
    Anonymous,
}

/// Find the signed-in operator, refreshing a token that is about to expire.
async fn resolve_operator(session: &Session, auth: &dyn AuthProvider) -> Gate {
    let SessionState::Authenticated(operator) = load_state(session).await else {
        return Gate::Anonymous;
    };

    let now = Utc::now();
    if !operator.needs_refresh_at(now) {
        return Gate::Active(operator);
    }

    match auth.refresh(&operator).await {
        Ok(refreshed) => {
            tracing::debug!(operator_id = %refreshed.operator_id, "Operator token refreshed");
            let stored = session
                .insert(
                    session_keys::SESSION_STATE,
                    SessionState::Authenticated(refreshed.clone()),
                )
                .await;
            if let Err(e) = stored {
                tracing::warn!(error = %e, "Failed to store refreshed operator token");
            }
            Gate::Active(refreshed)
        }
        Err(e) if !operator.is_expired_at(now) => {
            tracing::warn!(error = %e, "Token refresh failed; current token still valid");
            Gate::Active(operator)
        }
        Err(e) => {
            tracing::info!(
                operator_id = %operator.operator_id,
                error = %e,
                "Operator session expired"
            );
            Gate::Expired
        }
    }
}

/// Read the terminal's session state. Unreadable state counts as anonymous.
async fn load_state(session: &Session) -> SessionState {
    match session.get::<SessionState>(session_keys::SESSION_STATE).await {
        Ok(state) => state.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session state");
            SessionState::Anonymous
        }
    }
}

/// Store a freshly signed-in operator in the session.
///
/// Cycles the session id first so a pre-login cookie cannot be replayed.
///
/// The same operator signing in again (after their session expired) gets
/// their mounted screen back, cart included. Anyone else gets a new screen
/// id and the previous screen is unmounted. The id is persisted with the
/// sign-in response, so a logout racing the first screen load can always
/// find and unmount it.
///
/// # Errors
///
/// Returns an error if the session cannot be read or modified.
pub async fn set_current_operator(
    session: &Session,
    screens: &ScreenRegistry,
    operator: OperatorSession,
) -> Result<(), tower_sessions::session::Error> {
    let previous = session
        .get::<SessionState>(session_keys::SESSION_STATE)
        .await?;
    let screen_id = session.get::<ScreenId>(session_keys::SCREEN_ID).await?;
    let same_operator = matches!(
        &previous,
        Some(SessionState::Authenticated(prev)) if prev.operator_id == operator.operator_id
    );

    session.cycle_id().await?;

    match screen_id {
        Some(id) if same_operator => {
            tracing::debug!(screen_id = %id, "Resuming screen");
        }
        stale => {
            if let Some(id) = stale {
                screens.unmount(id).await;
            }
            session
                .insert(session_keys::SCREEN_ID, ScreenId::new())
                .await?;
        }
    }

    session
        .insert(
            session_keys::SESSION_STATE,
            SessionState::Authenticated(operator),
        )
        .await
}
