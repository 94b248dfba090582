//! Authentication route handlers.
//!
//! Handles email/password login, Google sign-in and logout. Failures come
//! back to the login page as `?error=<code>`; the session is left unchanged.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::{HeaderMap, header::COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cafe_pos_core::{OperatorSession, SessionState};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{LOGIN_PATH, OptionalOperator, set_current_operator};
use crate::models::{ScreenId, session_keys};
use crate::services::auth::{AuthError, login_message};
use crate::state::AppState;

/// Cookie and form field Google Identity Services uses for double-submit CSRF.
const GOOGLE_CSRF_FIELD: &str = "g_csrf_token";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Google Identity Services redirect-mode callback.
#[derive(Debug, Deserialize)]
pub struct GoogleForm {
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub g_csrf_token: Option<String>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
    pub google_client_id: Option<String>,
    pub google_login_uri: String,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
///
/// An operator who is already signed in goes straight to the sales screen.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalOperator(operator): OptionalOperator,
    Query(query): Query<MessageQuery>,
) -> Response {
    if operator.is_some() {
        return Redirect::to("/").into_response();
    }

    let google_login_uri = state
        .config()
        .base_url
        .join("/auth/google")
        .map(String::from)
        .unwrap_or_else(|_| "/auth/google".to_string());

    LoginTemplate {
        error: query.error.as_deref().and_then(login_message),
        google_client_id: state.config().firebase.google_client_id.clone(),
        google_login_uri,
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match state
        .auth()
        .sign_in_with_password(&form.email, &form.password)
        .await
    {
        Ok(operator) => complete_sign_in(&state, &session, operator).await,
        Err(e) => sign_in_failed(&e),
    }
}

/// Handle the Google Identity Services callback.
///
/// Only available when `GOOGLE_CLIENT_ID` is configured.
#[instrument(skip_all)]
pub async fn google(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<GoogleForm>,
) -> Result<Response> {
    if state.config().firebase.google_client_id.is_none() {
        return Err(AppError::NotFound("google sign-in".to_string()));
    }

    let cookie_token = cookie_value(&headers, GOOGLE_CSRF_FIELD);
    if cookie_token.is_none() || cookie_token != form.g_csrf_token.as_deref() {
        tracing::warn!("Google sign-in CSRF token mismatch");
        return Ok(sign_in_failed(&AuthError::FederatedCancelled));
    }

    let credential = form.credential.unwrap_or_default();
    Ok(
        match state.auth().sign_in_with_federated(&credential).await {
            Ok(operator) => complete_sign_in(&state, &session, operator).await,
            Err(e) => sign_in_failed(&e),
        },
    )
}

/// Handle logout.
///
/// Signs out at the provider, unmounts the screen (dropping cart, catalog and
/// search term) and destroys the session.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    if let Some(SessionState::Authenticated(operator)) = session
        .get::<SessionState>(session_keys::SESSION_STATE)
        .await?
    {
        state.auth().sign_out(&operator).await;
        tracing::info!(operator_id = %operator.operator_id, "Operator signed out");
    }

    if let Some(screen_id) = session.get::<ScreenId>(session_keys::SCREEN_ID).await? {
        state.screens().unmount(screen_id).await;
    }

    session.flush().await?;
    clear_sentry_user();

    Ok(Redirect::to(LOGIN_PATH))
}

// =============================================================================
// Helpers
// =============================================================================

async fn complete_sign_in(
    state: &AppState,
    session: &Session,
    operator: OperatorSession,
) -> Response {
    set_sentry_user(&operator.operator_id, Some(operator.email.as_str()));
    tracing::info!(operator_id = %operator.operator_id, "Operator signed in");

    if let Err(e) = set_current_operator(session, state.screens(), operator).await {
        tracing::error!(error = %e, "Failed to store operator session");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    Redirect::to("/").into_response()
}

fn sign_in_failed(err: &AuthError) -> Response {
    if err.is_server_error() {
        let event_id = sentry::capture_error(err);
        tracing::error!(error = %err, sentry_event_id = %event_id, "Sign-in failed");
    } else {
        tracing::warn!(error = %err, "Sign-in rejected");
    }

    Redirect::to(&format!("{LOGIN_PATH}?error={}", err.code())).into_response()
}

/// Value of cookie `name` in the request's `Cookie` headers.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find_map(|(key, value)| (key == name).then_some(value))
}
