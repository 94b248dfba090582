//! HTTP route handlers for the sales screen.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Sales screen (requires operator)
//! GET  /                       - Sales screen (mounts on first visit)
//! GET  /products?q=            - Update search term (returns product grid fragment)
//!
//! # Cart (HTMX fragments, requires operator)
//! POST /cart/add               - Add one unit (returns cart panel fragment)
//! POST /cart/remove            - Remove a line (returns cart panel fragment)
//! POST /cart/adjust            - Change a quantity by delta (returns cart panel fragment)
//! POST /cart/clear             - Empty the cart (returns cart panel fragment)
//! POST /checkout               - Show the total (cart left intact)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Email/password login
//! POST /auth/google            - Google Identity Services callback
//! POST /auth/logout            - Logout (unmounts the screen)
//! ```

pub mod auth;
pub mod cart;
pub mod pos;
pub mod views;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use cafe_pos_core::OperatorSession;

use crate::error::Result;
use crate::models::{ScreenId, session_keys};
use crate::screens::SharedScreen;
use crate::services::load_catalog;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/google", post(auth::google))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/adjust", post(cart::adjust))
        .route("/clear", post(cart::clear))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pos::screen))
        .route("/products", get(pos::search))
        .route("/checkout", post(cart::checkout))
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
}

/// The operator's mounted screen, mounting it if needed.
///
/// Returns `None` if the screen was unmounted (logout from another tab)
/// while the catalog was loading.
pub(crate) async fn open_screen(
    state: &AppState,
    session: &Session,
    operator: &OperatorSession,
) -> Result<Option<SharedScreen>> {
    let screen_id = if let Some(id) = session.get::<ScreenId>(session_keys::SCREEN_ID).await? {
        id
    } else {
        let id = ScreenId::new();
        session.insert(session_keys::SCREEN_ID, id).await?;
        id
    };

    if let Some(screen) = state.screens().get(screen_id).await {
        return Ok(Some(screen));
    }

    tracing::info!(screen_id = %screen_id, "Mounting sales screen");
    state.screens().begin_mount(screen_id).await;
    let catalog = load_catalog(
        state.catalog_source(),
        &state.config().firebase.collection,
        Some(&operator.id_token),
    )
    .await;

    Ok(state.screens().finish_mount(screen_id, catalog).await)
}
