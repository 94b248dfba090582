//! Sales screen route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cafe_pos_core::CatalogOrigin;

use crate::error::Result;
use crate::middleware::{HxRequest, LOGIN_PATH, RequireOperator};
use crate::models::PosScreen;
use crate::routes::open_screen;
use crate::routes::views::{CartView, ProductCard, product_cards};
use crate::state::AppState;

// =============================================================================
// Query Types
// =============================================================================

/// Search box query.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Full sales screen.
#[derive(Template, WebTemplate)]
#[template(path = "pos/screen.html")]
pub struct ScreenTemplate {
    pub operator_label: String,
    pub search_term: String,
    pub products: Vec<ProductCard>,
    pub cart: CartView,
    pub catalog_is_fallback: bool,
}

impl ScreenTemplate {
    fn new(operator_label: &str, screen: &PosScreen) -> Self {
        Self {
            operator_label: operator_label.to_string(),
            search_term: screen.search_term().to_string(),
            products: product_cards(screen.visible_products()),
            cart: CartView::from(screen.cart()),
            catalog_is_fallback: screen.catalog().origin() == CatalogOrigin::Fallback,
        }
    }
}

/// Product grid fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub search_term: String,
    pub products: Vec<ProductCard>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the sales screen, mounting it on first visit.
#[instrument(skip_all, fields(operator_id = %operator.operator_id))]
pub async fn screen(
    State(state): State<AppState>,
    session: Session,
    RequireOperator(operator): RequireOperator,
) -> Result<Response> {
    let Some(screen) = open_screen(&state, &session, &operator).await? else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };
    let screen = screen.lock().await;

    Ok(ScreenTemplate::new(operator.label(), &screen).into_response())
}

/// Update the search term.
///
/// HTMX requests get the filtered product grid; others are sent back to the
/// sales screen, which renders with the new term.
#[instrument(skip_all, fields(operator_id = %operator.operator_id))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    RequireOperator(operator): RequireOperator,
    HxRequest(is_htmx): HxRequest,
    Query(query): Query<SearchQuery>,
) -> Result<Response> {
    let Some(screen) = open_screen(&state, &session, &operator).await? else {
        return Ok(Redirect::to(LOGIN_PATH).into_response());
    };
    let mut screen = screen.lock().await;
    screen.set_search_term(query.q);

    if !is_htmx {
        return Ok(Redirect::to("/").into_response());
    }

    let products = product_cards(screen.visible_products());
    tracing::debug!(matches = products.len(), "Search term updated");
    Ok(ProductGridTemplate {
        search_term: screen.search_term().to_string(),
        products,
    }
    .into_response())
}
