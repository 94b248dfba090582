//! Cart route handlers.
//!
//! Every mutation answers HTMX with the refreshed cart panel and a
//! `cart-updated` trigger, and plain form posts with a redirect back to the
//! sales screen.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use cafe_pos_core::{OperatorSession, ProductId};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::htmx::HX_TRIGGER;
use crate::middleware::{HxRequest, RequireOperator};
use crate::models::PosScreen;
use crate::routes::open_screen;
use crate::routes::views::{CartView, CheckoutView};
use crate::screens::SharedScreen;
use crate::state::AppState;

/// Client event fired after every cart mutation.
const CART_UPDATED_EVENT: &str = "cart-updated";

// =============================================================================
// Form Types
// =============================================================================

/// Form naming one product.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: String,
}

/// Quantity adjustment form.
#[derive(Debug, Deserialize)]
pub struct AdjustForm {
    pub product_id: String,
    pub delta: i32,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart panel fragment.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_panel.html")]
pub struct CartPanelTemplate {
    pub cart: CartView,
}

/// Checkout confirmation fragment (HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_result.html")]
pub struct CheckoutResultTemplate {
    pub checkout: CheckoutView,
}

/// Checkout confirmation page (no JavaScript).
#[derive(Template, WebTemplate)]
#[template(path = "pos/checkout.html")]
pub struct CheckoutPageTemplate {
    pub operator_label: String,
    pub checkout: CheckoutView,
}

// =============================================================================
// Helpers
// =============================================================================

async fn mounted_screen(
    state: &AppState,
    session: &Session,
    operator: &OperatorSession,
) -> Result<SharedScreen> {
    open_screen(state, session, operator)
        .await?
        .ok_or_else(|| AppError::Unauthorized("sales screen closed".to_string()))
}

fn cart_response(screen: &PosScreen, is_htmx: bool) -> Response {
    if !is_htmx {
        return Redirect::to("/").into_response();
    }

    (
        [(HX_TRIGGER, CART_UPDATED_EVENT)],
        CartPanelTemplate {
            cart: CartView::from(screen.cart()),
        },
    )
        .into_response()
}

// =============================================================================
// Handlers
// =============================================================================

/// Add one unit of a product.
#[instrument(skip_all, fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    RequireOperator(operator): RequireOperator,
    HxRequest(is_htmx): HxRequest,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let id = ProductId::new(form.product_id);
    let screen = mounted_screen(&state, &session, &operator).await?;
    let mut screen = screen.lock().await;

    if !screen.add_product(&id) {
        return Err(AppError::NotFound(format!("product {id}")));
    }
    add_breadcrumb("cart", "Added item", Some(&[("product_id", id.as_str())]));
    tracing::debug!(total = %screen.cart().total(), "Item added");

    Ok(cart_response(&screen, is_htmx))
}

/// Remove a product's line. Ids not in the cart are ignored.
#[instrument(skip_all, fields(product_id = %form.product_id))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    RequireOperator(operator): RequireOperator,
    HxRequest(is_htmx): HxRequest,
    Form(form): Form<ProductForm>,
) -> Result<Response> {
    let id = ProductId::new(form.product_id);
    let screen = mounted_screen(&state, &session, &operator).await?;
    let mut screen = screen.lock().await;

    screen.cart_mut().remove_item(&id);
    add_breadcrumb("cart", "Removed item", Some(&[("product_id", id.as_str())]));

    Ok(cart_response(&screen, is_htmx))
}

/// Change a line's quantity by `delta`.
///
/// Adjustments that would take the quantity below 1, and ids not in the
/// cart, are ignored.
#[instrument(skip_all, fields(product_id = %form.product_id, delta = form.delta))]
pub async fn adjust(
    State(state): State<AppState>,
    session: Session,
    RequireOperator(operator): RequireOperator,
    HxRequest(is_htmx): HxRequest,
    Form(form): Form<AdjustForm>,
) -> Result<Response> {
    let id = ProductId::new(form.product_id);
    let screen = mounted_screen(&state, &session, &operator).await?;
    let mut screen = screen.lock().await;

    screen.cart_mut().adjust_quantity(&id, form.delta);
    let delta = form.delta.to_string();
    add_breadcrumb(
        "cart",
        "Adjusted quantity",
        Some(&[("product_id", id.as_str()), ("delta", delta.as_str())]),
    );

    Ok(cart_response(&screen, is_htmx))
}

/// Empty the cart.
#[instrument(skip_all)]
pub async fn clear(
    State(state): State<AppState>,
    session: Session,
    RequireOperator(operator): RequireOperator,
    HxRequest(is_htmx): HxRequest,
) -> Result<Response> {
    let screen = mounted_screen(&state, &session, &operator).await?;
    let mut screen = screen.lock().await;

    screen.cart_mut().clear();
    add_breadcrumb("cart", "Cleared cart", None);

    Ok(cart_response(&screen, is_htmx))
}

/// Show the amount to charge. The cart is left as it is.
#[instrument(skip_all, fields(operator_id = %operator.operator_id))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    RequireOperator(operator): RequireOperator,
    HxRequest(is_htmx): HxRequest,
) -> Result<Response> {
    let screen = mounted_screen(&state, &session, &operator).await?;
    let screen = screen.lock().await;

    if screen.cart().is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let summary = screen.cart().checkout();
    tracing::info!(
        total = %summary.total,
        lines = summary.line_count,
        items = summary.item_count,
        "Checkout"
    );
    add_breadcrumb("cart", "Checkout", None);

    let checkout = CheckoutView::from(&summary);
    if is_htmx {
        Ok(CheckoutResultTemplate { checkout }.into_response())
    } else {
        Ok(CheckoutPageTemplate {
            operator_label: operator.label().to_string(),
            checkout,
        }
        .into_response())
    }
}
