//! HTTP middleware stack for the sales screen.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Session layer (tower-sessions with in-memory store)
//!
//! The session gate itself is the [`RequireOperator`] extractor.

pub mod auth;
pub mod htmx;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{LOGIN_PATH, OptionalOperator, RequireOperator, set_current_operator};
pub use htmx::{HxRequest, is_htmx_request};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
