//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions. Sessions do not survive a
//! restart, which also signs every terminal out.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::PosConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pos_session";

/// Create the session layer with an in-memory store.
///
/// Sessions expire after `POS_SESSION_IDLE_MINUTES` of inactivity.
#[must_use]
pub fn create_session_layer(config: &PosConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::minutes(config.session_idle_minutes),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
