//! Session-related types.
//!
//! The session cookie only identifies the terminal; what it maps to lives in
//! the in-memory session store.

/// Session keys for operator data.
pub mod keys {
    /// Key for the [`SessionState`](cafe_pos_core::SessionState) of the terminal.
    pub const SESSION_STATE: &str = "session_state";

    /// Key for the [`ScreenId`](super::super::ScreenId) of the mounted sales screen.
    pub const SCREEN_ID: &str = "screen_id";
}
