//! Server-side models of the sales screen.

pub mod screen;
pub mod session;

pub use screen::{PosScreen, ScreenId};
pub use session::keys as session_keys;
