//! Boundaries to the external collaborators of the sales screen.
//!
//! # Services
//!
//! - `auth` - operator sign-in ([`AuthProvider`])
//! - `catalog` - product catalog loading with fallback ([`CatalogSource`])
//!
//! Handlers only see the traits; `main` wires in the Firebase clients and the
//! integration tests wire in fakes.

pub mod auth;
pub mod catalog;

pub use auth::{AuthError, AuthProvider};
pub use catalog::{CatalogLoadError, CatalogSource, load_catalog};
