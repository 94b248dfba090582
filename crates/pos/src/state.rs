//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use crate::config::PosConfig;
use crate::firebase::{FirestoreClient, IdentityToolkitClient};
use crate::screens::ScreenRegistry;
use crate::services::{AuthProvider, CatalogSource};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and gives handlers the
/// configuration, the external collaborators and the mounted screens.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PosConfig,
    auth: Arc<dyn AuthProvider>,
    catalog: Arc<dyn CatalogSource>,
    screens: ScreenRegistry,
}

impl AppState {
    /// Create application state with explicit collaborators.
    ///
    /// # Arguments
    ///
    /// * `config` - POS configuration
    /// * `auth` - Operator sign-in provider
    /// * `catalog` - Product record source
    #[must_use]
    pub fn new(
        config: PosConfig,
        auth: Arc<dyn AuthProvider>,
        catalog: Arc<dyn CatalogSource>,
    ) -> Self {
        let idle_secs = u64::try_from(config.session_idle_minutes)
            .unwrap_or(1)
            .saturating_mul(60);
        let screens = ScreenRegistry::new(Duration::from_secs(idle_secs));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                auth,
                catalog,
                screens,
            }),
        }
    }

    /// Create application state backed by the Firebase project in `config`.
    #[must_use]
    pub fn from_config(config: PosConfig) -> Self {
        let auth = IdentityToolkitClient::new(&config.firebase, &config.base_url);
        let catalog = FirestoreClient::new(&config.firebase);
        Self::new(config, Arc::new(auth), Arc::new(catalog))
    }

    /// Get a reference to the POS configuration.
    #[must_use]
    pub fn config(&self) -> &PosConfig {
        &self.inner.config
    }

    /// Get the operator sign-in provider.
    #[must_use]
    pub fn auth(&self) -> &dyn AuthProvider {
        self.inner.auth.as_ref()
    }

    /// Get the product record source.
    #[must_use]
    pub fn catalog_source(&self) -> &dyn CatalogSource {
        self.inner.catalog.as_ref()
    }

    /// Get the registry of mounted sales screens.
    #[must_use]
    pub fn screens(&self) -> &ScreenRegistry {
        &self.inner.screens
    }
}
