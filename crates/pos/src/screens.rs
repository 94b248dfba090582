//! Registry of mounted sales screens.
//!
//! A screen is mounted on the first sales-screen request after sign-in and
//! unmounted on logout. Mounting is split in two so the catalog can load
//! without holding any lock:
//!
//! 1. [`ScreenRegistry::begin_mount`] marks the id as mounting.
//! 2. The caller loads the catalog.
//! 3. [`ScreenRegistry::finish_mount`] attaches the screen, unless
//!    [`ScreenRegistry::unmount`] ran in between, in which case the loaded
//!    catalog is dropped.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;

use cafe_pos_core::Catalog;

use crate::models::{PosScreen, ScreenId};

/// Upper bound on how long a catalog load may keep a mount pending.
const MOUNT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// A mounted screen. The mutex serializes requests against one screen.
pub type SharedScreen = Arc<Mutex<PosScreen>>;

/// In-memory screens keyed by [`ScreenId`].
///
/// Cheaply cloneable; clones share the same screens.
#[derive(Clone)]
pub struct ScreenRegistry {
    screens: Cache<ScreenId, SharedScreen>,
    mounting: Cache<ScreenId, ()>,
}

impl ScreenRegistry {
    /// Create a registry whose screens expire after `idle` without access.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            screens: Cache::builder().time_to_idle(idle).build(),
            mounting: Cache::builder().time_to_live(MOUNT_TIMEOUT).build(),
        }
    }

    /// The mounted screen for `id`, if any.
    pub async fn get(&self, id: ScreenId) -> Option<SharedScreen> {
        self.screens.get(&id).await
    }

    /// Mark `id` as mounting.
    pub async fn begin_mount(&self, id: ScreenId) {
        self.mounting.insert(id, ()).await;
    }

    /// Attach a fresh screen for `id` with `catalog`.
    ///
    /// If a concurrent request already mounted `id`, that screen is returned
    /// and `catalog` is dropped. Returns `None` if `id` was unmounted while
    /// the catalog was loading.
    pub async fn finish_mount(&self, id: ScreenId, catalog: Catalog) -> Option<SharedScreen> {
        let pending = self.mounting.remove(&id).await.is_some();

        if let Some(existing) = self.screens.get(&id).await {
            return Some(existing);
        }
        if !pending {
            tracing::debug!(screen_id = %id, "Screen unmounted during catalog load");
            return None;
        }

        let screen = Arc::new(Mutex::new(PosScreen::new(catalog)));
        self.screens.insert(id, Arc::clone(&screen)).await;
        tracing::debug!(screen_id = %id, "Screen mounted");
        Some(screen)
    }

    /// Drop the screen for `id` along with any pending mount.
    pub async fn unmount(&self, id: ScreenId) {
        self.mounting.invalidate(&id).await;
        self.screens.invalidate(&id).await;
        tracing::debug!(screen_id = %id, "Screen unmounted");
    }
}
