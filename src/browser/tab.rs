//! A tab and its content surface.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::identifiers::{TabId, WindowId};
use crate::runtime::{SurfaceHandle, SurfaceType};

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a tab.
pub(crate) struct TabInner {
    /// Tab ID, taken from the surface ID.
    pub id: TabId,
    /// Owning window.
    pub window_id: WindowId,
    /// Content surface.
    pub surface: SurfaceHandle,
}

// ============================================================================
// Tab
// ============================================================================

/// A handle to one tab.
///
/// A tab belongs to exactly one window for its whole life. Cloning the
/// handle does not create a new tab.
#[derive(Clone)]
pub struct Tab {
    pub(crate) inner: Arc<TabInner>,
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.inner.id)
            .field("window_id", &self.inner.window_id)
            .field("surface_type", &self.inner.surface.surface_type())
            .finish_non_exhaustive()
    }
}

impl PartialEq for Tab {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Tab {}

impl Tab {
    /// Creates a tab handle around a freshly created view.
    pub(crate) fn new(window_id: WindowId, surface: SurfaceHandle) -> Self {
        Self {
            inner: Arc::new(TabInner {
                id: TabId::from(surface.id()),
                window_id,
                surface,
            }),
        }
    }
}

// ============================================================================
// Tab - Accessors
// ============================================================================

impl Tab {
    /// Returns the tab ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TabId {
        self.inner.id
    }

    /// Returns the ID of the owning window.
    #[inline]
    #[must_use]
    pub fn window_id(&self) -> WindowId {
        self.inner.window_id
    }

    /// Returns the content surface.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &SurfaceHandle {
        &self.inner.surface
    }

    /// Returns the content surface's type.
    #[inline]
    #[must_use]
    pub fn surface_type(&self) -> SurfaceType {
        self.inner.surface.surface_type()
    }

    /// Returns the current navigation target.
    #[must_use]
    pub fn url(&self) -> String {
        self.inner.surface.url()
    }
}

// ============================================================================
// Tab - Navigation
// ============================================================================

impl Tab {
    /// Starts loading `url`. Does not wait for the load.
    pub fn load_url(&self, url: &str) {
        debug!(tab_id = %self.inner.id, url, "Navigating");
        self.inner.surface.load_url(url);
    }
}

// ============================================================================
// Tests
// ============================================================================
