//! Per-window tab collection.
//!
//! [`Tabs`] owns the ordered tabs of one window and tracks which one is
//! selected. Lifecycle changes are reported to a [`TabObserver`]:
//!
//! | Operation | Observer calls |
//! |-----------|----------------|
//! | [`Tabs::create`] | `on_tab_created`, then `on_tab_selected` if nothing was selected |
//! | [`Tabs::select`] | `on_tab_selected` |
//! | [`Tabs::remove`] | `on_tab_removed`, then `on_tab_selected` for the replacement if the selected tab was removed |
//! | [`Tabs::clear`] | `on_tab_removed` for every tab |
//!
//! A tab is always reported as created before it is reported as selected.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identifiers::{TabId, WindowId};
use crate::runtime::PlatformWindow;

use super::Tab;

// ============================================================================
// TabObserver
// ============================================================================

/// Receives lifecycle notifications from a [`Tabs`] collection.
pub trait TabObserver: Send + Sync {
    /// A tab was appended to the collection.
    fn on_tab_created(&self, tab: &Tab);

    /// A tab became the selected tab.
    fn on_tab_selected(&self, tab: &Tab);

    /// A tab left the collection. Its surface is already destroyed.
    fn on_tab_removed(&self, tab: &Tab);
}

// ============================================================================
// Types
// ============================================================================

#[derive(Default)]
struct TabsState {
    /// Tabs in creation order.
    tabs: Vec<Tab>,
    selected: Option<TabId>,
}

// ============================================================================
// Tabs
// ============================================================================

/// The tabs of one window.
///
/// The lock is never held while calling into the window or the observer,
/// so observers may query the collection.
pub struct Tabs {
    window: Arc<dyn PlatformWindow>,
    observer: Arc<dyn TabObserver>,
    state: Mutex<TabsState>,
}

impl fmt::Debug for Tabs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Tabs")
            .field("window_id", &self.window.id())
            .field("len", &state.tabs.len())
            .field("selected", &state.selected)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tabs - Constructor
// ============================================================================

impl Tabs {
    /// Creates an empty collection for `window`.
    pub fn new(window: Arc<dyn PlatformWindow>, observer: Arc<dyn TabObserver>) -> Self {
        Self {
            window,
            observer,
            state: Mutex::new(TabsState::default()),
        }
    }
}

// ============================================================================
// Tabs - Queries
// ============================================================================

impl Tabs {
    /// Returns the owning window's ID.
    #[inline]
    #[must_use]
    pub fn window_id(&self) -> WindowId {
        self.window.id()
    }

    /// Returns the selected tab, or `None` if the collection is empty.
    #[must_use]
    pub fn selected(&self) -> Option<Tab> {
        let state = self.state.lock();
        let id = state.selected?;
        state.tabs.iter().find(|tab| tab.id() == id).cloned()
    }

    /// Returns the selected tab's ID.
    #[inline]
    #[must_use]
    pub fn selected_id(&self) -> Option<TabId> {
        self.state.lock().selected
    }

    /// Looks up a tab by ID.
    #[must_use]
    pub fn get(&self, id: TabId) -> Option<Tab> {
        self.state
            .lock()
            .tabs
            .iter()
            .find(|tab| tab.id() == id)
            .cloned()
    }

    /// Returns `true` if the collection holds `id`.
    #[must_use]
    pub fn contains(&self, id: TabId) -> bool {
        self.state.lock().tabs.iter().any(|tab| tab.id() == id)
    }

    /// Tab IDs in creation order.
    #[must_use]
    pub fn ids(&self) -> Vec<TabId> {
        self.state.lock().tabs.iter().map(Tab::id).collect()
    }

    /// Tabs in creation order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<Tab> {
        self.state.lock().tabs.clone()
    }

    /// Returns the number of tabs.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().tabs.len()
    }

    /// Returns `true` if the collection has no tabs.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().tabs.is_empty()
    }
}

// ============================================================================
// Tabs - Mutation
// ============================================================================

impl Tabs {
    /// Creates a tab on a fresh view and appends it.
    ///
    /// The observer hears about the tab before this returns. The first tab
    /// of an empty selection becomes selected. When `initial_url` is given
    /// the tab starts loading it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] if the window cannot create a view.
    pub fn create(&self, initial_url: Option<&str>) -> Result<Tab> {
        let surface = self.window.create_view()?;
        let tab = Tab::new(self.window.id(), surface);

        self.state.lock().tabs.push(tab.clone());
        debug!(window_id = %self.window.id(), tab_id = %tab.id(), "Tab created");

        self.observer.on_tab_created(&tab);

        if let Some(url) = initial_url {
            tab.load_url(url);
        }

        if self.selected_id().is_none() {
            self.select(tab.id());
        }

        Ok(tab)
    }

    /// Selects `id`, showing its view.
    ///
    /// Returns `false` and does nothing if the collection has no such tab.
    pub fn select(&self, id: TabId) -> bool {
        let tab = {
            let mut state = self.state.lock();
            let Some(tab) = state.tabs.iter().find(|tab| tab.id() == id).cloned() else {
                debug!(window_id = %self.window.id(), tab_id = %id, "Ignoring selection of unknown tab");
                return false;
            };
            state.selected = Some(id);
            tab
        };

        self.window.show_view(tab.surface());
        self.observer.on_tab_selected(&tab);
        true
    }

    /// Selects `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TabNotFound`] if the collection has no such tab.
    pub fn try_select(&self, id: TabId) -> Result<()> {
        if self.select(id) {
            Ok(())
        } else {
            Err(Error::tab_not_found(id))
        }
    }

    /// Removes `id` and destroys its view.
    ///
    /// If the removed tab was selected, the most recently created remaining
    /// tab is selected. Returns `None` if the collection has no such tab.
    pub fn remove(&self, id: TabId) -> Option<Tab> {
        let (removed, replacement) = {
            let mut state = self.state.lock();
            let position = state.tabs.iter().position(|tab| tab.id() == id)?;
            let removed = state.tabs.remove(position);

            let replacement = if state.selected == Some(id) {
                state.selected = None;
                state.tabs.last().map(Tab::id)
            } else {
                None
            };
            (removed, replacement)
        };

        removed.surface().destroy();
        debug!(window_id = %self.window.id(), tab_id = %id, "Tab removed");
        self.observer.on_tab_removed(&removed);

        if let Some(next) = replacement {
            self.select(next);
        }
        Some(removed)
    }

    /// Removes `id` and destroys its view.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TabNotFound`] if the collection has no such tab.
    pub fn try_remove(&self, id: TabId) -> Result<Tab> {
        self.remove(id).ok_or_else(|| Error::tab_not_found(id))
    }

    /// Destroys every tab without selecting replacements.
    ///
    /// Returns the number of tabs destroyed.
    pub fn clear(&self) -> usize {
        let tabs = {
            let mut state = self.state.lock();
            state.selected = None;
            std::mem::take(&mut state.tabs)
        };

        for tab in &tabs {
            tab.surface().destroy();
            self.observer.on_tab_removed(tab);
        }
        tabs.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
