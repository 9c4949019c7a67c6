//! Tabbed browser window.
//!
//! Each [`TabbedWindow`] owns:
//! - One platform window
//! - One shell surface rendering the bundled UI extension's `webui.html`
//! - One [`Tabs`] collection for tab content
//!
//! Construction queues [`ShellEvent::InitialTab`]. The controller handles it
//! on its next turn and creates the window's first tab, so window-level
//! wiring is complete before any tab exists.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::extensions::ExtensionHost;
use crate::identifiers::{ExtensionId, TabId, WindowId};
use crate::runtime::{
    EventSink, PlatformWindow, Runtime, Session, ShellEvent, SurfaceHandle, WindowOptions,
};

use super::{Tab, TabObserver, Tabs};

// ============================================================================
// Constants
// ============================================================================

/// Shell page inside the bundled UI extension.
pub const WEBUI_PAGE: &str = "webui.html";

/// Page loaded into the first tab when the window has no initial URL.
pub const BLANK_PAGE: &str = "about:blank";

// ============================================================================
// WindowConfig
// ============================================================================

/// Everything needed to open a [`TabbedWindow`].
#[derive(Clone)]
pub struct WindowConfig {
    /// URL loaded into every tab this window creates, and into its first tab.
    pub initial_url: Option<String>,
    /// Platform window options.
    pub options: WindowOptions,
    /// Shared extension host.
    pub extensions: Arc<dyn ExtensionHost>,
    /// Shared browsing session.
    pub session: Arc<dyn Session>,
    /// Bundled UI extension providing the shell page.
    pub ui_extension_id: ExtensionId,
    /// Queue for the deferred first tab.
    pub events: EventSink,
}

impl fmt::Debug for WindowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowConfig")
            .field("initial_url", &self.initial_url)
            .field("options", &self.options)
            .field("ui_extension_id", &self.ui_extension_id)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// WindowTabObserver
// ============================================================================

/// Mirrors a window's tab lifecycle into the extension host.
struct WindowTabObserver {
    window_id: WindowId,
    extensions: Arc<dyn ExtensionHost>,
    initial_url: Option<String>,
}

impl TabObserver for WindowTabObserver {
    fn on_tab_created(&self, tab: &Tab) {
        self.extensions.add_tab(tab.surface(), self.window_id);
        if let Some(url) = &self.initial_url {
            tab.load_url(url);
        }
    }

    fn on_tab_selected(&self, tab: &Tab) {
        self.extensions.select_tab(tab.surface());
    }

    fn on_tab_removed(&self, tab: &Tab) {
        self.extensions.remove_tab(tab.surface());
    }
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a window.
pub(crate) struct WindowInner {
    /// Platform window ID, fixed for the window's lifetime.
    id: WindowId,
    /// Platform window.
    platform: Arc<dyn PlatformWindow>,
    /// Shell surface, fixed for the window's lifetime.
    surface: SurfaceHandle,
    /// Tab content.
    tabs: Tabs,
    /// Shared browsing session.
    session: Arc<dyn Session>,
    /// Initial URL from the configuration.
    initial_url: Option<String>,
}

// ============================================================================
// TabbedWindow
// ============================================================================

/// A handle to a tabbed browser window.
///
/// Cloning the handle does not open a new window.
#[derive(Clone)]
pub struct TabbedWindow {
    /// Shared inner state.
    pub(crate) inner: Arc<WindowInner>,
}

// ============================================================================
// TabbedWindow - Display
// ============================================================================

impl fmt::Debug for TabbedWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TabbedWindow")
            .field("id", &self.id())
            .field("tab_count", &self.tab_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TabbedWindow - Constructor
// ============================================================================

impl TabbedWindow {
    /// Opens a platform window and wires it to the extension host.
    ///
    /// # Errors
    ///
    /// - [`Error::Runtime`](crate::Error::Runtime) if the platform refuses the window
    /// - [`Error::Url`](crate::Error::Url) if the UI extension ID is not a valid host
    pub(crate) fn open(runtime: &dyn Runtime, config: WindowConfig) -> Result<Self> {
        let webui_url = config.ui_extension_id.resource_url(WEBUI_PAGE)?;

        let platform = runtime.create_window(&config.options)?;
        let id = platform.id();
        let surface = platform.surface();

        config.extensions.add_extension_host(&surface);
        surface.load_url(&webui_url);

        let observer = Arc::new(WindowTabObserver {
            window_id: id,
            extensions: Arc::clone(&config.extensions),
            initial_url: config.initial_url.clone(),
        });
        let tabs = Tabs::new(Arc::clone(&platform), observer);

        if !config.events.send(ShellEvent::InitialTab(id)) {
            warn!(window_id = %id, "Shell queue closed, initial tab not scheduled");
        }

        debug!(window_id = %id, url = %webui_url, "Window opened");

        Ok(Self {
            inner: Arc::new(WindowInner {
                id,
                platform,
                surface,
                tabs,
                session: config.session,
                initial_url: config.initial_url,
            }),
        })
    }
}

// ============================================================================
// TabbedWindow - Accessors
// ============================================================================

impl TabbedWindow {
    /// Returns the window ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> WindowId {
        self.inner.id
    }

    /// Returns the shell surface.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &SurfaceHandle {
        &self.inner.surface
    }

    /// Returns the platform window.
    #[inline]
    #[must_use]
    pub fn platform_window(&self) -> &Arc<dyn PlatformWindow> {
        &self.inner.platform
    }

    /// Returns the tab collection.
    #[inline]
    #[must_use]
    pub fn tabs(&self) -> &Tabs {
        &self.inner.tabs
    }

    /// Returns the shared browsing session.
    #[inline]
    #[must_use]
    pub fn session(&self) -> &Arc<dyn Session> {
        &self.inner.session
    }

    /// Returns the configured initial URL.
    #[inline]
    #[must_use]
    pub fn initial_url(&self) -> Option<&str> {
        self.inner.initial_url.as_deref()
    }

    /// Returns `true` if the platform window has input focus.
    #[inline]
    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.inner.platform.is_focused()
    }

    /// Returns the selected tab.
    #[must_use]
    pub fn focused_tab(&self) -> Option<Tab> {
        self.inner.tabs.selected()
    }

    /// Returns the number of tabs.
    #[inline]
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.inner.tabs.len()
    }

    /// Returns `true` if this window holds `tab`.
    #[inline]
    #[must_use]
    pub fn has_tab(&self, tab: TabId) -> bool {
        self.inner.tabs.contains(tab)
    }
}

// ============================================================================
// TabbedWindow - Lifecycle
// ============================================================================

impl TabbedWindow {
    /// Creates the window's first tab.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`](crate::Error::Runtime) if the view cannot be created.
    pub(crate) fn bootstrap_initial_tab(&self) -> Result<Tab> {
        let url = self.initial_url().unwrap_or(BLANK_PAGE);
        let tab = self.inner.tabs.create(Some(url))?;
        info!(window_id = %self.id(), tab_id = %tab.id(), url, "Initial tab created");
        Ok(tab)
    }

    /// Closes the platform window.
    ///
    /// The runtime reports the close back to the controller, which then
    /// releases the window's tabs.
    pub fn close(&self) {
        debug!(window_id = %self.id(), "Closing window");
        self.inner.platform.close();
    }

    /// Destroys every tab surface and reports each removal to the extension
    /// host. Returns how many were destroyed.
    pub(crate) fn close_tabs(&self) -> usize {
        self.inner.tabs.clear()
    }
}

// ============================================================================
// Tests
// ============================================================================
