//! Shell callbacks for the extension host.
//!
//! Every callback resolves its target window through the controller's
//! resolver and then delegates to that window's tab collection. The delegate
//! holds the controller weakly, so the host never keeps it alive.

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Weak};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::extensions::{
    CreateTabDetails, CreateWindowDetails, ExtensionsDelegate, RequestContext,
};
use crate::identifiers::TabId;
use crate::runtime::SurfaceHandle;

use super::core::{Browser, BrowserInner};
use super::window::TabbedWindow;

// ============================================================================
// BrowserDelegate
// ============================================================================

/// [`ExtensionsDelegate`] backed by a [`Browser`].
pub(crate) struct BrowserDelegate {
    browser: Weak<BrowserInner>,
}

impl BrowserDelegate {
    /// Creates a delegate for the browser behind `browser`.
    pub(crate) fn new(browser: Weak<BrowserInner>) -> Self {
        Self { browser }
    }

    /// Upgrades to a browser handle.
    fn browser(&self) -> Result<Browser> {
        self.browser
            .upgrade()
            .map(|inner| Browser { inner })
            .ok_or(Error::BrowserClosed)
    }

    /// Resolves the requester's window, failing when there is none.
    fn requester_window(
        browser: &Browser,
        ctx: &RequestContext,
        operation: &str,
    ) -> Result<TabbedWindow> {
        browser
            .ipc_window(ctx)?
            .ok_or_else(|| Error::no_target_window(operation))
    }
}

impl ExtensionsDelegate for BrowserDelegate {
    fn create_tab(&self, ctx: &RequestContext, details: &CreateTabDetails) -> Result<SurfaceHandle> {
        let browser = self.browser()?;

        let window = match details.window_id {
            Some(window_id) => browser
                .window(window_id)
                .ok_or_else(|| Error::window_not_found(window_id))?,
            None => Self::requester_window(&browser, ctx, "create tab")?,
        };

        let tab = window.tabs().create(None)?;
        if let Some(url) = details.url.as_deref() {
            tab.load_url(url);
        }
        if details.is_active() {
            window.tabs().select(tab.id());
        }

        debug!(window_id = %window.id(), tab_id = %tab.id(), active = details.is_active(), "Extension created tab");
        Ok(Arc::clone(tab.surface()))
    }

    fn select_tab(&self, ctx: &RequestContext, tab: &SurfaceHandle) -> Result<()> {
        let browser = self.browser()?;
        let window = Self::requester_window(&browser, ctx, "select tab")?;
        window.tabs().try_select(TabId::from(tab.id()))
    }

    fn remove_tab(&self, ctx: &RequestContext, tab: &SurfaceHandle) -> Result<()> {
        let browser = self.browser()?;
        let window = Self::requester_window(&browser, ctx, "remove tab")?;
        window.tabs().try_remove(TabId::from(tab.id()))?;
        Ok(())
    }

    fn create_window(
        &self,
        _ctx: &RequestContext,
        details: &CreateWindowDetails,
    ) -> Result<SurfaceHandle> {
        let browser = self.browser()?;
        let initial_url = match &details.url {
            Some(url) => url.clone(),
            None => browser
                .new_tab_url()
                .ok_or_else(|| Error::not_ready("New-tab page is not available yet"))?,
        };

        let window = browser.create_window(Some(initial_url))?;
        Ok(Arc::clone(window.surface()))
    }

    fn active_tab_changed(&self, tab: &SurfaceHandle) -> Result<()> {
        let browser = self.browser()?;
        let tab_id = TabId::from(tab.id());

        let Some(window) = browser.window_from_surface(tab)? else {
            warn!(tab_id = %tab_id, "Active tab has no live window");
            return Ok(());
        };

        if !window.has_tab(tab_id) {
            warn!(window_id = %window.id(), tab_id = %tab_id, "Active tab not owned by its window, ignoring");
            return Ok(());
        }

        window.tabs().select(tab_id);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
