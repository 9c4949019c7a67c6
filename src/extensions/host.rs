//! Contract between the shell and the extension capability host.
//!
//! The host implements the extension tab/window APIs. It calls back into the
//! shell through [`ExtensionsDelegate`] whenever an extension asks for a
//! change, and the shell keeps the host's bookkeeping in step with reality
//! through [`ExtensionHost`].
//!
//! ```text
//! ┌──────────────┐   ExtensionsDelegate (5 callbacks)   ┌──────────────┐
//! │  Extension   │ ───────────────────────────────────► │   Browser    │
//! │    host      │                                       │  controller  │
//! │              │ ◄─────────────────────────────────── │              │
//! └──────────────┘   ExtensionHost (add/select tab ...)  └──────────────┘
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;

use crate::error::Result;
use crate::identifiers::WindowId;
use crate::runtime::SurfaceHandle;

use super::ExtensionInfo;

// ============================================================================
// RequestContext
// ============================================================================

/// Origin of a host request.
///
/// Carries the surface that issued the extension API call, when known. The
/// shell resolves the target window from it.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Surface that issued the request.
    pub sender: Option<SurfaceHandle>,
}

impl RequestContext {
    /// Context for a request issued by `sender`.
    #[inline]
    #[must_use]
    pub fn from_sender(sender: SurfaceHandle) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    /// Context for a request with no originating surface.
    #[inline]
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }
}

// ============================================================================
// Details
// ============================================================================

/// Arguments of an extension's "create tab" call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTabDetails {
    /// Target window. Falls back to the requester's window when absent.
    pub window_id: Option<WindowId>,
    /// URL to open in the new tab.
    pub url: Option<String>,
    /// Whether the new tab becomes selected. Defaults to `true`.
    pub active: Option<bool>,
}

impl CreateTabDetails {
    /// Returns whether the new tab should be selected.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }

    /// Targets an explicit window.
    #[must_use]
    pub fn with_window(mut self, window_id: WindowId) -> Self {
        self.window_id = Some(window_id);
        self
    }

    /// Sets the URL to open.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets whether the tab becomes selected.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

/// Arguments of an extension's "create window" call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateWindowDetails {
    /// URL for the window's first tab. Falls back to the new-tab page.
    pub url: Option<String>,
}

impl CreateWindowDetails {
    /// Sets the URL for the first tab.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

// ============================================================================
// ExtensionHost
// ============================================================================

/// Methods of the extension host the shell may call.
///
/// Only the browser controller registers or unregisters windows here, and
/// only a window's own tab observer reports that window's tabs.
pub trait ExtensionHost: Send + Sync {
    /// Lets background extension UI attach to a window's shell surface.
    fn add_extension_host(&self, surface: &SurfaceHandle);

    /// Reverses [`add_extension_host`](Self::add_extension_host) when the window closes.
    fn remove_extension_host(&self, surface: &SurfaceHandle);

    /// Reports a new tab in `window`.
    fn add_tab(&self, tab: &SurfaceHandle, window: WindowId);

    /// Reports that `tab` is now the active tab of its window.
    fn select_tab(&self, tab: &SurfaceHandle);

    /// Reports that `tab` left its window and its surface is gone.
    fn remove_tab(&self, tab: &SurfaceHandle);

    /// Registers a loaded extension.
    fn add_extension(&self, extension: &ExtensionInfo);
}

// ============================================================================
// ExtensionsDelegate
// ============================================================================

/// The shell's callbacks, invoked by the extension host.
pub trait ExtensionsDelegate: Send + Sync {
    /// Creates a tab and returns its surface.
    ///
    /// # Errors
    ///
    /// - [`Error::WindowNotFound`](crate::Error::WindowNotFound) if `details.window_id` is stale
    /// - [`Error::NoTargetWindow`](crate::Error::NoTargetWindow) if no window can be resolved
    fn create_tab(&self, ctx: &RequestContext, details: &CreateTabDetails)
    -> Result<SurfaceHandle>;

    /// Selects `tab` in the requester's window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TabNotFound`](crate::Error::TabNotFound) if the window has no such tab.
    fn select_tab(&self, ctx: &RequestContext, tab: &SurfaceHandle) -> Result<()>;

    /// Removes `tab` from the requester's window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TabNotFound`](crate::Error::TabNotFound) if the window has no such tab.
    fn remove_tab(&self, ctx: &RequestContext, tab: &SurfaceHandle) -> Result<()>;

    /// Creates a window and returns its shell surface.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`](crate::Error::NotReady) before the UI extension is loaded.
    fn create_window(
        &self,
        ctx: &RequestContext,
        details: &CreateWindowDetails,
    ) -> Result<SurfaceHandle>;

    /// The host changed its active tab; mirror it in the owning window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedSurface`](crate::Error::UnsupportedSurface)
    /// if the tab's parent window cannot be resolved.
    fn active_tab_changed(&self, tab: &SurfaceHandle) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_tab_details_default_active() {
        let details = CreateTabDetails::default();
        assert!(details.is_active());
        assert!(!details.clone().with_active(false).is_active());
    }

    #[test]
    fn test_create_tab_details_from_json() {
        let details: CreateTabDetails = serde_json::from_value(serde_json::json!({
            "windowId": 3,
            "url": "https://example.com",
            "active": false
        }))
        .unwrap();

        assert_eq!(details.window_id, WindowId::new(3));
        assert_eq!(details.url.as_deref(), Some("https://example.com"));
        assert!(!details.is_active());
    }

    #[test]
    fn test_create_tab_details_builder() {
        let window = WindowId::new(2).unwrap();
        let details = CreateTabDetails::default()
            .with_window(window)
            .with_url("about:blank");
        assert_eq!(details.window_id, Some(window));
        assert_eq!(details.url.as_deref(), Some("about:blank"));
    }

    #[test]
    fn test_create_window_details_from_json() {
        let details: CreateWindowDetails = serde_json::from_str("{}").unwrap();
        assert!(details.url.is_none());
    }

    #[test]
    fn test_request_context_detached() {
        assert!(RequestContext::detached().sender.is_none());
    }
}
