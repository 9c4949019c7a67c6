//! Content-host surfaces.
//!
//! A surface renders one piece of content: a tab's page, a window's shell UI,
//! or an extension's background page. The runtime owns the surface; the
//! shell only holds [`SurfaceHandle`]s to it.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::identifiers::{SurfaceId, WindowId};

// ============================================================================
// SurfaceType
// ============================================================================

/// Kind of content-host surface.
///
/// Parent-window resolution differs per kind; see
/// [`Browser::window_from_surface`](crate::Browser::window_from_surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceType {
    /// The top-level surface of a platform window.
    Window,

    /// A view attached to a platform window (tab content).
    BrowserView,

    /// An embedded guest view inside another surface.
    #[serde(rename = "webview")]
    WebView,

    /// An extension background page with no window of its own.
    BackgroundPage,

    /// A surface proxied from another process.
    Remote,

    /// A surface rendered without any window.
    Offscreen,
}

impl SurfaceType {
    /// Returns the runtime's name for this surface kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Window => "window",
            Self::BrowserView => "browserView",
            Self::WebView => "webview",
            Self::BackgroundPage => "backgroundPage",
            Self::Remote => "remote",
            Self::Offscreen => "offscreen",
        }
    }

    /// Returns `true` for surfaces attached to, or embedded in, a window.
    #[inline]
    #[must_use]
    pub const fn is_attached(&self) -> bool {
        matches!(self, Self::BrowserView | Self::WebView)
    }
}

impl fmt::Display for SurfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DevTools
// ============================================================================

/// Placement of an inspector panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevToolsMode {
    /// Separate window, detached from the inspected surface.
    #[default]
    Detach,
    /// Docked to the right edge.
    Right,
    /// Docked to the bottom edge.
    Bottom,
}

/// Options for opening an inspector panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DevToolsOptions {
    /// Panel placement.
    pub mode: DevToolsMode,
    /// Whether the panel takes focus when opened.
    pub activate: bool,
}

impl DevToolsOptions {
    /// Detached panel that does not take focus.
    #[must_use]
    pub const fn detached() -> Self {
        Self {
            mode: DevToolsMode::Detach,
            activate: false,
        }
    }

    /// Detached panel that takes focus.
    #[must_use]
    pub const fn detached_active() -> Self {
        Self {
            mode: DevToolsMode::Detach,
            activate: true,
        }
    }
}

// ============================================================================
// ContentSurface
// ============================================================================

/// A content-host surface owned by the runtime.
///
/// Navigation is fire-and-forget: [`load_url`](Self::load_url) starts the
/// load and returns without waiting for it.
pub trait ContentSurface: Send + Sync {
    /// Runtime-assigned identifier.
    fn id(&self) -> SurfaceId;

    /// Kind of surface.
    fn surface_type(&self) -> SurfaceType;

    /// Current navigation target.
    fn url(&self) -> String;

    /// Starts navigating to `url`.
    fn load_url(&self, url: &str);

    /// The window whose top-level surface this is.
    ///
    /// Only meaningful for [`SurfaceType::Window`].
    fn host_window(&self) -> Option<WindowId>;

    /// The window this surface is attached to or embedded in.
    ///
    /// Only meaningful for attached kinds, see [`SurfaceType::is_attached`].
    fn owner_window(&self) -> Option<WindowId>;

    /// Opens an inspector panel for this surface.
    fn open_devtools(&self, options: DevToolsOptions);

    /// Returns `true` once the surface has been destroyed.
    fn is_destroyed(&self) -> bool;

    /// Destroys the surface. Idempotent.
    fn destroy(&self);
}

/// Shared handle to a runtime surface.
pub type SurfaceHandle = Arc<dyn ContentSurface>;

impl fmt::Debug for dyn ContentSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentSurface")
            .field("id", &self.id())
            .field("type", &self.surface_type())
            .field("url", &self.url())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
