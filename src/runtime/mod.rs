//! Content-hosting runtime boundary.
//!
//! The shell does not render anything itself. It drives a runtime that owns
//! platform windows, content-host surfaces, and the browsing session, and
//! receives the runtime's notifications as [`ShellEvent`]s.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Runtime`] | Process-wide runtime: windows, focus, session, app lifecycle |
//! | [`PlatformWindow`] | One top-level platform window |
//! | [`ContentSurface`] | One content-host surface |
//! | [`Session`] | Shared browsing session |
//! | [`WindowOptions`] | Window chrome and isolation policy |
//! | [`headless`] | In-memory runtime for tests and display-less embedding |

// ============================================================================
// Submodules
// ============================================================================

/// Queue events from the runtime to the shell.
pub mod events;

/// In-memory runtime.
pub mod headless;

/// Window options and isolation policy.
pub mod options;

/// Shared browsing session.
pub mod session;

/// Content-host surfaces.
pub mod surface;

// ============================================================================
// Re-exports
// ============================================================================

pub use events::{ContextMenuParams, Disposition, EventSink, NewTargetRequest, ShellEvent};
pub use options::{WebPreferences, WindowOptions};
pub use session::Session;
pub use surface::{ContentSurface, DevToolsMode, DevToolsOptions, SurfaceHandle, SurfaceType};

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use crate::error::Result;
use crate::extensions::{ExtensionHost, ExtensionsDelegate};
use crate::identifiers::WindowId;

// ============================================================================
// PlatformWindow
// ============================================================================

/// A top-level platform window.
pub trait PlatformWindow: Send + Sync {
    /// Platform-assigned identifier.
    fn id(&self) -> WindowId;

    /// The window's own top-level surface, used for the shell UI.
    fn surface(&self) -> SurfaceHandle;

    /// Returns `true` if the window has input focus.
    fn is_focused(&self) -> bool;

    /// Creates a view attached to this window, used as tab content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`](crate::Error::Runtime) if the window is closed.
    fn create_view(&self) -> Result<SurfaceHandle>;

    /// Brings an attached view to the front.
    fn show_view(&self, view: &SurfaceHandle);

    /// Closes the window.
    fn close(&self);
}

// ============================================================================
// Runtime
// ============================================================================

/// The content-hosting runtime.
pub trait Runtime: Send + Sync {
    /// Product token the runtime adds to the user agent (e.g. `Electron`).
    fn runtime_name(&self) -> &str;

    /// Application name the runtime adds to the user agent.
    fn app_name(&self) -> &str;

    /// The default browsing session.
    fn default_session(&self) -> Arc<dyn Session>;

    /// Creates a platform window.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`](crate::Error::Runtime) if the platform
    /// refuses the window.
    fn create_window(&self, options: &WindowOptions) -> Result<Arc<dyn PlatformWindow>>;

    /// The platform window that currently has input focus.
    ///
    /// Background pages have no window of their own and resolve to this one.
    fn focused_window(&self) -> Option<WindowId>;

    /// Returns `true` on platforms where the app keeps running with no windows.
    fn stays_resident(&self) -> bool;

    /// Constructs the extension host for `session`, bound to the shell's callbacks.
    fn create_extension_host(
        &self,
        session: Arc<dyn Session>,
        delegate: Arc<dyn ExtensionsDelegate>,
    ) -> Arc<dyn ExtensionHost>;

    /// Registers the queue the runtime delivers notifications to.
    fn set_event_sink(&self, sink: EventSink);

    /// Terminates the application.
    fn quit(&self);
}
