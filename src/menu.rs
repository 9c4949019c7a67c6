//! Menu collaborator.
//!
//! The shell does not build menus itself. It calls a [`MenuBuilder`] once
//! during start-up for the application menu, and for every context-menu
//! request a surface raises.

use crate::browser::Browser;
use crate::runtime::{ContextMenuParams, SurfaceHandle};

// ============================================================================
// MenuBuilder
// ============================================================================

/// Builds application and context menus.
pub trait MenuBuilder: Send + Sync {
    /// Installs the application menu.
    fn setup_menu(&self, browser: &Browser);

    /// Shows a context menu for `surface`.
    fn setup_context_menu(
        &self,
        browser: &Browser,
        surface: &SurfaceHandle,
        params: &ContextMenuParams,
    );
}

// ============================================================================
// NoopMenus
// ============================================================================

/// A [`MenuBuilder`] that installs nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMenus;

impl MenuBuilder for NoopMenus {
    fn setup_menu(&self, _browser: &Browser) {}

    fn setup_context_menu(
        &self,
        _browser: &Browser,
        _surface: &SurfaceHandle,
        _params: &ContextMenuParams,
    ) {
    }
}
