//! Browser controller, windows, and tabs.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Browser`] | Process-wide controller owning every window |
//! | [`BrowserBuilder`] | Validated configuration |
//! | [`TabbedWindow`] | One platform window with its shell surface and tabs |
//! | [`Tabs`] | Ordered tabs of one window, with selection |
//! | [`Tab`] | One tab backed by one content surface |
//!
//! Ownership runs one way: browser → windows → tabs. Every "which window
//! owns this surface" question goes through
//! [`Browser::window_from_surface`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tabbed_shell::Browser;
//! use tabbed_shell::runtime::headless::HeadlessRuntime;
//!
//! # async fn example() -> tabbed_shell::Result<()> {
//! let browser = Browser::builder()
//!     .ui_extension("./ui")
//!     .build(Arc::new(HeadlessRuntime::new("shell")))?;
//! browser.init().await?;
//! browser.dispatch_pending();
//!
//! let window = browser.get_focused_window().expect("first window");
//! let tab = window.tabs().create(Some("https://example.com"))?;
//! window.tabs().select(tab.id());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Browser configuration builder.
pub mod builder;

/// Browser controller.
pub mod core;

/// Extension host callbacks.
mod delegate;

/// Tab handle.
pub mod tab;

/// Tab collection.
pub mod tabs;

/// User-agent sanitizing.
pub mod user_agent;

/// Tabbed window.
pub mod window;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{BrowserBuilder, BrowserConfig};
pub use self::core::{Browser, NEW_TAB_PAGE};
pub use tab::Tab;
pub use tabs::{TabObserver, Tabs};
pub use user_agent::sanitize_user_agent;
pub use window::{BLANK_PAGE, TabbedWindow, WEBUI_PAGE, WindowConfig};
