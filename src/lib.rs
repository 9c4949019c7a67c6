//! Tabbed Shell - Window and tab orchestration for an extension-enabled browser shell.
//!
//! This library keeps a browser shell's windows, their tabs, and an external
//! extension capability host consistent with each other.
//!
//! # Architecture
//!
//! The shell sits between a content-hosting runtime and an extension host:
//!
//! - **Runtime**: Owns platform windows and content surfaces, delivers
//!   notifications as [`ShellEvent`]s on one queue
//! - **Extension host**: Implements extension tab/window APIs, calls back
//!   through [`ExtensionsDelegate`]
//!
//! Key design principles:
//!
//! - Ownership runs one way: [`Browser`] → [`TabbedWindow`] → [`Tabs`] → [`Tab`]
//! - All "which window owns this surface" lookups go through one resolver
//! - Notifications are handled one at a time, in arrival order
//! - The host hears about a tab before it hears that the tab is selected
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tabbed_shell::runtime::headless::HeadlessRuntime;
//! use tabbed_shell::{Browser, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let runtime = Arc::new(HeadlessRuntime::new("shell"));
//!
//!     // Bundled UI extension; installed extensions default to ./extensions
//!     let browser = Browser::builder()
//!         .ui_extension("./ui")
//!         .build(runtime)?;
//!
//!     // Load extensions and open the first window
//!     browser.init().await?;
//!
//!     // Handle runtime notifications until the last window closes
//!     browser.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`browser`] | Controller, windows, and tabs: [`Browser`], [`TabbedWindow`], [`Tab`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`extensions`] | Extension host contract, manifests, and discovery |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`menu`] | Menu collaborator |
//! | [`runtime`] | Content-hosting runtime contract and the headless runtime |

// ============================================================================
// Modules
// ============================================================================

/// Browser controller, windows, and tabs.
///
/// - [`Browser`] - Process-wide controller
/// - [`TabbedWindow`] - Window with shell surface and tabs
/// - [`Tab`] - One tab
pub mod browser;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Extension capability host contract, manifests, and discovery.
pub mod extensions;

/// Type-safe identifiers for windows, surfaces, tabs, and extensions.
///
/// Newtype wrappers prevent mixing incompatible IDs at compile time.
pub mod identifiers;

/// Application and context menu collaborator.
pub mod menu;

/// Content-hosting runtime contract.
pub mod runtime;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{Browser, BrowserBuilder, BrowserConfig, Tab, TabObserver, TabbedWindow, Tabs};

// Error types
pub use error::{Error, Result};

// Extension types
pub use extensions::{
    CreateTabDetails, CreateWindowDetails, ExtensionHost, ExtensionInfo, ExtensionsDelegate,
    RequestContext,
};

// Identifier types
pub use identifiers::{ExtensionId, SurfaceId, TabId, WindowId};

// Menu types
pub use menu::{MenuBuilder, NoopMenus};

// Runtime types
pub use runtime::{
    ContentSurface, Disposition, PlatformWindow, Runtime, Session, ShellEvent, SurfaceHandle,
    SurfaceType, WindowOptions,
};
