//! Error types for the browser shell core.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```
//! use tabbed_shell::{Result, TabId, TabbedWindow};
//!
//! fn close_tab(window: &TabbedWindow, tab: TabId) -> Result<()> {
//!     window.tabs().try_remove(tab)?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::NotReady`] |
//! | Caller | [`Error::WindowNotFound`], [`Error::TabNotFound`] |
//! | Contract | [`Error::NoTargetWindow`], [`Error::UnsupportedSurface`] |
//! | Lifecycle | [`Error::Runtime`], [`Error::BrowserClosed`] |
//! | Extensions | [`Error::Extension`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::Url`], [`Error::Regex`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;

use crate::identifiers::{TabId, WindowId};

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when shell or window configuration is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// The shell is not initialized far enough for the operation.
    ///
    /// Returned, for example, when a window is requested before the bundled
    /// UI extension has been loaded.
    #[error("Not ready: {message}")]
    NotReady {
        /// What is missing.
        message: String,
    },

    // ========================================================================
    // Caller Errors
    // ========================================================================
    /// No live window carries this id.
    #[error("Window not found: {window_id}")]
    WindowNotFound {
        /// The missing window ID.
        window_id: WindowId,
    },

    /// The resolved window has no tab with this id.
    #[error("Tab not found: {tab_id}")]
    TabNotFound {
        /// The missing tab ID.
        tab_id: TabId,
    },

    // ========================================================================
    // Contract Violations
    // ========================================================================
    /// A window or tab operation had no resolvable target window.
    #[error("No target window for {operation}")]
    NoTargetWindow {
        /// The operation that needed a window.
        operation: String,
    },

    /// The surface type has no parent-window resolution rule.
    #[error("Unable to find parent window of '{surface_type}'")]
    UnsupportedSurface {
        /// The unhandled surface type.
        surface_type: String,
    },

    // ========================================================================
    // Lifecycle Errors
    // ========================================================================
    /// The content-hosting runtime refused an operation.
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the runtime failure.
        message: String,
    },

    /// The browser controller has been dropped or has quit.
    #[error("Browser closed")]
    BrowserClosed,

    // ========================================================================
    // Extension Errors
    // ========================================================================
    /// An extension could not be loaded.
    #[error("Extension error at {path}: {message}")]
    Extension {
        /// Extension directory.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Regular expression error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a not-ready error.
    #[inline]
    pub fn not_ready(message: impl Into<String>) -> Self {
        Self::NotReady {
            message: message.into(),
        }
    }

    /// Creates a window not found error.
    #[inline]
    pub fn window_not_found(window_id: WindowId) -> Self {
        Self::WindowNotFound { window_id }
    }

    /// Creates a tab not found error.
    #[inline]
    pub fn tab_not_found(tab_id: TabId) -> Self {
        Self::TabNotFound { tab_id }
    }

    /// Creates a no-target-window error.
    #[inline]
    pub fn no_target_window(operation: impl Into<String>) -> Self {
        Self::NoTargetWindow {
            operation: operation.into(),
        }
    }

    /// Creates an unsupported surface error.
    #[inline]
    pub fn unsupported_surface(surface_type: impl Into<String>) -> Self {
        Self::UnsupportedSurface {
            surface_type: surface_type.into(),
        }
    }

    /// Creates a runtime error.
    #[inline]
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// Creates an extension error.
    #[inline]
    pub fn extension(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Extension {
            path: path.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if the caller addressed a window or tab that does not exist.
    ///
    /// These surface from the extension host boundary and are the host's to handle.
    #[inline]
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::WindowNotFound { .. } | Self::TabNotFound { .. }
        )
    }

    /// Returns `true` if this error means the shell was driven outside its contract.
    #[inline]
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::NoTargetWindow { .. } | Self::UnsupportedSurface { .. }
        )
    }

    /// Returns `true` if this is an extension loading error.
    #[inline]
    #[must_use]
    pub fn is_extension_error(&self) -> bool {
        matches!(self, Self::Extension { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
