//! Builder pattern for browser configuration.
//!
//! Provides a fluent API for configuring and creating [`Browser`] instances.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tabbed_shell::Browser;
//! use tabbed_shell::runtime::headless::HeadlessRuntime;
//!
//! # fn example() -> tabbed_shell::Result<()> {
//! let browser = Browser::builder()
//!     .ui_extension("./shell/ui")
//!     .extensions_dir("./extensions")
//!     .preload("./shell/preload.js")
//!     .build(Arc::new(HeadlessRuntime::new("shell")))?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::menu::{MenuBuilder, NoopMenus};
use crate::runtime::{Runtime, WindowOptions};

use super::core::Browser;

// ============================================================================
// Constants
// ============================================================================

/// Environment variable that turns on inspector panels for new windows.
pub const DEBUG_ENV: &str = "DEBUG";

/// Installed-extensions directory name, next to the UI extension.
pub const EXTENSIONS_DIR: &str = "extensions";

// ============================================================================
// BrowserConfig
// ============================================================================

/// Validated browser configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Bundled UI extension directory.
    pub ui_extension: PathBuf,
    /// Root of installed extensions.
    pub extensions_dir: PathBuf,
    /// Preload scripts for content processes.
    pub preloads: Vec<PathBuf>,
    /// Whether new windows open a detached inspector.
    pub debug: bool,
    /// Options for every new window.
    pub window_options: WindowOptions,
}

// ============================================================================
// BrowserBuilder
// ============================================================================

/// Builder for configuring a [`Browser`] instance.
///
/// Use [`Browser::builder()`] to create a new builder.
#[derive(Clone)]
pub struct BrowserBuilder {
    /// Bundled UI extension directory.
    ui_extension: Option<PathBuf>,
    /// Root of installed extensions.
    extensions_dir: Option<PathBuf>,
    /// Preload scripts.
    preloads: Vec<PathBuf>,
    /// Debug flag override.
    debug: Option<bool>,
    /// Menu collaborator.
    menus: Option<Arc<dyn MenuBuilder>>,
    /// Window options.
    window_options: WindowOptions,
}

impl fmt::Debug for BrowserBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserBuilder")
            .field("ui_extension", &self.ui_extension)
            .field("extensions_dir", &self.extensions_dir)
            .field("preloads", &self.preloads)
            .field("debug", &self.debug)
            .field("has_menus", &self.menus.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for BrowserBuilder {
    fn default() -> Self {
        Self {
            ui_extension: None,
            extensions_dir: None,
            preloads: Vec::new(),
            debug: None,
            menus: None,
            window_options: WindowOptions::browser_defaults(),
        }
    }
}

// ============================================================================
// BrowserBuilder Implementation
// ============================================================================

impl BrowserBuilder {
    /// Creates a new builder with default window options.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bundled UI extension directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory holding the UI extension's `manifest.json`
    #[inline]
    #[must_use]
    pub fn ui_extension(mut self, path: impl Into<PathBuf>) -> Self {
        self.ui_extension = Some(path.into());
        self
    }

    /// Sets the installed-extensions root.
    ///
    /// Defaults to `extensions/` next to the UI extension directory.
    #[inline]
    #[must_use]
    pub fn extensions_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.extensions_dir = Some(path.into());
        self
    }

    /// Adds a content-process preload script.
    #[inline]
    #[must_use]
    pub fn preload(mut self, path: impl Into<PathBuf>) -> Self {
        self.preloads.push(path.into());
        self
    }

    /// Overrides the `DEBUG` environment flag.
    #[inline]
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Sets the menu collaborator. Defaults to [`NoopMenus`].
    #[inline]
    #[must_use]
    pub fn menus(mut self, menus: Arc<dyn MenuBuilder>) -> Self {
        self.menus = Some(menus);
        self
    }

    /// Sets the options used for every new window.
    #[inline]
    #[must_use]
    pub fn window_options(mut self, options: WindowOptions) -> Self {
        self.window_options = options;
        self
    }

    /// Builds the browser with validation.
    ///
    /// The browser is inert until [`Browser::init`] runs.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the UI extension is not set or does not exist
    /// - [`Error::Config`] if the window options are invalid
    pub fn build(self, runtime: Arc<dyn Runtime>) -> Result<Browser> {
        let ui_extension = self.validate_ui_extension()?;
        self.validate_window_options()?;

        let extensions_dir = self
            .extensions_dir
            .clone()
            .unwrap_or_else(|| default_extensions_dir(&ui_extension));
        let debug = self.debug.unwrap_or_else(debug_from_env);

        let config = BrowserConfig {
            ui_extension,
            extensions_dir,
            preloads: self.preloads,
            debug,
            window_options: self.window_options,
        };
        let menus = self.menus.unwrap_or_else(|| Arc::new(NoopMenus));

        Ok(Browser::new(runtime, config, menus))
    }
}

// ============================================================================
// Validation
// ============================================================================

impl BrowserBuilder {
    /// Validates the UI extension configuration.
    fn validate_ui_extension(&self) -> Result<PathBuf> {
        let path = self.ui_extension.clone().ok_or_else(|| {
            Error::config(
                "UI extension is required. Use .ui_extension() to set it.\n\
                 Example: Browser::builder().ui_extension(\"./ui\")",
            )
        })?;

        if !path.is_dir() {
            return Err(Error::config(format!(
                "UI extension not found at: {}\n\
                 Ensure the directory exists and holds a manifest.json.",
                path.display()
            )));
        }

        Ok(path)
    }

    /// Validates the window options.
    fn validate_window_options(&self) -> Result<()> {
        self.window_options.validate().map_err(Error::config)
    }
}

// ============================================================================
// Private Helpers
// ============================================================================

/// `extensions/` next to the UI extension directory.
fn default_extensions_dir(ui_extension: &Path) -> PathBuf {
    ui_extension
        .parent()
        .map_or_else(|| PathBuf::from(EXTENSIONS_DIR), |parent| parent.join(EXTENSIONS_DIR))
}

/// Reads the debug flag from the environment.
fn debug_from_env() -> bool {
    std::env::var(DEBUG_ENV).is_ok_and(|value| is_truthy(&value))
}

/// Any non-empty value other than `0` or `false` turns the flag on.
fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::runtime::headless::HeadlessRuntime;

    fn runtime() -> Arc<dyn Runtime> {
        Arc::new(HeadlessRuntime::new("shell"))
    }

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = BrowserBuilder::new();
        assert!(builder.ui_extension.is_none());
        assert!(builder.extensions_dir.is_none());
        assert!(builder.preloads.is_empty());
        assert_eq!(builder.window_options, WindowOptions::browser_defaults());
    }

    #[test]
    fn test_preload_accumulates() {
        let builder = BrowserBuilder::new().preload("a.js").preload("b.js");
        assert_eq!(
            builder.preloads,
            vec![PathBuf::from("a.js"), PathBuf::from("b.js")]
        );
    }

    #[test]
    fn test_build_fails_without_ui_extension() {
        let err = BrowserBuilder::new().build(runtime()).unwrap_err();
        assert!(err.to_string().contains("UI extension is required"));
    }

    #[test]
    fn test_build_fails_with_missing_ui_extension() {
        let err = BrowserBuilder::new()
            .ui_extension("/nonexistent/ui")
            .build(runtime())
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_build_fails_with_invalid_window_options() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = BrowserBuilder::new()
            .ui_extension(dir.path())
            .window_options(WindowOptions::browser_defaults().with_size(0, 720))
            .build(runtime())
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_build_defaults_extensions_dir() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let ui = dir.path().join("ui");
        std::fs::create_dir_all(&ui).unwrap();

        let browser = BrowserBuilder::new()
            .ui_extension(&ui)
            .debug(true)
            .build(runtime())
            .unwrap();

        assert_eq!(browser.config().extensions_dir, dir.path().join("extensions"));
        assert!(browser.config().debug);
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("1"));
        assert!(is_truthy("electron*"));
        assert!(!is_truthy(""));
        assert!(!is_truthy("  "));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("FALSE"));
    }

    #[test]
    fn test_builder_is_clone() {
        let builder = BrowserBuilder::new().ui_extension("./ui");
        let cloned = builder.clone();
        assert_eq!(builder.ui_extension, cloned.ui_extension);
    }
}
