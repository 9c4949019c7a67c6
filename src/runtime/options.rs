//! Platform window options.
//!
//! Provides a type-safe description of the window the shell asks the
//! runtime for: dimensions, chrome, and the content isolation policy.
//!
//! # Example
//!
//! ```
//! use tabbed_shell::runtime::WindowOptions;
//!
//! let options = WindowOptions::browser_defaults().with_size(1600, 900);
//! assert!(!options.frame);
//! assert!(options.validate().is_ok());
//! ```

// ============================================================================
// Constants
// ============================================================================

/// Default window width in pixels.
pub const DEFAULT_WIDTH: u32 = 1280;

/// Default window height in pixels.
pub const DEFAULT_HEIGHT: u32 = 720;

// ============================================================================
// WebPreferences
// ============================================================================

/// Isolation policy applied to every surface a window hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebPreferences {
    /// Run content in a sandboxed renderer.
    pub sandbox: bool,

    /// Expose privileged runtime APIs to page content.
    pub node_integration: bool,

    /// Expose the legacy remote-object bridge.
    pub enable_remote_module: bool,

    /// Separate the shell's script world from page scripts.
    pub context_isolation: bool,

    /// Run injected scripts in a world-safe manner.
    pub world_safe_execute_javascript: bool,
}

impl WebPreferences {
    /// Strict isolation between shell UI and content.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            sandbox: true,
            node_integration: false,
            enable_remote_module: false,
            context_isolation: true,
            world_safe_execute_javascript: true,
        }
    }

    /// Returns `true` if no privileged access leaks into content.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.sandbox
            && !self.node_integration
            && !self.enable_remote_module
            && self.context_isolation
            && self.world_safe_execute_javascript
    }
}

impl Default for WebPreferences {
    fn default() -> Self {
        Self::strict()
    }
}

// ============================================================================
// WindowOptions
// ============================================================================

/// Options for creating a platform window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowOptions {
    /// Window width in pixels.
    pub width: u32,

    /// Window height in pixels.
    pub height: u32,

    /// Draw the platform's window frame. The shell draws its own chrome.
    pub frame: bool,

    /// Isolation policy for hosted content.
    pub web_preferences: WebPreferences,
}

// ============================================================================
// Constructors
// ============================================================================

impl WindowOptions {
    /// Fixed chrome defaults for shell windows: 1280x720, frameless, strict isolation.
    #[inline]
    #[must_use]
    pub const fn browser_defaults() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            frame: false,
            web_preferences: WebPreferences::strict(),
        }
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self::browser_defaults()
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl WindowOptions {
    /// Sets window size in pixels.
    #[inline]
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enables the platform window frame.
    #[inline]
    #[must_use]
    pub fn with_frame(mut self) -> Self {
        self.frame = true;
        self
    }
}

// ============================================================================
// Validation
// ============================================================================

impl WindowOptions {
    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns an error message for zero dimensions or a non-strict
    /// isolation policy.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("Window dimensions must be greater than zero".to_string());
        }
        if !self.web_preferences.is_strict() {
            return Err("Shell windows require strict content isolation".to_string());
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
