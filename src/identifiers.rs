//! Type-safe identifiers for shell entities.
//!
//! Newtype wrappers keep window, surface, tab, and extension identifiers
//! from being mixed up at compile time.
//!
//! | Type | Assigned by | Backing |
//! |------|-------------|---------|
//! | [`WindowId`] | Platform window system | `NonZeroU32` |
//! | [`SurfaceId`] | Content-hosting runtime | `NonZeroU32` |
//! | [`TabId`] | Derived from the tab's surface | `NonZeroU32` |
//! | [`ExtensionId`] | Session on extension load | `String` |
//!
//! # Example
//!
//! ```
//! use tabbed_shell::identifiers::{SurfaceId, TabId};
//!
//! let surface = SurfaceId::new(7).unwrap();
//! let tab = TabId::from(surface);
//! assert_eq!(tab.as_u32(), 7);
//! assert!(SurfaceId::new(0).is_none());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// URL scheme under which extension resources are served.
pub const EXTENSION_SCHEME: &str = "chrome-extension";

// ============================================================================
// Numeric Identifiers
// ============================================================================

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Creates an identifier. Returns `None` for zero.
            #[inline]
            #[must_use]
            pub fn new(value: u32) -> Option<Self> {
                NonZeroU32::new(value).map(Self)
            }

            /// Returns the raw value.
            #[inline]
            #[must_use]
            pub fn as_u32(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a top-level platform window. Stable for the window's lifetime.
    WindowId
);

numeric_id!(
    /// Identifier of a content-host surface.
    SurfaceId
);

numeric_id!(
    /// Identifier of a tab.
    ///
    /// A tab carries the id of the surface backing it, so a host that only
    /// knows the surface can still address the tab.
    TabId
);

impl From<SurfaceId> for TabId {
    #[inline]
    fn from(surface: SurfaceId) -> Self {
        Self(surface.0)
    }
}

// ============================================================================
// IdAllocator
// ============================================================================

/// Monotonic allocator for numeric identifiers, starting at 1.
///
/// Used by runtimes that assign their own window and surface ids.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU32,
}

impl IdAllocator {
    /// Creates an allocator whose first value is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }

    /// Returns the next non-zero value.
    fn next_value(&self) -> NonZeroU32 {
        // Skip zero on wrap-around.
        loop {
            if let Some(value) = NonZeroU32::new(self.next.fetch_add(1, Ordering::Relaxed)) {
                return value;
            }
        }
    }

    /// Allocates the next window id.
    pub fn next_window(&self) -> WindowId {
        WindowId(self.next_value())
    }

    /// Allocates the next surface id.
    pub fn next_surface(&self) -> SurfaceId {
        SurfaceId(self.next_value())
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ExtensionId
// ============================================================================

/// Identifier of a loaded extension, assigned by the session that loaded it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionId(String);

impl ExtensionId {
    /// Creates an extension identifier.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Builds the URL of a resource packaged with this extension.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Url`] if the id is not a valid URL host.
    ///
    /// # Example
    ///
    /// ```
    /// use tabbed_shell::identifiers::ExtensionId;
    ///
    /// let id = ExtensionId::new("abcdef");
    /// let url = id.resource_url("webui.html").unwrap();
    /// assert_eq!(url, "chrome-extension://abcdef/webui.html");
    /// ```
    pub fn resource_url(&self, resource: &str) -> Result<String> {
        let base = Url::parse(&format!("{EXTENSION_SCHEME}://{}/", self.0))?;
        Ok(base.join(resource)?.to_string())
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rejected() {
        assert!(WindowId::new(0).is_none());
        assert!(SurfaceId::new(0).is_none());
        assert!(TabId::new(0).is_none());
    }

    #[test]
    fn test_tab_id_from_surface() {
        let surface = SurfaceId::new(42).unwrap();
        assert_eq!(TabId::from(surface).as_u32(), 42);
    }

    #[test]
    fn test_allocator_starts_at_one() {
        let ids = IdAllocator::new();
        assert_eq!(ids.next_window().as_u32(), 1);
        assert_eq!(ids.next_surface().as_u32(), 2);
        assert_eq!(ids.next_window().as_u32(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(WindowId::new(5).unwrap().to_string(), "5");
        assert_eq!(ExtensionId::new("abc").to_string(), "abc");
    }

    #[test]
    fn test_resource_url() {
        let id = ExtensionId::new("mnopqr");
        assert_eq!(
            id.resource_url("new-tab.html").unwrap(),
            "chrome-extension://mnopqr/new-tab.html"
        );
    }

    #[test]
    fn test_resource_url_rejects_bad_host() {
        let id = ExtensionId::new("bad host");
        assert!(id.resource_url("webui.html").is_err());
    }

    #[test]
    fn test_serde_transparent() {
        let id = WindowId::new(9).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
        let back: WindowId = serde_json::from_str("9").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<WindowId>("0").is_err());
    }
}
