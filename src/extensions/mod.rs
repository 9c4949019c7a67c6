//! Extension capability host boundary.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ExtensionHost`] | Host methods the shell calls |
//! | [`ExtensionsDelegate`] | Shell callbacks the host calls |
//! | [`RequestContext`] | Origin of a host request |
//! | [`Manifest`] / [`ExtensionInfo`] | Extension metadata |
//! | [`load_extensions`] | Installed-extension discovery |

// ============================================================================
// Submodules
// ============================================================================

/// Installed-extension discovery.
pub mod discovery;

/// Host and delegate contracts.
pub mod host;

/// Manifest parsing and loaded-extension records.
pub mod manifest;

// ============================================================================
// Re-exports
// ============================================================================

pub use discovery::{discover_extensions, load_extensions, manifest_exists};
pub use host::{
    CreateTabDetails, CreateWindowDetails, ExtensionHost, ExtensionsDelegate, RequestContext,
};
pub use manifest::{ExtensionInfo, MANIFEST_FILE, Manifest};
