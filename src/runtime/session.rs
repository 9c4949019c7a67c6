//! Browsing session shared by every window.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::extensions::ExtensionInfo;

/// The runtime's browsing session (profile): user agent, preload scripts,
/// and loaded extensions.
#[async_trait]
pub trait Session: Send + Sync {
    /// Current user-agent string.
    fn user_agent(&self) -> String;

    /// Replaces the user-agent string.
    fn set_user_agent(&self, user_agent: &str);

    /// Scripts injected into every content process before page scripts run.
    fn set_preloads(&self, preloads: &[PathBuf]);

    /// Loads an unpacked extension from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extension`](crate::Error::Extension) if the directory
    /// does not hold a loadable extension.
    async fn load_extension(&self, path: &Path) -> Result<ExtensionInfo>;
}
