//! Extension manifests and loaded-extension records.
//!
//! # Example
//!
//! ```
//! use tabbed_shell::extensions::Manifest;
//!
//! let manifest = Manifest::parse(r#"{ "name": "Shell UI", "version": "1.0.0" }"#).unwrap();
//! assert_eq!(manifest.name, "Shell UI");
//! assert!(!manifest.has_background());
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::ExtensionId;

// ============================================================================
// Constants
// ============================================================================

/// File name of an extension manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

// ============================================================================
// Manifest
// ============================================================================

/// The fields of `manifest.json` the shell reads.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manifest {
    /// Display name.
    pub name: String,

    /// Version string.
    pub version: String,

    /// Manifest format version.
    #[serde(default)]
    pub manifest_version: Option<u8>,

    /// Short description.
    #[serde(default)]
    pub description: Option<String>,

    /// Background page or service-worker declaration.
    #[serde(default)]
    pub background: Option<Value>,
}

impl Manifest {
    /// Parses manifest JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the text is not a valid manifest.
    pub fn parse(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses `manifest.json` from an extension directory.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Extension`] if the file is missing or malformed.
    pub async fn read(dir: &Path) -> Result<Self> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let content = tokio::fs::read_to_string(&manifest_path)
            .await
            .map_err(|e| Error::extension(dir, format!("Manifest not readable: {e}")))?;

        Self::parse(&content)
            .map_err(|e| Error::extension(dir, format!("Invalid {MANIFEST_FILE}: {e}")))
    }

    /// Returns `true` if the extension declares a background page or worker.
    #[inline]
    #[must_use]
    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }
}

// ============================================================================
// ExtensionInfo
// ============================================================================

/// A loaded extension.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionInfo {
    /// Session-assigned identifier.
    pub id: ExtensionId,
    /// Display name from the manifest.
    pub name: String,
    /// Version from the manifest.
    pub version: String,
    /// Directory the extension was loaded from.
    pub path: PathBuf,
}

impl ExtensionInfo {
    /// Builds a record from a parsed manifest.
    #[must_use]
    pub fn from_manifest(id: ExtensionId, manifest: &Manifest, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            name: manifest.name.clone(),
            version: manifest.version.clone(),
            path: path.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let manifest = Manifest::parse(r#"{"name":"a","version":"1"}"#).unwrap();
        assert_eq!(manifest.version, "1");
        assert!(manifest.manifest_version.is_none());
        assert!(manifest.background.is_none());
    }

    #[test]
    fn test_parse_background() {
        let manifest = Manifest::parse(
            r#"{"name":"a","version":"1","manifest_version":2,"background":{"scripts":["bg.js"]}}"#,
        )
        .unwrap();
        assert_eq!(manifest.manifest_version, Some(2));
        assert!(manifest.has_background());
    }

    #[test]
    fn test_parse_rejects_missing_name() {
        assert!(Manifest::parse(r#"{"version":"1"}"#).is_err());
    }

    #[tokio::test]
    async fn test_read_missing_is_extension_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let err = Manifest::read(dir.path()).await.unwrap_err();
        assert!(err.is_extension_error());
    }

    #[tokio::test]
    async fn test_read_malformed_is_extension_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join(MANIFEST_FILE), "{ not json").unwrap();
        let err = Manifest::read(dir.path()).await.unwrap_err();
        assert!(err.is_extension_error());
    }

    #[test]
    fn test_info_from_manifest() {
        let manifest = Manifest::parse(r#"{"name":"Reader","version":"2.1"}"#).unwrap();
        let info = ExtensionInfo::from_manifest(ExtensionId::new("abc"), &manifest, "/ext/reader");
        assert_eq!(info.name, "Reader");
        assert_eq!(info.version, "2.1");
        assert_eq!(info.path, PathBuf::from("/ext/reader"));
    }
}
