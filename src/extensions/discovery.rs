//! Discovery of installed extensions.
//!
//! The extensions root holds one directory per extension. Each directory
//! either contains `manifest.json` itself, or contains exactly one version
//! directory that does:
//!
//! ```text
//! extensions/
//! ├── reader/                  loaded from reader/
//! │   └── manifest.json
//! ├── adblock/
//! │   └── 1.4.2_0/             loaded from adblock/1.4.2_0/
//! │       └── manifest.json
//! ├── empty/                   skipped
//! └── ambiguous/               skipped
//!     ├── 1.0/
//!     └── 2.0/
//! ```
//!
//! A bad entry is skipped and logged; discovery continues with the rest.

// ============================================================================
// Imports
// ============================================================================

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::runtime::Session;

use super::{ExtensionInfo, MANIFEST_FILE};

// ============================================================================
// Public API
// ============================================================================

/// Returns `true` if `dir` contains a `manifest.json` file.
pub async fn manifest_exists(dir: &Path) -> bool {
    match tokio::fs::metadata(dir.join(MANIFEST_FILE)).await {
        Ok(metadata) => metadata.is_file(),
        Err(_) => false,
    }
}

/// Lists the directories under `root` that hold a loadable extension.
///
/// Results are ordered by extension directory name. A missing root yields
/// an empty list.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if `root` exists but cannot be read.
pub async fn discover_extensions(root: &Path) -> Result<Vec<PathBuf>> {
    let mut read_dir = match tokio::fs::read_dir(root).await {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(root = %root.display(), "Extensions root does not exist");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut candidates = Vec::new();
    loop {
        let entry = match read_dir.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Unreadable entry in extensions root");
                continue;
            }
        };

        match entry.file_type().await {
            Ok(file_type) if file_type.is_dir() => candidates.push(entry.path()),
            Ok(_) => {}
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Skipping unreadable entry");
            }
        }
    }
    candidates.sort();

    let resolved = join_all(candidates.into_iter().map(resolve_extension_dir)).await;
    Ok(resolved.into_iter().flatten().collect())
}

/// Loads every extension found under `root` into `session`.
///
/// An extension that fails to load is logged and skipped.
///
/// # Errors
///
/// Returns [`Error::Io`](crate::Error::Io) if `root` exists but cannot be read.
pub async fn load_extensions(session: &dyn Session, root: &Path) -> Result<Vec<ExtensionInfo>> {
    let paths = discover_extensions(root).await?;
    let mut loaded = Vec::with_capacity(paths.len());

    for path in paths {
        info!(path = %path.display(), "Loading extension");
        match session.load_extension(&path).await {
            Ok(extension) => loaded.push(extension),
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping extension"),
        }
    }

    Ok(loaded)
}

// ============================================================================
// Private Helpers
// ============================================================================

/// Resolves an extension directory to the directory holding its manifest.
async fn resolve_extension_dir(dir: PathBuf) -> Option<PathBuf> {
    if manifest_exists(&dir).await {
        return Some(dir);
    }

    let version_dir = match single_subdirectory(&dir).await {
        Ok(version_dir) => version_dir,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Skipping unreadable extension directory");
            return None;
        }
    };

    if let Some(version_dir) = version_dir
        && manifest_exists(&version_dir).await
    {
        return Some(version_dir);
    }

    debug!(path = %dir.display(), "No manifest found, skipping");
    None
}

/// Returns the only entry of `dir` if there is exactly one and it is a directory.
async fn single_subdirectory(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let mut read_dir = tokio::fs::read_dir(dir).await?;

    let Some(first) = read_dir.next_entry().await? else {
        return Ok(None);
    };
    if read_dir.next_entry().await?.is_some() {
        return Ok(None);
    }

    if first.file_type().await?.is_dir() {
        Ok(Some(first.path()))
    } else {
        Ok(None)
    }
}

// ============================================================================
// Tests
// ============================================================================
