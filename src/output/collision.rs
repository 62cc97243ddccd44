use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do when the destination file already exists
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Leave the existing file alone and report the video as skipped
    #[default]
    Skip,
    /// Replace the existing file
    Overwrite,
    /// Write to the lowest free `<stem>_<n>` name
    Append,
}

impl std::fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollisionPolicy::Skip => write!(f, "skip"),
            CollisionPolicy::Overwrite => write!(f, "overwrite"),
            CollisionPolicy::Append => write!(f, "append"),
        }
    }
}

/// Decide where a transcript should be written, or `None` if it should not be written.
///
/// Only checks for existence; the directory must already exist and the caller does the
/// write. `Append` scans `_1`, `_2`, ... from the start on every call.
pub fn resolve_path(
    directory: &Path,
    stem: &str,
    extension: &str,
    policy: CollisionPolicy,
) -> Option<PathBuf> {
    let candidate = directory.join(format!("{}.{}", stem, extension));

    match policy {
        CollisionPolicy::Overwrite => Some(candidate),
        CollisionPolicy::Skip if candidate.exists() => None,
        CollisionPolicy::Skip => Some(candidate),
        CollisionPolicy::Append if !candidate.exists() => Some(candidate),
        CollisionPolicy::Append => (1u64..)
            .map(|n| directory.join(format!("{}_{}.{}", stem, n, extension)))
            .find(|path| !path.exists()),
    }
}
