//! Observable update lifecycle.

use super::descriptor::UpdateDescriptor;
use std::path::PathBuf;

/// A verified artifact sitting in the cache, ready to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the file contents.
    pub digest: String,
}

/// Where the pipeline currently is. Exactly one variant is active; the
/// pipeline replaces the whole value on every transition, so observers always
/// see the latest state and never a partial one.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateState {
    Idle,
    Checking,
    Available(UpdateDescriptor),
    /// `percent` is 0..=100 while the total size is known, or -1 when the
    /// server did not declare a content length.
    Downloading { percent: i32 },
    VerifyingIntegrity,
    Complete(DownloadedArtifact),
    Failed { message: String },
}

impl Default for UpdateState {
    fn default() -> Self {
        UpdateState::Idle
    }
}
