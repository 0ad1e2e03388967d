//! Host capabilities the update pipeline needs but cannot own.
//!
//! Package inspection and install handoff differ per deployment (desktop
//! session, kiosk image, CI), so the pipeline depends on these traits and the
//! binary wires in a concrete host.

use std::path::{Path, PathBuf};

/// A downloaded package staged where the host installer can read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSource {
    pub path: PathBuf,
}

/// Reads identifying metadata out of a package archive.
pub trait PackageInspector: Send + Sync {
    /// The package identifier declared inside the archive at `path`.
    fn archive_package_id(&self, path: &Path) -> anyhow::Result<String>;
}

/// Hands a verified artifact over to the platform installer.
pub trait InstallHost: Send + Sync {
    /// Whether this host can launch an installer at all.
    fn can_request_install(&self) -> bool;

    /// Asks the user/host to grant install permission. Called when a prior
    /// `request_install` was refused; the artifact stays on disk so the
    /// caller can retry without downloading again.
    fn request_install_permission(&self) -> anyhow::Result<()>;

    /// Exposes the artifact at a location the installer may read.
    fn share_for_read(&self, artifact: &Path) -> anyhow::Result<InstallSource>;

    /// Launches the installer for a staged package. Implementations must not
    /// delete the source file; retries depend on it.
    fn request_install(&self, source: &InstallSource) -> anyhow::Result<()>;
}
