//! Debian host wiring for the update pipeline.
//!
//! Inspects `.deb` archives with `dpkg-deb` and hands verified packages to a
//! configurable install command (privileged via `pkexec` by default).

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use lgs_core::config::StationConfig;
use lgs_core::platform::{InstallHost, InstallSource, PackageInspector};

/// `{pkg}` is replaced token-wise with the staged package path.
const DEFAULT_INSTALL_COMMAND: &str = "pkexec dpkg -i {pkg}";

pub struct DebianHost {
    install_command: String,
    stage_dir: PathBuf,
}

impl DebianHost {
    pub fn from_config(cfg: &StationConfig) -> Result<Self> {
        let install_command = cfg
            .install_command
            .as_deref()
            .map(str::trim)
            .filter(|cmd| !cmd.is_empty())
            .unwrap_or(DEFAULT_INSTALL_COMMAND)
            .to_string();
        let stage_dir = cfg.artifact_dir()?.join("stage");
        Ok(Self {
            install_command,
            stage_dir,
        })
    }
}

impl PackageInspector for DebianHost {
    fn archive_package_id(&self, path: &Path) -> Result<String> {
        let output = Command::new("dpkg-deb")
            .arg("--field")
            .arg(path)
            .arg("Package")
            .output()
            .context("failed to run dpkg-deb")?;
        if !output.status.success() {
            bail!(
                "dpkg-deb rejected {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        let package = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if package.is_empty() {
            bail!("{} declares no Package field", path.display());
        }
        Ok(package)
    }
}

impl InstallHost for DebianHost {
    fn can_request_install(&self) -> bool {
        self.install_command
            .split_whitespace()
            .next()
            .map(|bin| which::which(bin).is_ok())
            .unwrap_or(false)
    }

    fn request_install_permission(&self) -> Result<()> {
        let bin = self.install_command.split_whitespace().next().unwrap_or("");
        println!("installer `{bin}` not found; install it or set install_command in the config");
        Ok(())
    }

    fn share_for_read(&self, artifact: &Path) -> Result<InstallSource> {
        fs::create_dir_all(&self.stage_dir)
            .with_context(|| format!("failed to create {}", self.stage_dir.display()))?;
        let name = artifact
            .file_name()
            .context("artifact path has no file name")?;
        let staged = self.stage_dir.join(name);
        fs::copy(artifact, &staged)
            .with_context(|| format!("failed to stage {}", artifact.display()))?;
        // pkexec runs the installer as root; the staged copy must be
        // world-readable for it to open the archive.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&staged, fs::Permissions::from_mode(0o644))?;
        }
        Ok(InstallSource { path: staged })
    }

    fn request_install(&self, source: &InstallSource) -> Result<()> {
        let rendered = render_install_args(&self.install_command, &source.path);
        let mut parts = rendered.iter();
        let Some(bin) = parts.next() else {
            bail!("install_command is empty");
        };
        tracing::info!(command = %rendered.join(" "), "launching installer");
        // The installer replaces this binary; spawn and let it run detached.
        Command::new(bin)
            .args(parts)
            .spawn()
            .with_context(|| format!("failed to launch `{bin}`"))?;
        Ok(())
    }
}

/// Splits the command template on whitespace, then substitutes `{pkg}` per
/// token. Substituting after the split keeps paths with spaces intact.
fn render_install_args(template: &str, pkg: &Path) -> Vec<String> {
    template
        .split_whitespace()
        .map(|token| {
            if token == "{pkg}" {
                pkg.display().to_string()
            } else {
                token.to_string()
            }
        })
        .collect()
}
