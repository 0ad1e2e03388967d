//! Sequential update pipeline with observable state.
//!
//! One logical flight at a time: check, then download + verify, then install
//! handoff. State transitions are published through a watch channel; readers
//! always see the latest state (last write wins).

use super::descriptor::UpdateDescriptor;
use super::download;
use super::error::UpdateError;
use super::state::{DownloadedArtifact, UpdateState};
use super::verify;
use crate::api::ApiClient;
use crate::build_info::AppIdentity;
use crate::http::AuthContext;
use crate::platform::{InstallHost, PackageInspector};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Fixed artifact file name inside the cache directory. Reusing one name
/// means a newer download always replaces an older one.
pub const ARTIFACT_NAME: &str = "update.pkg";

/// Result of an install handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The host installer was launched.
    Started,
    /// The host cannot install yet; permission was requested and the
    /// artifact kept for a retry.
    PermissionRequested,
}

pub struct UpdatePipeline {
    api: ApiClient,
    identity: AppIdentity,
    artifact_dir: PathBuf,
    inspector: Arc<dyn PackageInspector>,
    busy: AtomicBool,
    state: Arc<watch::Sender<UpdateState>>,
}

impl UpdatePipeline {
    pub fn new(
        api: ApiClient,
        identity: AppIdentity,
        artifact_dir: PathBuf,
        inspector: Arc<dyn PackageInspector>,
    ) -> Self {
        let (tx, _rx) = watch::channel(UpdateState::Idle);
        Self {
            api,
            identity,
            artifact_dir,
            inspector,
            busy: AtomicBool::new(false),
            state: Arc::new(tx),
        }
    }

    /// Watch state transitions. The receiver always yields the latest state;
    /// a slow reader skips intermediate values rather than lagging.
    pub fn subscribe(&self) -> watch::Receiver<UpdateState> {
        self.state.subscribe()
    }

    pub fn current_state(&self) -> UpdateState {
        self.state.borrow().clone()
    }

    /// Where the artifact lands once downloaded.
    pub fn artifact_path(&self) -> PathBuf {
        self.artifact_dir.join(ARTIFACT_NAME)
    }

    fn publish(&self, state: UpdateState) {
        self.state.send_replace(state);
    }

    /// Asks the server for the newest published build. Publishes `Available`
    /// and returns the descriptor when it is newer than the running build;
    /// publishes `Idle` and returns `None` when already current.
    pub async fn check_for_update(
        &self,
        auth: Option<&AuthContext>,
    ) -> Result<Option<UpdateDescriptor>, UpdateError> {
        let _flight = FlightGuard::acquire(&self.busy)?;
        self.publish(UpdateState::Checking);
        match self.fetch_descriptor(auth).await {
            Ok(desc) if desc.is_newer_than(self.identity.version_code) => {
                tracing::info!(
                    offered = desc.version_code,
                    running = self.identity.version_code,
                    "update available"
                );
                self.publish(UpdateState::Available(desc.clone()));
                Ok(Some(desc))
            }
            Ok(desc) => {
                tracing::debug!(
                    offered = desc.version_code,
                    running = self.identity.version_code,
                    "running build is current"
                );
                self.publish(UpdateState::Idle);
                Ok(None)
            }
            Err(e) => {
                self.publish(UpdateState::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn fetch_descriptor(
        &self,
        auth: Option<&AuthContext>,
    ) -> Result<UpdateDescriptor, UpdateError> {
        let info = self.api.latest_update(auth).await?;
        UpdateDescriptor::from_wire(info)
    }

    /// Downloads and verifies `descriptor`, publishing progress along the
    /// way. On success the artifact stays in the cache and `Complete` is
    /// published; any failure publishes `Failed` and leaves no artifact
    /// behind.
    pub async fn download_update(
        &self,
        descriptor: &UpdateDescriptor,
        auth: Option<&AuthContext>,
    ) -> Result<DownloadedArtifact, UpdateError> {
        let _flight = FlightGuard::acquire(&self.busy)?;
        self.publish(UpdateState::Downloading { percent: 0 });
        match self.run_download(descriptor, auth).await {
            Ok(artifact) => {
                self.publish(UpdateState::Complete(artifact.clone()));
                Ok(artifact)
            }
            Err(e) => {
                self.publish(UpdateState::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_download(
        &self,
        descriptor: &UpdateDescriptor,
        auth: Option<&AuthContext>,
    ) -> Result<DownloadedArtifact, UpdateError> {
        let url = descriptor.download_url.clone();
        let auth = auth.cloned();
        let dest = self.artifact_path();
        let connect_timeout = self.api.http().connect_timeout();
        let sender = Arc::clone(&self.state);
        let bytes = tokio::task::spawn_blocking(move || {
            let mut report = |percent: i32| {
                sender.send_replace(UpdateState::Downloading { percent });
            };
            download::fetch_artifact(&url, auth.as_ref(), &dest, connect_timeout, &mut report)
        })
        .await
        .map_err(|e| UpdateError::Task(e.to_string()))??;
        tracing::debug!(bytes, "download complete, verifying");

        self.publish(UpdateState::VerifyingIntegrity);
        let dest = self.artifact_path();
        let descriptor = descriptor.clone();
        let identity = self.identity.clone();
        let inspector = Arc::clone(&self.inspector);
        tokio::task::spawn_blocking(move || {
            verify::verify_artifact(&dest, &descriptor, &identity, inspector.as_ref())
        })
        .await
        .map_err(|e| UpdateError::Task(e.to_string()))?
    }

    /// Hands a verified artifact to the host installer. The artifact file is
    /// left in place in every outcome; a refused or failed handoff must be
    /// retryable without downloading again.
    pub fn install_update(
        &self,
        host: &dyn InstallHost,
        artifact: &DownloadedArtifact,
    ) -> Result<InstallOutcome, UpdateError> {
        if !host.can_request_install() {
            host.request_install_permission()
                .map_err(|e| UpdateError::Install(format!("{:#}", e)))?;
            tracing::info!("install permission requested, artifact kept for retry");
            return Ok(InstallOutcome::PermissionRequested);
        }
        let source = host
            .share_for_read(&artifact.path)
            .map_err(|e| UpdateError::Install(format!("{:#}", e)))?;
        host.request_install(&source)
            .map_err(|e| UpdateError::Install(format!("{:#}", e)))?;
        tracing::info!(path = %source.path.display(), "install requested");
        Ok(InstallOutcome::Started)
    }
}

/// Marks the pipeline busy for the duration of one flight. Acquisition fails
/// instead of queueing; the published state is not touched on refusal, so a
/// rejected caller cannot clobber the active flight's state.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, UpdateError> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(UpdateError::Busy);
        }
        Ok(Self { flag })
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
