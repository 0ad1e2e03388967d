//! Self-update pipeline.
//!
//! A station keeps itself current in four steps: ask the version endpoint
//! for the newest build, stream the package into the cache, verify its
//! SHA-256 digest and declared package id, then hand the file to the host
//! installer. Every step publishes its state through [`UpdatePipeline`], and
//! a rejected artifact is always deleted before the failure is reported.

pub mod descriptor;
pub mod download;
pub mod error;
pub mod pipeline;
pub mod state;
pub mod verify;

pub use descriptor::UpdateDescriptor;
pub use download::{fetch_artifact, staging_path};
pub use error::UpdateError;
pub use pipeline::{InstallOutcome, UpdatePipeline, ARTIFACT_NAME};
pub use state::{DownloadedArtifact, UpdateState};
pub use verify::{checksum_matches, sha256_file, verify_artifact};
