//! Failure states of the update pipeline.

use crate::api::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpdateError {
    /// Another check or download is already running.
    #[error("an update operation is already in progress")]
    Busy,

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server's `version_code` did not parse as an integer.
    #[error("server reported unusable version code {raw:?}")]
    BadVersionCode { raw: String },

    /// The artifact URL answered with a non-success status.
    #[error("download failed with HTTP {status}")]
    Download { status: u32 },

    #[error(transparent)]
    Transport(#[from] curl::Error),

    /// The transfer succeeded but delivered no bytes.
    #[error("download produced an empty artifact")]
    EmptyBody,

    /// Fewer (or more) bytes arrived than the server declared.
    #[error("partial transfer: got {received} of {expected} bytes")]
    PartialTransfer { expected: u64, received: u64 },

    #[error("checksum mismatch: expected {expected}, computed {computed}")]
    ChecksumMismatch { expected: String, computed: String },

    /// The archive declares a different package than the one running.
    #[error("package id mismatch: expected {expected}, found {found}")]
    PackageIdMismatch { expected: String, found: String },

    /// The downloaded file could not be read as a package archive.
    #[error("could not inspect package: {0}")]
    Archive(String),

    #[error("install handoff failed: {0}")]
    Install(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(String),
}
