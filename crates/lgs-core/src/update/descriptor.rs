//! Metadata for a published build.

use super::error::UpdateError;
use crate::api::types::UpdateInfo;

/// An update the server is offering. `version_code` is the integer form of
/// the wire value; ordering against the running build happens on this number,
/// never on the display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateDescriptor {
    pub version_code: u64,
    pub version_name: String,
    pub download_url: String,
    pub changelog: String,
    /// Hex SHA-256 as published, possibly mixed case.
    pub checksum: String,
}

impl UpdateDescriptor {
    /// Converts the wire record, parsing the string-encoded version code.
    pub fn from_wire(info: UpdateInfo) -> Result<Self, UpdateError> {
        let raw = info.version_code.trim();
        let version_code = raw
            .parse::<u64>()
            .map_err(|_| UpdateError::BadVersionCode {
                raw: raw.to_string(),
            })?;
        Ok(Self {
            version_code,
            version_name: info.version_name,
            download_url: info.apk_url,
            changelog: info.changelog,
            checksum: info.checksum,
        })
    }

    pub fn is_newer_than(&self, running_code: u64) -> bool {
        self.version_code > running_code
    }
}
