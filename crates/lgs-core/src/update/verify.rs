//! Artifact integrity checks: digest plus declared package identity.

use super::descriptor::UpdateDescriptor;
use super::error::UpdateError;
use super::state::DownloadedArtifact;
use crate::build_info::AppIdentity;
use crate::platform::PackageInspector;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read granularity for hashing.
const CHUNK_SIZE: usize = 8 * 1024;

/// Hex SHA-256 of the file at `path`, streamed chunk by chunk so artifact
/// size never matters.
pub fn sha256_file(path: &Path) -> Result<String, UpdateError> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compares a published checksum against a computed hex digest. The published
/// side may use any hex casing and may carry a `sha256:` prefix.
pub fn checksum_matches(expected: &str, computed: &str) -> bool {
    let expected = expected.trim();
    let expected = expected.strip_prefix("sha256:").unwrap_or(expected);
    expected.eq_ignore_ascii_case(computed.trim())
}

/// Verifies a downloaded file against the descriptor and the running build's
/// identity. On any mismatch the file is deleted before the error returns, so
/// a rejected artifact never survives to an install attempt.
pub fn verify_artifact(
    path: &Path,
    descriptor: &UpdateDescriptor,
    identity: &AppIdentity,
    inspector: &dyn PackageInspector,
) -> Result<DownloadedArtifact, UpdateError> {
    let computed = sha256_file(path)?;
    if !checksum_matches(&descriptor.checksum, &computed) {
        discard(path);
        return Err(UpdateError::ChecksumMismatch {
            expected: descriptor.checksum.clone(),
            computed,
        });
    }
    let package_id = match inspector.archive_package_id(path) {
        Ok(id) => id,
        Err(e) => {
            discard(path);
            return Err(UpdateError::Archive(format!("{:#}", e)));
        }
    };
    if package_id != identity.package_id {
        discard(path);
        return Err(UpdateError::PackageIdMismatch {
            expected: identity.package_id.clone(),
            found: package_id,
        });
    }
    tracing::info!(path = %path.display(), digest = %computed, "artifact verified");
    Ok(DownloadedArtifact {
        path: path.to_path_buf(),
        digest: computed,
    })
}

fn discard(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!(path = %path.display(), "could not remove rejected artifact: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedInspector(&'static str);

    impl PackageInspector for FixedInspector {
        fn archive_package_id(&self, _path: &Path) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenInspector;

    impl PackageInspector for BrokenInspector {
        fn archive_package_id(&self, _path: &Path) -> anyhow::Result<String> {
            anyhow::bail!("not an archive")
        }
    }

    fn identity() -> AppIdentity {
        AppIdentity {
            package_id: "com.thanesgroup.lgs".to_string(),
            version_code: 3,
            version_name: "1.0.1".to_string(),
        }
    }

    fn descriptor_with_checksum(checksum: &str) -> UpdateDescriptor {
        UpdateDescriptor {
            version_code: 5,
            version_name: "1.2.0".to_string(),
            download_url: "http://srv/pkg".to_string(),
            changelog: String::new(),
            checksum: checksum.to_string(),
        }
    }

    #[test]
    fn sha256_of_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, b"").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello");
        std::fs::write(&path, b"hello\n").unwrap();
        assert_eq!(
            sha256_file(&path).unwrap(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn sha256_spans_chunk_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big");
        // Three full chunks plus a tail.
        std::fs::write(&path, vec![0xa5u8; CHUNK_SIZE * 3 + 17]).unwrap();
        let first = sha256_file(&path).unwrap();
        let second = sha256_file(&path).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn checksum_comparison_ignores_case_and_prefix() {
        assert!(checksum_matches("ABCDEF", "abcdef"));
        assert!(checksum_matches("abcdef", "ABCDEF"));
        assert!(checksum_matches("sha256:AbCdEf", "abcdef"));
        assert!(checksum_matches("  abcdef  ", "abcdef"));
        assert!(!checksum_matches("abcdef", "abcde0"));
        assert!(!checksum_matches("", "abcdef"));
    }

    #[test]
    fn accepts_matching_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.pkg");
        std::fs::write(&path, b"hello\n").unwrap();
        let desc = descriptor_with_checksum(
            "5891B5B522D5DF086D0FF0B110FBD9D21BB4FC7163AF34D08286A2E846F6BE03",
        );
        let artifact =
            verify_artifact(&path, &desc, &identity(), &FixedInspector("com.thanesgroup.lgs"))
                .unwrap();
        assert_eq!(artifact.path, path);
        assert_eq!(
            artifact.digest,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
        assert!(path.exists());
    }

    #[test]
    fn checksum_mismatch_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.pkg");
        std::fs::write(&path, b"hello\n").unwrap();
        let desc = descriptor_with_checksum(&"0".repeat(64));
        let err =
            verify_artifact(&path, &desc, &identity(), &FixedInspector("com.thanesgroup.lgs"))
                .unwrap_err();
        assert!(matches!(err, UpdateError::ChecksumMismatch { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn foreign_package_id_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.pkg");
        std::fs::write(&path, b"hello\n").unwrap();
        let desc = descriptor_with_checksum(
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03",
        );
        let err = verify_artifact(&path, &desc, &identity(), &FixedInspector("com.other.app"))
            .unwrap_err();
        match err {
            UpdateError::PackageIdMismatch { expected, found } => {
                assert_eq!(expected, "com.thanesgroup.lgs");
                assert_eq!(found, "com.other.app");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!path.exists());
    }

    #[test]
    fn unreadable_archive_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.pkg");
        std::fs::write(&path, b"hello\n").unwrap();
        let desc = descriptor_with_checksum(
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03",
        );
        let err = verify_artifact(&path, &desc, &identity(), &BrokenInspector).unwrap_err();
        assert!(matches!(err, UpdateError::Archive(_)));
        assert!(!path.exists());
    }
}
