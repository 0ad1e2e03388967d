//! Persist login session and station state to disk (JSON under XDG state
//! dir) so both survive across runs.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::api::types::{ActiveLight, UserAuth};

const SESSION_FILE: &str = "session.json";
const STATION_FILE: &str = "station.json";

/// A logged-in user: the bearer token plus the identity the server returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: String,
    pub user: UserAuth,
}

/// Mutable station-side state that outlives a single command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationState {
    /// Patient HN currently being dispensed, empty when idle.
    #[serde(default)]
    pub hn: String,
    /// True while a dispense pass is in progress.
    #[serde(default)]
    pub dispense_mode: bool,
    /// Reference of the order a label was last requested for.
    #[serde(default)]
    pub order_label: Option<String>,
    /// Shelf light currently forced on by hand, if any.
    #[serde(default)]
    pub active_light: Option<ActiveLight>,
}

/// Reads and writes the station's JSON state files.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Store rooted at `~/.local/state/lgs/`.
    pub fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("lgs")?;
        Ok(Self {
            dir: xdg_dirs.get_state_home().join("lgs"),
        })
    }

    /// Store rooted at an explicit directory. Used by tests.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    pub fn station_path(&self) -> PathBuf {
        self.dir.join(STATION_FILE)
    }

    pub fn save_session(&self, session: &StoredSession) -> Result<()> {
        write_json(&self.session_path(), session).context("save session")
    }

    /// Loads the stored session. Missing file means logged out; an unreadable
    /// file is treated the same after a warning, so a bad write never wedges
    /// the station.
    pub fn load_session(&self) -> Result<Option<StoredSession>> {
        let path = self.session_path();
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e).with_context(|| format!("read session: {}", path.display())),
        };
        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unparsable session file");
                Ok(None)
            }
        }
    }

    pub fn clear_session(&self) -> Result<()> {
        let path = self.session_path();
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove session: {}", path.display())),
        }
    }

    pub fn save_station(&self, state: &StationState) -> Result<()> {
        write_json(&self.station_path(), state).context("save station state")
    }

    /// Loads station state, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn load_station(&self) -> StationState {
        let path = self.station_path();
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return StationState::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read station state");
                return StationState::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "discarding unparsable station state");
                StationState::default()
            }
        }
    }
}

/// Writes `value` as pretty JSON via a temp file and rename so a crash
/// mid-write never leaves a half-written state file.
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("serialize state")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("write: {}", tmp.display()))?;
    std::fs::rename(&tmp, path).with_context(|| format!("finalize: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_session() -> StoredSession {
        StoredSession {
            token: "tok-abc".to_string(),
            user: UserAuth {
                id: "7".to_string(),
                token: "tok-abc".to_string(),
            },
        }
    }

    #[test]
    fn session_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_dir(dir.path());
        let session = sample_session();
        store.save_session(&session).unwrap();
        assert_eq!(store.load_session().unwrap(), Some(session));
    }

    #[test]
    fn missing_session_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_dir(dir.path().join("nested"));
        assert_eq!(store.load_session().unwrap(), None);
    }

    #[test]
    fn corrupt_session_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_dir(dir.path());
        std::fs::write(store.session_path(), b"{not json").unwrap();
        assert_eq!(store.load_session().unwrap(), None);
    }

    #[test]
    fn clear_session_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_dir(dir.path());
        store.clear_session().unwrap();
        store.save_session(&sample_session()).unwrap();
        store.clear_session().unwrap();
        store.clear_session().unwrap();
        assert_eq!(store.load_session().unwrap(), None);
    }

    #[test]
    fn station_state_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_dir(dir.path());
        let state = store.load_station();
        assert_eq!(state, StationState::default());
        assert!(!state.dispense_mode);
        assert_eq!(state.hn, "");
    }

    #[test]
    fn station_state_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_dir(dir.path());
        let state = StationState {
            hn: "HN001234".to_string(),
            dispense_mode: true,
            order_label: Some("RX-9".to_string()),
            active_light: Some(ActiveLight {
                drug_code: "PARA500".to_string(),
                drug_name: "Paracetamol 500mg".to_string(),
                location: "A-03-2".to_string(),
            }),
        };
        store.save_station(&state).unwrap();
        assert_eq!(store.load_station(), state);
    }

    #[test]
    fn corrupt_station_state_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::with_dir(dir.path());
        std::fs::write(store.station_path(), b"[]").unwrap();
        assert_eq!(store.load_station(), StationState::default());
    }
}
