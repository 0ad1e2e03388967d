//! Streaming HTTP GET for update artifacts.
//!
//! Writes the body sequentially to `<dest>.part` while reporting integer
//! percent progress, then renames into place once the transfer is complete.

use super::error::UpdateError;
use crate::http::AuthContext;
use std::cell::Cell;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str;
use std::time::Duration;

/// Staging file suffix used before atomic rename.
const PART_SUFFIX: &str = ".part";

/// Path for the staging file: appends `.part` to the destination
/// (e.g. `update.pkg` -> `update.pkg.part`).
pub fn staging_path(dest: &Path) -> PathBuf {
    let mut o = dest.as_os_str().to_owned();
    o.push(PART_SUFFIX);
    PathBuf::from(o)
}

/// Downloads `url` into `dest`, streaming through the staging file.
///
/// `progress` receives percentages computed from `Content-Length`, published
/// only when the value grows and ending at 100, or a single -1 when the
/// server declares no length. Any staging file left over from an earlier
/// attempt is discarded first, so every call starts from byte zero.
/// Returns the number of bytes written.
pub fn fetch_artifact(
    url: &str,
    auth: Option<&AuthContext>,
    dest: &Path,
    connect_timeout: Duration,
    progress: &mut dyn FnMut(i32),
) -> Result<u64, UpdateError> {
    let staging = staging_path(dest);
    match std::fs::remove_file(&staging) {
        Ok(()) => tracing::debug!(path = %staging.display(), "removed stale staging file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(UpdateError::Io(e)),
    }
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::options()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&staging)?;

    // Shared with the transfer callbacks below.
    let status = Cell::new(0u32);
    let total = Cell::new(None::<u64>);
    let written = Cell::new(0u64);
    let last_percent = Cell::new(-1i32);
    let announced_unknown = Cell::new(false);

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(connect_timeout)?;
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    easy.timeout(Duration::from_secs(3600))?;
    if let Some(auth) = auth {
        let mut list = curl::easy::List::new();
        list.append(&format!("Authorization: Bearer {}", auth.token()))?;
        easy.http_headers(list)?;
    }

    {
        let mut transfer = easy.transfer();
        transfer.header_function(|line| {
            if let Ok(text) = str::from_utf8(line) {
                let text = text.trim();
                if let Some(rest) = text.strip_prefix("HTTP/") {
                    // A redirect starts a fresh header block; forget the
                    // previous response's length.
                    if let Some(code) = rest
                        .split_whitespace()
                        .nth(1)
                        .and_then(|s| s.parse::<u32>().ok())
                    {
                        status.set(code);
                        total.set(None);
                    }
                } else if let Some(value) = header_value(text, "content-length") {
                    total.set(value.parse::<u64>().ok().filter(|n| *n > 0));
                }
            }
            true
        })?;
        transfer.write_function(|data| {
            if !(200..300).contains(&status.get()) {
                // Error-page body; count nothing, write nothing.
                return Ok(data.len());
            }
            if let Err(e) = file.write_all(data) {
                tracing::warn!("artifact write failed: {}", e);
                return Ok(0); // abort transfer
            }
            let count = written.get() + data.len() as u64;
            written.set(count);
            match total.get() {
                Some(t) => {
                    let pct = ((count * 100) / t).min(100) as i32;
                    if pct > last_percent.get() {
                        last_percent.set(pct);
                        progress(pct);
                    }
                }
                None => {
                    if !announced_unknown.get() {
                        announced_unknown.set(true);
                        progress(-1);
                    }
                }
            }
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    let count = written.get();
    if !(200..300).contains(&code) {
        drop(file);
        let _ = std::fs::remove_file(&staging);
        return Err(UpdateError::Download { status: code });
    }
    if count == 0 {
        drop(file);
        let _ = std::fs::remove_file(&staging);
        return Err(UpdateError::EmptyBody);
    }
    if let Some(expected) = total.get() {
        if count != expected {
            drop(file);
            let _ = std::fs::remove_file(&staging);
            return Err(UpdateError::PartialTransfer {
                expected,
                received: count,
            });
        }
    }

    file.sync_all()?;
    // Close before rename for platforms that dislike renaming open files.
    drop(file);
    std::fs::rename(&staging, dest)?;
    tracing::info!(url, bytes = count, dest = %dest.display(), "artifact downloaded");
    Ok(count)
}

fn header_value<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let (k, v) = line.split_once(':')?;
    if k.trim().eq_ignore_ascii_case(name) {
        Some(v.trim())
    } else {
        None
    }
}
