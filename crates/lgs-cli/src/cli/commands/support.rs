//! Shared helpers for command handlers.

use anyhow::{bail, Result};
use lgs_core::api::{ApiError, Order};
use lgs_core::http::AuthContext;
use lgs_core::session::{SessionStore, StoredSession};

/// Loads the stored session or fails with a login hint.
pub fn require_session(store: &SessionStore) -> Result<(StoredSession, AuthContext)> {
    match store.load_session()? {
        Some(session) => {
            let auth = AuthContext::new(session.token.clone());
            Ok((session, auth))
        }
        None => bail!("not logged in; run `lgs login <username>` first"),
    }
}

/// Converts an API failure into the final CLI error. A 401 additionally
/// clears the stored session so the next command asks for a fresh login.
pub fn fail_api(store: &SessionStore, err: ApiError) -> anyhow::Error {
    if matches!(err, ApiError::Unauthorized) {
        if let Err(e) = store.clear_session() {
            tracing::warn!("could not clear stale session: {:#}", e);
        }
        return anyhow::anyhow!("session expired; run `lgs login <username>` again");
    }
    anyhow::Error::new(err)
}

/// Prints an order table the way the station screens lay it out.
pub fn print_orders(orders: &[Order]) {
    println!(
        "{:<12} {:<30} {:<6} {:<6} {:<10} {}",
        "CODE", "ITEM", "QTY", "UNIT", "BIN", "REFERENCE"
    );
    for o in orders {
        println!(
            "{:<12} {:<30} {:<6} {:<6} {:<10} {}",
            o.item_code, o.item_name, o.qty, o.unit, o.bin_location, o.reference_code
        );
    }
}
