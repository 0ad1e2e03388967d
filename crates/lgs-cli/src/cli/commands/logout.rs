//! `lgs logout` – end the session on the server and locally.

use anyhow::Result;
use lgs_core::api::ApiClient;
use lgs_core::jwt::{self, TokenClaims};
use lgs_core::session::SessionStore;

use super::support::require_session;

pub async fn run_logout(api: &ApiClient, store: &SessionStore) -> Result<()> {
    let (session, auth) = require_session(store)?;
    let color = jwt::decode_claims::<TokenClaims>(&session.token)
        .ok()
        .and_then(|c| c.color)
        .unwrap_or_else(|| "0".to_string());
    // Server-side logout is best effort; the local session goes either way.
    if let Err(e) = api.logout(&auth, &color, &session.user.id).await {
        tracing::warn!("server logout failed: {}", e);
    }
    store.clear_session()?;
    println!("logged out");
    Ok(())
}
