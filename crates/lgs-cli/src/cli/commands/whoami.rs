//! `lgs whoami` – show the logged-in user after validating the token.

use anyhow::Result;
use lgs_core::api::ApiClient;
use lgs_core::http::AuthContext;
use lgs_core::jwt::{self, LightColor, TokenClaims};
use lgs_core::session::SessionStore;

use super::support::fail_api;

pub async fn run_whoami(api: &ApiClient, store: &SessionStore) -> Result<()> {
    let Some(session) = store.load_session()? else {
        println!("not logged in");
        return Ok(());
    };
    let auth = AuthContext::new(session.token.clone());
    let record = api
        .check_token(&auth, &session.user.id)
        .await
        .map_err(|e| fail_api(store, e))?;

    let color = jwt::decode_claims::<TokenClaims>(&session.token)
        .ok()
        .and_then(|claims| claims.color)
        .map(|code| LightColor::from_code(&code))
        .unwrap_or(LightColor::Yellow);
    match record.full_name.as_deref().filter(|name| !name.is_empty()) {
        Some(name) => println!(
            "{} (user {}, guide light: {})",
            name, session.user.id, color
        ),
        None => println!("user {} (guide light: {})", session.user.id, color),
    }
    Ok(())
}
