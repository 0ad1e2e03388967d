//! `lgs receive` – confirm a bin pick against the server.

use anyhow::Result;
use lgs_core::api::ApiClient;
use lgs_core::session::SessionStore;

use super::support::{fail_api, require_session};

pub async fn run_receive(
    api: &ApiClient,
    store: &SessionStore,
    location: &str,
    reference: Option<&str>,
) -> Result<()> {
    let (session, auth) = require_session(store)?;
    let ack = api
        .receive_order(&auth, location, reference, Some(session.user.id.as_str()))
        .await
        .map_err(|e| fail_api(store, e))?;
    if ack.message {
        println!("received at {location}");
    } else {
        println!("server did not accept the receive for {location}");
    }
    Ok(())
}
