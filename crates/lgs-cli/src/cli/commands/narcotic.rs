//! `lgs narcotic` – check whether a drug needs the narcotic workflow.

use anyhow::Result;
use lgs_core::api::ApiClient;
use lgs_core::session::SessionStore;

use super::support::{fail_api, require_session};

pub async fn run_narcotic(api: &ApiClient, store: &SessionStore, code: &str) -> Result<()> {
    let (_session, auth) = require_session(store)?;
    let check = api
        .check_narcotic(&auth, code)
        .await
        .map_err(|e| fail_api(store, e))?;
    if check.is_narcotic {
        println!("{code} is a controlled narcotic; double sign-off required");
    } else {
        println!("{code} is not a controlled narcotic");
    }
    Ok(())
}
