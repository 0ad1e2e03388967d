//! `lgs pause` – stop an in-flight dispense round.

use anyhow::Result;
use lgs_core::api::ApiClient;
use lgs_core::session::SessionStore;

use super::support::{fail_api, require_session};

pub async fn run_pause(api: &ApiClient, store: &SessionStore, hn: &str) -> Result<()> {
    let (_session, auth) = require_session(store)?;
    api.pause_dispense(&auth, hn)
        .await
        .map_err(|e| fail_api(store, e))?;

    let mut state = store.load_station();
    if state.hn == hn {
        state.hn.clear();
        state.dispense_mode = false;
        store.save_station(&state)?;
    }
    println!("dispense paused for {hn}");
    Ok(())
}
