//! `lgs light-on` / `lgs light-off` – drive a bin light by hand.

use anyhow::Result;
use lgs_core::api::ApiClient;
use lgs_core::session::SessionStore;

use super::support::{fail_api, require_session};

pub async fn run_light_on(api: &ApiClient, store: &SessionStore, location: &str) -> Result<()> {
    let (_session, auth) = require_session(store)?;
    let light = api
        .light_on(&auth, location)
        .await
        .map_err(|e| fail_api(store, e))?;
    println!(
        "light on at {} ({} {})",
        light.location, light.drug_code, light.drug_name
    );

    let mut state = store.load_station();
    state.active_light = Some(light);
    store.save_station(&state)?;
    Ok(())
}

pub async fn run_light_off(api: &ApiClient, store: &SessionStore, location: &str) -> Result<()> {
    let (_session, auth) = require_session(store)?;
    api.light_off(&auth, location)
        .await
        .map_err(|e| fail_api(store, e))?;
    println!("light off at {location}");

    let mut state = store.load_station();
    if state
        .active_light
        .as_ref()
        .is_some_and(|light| light.location == location)
    {
        state.active_light = None;
        store.save_station(&state)?;
    }
    Ok(())
}
