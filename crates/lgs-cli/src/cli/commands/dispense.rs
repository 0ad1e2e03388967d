//! `lgs dispense` – fetch pending orders and enter dispense mode.

use anyhow::Result;
use lgs_core::api::ApiClient;
use lgs_core::session::SessionStore;

use super::support::{fail_api, print_orders, require_session};

pub async fn run_dispense(api: &ApiClient, store: &SessionStore, hn: &str) -> Result<()> {
    let (_session, auth) = require_session(store)?;
    let prescription = api
        .prescription_orders(&auth, hn)
        .await
        .map_err(|e| fail_api(store, e))?;
    let Some(prescription) = prescription else {
        println!("no pending orders for {hn}");
        return Ok(());
    };
    println!(
        "{} ({}): {} order(s)",
        prescription.patient_name,
        prescription.hn,
        prescription.orders.len()
    );
    print_orders(&prescription.orders);

    let mut state = store.load_station();
    state.hn = prescription.hn.clone();
    state.dispense_mode = true;
    store.save_station(&state)?;
    Ok(())
}
