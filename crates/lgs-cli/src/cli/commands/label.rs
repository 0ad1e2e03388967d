//! `lgs label` – fetch the shelf label for one order line.

use anyhow::Result;
use lgs_core::api::ApiClient;
use lgs_core::session::SessionStore;

use super::support::{fail_api, require_session};

pub async fn run_label(
    api: &ApiClient,
    store: &SessionStore,
    reference: &str,
    code: &str,
) -> Result<()> {
    let (_session, auth) = require_session(store)?;
    let label = api
        .order_label(&auth, reference, code)
        .await
        .map_err(|e| fail_api(store, e))?;
    println!("{}", label.item_name);
    println!(
        "{} {}  bin {}  ref {}",
        label.qty, label.unit, label.bin_location, label.reference_code
    );

    let mut state = store.load_station();
    state.order_label = Some(label.reference_code.clone());
    store.save_station(&state)?;
    Ok(())
}
