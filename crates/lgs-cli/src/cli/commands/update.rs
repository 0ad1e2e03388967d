//! `lgs update` – check for a newer build, download it and hand it to the
//! platform installer.

use std::sync::Arc;

use anyhow::Result;
use lgs_core::api::ApiClient;
use lgs_core::build_info::AppIdentity;
use lgs_core::config::StationConfig;
use lgs_core::http::AuthContext;
use lgs_core::session::SessionStore;
use lgs_core::update::{InstallOutcome, UpdatePipeline, UpdateState};

use crate::host::DebianHost;

pub async fn run_update(
    cfg: &StationConfig,
    api: &ApiClient,
    store: &SessionStore,
    check_only: bool,
) -> Result<()> {
    let auth = store
        .load_session()?
        .map(|session| AuthContext::new(session.token));
    let identity = AppIdentity::current();
    let host = Arc::new(DebianHost::from_config(cfg)?);
    let pipeline = UpdatePipeline::new(
        api.clone(),
        identity.clone(),
        cfg.artifact_dir()?,
        host.clone(),
    );

    let Some(descriptor) = pipeline.check_for_update(auth.as_ref()).await? else {
        println!(
            "lgs {} (build {}) is up to date",
            identity.version_name, identity.version_code
        );
        return Ok(());
    };
    println!(
        "update available: {} (build {})",
        descriptor.version_name, descriptor.version_code
    );
    if !descriptor.changelog.is_empty() {
        // The server stores newlines as literal "\n" sequences.
        println!("{}", descriptor.changelog.replace("\\n", "\n"));
    }
    if check_only {
        return Ok(());
    }

    let mut rx = pipeline.subscribe();
    let reporter = tokio::spawn(async move {
        let mut line_open = false;
        while rx.changed().await.is_ok() {
            match rx.borrow_and_update().clone() {
                UpdateState::Downloading { percent } if percent >= 0 => {
                    eprint!("\rdownloading {percent:3}%");
                    line_open = true;
                }
                UpdateState::Downloading { .. } => {
                    eprint!("\rdownloading...");
                    line_open = true;
                }
                UpdateState::VerifyingIntegrity => {
                    if line_open {
                        eprintln!();
                        line_open = false;
                    }
                    eprintln!("verifying integrity...");
                }
                UpdateState::Complete(_) | UpdateState::Failed { .. } | UpdateState::Idle => {
                    if line_open {
                        eprintln!();
                    }
                    break;
                }
                _ => {}
            }
        }
    });

    let result = pipeline.download_update(&descriptor, auth.as_ref()).await;
    let _ = reporter.await;
    let artifact = result?;
    println!(
        "downloaded {} (sha256 {})",
        artifact.path.display(),
        artifact.digest
    );

    match pipeline.install_update(host.as_ref(), &artifact)? {
        InstallOutcome::Started => {
            println!("installer launched; the station restarts into the new build");
        }
        InstallOutcome::PermissionRequested => {
            println!(
                "artifact kept at {}; rerun `lgs update` once installing is possible",
                artifact.path.display()
            );
        }
    }
    Ok(())
}
