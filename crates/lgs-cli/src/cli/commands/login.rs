//! `lgs login` – authenticate and store the session.

use anyhow::{Context, Result};
use lgs_core::api::ApiClient;
use lgs_core::jwt::{self, LightColor, TokenClaims};
use lgs_core::session::{SessionStore, StoredSession};
use std::io::Write;

pub async fn run_login(
    api: &ApiClient,
    store: &SessionStore,
    username: &str,
    password: Option<String>,
    qr: bool,
) -> Result<()> {
    let user = if qr {
        api.qr_login(username).await?
    } else {
        let password = match password {
            Some(p) => p,
            None => prompt_password()?,
        };
        api.login(username, &password).await?
    };
    let session = StoredSession {
        token: user.token.clone(),
        user,
    };
    store.save_session(&session)?;

    match jwt::decode_claims::<TokenClaims>(&session.token) {
        Ok(claims) => match claims.color.as_deref() {
            Some(code) => println!(
                "logged in as user {} (guide light: {})",
                session.user.id,
                LightColor::from_code(code)
            ),
            None => println!("logged in as user {}", session.user.id),
        },
        Err(e) => {
            tracing::debug!("token claims not decodable: {}", e);
            println!("logged in as user {}", session.user.id);
        }
    }
    Ok(())
}

fn prompt_password() -> Result<String> {
    print!("password: ");
    std::io::stdout().flush().context("flush stdout")?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("read password")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
