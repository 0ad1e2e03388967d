//! CLI for the LGS station client.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lgs_core::api::ApiClient;
use lgs_core::config;
use lgs_core::http::HttpClient;
use lgs_core::session::SessionStore;

use commands::{
    run_completions, run_dispense, run_label, run_light_off, run_light_on, run_login, run_logout,
    run_man, run_narcotic, run_pause, run_receive, run_redispense, run_update, run_whoami,
};

/// Top-level CLI for the LGS station client.
#[derive(Debug, Parser)]
#[command(name = "lgs")]
#[command(about = "LGS: pharmacy light guiding station client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Log in to the station backend and store the session.
    Login {
        /// Backend account name.
        username: String,
        /// Password; prompted for when omitted.
        password: Option<String>,
        /// Use the QR code flow (no password).
        #[arg(long)]
        qr: bool,
    },

    /// End the session on the server and locally.
    Logout,

    /// Show the logged-in user and assigned light color.
    Whoami,

    /// Fetch pending orders for a patient HN and enter dispense mode.
    Dispense {
        /// Patient hospital number.
        hn: String,
    },

    /// Turn a bin light on by its location code.
    LightOn {
        /// Bin location, e.g. "A-03-2".
        location: String,
    },

    /// Turn a bin light off by its location code.
    LightOff {
        /// Bin location, e.g. "A-03-2".
        location: String,
    },

    /// Pause the dispense pass for a patient.
    Pause {
        /// Patient hospital number.
        hn: String,
    },

    /// Fetch already-dispensed orders for a second pass.
    Redispense {
        /// Patient hospital number.
        hn: String,
    },

    /// Check whether a drug code is a controlled narcotic.
    Narcotic {
        /// Drug code.
        code: String,
    },

    /// Request a shelf label for an order line.
    Label {
        /// Order reference code.
        reference: String,
        /// Drug code.
        code: String,
    },

    /// Confirm receipt of an order at a bin location.
    Receive {
        /// Bin location code.
        location: String,
        /// Order reference code, when the bin holds several.
        #[arg(long)]
        reference: Option<String>,
    },

    /// Check for a newer build and install it.
    Update {
        /// Only report whether an update exists.
        #[arg(long)]
        check: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },

    /// Render the man page to stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let api = ApiClient::from_config(HttpClient::from_config(&cfg)?, &cfg);
        let store = SessionStore::open_default()?;

        match cli.command {
            CliCommand::Login {
                username,
                password,
                qr,
            } => run_login(&api, &store, &username, password, qr).await?,
            CliCommand::Logout => run_logout(&api, &store).await?,
            CliCommand::Whoami => run_whoami(&api, &store).await?,
            CliCommand::Dispense { hn } => run_dispense(&api, &store, &hn).await?,
            CliCommand::LightOn { location } => run_light_on(&api, &store, &location).await?,
            CliCommand::LightOff { location } => run_light_off(&api, &store, &location).await?,
            CliCommand::Pause { hn } => run_pause(&api, &store, &hn).await?,
            CliCommand::Redispense { hn } => run_redispense(&api, &store, &hn).await?,
            CliCommand::Narcotic { code } => run_narcotic(&api, &store, &code).await?,
            CliCommand::Label { reference, code } => {
                run_label(&api, &store, &reference, &code).await?
            }
            CliCommand::Receive {
                location,
                reference,
            } => run_receive(&api, &store, &location, reference.as_deref()).await?,
            CliCommand::Update { check } => run_update(&cfg, &api, &store, check).await?,
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}
