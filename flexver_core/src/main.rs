/*============================================================
  Synavera Project: FlexVer
  Module: flexver_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for FlexVer. Mounts the version view, services
    its refresh request against a FlexGet daemon or the release
    index, reduces the result into the store, and renders.

  Security / Safety Notes:
    Operates within user privileges. Performs HTTP(S) GET
    requests and reads operator-supplied files only.

  Dependencies:
    clap for CLI parsing, tokio for the runtime and the refresh
    channel, chrono for session stamps.

  Operational Scope:
    Invoked by operators or status bars that need the daemon's
    version line and an update hint.

  Revision History:
    2025-11-12 COD  Authored FlexVer composition root.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

mod comparator;
mod config;
mod error;
mod logger;
mod refresh;
mod release;
mod store;
#[cfg(test)]
mod test_support;
mod version_info;
mod view;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use comparator::SemverComparator;
use config::FlexverConfig;
use error::{FlexverError, Result};
use logger::Logger;
use refresh::{mount_and_refresh, RefreshOptions};
use release::{check_release, ReleaseClient, ReleaseReport};
use store::{Action, VersionStore};
use view::ViewProps;

/// Command-line arguments for FlexVer.
#[derive(Debug, Parser)]
#[command(
    name = "flexver",
    version,
    author = "Synavera Systems",
    about = "Version line and update hint for a FlexGet daemon"
)]
struct Cli {
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// FlexGet daemon base URL (overrides `server.base_url`).
    #[arg(long, value_name = "URL")]
    server: Option<String>,
    /// Running FlexGet version when no daemon is queried.
    #[arg(long, value_name = "VERSION")]
    current: Option<String>,
    /// Reduce a JSON action from this file instead of fetching.
    #[arg(long, value_name = "PATH")]
    action_file: Option<PathBuf>,
    /// Report current vs latest release and exit.
    #[arg(long, action = ArgAction::SetTrue)]
    check: bool,
    /// Emit the rendering as JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[FlexVer] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = FlexverConfig::load_from_optional_path(cli.config.as_deref())?;
    if let Some(server) = &cli.server {
        config.server.base_url = Some(server.clone());
    }

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| config.log_dir().join(format!("flexver_{session_stamp}.log")));
    let logger = Logger::new(Some(log_path), cli.verbose)?;
    logger.info("INIT", "FlexVer session opened.");

    let client = ReleaseClient::new(&config.server, &config.release)?;

    let code = if cli.check {
        run_check(&cli, &config, &client, &logger).await?
    } else {
        run_view(&cli, &config, &client, &logger).await?
    };

    logger.info("COMPLETE", "FlexVer session closed.");
    logger.finalize()?;
    Ok(code)
}

async fn run_view(
    cli: &Cli,
    config: &FlexverConfig,
    client: &ReleaseClient,
    logger: &Logger,
) -> Result<ExitCode> {
    let mut store = VersionStore::new();
    let props = ViewProps::new(store.state().clone())
        .with_class_name(config.view.class_name.clone())
        .with_changelog_url(config.view.changelog_url.clone());
    let options = RefreshOptions {
        action_file: cli.action_file.clone(),
        current: cli.current.clone(),
    };
    let outcome = mount_and_refresh(
        props,
        &mut store,
        &options,
        client,
        &SemverComparator,
        logger,
    )
    .await;
    let rendered = &outcome.rendered;
    logger.info(
        "RENDER",
        format!(
            "flexget=`{}` api=`{}` update_available={}",
            store.state().flexget,
            store.state().api,
            rendered.update_available()
        ),
    );

    if cli.json {
        let text = serde_json::to_string_pretty(rendered).map_err(|err| {
            FlexverError::Serialization(format!("Failed to encode rendering: {err}"))
        })?;
        println!("{text}");
    } else {
        println!("{rendered}");
    }

    Ok(outcome.exit_code())
}

async fn run_check(
    cli: &Cli,
    config: &FlexverConfig,
    client: &ReleaseClient,
    logger: &Logger,
) -> Result<ExitCode> {
    let current = match &cli.current {
        Some(current) => current.clone(),
        None => match client.fetch_server_version().await? {
            Action::VersionReceived(payload) => payload.flexget_version,
            _ => String::new(),
        },
    };

    let latest = match client.fetch_latest_release().await {
        Ok(latest) => Some(latest),
        Err(err) => {
            logger.warn("RELEASE", format!("Latest release unknown: {err}"));
            None
        }
    };

    let status = check_release(&current, latest.as_deref());
    logger.info("CHECK", format!("current=`{current}` status={status:?}"));

    println!("{current}");
    let release_page = config.release_page();
    println!(
        "{}",
        ReleaseReport {
            status: &status,
            release_page: &release_page,
        }
    );
    Ok(ExitCode::SUCCESS)
}
