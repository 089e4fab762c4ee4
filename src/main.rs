use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use eyre::{Result, WrapErr};
use log::{LevelFilter, info, warn};
use tokio::signal;

use ytxd::config::Config;
use ytxd::oembed::OembedClient;
use ytxd::server::{self, AppState};
use ytxd::youtube::CaptionClient;

mod cli;

use cli::Cli;

fn setup_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if let Some(log_file) = log_file {
        if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let target = Box::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
                .wrap_err_with(|| format!("could not open log file {}", log_file.display()))?,
        );
        builder.target(env_logger::Target::Pipe(target));
    }

    builder.init();
    if let Some(log_file) = log_file {
        info!("Logging initialized: {}", log_file.display());
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {err}");
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.log_file.as_deref())?;

    // Load config file (non-fatal if missing/invalid)
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        warn!("Ignoring config file: {e:#}");
        Config::default()
    });

    // CLI flags take priority
    if cli.host.is_some() {
        config.host = cli.host;
    }
    if cli.port.is_some() {
        config.port = cli.port;
    }

    let client = reqwest::Client::new();
    let state = AppState {
        transcripts: Arc::new(CaptionClient::new(client.clone(), config.languages())),
        oembed: OembedClient::new(client),
        transcript_timeout: config.transcript_timeout(),
    };

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("binding to {addr}"))?;
    info!(
        "Listening on http://{addr} (languages: {}, transcript timeout: {:?})",
        config.languages().join(","),
        config.transcript_timeout()
    );

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("running HTTP server")?;

    Ok(())
}
