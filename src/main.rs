//! KuaKua chat front-end
//!
//! Entry point for the terminal chat client.

use mimalloc::MiMalloc;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::path::PathBuf;

use anyhow::Context;
use console::Term;
use dotenvy::dotenv;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use kuakua_chat::api::HttpBackend;
use kuakua_chat::config::{AppConfig, LogConfig};
use kuakua_chat::shell::{self, Shell};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present)
    let _ = dotenv();

    let config = AppConfig::load().context("Configuration error")?;
    init_tracing(&config.log);

    info!(
        name: "api.config.loaded",
        base_url = %config.api.base_url,
        cookie_file = ?config.session.cookie_file,
        "Backend configuration loaded"
    );

    let backend = HttpBackend::new(
        &config.api.base_url,
        config.session.cookie_file.as_ref().map(PathBuf::from),
    )
    .with_context(|| format!("Invalid backend URL: {}", config.api.base_url))?;

    match backend.session().restore().await {
        Ok(Some(_)) => info!(name: "session.resumed", "Resuming previous session"),
        Ok(None) => {}
        Err(e) => warn!(
            name: "session.restore_failed",
            error = %e,
            "Could not read session cookie file"
        ),
    }

    let mut terminal = Shell::new(&config.ui, Term::stdout());
    shell::run(&backend, &mut terminal, BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}

/// Initialize tracing (M-LOG-STRUCTURED).
///
/// Logs go to stderr so they never interleave with the frame on stdout.
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_new(&log.filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    if log.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
