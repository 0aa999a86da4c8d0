// crates/edge/src/cli.rs

use crate::error::Error;
use crate::router;
use crate::state::AppState;
use adapt::cache::TtlCache;
use adapt::entity::Transformer;
use adapt::http::CmsClient;
use adapt::service::{CacheTtls, ContentService};
use chrono::Utc;
use clap::{builder::ValueHint, Parser, Subcommand};
use domain::setting::Settings;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

pub type Result<T> = std::result::Result<T, Error>;

/// Everwell CLI — content edge
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(serve) => do_serve(serve).await,
    };

    result.map_or_else(
        |e| {
            error!("Failed to start Everwell edge: {}", e);
            ExitCode::FAILURE
        },
        |_| {
            info!("Everwell edge stopped");
            ExitCode::SUCCESS
        },
    )
}

#[tracing::instrument(skip_all)]
async fn do_serve(serve: ServeCmd) -> Result<()> {
    // parse settings file -> does the settings file exist?  If yes, parse it
    let then = Utc::now();
    let settings = parse_settings_file(&serve)?;
    info!(
        "Settings parsed in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    // wire the pipeline -> client, cache, transformer, service
    let then = Utc::now();
    let state = build_state(&settings)?;
    info!(
        "Content service wired in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let addr = SocketAddr::new(settings.http.ip, settings.http.port);
    let listener = TcpListener::bind(addr).await?;
    info!("Serving content API on {addr}");

    axum::serve(listener, router::router(state)).await?;
    Ok(())
}

/// Load settings from `<dir>/settings.toml`.
#[tracing::instrument(skip_all)]
fn parse_settings_file(serve: &ServeCmd) -> Result<Settings> {
    let dir = serve.dir.clone();
    if !dir.exists() {
        return Err(Error::Config(format!(
            "Settings directory does not exist: {}",
            dir.display()
        )));
    }

    let mut path = PathBuf::from(dir);
    path.push("settings.toml");

    if !path.exists() {
        return Err(Error::Config(format!(
            "settings.toml not found at {}",
            path.display()
        )));
    }

    let text = std::fs::read_to_string(&path)
        .map_err(|err| Error::Config(format!("Failed reading {}: {}", path.display(), err)))?;

    let settings: Settings = toml::from_str(&text).map_err(|err| {
        Error::Config(format!(
            "Invalid settings.toml at {}: {}",
            path.display(),
            err
        ))
    })?;

    Ok(settings)
}

#[tracing::instrument(skip_all)]
fn build_state(settings: &Settings) -> Result<AppState> {
    let client = CmsClient::new(&settings.cms)?;
    let cache_settings = settings.cache.clone().unwrap_or_default();

    let service = ContentService::new(
        client,
        TtlCache::new(),
        Transformer::new(settings.cms.base_url.as_str()),
        CacheTtls::from(&cache_settings),
        settings.cms.default_locale.clone(),
    );

    Ok(AppState {
        service: Arc::new(service),
        preview_secret: settings.preview.as_ref().map(|p| p.secret.clone()),
    })
}

#[derive(Parser, Debug)]
#[command(name = "everwell", version, about = "Everwell content-engine command-line tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the content API using the specified directory
    Serve(ServeCmd),
}

#[derive(Parser, Debug)]
pub struct ServeCmd {
    /// Target directory (or set EVERWELL_DIR)
    ///
    /// Must exist, be a directory, and contain settings.toml.
    #[arg(
        value_name = "DIR",
        env = "EVERWELL_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}
