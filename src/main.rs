use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Result, WrapErr};
use log::{debug, info, warn};

use ytbrief::config::{ApiKeys, Config, config_path};
use ytbrief::metadata::YouTubeDataClient;
use ytbrief::pipeline::{Pipeline, PipelineSettings};
use ytbrief::summarize::GeminiClient;
use ytbrief::youtube::InnerTubeClient;

mod cli;

use cli::Cli;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytbrief.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytbrief")
        .join("logs")
}

fn build_pipeline(config: &Config, keys: ApiKeys) -> Result<Pipeline> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.upstream_timeout() {
        builder = builder.timeout(timeout);
    }
    let client = builder.build().wrap_err("building HTTP client")?;

    if keys.gemini.is_none() {
        warn!("GOOGLE_API_KEY not set; every summary request will fail");
    }
    if keys.youtube.is_none() {
        warn!("YT_API_KEY not set; video info will be omitted");
    }

    let transcripts = InnerTubeClient::new(client.clone());
    let summarizer = GeminiClient::new(client.clone(), &config.gemini_endpoint, &config.gemini_model, keys.gemini);
    let metadata = YouTubeDataClient::new(client, keys.youtube);

    Ok(Pipeline::new(
        Arc::new(transcripts),
        Arc::new(summarizer),
        Arc::new(metadata),
        PipelineSettings::from(config),
    ))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl+C handler: {err}");
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging()?;

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    if cli.verbose {
        let path = cli.config.clone().unwrap_or_else(config_path);
        if path.exists() {
            eprintln!("Config: {}", path.display());
        }
        eprintln!("{config:#?}");
    }
    debug!("Effective config: {config:?}");

    let pipeline = build_pipeline(&config, ApiKeys::from_env())?;
    let app = ytbrief::server::router(pipeline);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .wrap_err_with(|| format!("binding to {}:{}", config.host, config.port))?;
    let addr: SocketAddr = listener.local_addr()?;

    info!("Listening on http://{addr}");
    eprintln!("ytbrief listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("running API server")?;

    Ok(())
}
