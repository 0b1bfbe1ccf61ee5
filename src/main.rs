use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use temp_telemetry_api::config::{Config, load_env_file};
use temp_telemetry_api::error_log::ErrorLog;
use temp_telemetry_api::routes::{self, AppState};

#[derive(Parser)]
#[command(name = "temp-telemetry-api")]
#[command(about = "Accepts device temperature readings and reports overtemp devices")]
struct Args {
    /// Env file with BIND_ADDRESS, PORT and ERROR_LOG_CAPACITY
    #[arg(short, long, default_value = "config.env")]
    env_file: PathBuf,
    /// Overrides BIND_ADDRESS
    #[arg(long)]
    bind_address: Option<String>,
    /// Overrides PORT
    #[arg(short, long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let env_file = load_env_file(&args.env_file)?;

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    match env_file {
        Some(path) => log::info!("Environment seeded from {}", path.display()),
        None => log::info!("No env file found, using the process environment"),
    }

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(bind_address) = args.bind_address {
        config.bind_address = bind_address;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    match config.error_log_capacity {
        Some(capacity) => log::info!("Error log keeps the latest {} rejected payloads", capacity),
        None => log::info!("Error log is unbounded"),
    }

    let state = web::Data::new(AppState::new(ErrorLog::new(config.error_log_capacity)));

    log::info!(
        "Starting HTTP server on {}:{}",
        config.bind_address,
        config.port
    );
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(routes::configure)
            .wrap(Logger::default())
    })
    .bind((config.bind_address.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.bind_address, config.port))?
    .run()
    .await?;

    Ok(())
}
