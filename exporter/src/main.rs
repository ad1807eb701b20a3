mod config;
mod errors;
mod metrics;
mod model;
mod nest;
mod poll;
mod weather;

use axum::{routing::get, Router};
use std::env;
use std::time::{Duration, Instant};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config_path =
        env::var("EXPORTER_CONFIG").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.to_string());

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting thermostat/weather exporter");

    let settings = match config::load(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load config from {}: {}", config_path, e);
            std::process::exit(1);
        }
    };
    info!("Poll interval: {}s", settings.exporter.poll_interval_secs);

    // Initialize metrics
    metrics::init_metrics();

    // Set up the Nest account (interactive pairing on first run)
    let start = Instant::now();
    let nest = match nest::NestClient::connect(&settings.nest).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to set up Nest client: {}", e);
            std::process::exit(1);
        }
    };
    info!("Nest API: {:.3}s", start.elapsed().as_secs_f64());

    // Set up the OpenWeatherMap account
    let owm = weather::OwmClient::new(&settings.owm);

    // Start up the server to expose the metrics
    let app = Router::new().route("/metrics", get(metrics_handler));

    let listener = tokio::net::TcpListener::bind(&settings.exporter.listen_addr)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to bind to {}: {}", settings.exporter.listen_addr, e);
            std::process::exit(1);
        });

    info!("Listening on {}", settings.exporter.listen_addr);

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap_or_else(|e| {
            error!("HTTP server error: {}", e);
        });
    });

    // Fixed-interval poll loop: cycle, sleep, repeat. A failed thermostat
    // fetch is fatal; an external process manager handles restarts.
    let interval = Duration::from_secs(settings.exporter.poll_interval_secs);
    let poll_handle = tokio::spawn(async move {
        let mut state = poll::PollState::new();
        loop {
            if let Err(e) = poll::run_cycle(&nest, &owm, &mut state).await {
                error!("Thermostat poll failed: {}", e);
                break;
            }
            tokio::time::sleep(interval).await;
        }
    });

    tokio::select! {
        _ = poll_handle => {
            error!("Poll loop terminated");
            std::process::exit(1);
        }
        _ = server_handle => {
            error!("HTTP server terminated");
            std::process::exit(1);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Shutting down");
}

async fn metrics_handler() -> String {
    metrics::gather_metrics()
}
