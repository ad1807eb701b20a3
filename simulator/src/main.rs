mod payload;

use axum::{
    routing::{get, post},
    Json, Router,
};
use rand::Rng;
use serde_json::json;
use std::env;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let http_addr = env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:9800".to_string());
    let num_devices: usize = env::var("DEVICES")
        .unwrap_or_else(|_| "2".to_string())
        .parse()
        .unwrap_or(2);
    let structure = env::var("STRUCTURE").unwrap_or_else(|_| "Home".to_string());
    let city = env::var("CITY").unwrap_or_else(|_| "Springfield".to_string());

    // Initialize logging
    tracing_subscriber::fmt::init();

    info!("Starting API simulator");
    info!(
        "Serving {} thermostats in structure {:?}, weather for {:?}",
        num_devices, structure, city
    );

    // Fresh randomized readings on every request, like a live account.
    let app = Router::new()
        .route(
            "/",
            get(move || {
                let structure = structure.clone();
                async move {
                    Json(payload::nest_document(
                        &mut rand::thread_rng(),
                        &structure,
                        num_devices,
                    ))
                }
            }),
        )
        .route(
            "/data/2.5/weather",
            get(move || {
                let city = city.clone();
                async move { Json(payload::weather_document(&mut rand::thread_rng(), &city)) }
            }),
        )
        // Fake PIN exchange so the exporter's pairing flow works offline.
        .route(
            "/oauth2/access_token",
            post(|| async {
                Json(json!({
                    "access_token": format!("sim-token-{}", rand::thread_rng().gen::<u32>()),
                    "expires_in": 315_360_000u64,
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to bind to {}: {}", http_addr, e);
            std::process::exit(1);
        });

    info!("Listening on {}", http_addr);

    axum::serve(listener, app).await.unwrap_or_else(|e| {
        error!("HTTP server error: {}", e);
    });
}
