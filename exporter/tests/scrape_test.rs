//! End-to-end scrape checks. These assume an exporter already running on
//! localhost:8000, typically pointed at the simulator:
//!
//! ```text
//! cargo run -p simulator &
//! EXPORTER_CONFIG=settings.example.toml cargo run -p exporter &
//! cargo test -p exporter -- --ignored
//! ```

use std::time::Duration;
use tokio::time::sleep;

const METRICS_URL: &str = "http://localhost:8000/metrics";

async fn scrape() -> String {
    reqwest::get(METRICS_URL)
        .await
        .expect("exporter not reachable on localhost:8000")
        .text()
        .await
        .unwrap()
}

#[tokio::test]
#[ignore]
async fn test_scrape_exposes_expected_series() {
    let body = scrape().await;

    for name in [
        "nest_is_online",
        "nest_has_leaf",
        "nest_target_temp",
        "nest_current_temp",
        "nest_humidity",
        "nest_state",
        "nest_mode",
        "nest_fan_running",
        "nest_time_to_target",
        "nest_is_using_emergency_heat",
        "nest_fan_counter",
        "nest_cooling_counter",
        "nest_heating_counter",
        "nest_state_info",
        "nest_mode_info",
        "weather_current_temp",
        "weather_current_humidity",
        "exporter_poll_duration_seconds",
    ] {
        assert!(body.contains(name), "missing series: {}", name);
    }
}

#[tokio::test]
#[ignore]
async fn test_counters_never_decrease_between_scrapes() {
    let first = counter_samples(&scrape().await);
    sleep(Duration::from_secs(35)).await;
    let second = counter_samples(&scrape().await);

    assert!(!first.is_empty(), "no counter samples in first scrape");
    for (series, before) in &first {
        if let Some(after) = second.get(series) {
            assert!(
                after >= before,
                "counter {} decreased: {} -> {}",
                series,
                before,
                after
            );
        }
    }
}

/// Parses `nest_*_counter{...} value` lines into (series, value) pairs.
fn counter_samples(body: &str) -> std::collections::HashMap<String, f64> {
    body.lines()
        .filter(|line| {
            line.starts_with("nest_fan_counter{")
                || line.starts_with("nest_cooling_counter{")
                || line.starts_with("nest_heating_counter{")
        })
        .filter_map(|line| {
            let (series, value) = line.rsplit_once(' ')?;
            Some((series.to_string(), value.parse().ok()?))
        })
        .collect()
}
