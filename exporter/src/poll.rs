use crate::errors::Result;
use crate::metrics::{
    NEST_COOLING_COUNTER, NEST_CURRENT_TEMP, NEST_FAN_COUNTER, NEST_FAN_RUNNING, NEST_HAS_LEAF,
    NEST_HEATING_COUNTER, NEST_HUMIDITY, NEST_IS_ONLINE, NEST_IS_USING_EMERGENCY_HEAT, NEST_MODE,
    NEST_MODE_INFO, NEST_STATE, NEST_STATE_INFO, NEST_TARGET_TEMP, NEST_TIME_TO_TARGET,
    POLL_DURATION_SECONDS, WEATHER_CURRENT_HUMIDITY, WEATHER_CURRENT_TEMP,
    WEATHER_FETCH_FAILURES_TOTAL,
};
use crate::model::{DeviceSnapshot, StructureSnapshot, WeatherSnapshot};
use crate::nest::NestClient;
use crate::weather::OwmClient;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

pub trait ThermostatSource {
    async fn structures(&self) -> Result<Vec<StructureSnapshot>>;
}

pub trait WeatherSource {
    async fn current(&self) -> Result<WeatherSnapshot>;
}

impl ThermostatSource for NestClient {
    async fn structures(&self) -> Result<Vec<StructureSnapshot>> {
        self.fetch_structures().await
    }
}

impl WeatherSource for OwmClient {
    async fn current(&self) -> Result<WeatherSnapshot> {
        self.fetch_current().await
    }
}

/// Scheduler-owned bookkeeping carried between cycles: the shared
/// last-poll timestamp and the per-device state/mode strings last
/// written to the info records.
pub struct PollState {
    last_poll: Instant,
    last_state: HashMap<(String, String), String>,
    last_mode: HashMap<(String, String), String>,
}

impl PollState {
    pub fn new() -> Self {
        Self {
            last_poll: Instant::now(),
            last_state: HashMap::new(),
            last_mode: HashMap::new(),
        }
    }
}

impl Default for PollState {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs one poll cycle: weather first (failures logged and skipped),
/// then the thermostat fetch (failures propagate) and the per-device
/// mapping pass. The elapsed wall-clock delta since the previous cycle
/// is computed once and shared by every device in the cycle.
pub async fn run_cycle(
    thermostats: &impl ThermostatSource,
    weather: &impl WeatherSource,
    state: &mut PollState,
) -> Result<()> {
    let start = Instant::now();
    debug!("Polling");

    match weather.current().await {
        Ok(snapshot) => apply_weather(&snapshot),
        Err(e) => {
            warn!("Weather fetch failed, skipping weather gauges this cycle: {}", e);
            WEATHER_FETCH_FAILURES_TOTAL.inc();
        }
    }

    let structures = thermostats.structures().await?;

    let now = Instant::now();
    let elapsed_secs = now.duration_since(state.last_poll).as_secs_f64();
    for structure in &structures {
        for device in &structure.thermostats {
            apply_device(&structure.name, device, elapsed_secs, state);
        }
    }
    state.last_poll = now;

    POLL_DURATION_SECONDS.observe(start.elapsed().as_secs_f64());
    Ok(())
}

fn apply_weather(snapshot: &WeatherSnapshot) {
    WEATHER_CURRENT_TEMP
        .with_label_values(&[&snapshot.city])
        .set(snapshot.temp_f);
    WEATHER_CURRENT_HUMIDITY
        .with_label_values(&[&snapshot.city])
        .set(snapshot.humidity);
}

fn apply_device(structure: &str, device: &DeviceSnapshot, elapsed_secs: f64, state: &mut PollState) {
    let labels = &[structure, device.name.as_str()];

    NEST_IS_ONLINE.with_label_values(labels).set(flag(device.online));
    NEST_HAS_LEAF
        .with_label_values(labels)
        .set(flag(device.has_leaf));
    NEST_IS_USING_EMERGENCY_HEAT
        .with_label_values(labels)
        .set(flag(device.is_using_emergency_heat));
    NEST_TARGET_TEMP
        .with_label_values(labels)
        .set(device.target_temp);
    NEST_CURRENT_TEMP
        .with_label_values(labels)
        .set(device.current_temp);
    NEST_HUMIDITY.with_label_values(labels).set(device.humidity);
    NEST_STATE
        .with_label_values(labels)
        .set(flag(device.hvac_state != "off"));
    NEST_MODE
        .with_label_values(labels)
        .set(flag(device.mode != "off"));
    NEST_FAN_RUNNING
        .with_label_values(labels)
        .set(flag(device.fan_running));
    NEST_TIME_TO_TARGET
        .with_label_values(labels)
        .set(parse_minutes(&device.time_to_target) as f64);

    NEST_FAN_COUNTER
        .with_label_values(labels)
        .inc_by(if device.fan_running { elapsed_secs } else { 0.0 });
    NEST_COOLING_COUNTER
        .with_label_values(labels)
        .inc_by(if device.hvac_state == "cooling" {
            elapsed_secs
        } else {
            0.0
        });
    NEST_HEATING_COUNTER
        .with_label_values(labels)
        .inc_by(if device.hvac_state == "heating" {
            elapsed_secs
        } else {
            0.0
        });

    let key = (structure.to_string(), device.name.clone());

    // Info records carry the full string as a label; drop the stale
    // label set when the value changes so one sample remains per device.
    if let Some(prev) = state
        .last_state
        .insert(key.clone(), device.hvac_state.clone())
    {
        if prev != device.hvac_state {
            let _ = NEST_STATE_INFO.remove_label_values(&[structure, &device.name, &prev]);
        }
    }
    NEST_STATE_INFO
        .with_label_values(&[structure, &device.name, &device.hvac_state])
        .set(1.0);

    if let Some(prev) = state.last_mode.insert(key, device.mode.clone()) {
        if prev != device.mode {
            let _ = NEST_MODE_INFO.remove_label_values(&[structure, &device.name, &prev]);
        }
    }
    NEST_MODE_INFO
        .with_label_values(&[structure, &device.name, &device.mode])
        .set(1.0);
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Keeps only the digits of the textual minutes-to-target field ("~15",
/// "12 min") and reads them as an integer. A value with no digits at
/// all ("--") reads as zero.
fn parse_minutes(raw: &str) -> u64 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
