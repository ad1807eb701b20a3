use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, GaugeVec, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};

const DEVICE_LABELS: &[&str] = &["structure", "device"];

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref NEST_IS_ONLINE: GaugeVec = GaugeVec::new(
        Opts::new(
            "nest_is_online",
            "Device connection status with the Nest service"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_HAS_LEAF: GaugeVec = GaugeVec::new(
        Opts::new(
            "nest_has_leaf",
            "Displayed when the thermostat is set to an energy-saving temperature"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_TARGET_TEMP: GaugeVec = GaugeVec::new(
        Opts::new(
            "nest_target_temp",
            "Desired temperature, in half degrees Fahrenheit (0.5\u{b0}F)"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_CURRENT_TEMP: GaugeVec = GaugeVec::new(
        Opts::new(
            "nest_current_temp",
            "Temperature, measured at the device, in half degrees Fahrenheit (0.5\u{b0}F)"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_HUMIDITY: GaugeVec = GaugeVec::new(
        Opts::new(
            "nest_humidity",
            "Humidity, in percent (%) format, measured at the device, rounded to the nearest 5%"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_STATE: GaugeVec = GaugeVec::new(
        Opts::new(
            "nest_state",
            "Whether the HVAC system is actively heating, cooling or is off (0=off, 1=active)"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_MODE: GaugeVec = GaugeVec::new(
        Opts::new(
            "nest_mode",
            "Whether a heating/cooling mode is configured (0=off, 1=active)"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_FAN_RUNNING: GaugeVec = GaugeVec::new(
        Opts::new("nest_fan_running", "Whether the fan is currently running"),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_TIME_TO_TARGET: GaugeVec = GaugeVec::new(
        Opts::new(
            "nest_time_to_target",
            "The time, in minutes, that it will take for the structure to reach the target temperature"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_IS_USING_EMERGENCY_HEAT: GaugeVec = GaugeVec::new(
        Opts::new(
            "nest_is_using_emergency_heat",
            "If this is using emergency heat or not"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_FAN_COUNTER: CounterVec = CounterVec::new(
        Opts::new(
            "nest_fan_counter",
            "Cumulative seconds the fan has been running"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_COOLING_COUNTER: CounterVec = CounterVec::new(
        Opts::new(
            "nest_cooling_counter",
            "Cumulative seconds the HVAC system has been cooling"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_HEATING_COUNTER: CounterVec = CounterVec::new(
        Opts::new(
            "nest_heating_counter",
            "Cumulative seconds the HVAC system has been heating"
        ),
        DEVICE_LABELS
    )
    .unwrap();
    pub static ref NEST_STATE_INFO: GaugeVec = GaugeVec::new(
        Opts::new("nest_state_info", "Current state of the HVAC system"),
        &["structure", "device", "state"]
    )
    .unwrap();
    pub static ref NEST_MODE_INFO: GaugeVec = GaugeVec::new(
        Opts::new("nest_mode_info", "HVAC system heating/cooling mode"),
        &["structure", "device", "mode"]
    )
    .unwrap();
    pub static ref WEATHER_CURRENT_TEMP: GaugeVec = GaugeVec::new(
        Opts::new("weather_current_temp", "Current temperature, in Fahrenheit"),
        &["city"]
    )
    .unwrap();
    pub static ref WEATHER_CURRENT_HUMIDITY: GaugeVec = GaugeVec::new(
        Opts::new(
            "weather_current_humidity",
            "Current humidity, in percent (%)"
        ),
        &["city"]
    )
    .unwrap();
    pub static ref POLL_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "exporter_poll_duration_seconds",
            "Time taken to run one poll cycle"
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0])
    )
    .unwrap();
    pub static ref WEATHER_FETCH_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "exporter_weather_fetch_failures_total",
        "Total weather fetches that failed and were skipped"
    ))
    .unwrap();
}

pub fn init_metrics() {
    REGISTRY.register(Box::new(NEST_IS_ONLINE.clone())).unwrap();
    REGISTRY.register(Box::new(NEST_HAS_LEAF.clone())).unwrap();
    REGISTRY
        .register(Box::new(NEST_TARGET_TEMP.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(NEST_CURRENT_TEMP.clone()))
        .unwrap();
    REGISTRY.register(Box::new(NEST_HUMIDITY.clone())).unwrap();
    REGISTRY.register(Box::new(NEST_STATE.clone())).unwrap();
    REGISTRY.register(Box::new(NEST_MODE.clone())).unwrap();
    REGISTRY
        .register(Box::new(NEST_FAN_RUNNING.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(NEST_TIME_TO_TARGET.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(NEST_IS_USING_EMERGENCY_HEAT.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(NEST_FAN_COUNTER.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(NEST_COOLING_COUNTER.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(NEST_HEATING_COUNTER.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(NEST_STATE_INFO.clone()))
        .unwrap();
    REGISTRY.register(Box::new(NEST_MODE_INFO.clone())).unwrap();
    REGISTRY
        .register(Box::new(WEATHER_CURRENT_TEMP.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(WEATHER_CURRENT_HUMIDITY.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(POLL_DURATION_SECONDS.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(WEATHER_FETCH_FAILURES_TOTAL.clone()))
        .unwrap();
}

pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
