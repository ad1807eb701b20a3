/// A named physical location containing one or more thermostats.
#[derive(Debug, Clone)]
pub struct StructureSnapshot {
    pub name: String,
    pub thermostats: Vec<DeviceSnapshot>,
}

/// Per-poll read-only view of one thermostat's reported fields. Built
/// fresh on every cycle and discarded after the mapping pass.
#[derive(Debug, Clone)]
pub struct DeviceSnapshot {
    pub name: String,
    pub online: bool,
    pub has_leaf: bool,
    pub is_using_emergency_heat: bool,
    pub target_temp: f64,
    pub current_temp: f64,
    pub humidity: f64,
    /// HVAC activity: "heating", "cooling" or "off".
    pub hvac_state: String,
    /// Configured operating mode: "heat", "cool", "heat-cool", "eco" or "off".
    pub mode: String,
    pub fan_running: bool,
    /// Raw textual minutes-to-target, e.g. "~15" or "<5".
    pub time_to_target: String,
}

/// Per-poll view of one city's current weather.
#[derive(Debug, Clone)]
pub struct WeatherSnapshot {
    pub city: String,
    pub temp_f: f64,
    pub humidity: f64,
}
