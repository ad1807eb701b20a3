use chrono::Utc;
use rand::Rng;
use serde_json::{json, Value};

const HVAC_STATES: &[&str] = &["heating", "cooling", "off"];
const HVAC_MODES: &[&str] = &["heat", "cool", "heat-cool", "eco", "off"];
const TIME_TO_TARGET: &[&str] = &["~0", "<5", "~15", "30 min", "--"];

/// Builds a Nest-style API root document with randomized thermostat
/// readings: one structure listing `num_devices` thermostats.
pub fn nest_document(rng: &mut impl Rng, structure: &str, num_devices: usize) -> Value {
    let mut thermostats = serde_json::Map::new();
    let mut ids = Vec::with_capacity(num_devices);

    for i in 0..num_devices {
        let id = format!("sim-thermostat-{}", i);
        let current = rng.gen_range(124..160) as f64 / 2.0;
        thermostats.insert(
            id.clone(),
            json!({
                "device_id": id,
                "name": format!("Thermostat {}", i),
                "is_online": rng.gen_bool(0.98),
                "has_leaf": rng.gen_bool(0.3),
                "is_using_emergency_heat": rng.gen_bool(0.02),
                "target_temperature_f": rng.gen_range(130..150) as f64 / 2.0,
                "ambient_temperature_f": current,
                "humidity": (rng.gen_range(4..13) * 5) as f64,
                "hvac_state": HVAC_STATES[rng.gen_range(0..HVAC_STATES.len())],
                "hvac_mode": HVAC_MODES[rng.gen_range(0..HVAC_MODES.len())],
                "fan_timer_active": rng.gen_bool(0.2),
                "time_to_target": TIME_TO_TARGET[rng.gen_range(0..TIME_TO_TARGET.len())],
            }),
        );
        ids.push(Value::String(id));
    }

    json!({
        "devices": { "thermostats": Value::Object(thermostats) },
        "structures": {
            "sim-structure-0": {
                "structure_id": "sim-structure-0",
                "name": structure,
                "thermostats": ids,
            }
        }
    })
}

/// Builds an OpenWeatherMap-style current-weather document.
pub fn weather_document(rng: &mut impl Rng, city: &str) -> Value {
    json!({
        "name": city,
        "dt": Utc::now().timestamp(),
        "main": {
            "temp": rng.gen_range(100..950) as f64 / 10.0,
            "feels_like": rng.gen_range(100..950) as f64 / 10.0,
            "pressure": rng.gen_range(980..1040),
            "humidity": rng.gen_range(20..91) as f64,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nest_document_lists_every_thermostat() {
        let mut rng = rand::thread_rng();
        let doc = nest_document(&mut rng, "Test Home", 3);

        let thermostats = doc["devices"]["thermostats"].as_object().unwrap();
        assert_eq!(thermostats.len(), 3);

        let listed = doc["structures"]["sim-structure-0"]["thermostats"]
            .as_array()
            .unwrap();
        assert_eq!(listed.len(), 3);
        for id in listed {
            assert!(thermostats.contains_key(id.as_str().unwrap()));
        }
        assert_eq!(doc["structures"]["sim-structure-0"]["name"], "Test Home");
    }

    #[test]
    fn test_nest_document_fields_in_range() {
        let mut rng = rand::thread_rng();
        let doc = nest_document(&mut rng, "Home", 1);
        let t = &doc["devices"]["thermostats"]["sim-thermostat-0"];

        let humidity = t["humidity"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&humidity));
        assert_eq!(humidity % 5.0, 0.0);

        let state = t["hvac_state"].as_str().unwrap();
        assert!(HVAC_STATES.contains(&state));
    }

    #[test]
    fn test_weather_document_shape() {
        let mut rng = rand::thread_rng();
        let doc = weather_document(&mut rng, "Boston");

        assert_eq!(doc["name"], "Boston");
        assert!(doc["main"]["temp"].is_f64());
        assert!(doc["main"]["humidity"].is_f64());
    }
}
