use crate::config::NestConfig;
use crate::errors::{Error, Result};
use crate::model::{DeviceSnapshot, StructureSnapshot};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

/// Client for the Nest developer API. Holds a bearer token obtained either
/// from the on-disk cache or from the one-time interactive pairing flow.
pub struct NestClient {
    http: reqwest::Client,
    api_url: String,
    access_token: String,
}

impl NestClient {
    /// Sets up the client, running the interactive pairing flow if the
    /// cached token is absent or expired. Authorization errors are fatal.
    pub async fn connect(cfg: &NestConfig) -> Result<Self> {
        let http = reqwest::Client::new();

        let access_token = match load_cached_token(&cfg.access_token_cache_file)? {
            Some(token) if !token.is_expired() => token.access_token,
            Some(_) => {
                info!("Cached Nest token expired, re-pairing");
                pair(&http, cfg).await?
            }
            None => pair(&http, cfg).await?,
        };

        Ok(Self {
            http,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// Fetches the API root document and joins structures with their
    /// thermostats into per-structure snapshots.
    pub async fn fetch_structures(&self) -> Result<Vec<StructureSnapshot>> {
        let doc: ApiDocument = self
            .http
            .get(format!("{}/", self.api_url))
            .bearer_auth(&self.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(doc.into_snapshots())
    }
}

/// One-time pairing: print the authorization URL, block on an operator
/// PIN, exchange it for a token and persist it to the cache file.
async fn pair(http: &reqwest::Client, cfg: &NestConfig) -> Result<String> {
    let authorize_url = format!(
        "https://home.nest.com/login/oauth2?client_id={}&state=STATE",
        cfg.client_id
    );
    println!("Go to {authorize_url} to authorize, then enter PIN below");
    print!("PIN: ");
    std::io::stdout().flush()?;

    let mut pin = String::new();
    std::io::stdin().read_line(&mut pin)?;
    let pin = pin.trim();
    if pin.is_empty() {
        return Err(Error::Auth("no PIN entered".to_string()));
    }

    let token: TokenResponse = http
        .post(&cfg.token_url)
        .form(&[
            ("client_id", cfg.client_id.as_str()),
            ("client_secret", cfg.client_secret.as_str()),
            ("code", pin),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let cached = CachedToken {
        access_token: token.access_token.clone(),
        expires_at: Utc::now() + Duration::seconds(token.expires_in),
    };
    std::fs::write(
        &cfg.access_token_cache_file,
        serde_json::to_string_pretty(&cached)?,
    )?;
    info!("Nest token persisted to {}", cfg.access_token_cache_file);

    Ok(token.access_token)
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

fn load_cached_token(path: &str) -> Result<Option<CachedToken>> {
    if !Path::new(path).exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)?;
    match serde_json::from_str(&raw) {
        Ok(token) => Ok(Some(token)),
        Err(e) => {
            // Unreadable cache forces re-pairing rather than aborting.
            warn!("Ignoring unreadable token cache {}: {}", path, e);
            Ok(None)
        }
    }
}

// Wire shapes of the Nest developer API root document.

#[derive(Debug, Default, Deserialize)]
struct ApiDocument {
    #[serde(default)]
    devices: ApiDevices,
    #[serde(default)]
    structures: HashMap<String, ApiStructure>,
}

#[derive(Debug, Default, Deserialize)]
struct ApiDevices {
    #[serde(default)]
    thermostats: HashMap<String, ApiThermostat>,
}

#[derive(Debug, Deserialize)]
struct ApiStructure {
    name: String,
    #[serde(default)]
    thermostats: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ApiThermostat {
    name: String,
    is_online: bool,
    has_leaf: bool,
    is_using_emergency_heat: bool,
    target_temperature_f: f64,
    ambient_temperature_f: f64,
    humidity: f64,
    hvac_state: String,
    hvac_mode: String,
    fan_timer_active: bool,
    #[serde(default)]
    time_to_target: String,
}

impl ApiDocument {
    fn into_snapshots(self) -> Vec<StructureSnapshot> {
        let mut thermostats = self.devices.thermostats;
        let mut structures: Vec<StructureSnapshot> = self
            .structures
            .into_values()
            .map(|s| StructureSnapshot {
                thermostats: s
                    .thermostats
                    .iter()
                    .filter_map(|id| thermostats.remove(id))
                    .map(ApiThermostat::into_snapshot)
                    .collect(),
                name: s.name,
            })
            .collect();
        // HashMap iteration order is arbitrary; keep output stable.
        structures.sort_by(|a, b| a.name.cmp(&b.name));
        structures
    }
}

impl ApiThermostat {
    fn into_snapshot(self) -> DeviceSnapshot {
        DeviceSnapshot {
            name: self.name,
            online: self.is_online,
            has_leaf: self.has_leaf,
            is_using_emergency_heat: self.is_using_emergency_heat,
            target_temp: self.target_temperature_f,
            current_temp: self.ambient_temperature_f,
            humidity: self.humidity,
            hvac_state: self.hvac_state,
            mode: self.hvac_mode,
            fan_running: self.fan_timer_active,
            time_to_target: self.time_to_target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> &'static str {
        r#"{
            "devices": {
                "thermostats": {
                    "t1": {
                        "device_id": "t1",
                        "name": "Living Room",
                        "is_online": true,
                        "has_leaf": false,
                        "is_using_emergency_heat": false,
                        "target_temperature_f": 70.0,
                        "ambient_temperature_f": 68.5,
                        "humidity": 45.0,
                        "hvac_state": "heating",
                        "hvac_mode": "heat",
                        "fan_timer_active": true,
                        "time_to_target": "~15"
                    },
                    "t2": {
                        "device_id": "t2",
                        "name": "Bedroom",
                        "is_online": false,
                        "has_leaf": true,
                        "is_using_emergency_heat": false,
                        "target_temperature_f": 66.0,
                        "ambient_temperature_f": 66.0,
                        "humidity": 50.0,
                        "hvac_state": "off",
                        "hvac_mode": "eco",
                        "fan_timer_active": false,
                        "time_to_target": "~0"
                    }
                }
            },
            "structures": {
                "s1": {
                    "structure_id": "s1",
                    "name": "Home",
                    "thermostats": ["t1", "t2"]
                }
            }
        }"#
    }

    #[test]
    fn test_document_joins_structures_and_devices() {
        let doc: ApiDocument = serde_json::from_str(sample_document()).unwrap();
        let structures = doc.into_snapshots();

        assert_eq!(structures.len(), 1);
        let home = &structures[0];
        assert_eq!(home.name, "Home");
        assert_eq!(home.thermostats.len(), 2);

        let living = home
            .thermostats
            .iter()
            .find(|d| d.name == "Living Room")
            .unwrap();
        assert!(living.online);
        assert!(living.fan_running);
        assert_eq!(living.hvac_state, "heating");
        assert_eq!(living.mode, "heat");
        assert_eq!(living.target_temp, 70.0);
        assert_eq!(living.current_temp, 68.5);
        assert_eq!(living.time_to_target, "~15");
    }

    #[test]
    fn test_unlisted_thermostat_is_skipped() {
        let doc: ApiDocument = serde_json::from_str(
            r#"{
                "devices": { "thermostats": {} },
                "structures": {
                    "s1": { "name": "Home", "thermostats": ["missing"] }
                }
            }"#,
        )
        .unwrap();
        let structures = doc.into_snapshots();

        assert_eq!(structures.len(), 1);
        assert!(structures[0].thermostats.is_empty());
    }

    #[test]
    fn test_token_cache_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        let path = path.to_str().unwrap();

        assert!(load_cached_token(path).unwrap().is_none());

        let cached = CachedToken {
            access_token: "tok-123".to_string(),
            expires_at: Utc::now() + Duration::days(365),
        };
        std::fs::write(path, serde_json::to_string(&cached).unwrap()).unwrap();

        let loaded = load_cached_token(path).unwrap().unwrap();
        assert_eq!(loaded.access_token, "tok-123");
        assert!(!loaded.is_expired());
    }

    #[test]
    fn test_expired_token_detected() {
        let cached = CachedToken {
            access_token: "tok".to_string(),
            expires_at: Utc::now() - Duration::seconds(1),
        };
        assert!(cached.is_expired());
    }

    #[test]
    fn test_corrupt_cache_forces_repair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(load_cached_token(path.to_str().unwrap())
            .unwrap()
            .is_none());
    }
}
