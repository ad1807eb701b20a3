use crate::config::OwmConfig;
use crate::errors::Result;
use crate::model::WeatherSnapshot;
use serde::Deserialize;

/// Client for the OpenWeatherMap current-weather API, bound to a single
/// city id at construction time.
pub struct OwmClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    city_id: u64,
}

impl OwmClient {
    pub fn new(cfg: &OwmConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            api_key: cfg.owm_id.clone(),
            city_id: cfg.owm_city_id,
        }
    }

    pub async fn fetch_current(&self) -> Result<WeatherSnapshot> {
        let doc: ApiWeather = self
            .http
            .get(format!("{}/data/2.5/weather", self.api_url))
            .query(&[
                ("id", self.city_id.to_string().as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "imperial"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(WeatherSnapshot {
            city: doc.name,
            temp_f: doc.main.temp,
            humidity: doc.main.humidity,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiWeather {
    name: String,
    main: ApiMain,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    humidity: f64,
}
