use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    WeatherBotError,
    config::QWeatherConfig,
    model::{DailyForecast, LocationId},
};

use super::{ForecastFetcher, LocationResolver};

/// Status code QWeather uses for a successful response.
pub const SUCCESS_CODE: &str = "200";

/// Client for the QWeather geocoding and daily forecast endpoints.
#[derive(Debug, Clone)]
pub struct QWeatherClient {
    api_key: String,
    api_host: String,
    http: Client,
}

impl QWeatherClient {
    pub fn new(api_key: String, config: &QWeatherConfig) -> Result<Self, WeatherBotError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            api_key,
            api_host: config.api_host.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get(&self, path: &str, location: &str) -> Result<String, WeatherBotError> {
        let url = format!("{}{}", self.api_host, path);

        let res = self
            .http
            .get(&url)
            .query(&[("location", location), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(%url, %status, %body, "QWeather response");

        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    code: String,
}

#[derive(Debug, Deserialize)]
struct GeoCandidate {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GeoLookupResponse {
    code: String,
    #[serde(default)]
    location: Vec<GeoCandidate>,
}

#[derive(Debug, Deserialize)]
struct DailyResponse {
    daily: Vec<DailyForecast>,
}

/// Picks the first candidate of a geocoding lookup body.
pub fn parse_lookup(body: &str) -> Result<LocationId, WeatherBotError> {
    let parsed: GeoLookupResponse =
        serde_json::from_str(body).map_err(|_| WeatherBotError::resolution(body))?;

    if parsed.code != SUCCESS_CODE {
        return Err(WeatherBotError::resolution(body));
    }

    parsed
        .location
        .into_iter()
        .next()
        .map(|candidate| LocationId::new(candidate.id))
        .ok_or_else(|| WeatherBotError::resolution(body))
}

/// Decodes a daily forecast body; the status code is checked before any record.
pub fn parse_forecast(body: &str) -> Result<Vec<DailyForecast>, WeatherBotError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|_| WeatherBotError::fetch(body))?;

    if envelope.code != SUCCESS_CODE {
        return Err(WeatherBotError::fetch(body));
    }

    let parsed: DailyResponse =
        serde_json::from_str(body).map_err(|e| WeatherBotError::decode("天气", e))?;

    Ok(parsed.daily)
}

#[async_trait]
impl LocationResolver for QWeatherClient {
    async fn resolve(&self, name: &str) -> Result<LocationId, WeatherBotError> {
        let body = self.get("/geo/v2/city/lookup", name).await?;
        let id = parse_lookup(&body)?;
        debug!(name, %id, "resolved location");
        Ok(id)
    }
}

#[async_trait]
impl ForecastFetcher for QWeatherClient {
    async fn fetch(
        &self,
        location: &LocationId,
        days: u32,
    ) -> Result<Vec<DailyForecast>, WeatherBotError> {
        let body = self
            .get(&format!("/v7/weather/{days}d"), location.as_str())
            .await?;
        parse_forecast(&body)
    }
}
