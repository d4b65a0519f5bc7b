use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    WeatherBotError,
    model::{DailyForecast, LocationId},
};

pub mod qweather;

pub use qweather::QWeatherClient;

/// Maps a free-text place name to a provider location id.
#[async_trait]
pub trait LocationResolver: Send + Sync + Debug {
    async fn resolve(&self, name: &str) -> Result<LocationId, WeatherBotError>;
}

/// Retrieves daily forecasts for a resolved location.
#[async_trait]
pub trait ForecastFetcher: Send + Sync + Debug {
    async fn fetch(
        &self,
        location: &LocationId,
        days: u32,
    ) -> Result<Vec<DailyForecast>, WeatherBotError>;
}
