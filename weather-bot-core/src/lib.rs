//! Core library for the `weather-bot` broadcaster.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - QWeather location lookup and daily forecast retrieval
//! - Markdown report formatting
//! - The per-run orchestrator and DingTalk delivery
//!
//! It is used by `weather-bot`, but the orchestrator only depends on traits,
//! so other providers or notifiers can be plugged in.

pub mod config;
pub mod error;
pub mod format;
pub mod model;
pub mod notifier;
pub mod orchestrator;
pub mod provider;

pub use config::{Config, Credentials, QWeatherConfig, ReportConfig};
pub use error::WeatherBotError;
pub use format::format_forecasts;
pub use model::{CombinedReport, DailyForecast, Fragment, LocationId, LocationRequest};
pub use notifier::{ConsoleNotifier, DingTalkNotifier, Notifier};
pub use orchestrator::Broadcaster;
pub use provider::{ForecastFetcher, LocationResolver, QWeatherClient};
