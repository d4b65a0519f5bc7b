use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt::Display, str::FromStr};

/// Weekday labels indexed from Monday.
pub const WEEKDAY_LABELS: [&str; 7] = ["周一", "周二", "周三", "周四", "周五", "周六", "周日"];

/// One configured area to report on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRequest {
    pub name: String,

    /// Forecast horizon in days, forwarded to the provider as-is.
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    1
}

impl LocationRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            days: default_days(),
        }
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }
}

/// Provider-specific location token, e.g. `"101010100"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationId(String);

impl LocationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single day of forecast, decoded from a QWeather `daily` record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyForecast {
    #[serde(rename = "fxDate")]
    pub date: NaiveDate,
    pub text_day: String,
    pub text_night: String,
    #[serde(deserialize_with = "lenient_number")]
    pub temp_min: i32,
    #[serde(deserialize_with = "lenient_number")]
    pub temp_max: i32,
    pub wind_dir_day: String,
    pub wind_scale_day: String,
    #[serde(deserialize_with = "lenient_number")]
    pub humidity: u8,
    #[serde(deserialize_with = "lenient_number")]
    pub precip: f64,
    pub sunrise: String,
    pub sunset: String,
}

impl DailyForecast {
    pub fn weekday_label(&self) -> &'static str {
        WEEKDAY_LABELS[self.date.weekday().num_days_from_monday() as usize]
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Number(T),
    Text(String),
}

/// QWeather sends numeric fields as strings; accept both encodings.
fn lenient_number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Number(value) => Ok(value),
        Lenient::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// The text one configured location contributes to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Success { name: String, body: String },
    Failure { name: String, detail: String },
}

impl Fragment {
    pub fn name(&self) -> &str {
        match self {
            Fragment::Success { name, .. } | Fragment::Failure { name, .. } => name,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Fragment::Failure { .. })
    }

    pub fn render(&self) -> String {
        match self {
            Fragment::Success { name, body } => format!("## 🌍 **{name}**\n{body}"),
            Fragment::Failure { name, detail } => format!("❌ {name}播报失败: {detail}"),
        }
    }
}

/// Everything produced by one run, in configured order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinedReport {
    pub date: NaiveDate,
    pub fragments: Vec<Fragment>,
}

impl CombinedReport {
    pub fn new(date: NaiveDate, fragments: Vec<Fragment>) -> Self {
        Self { date, fragments }
    }

    pub fn header(&self) -> String {
        format!("### ⏰ 晨间天气预报 {}", self.date.format("%m/%d"))
    }

    /// Fragments separated by blank lines, without the header.
    pub fn body(&self) -> String {
        self.fragments
            .iter()
            .map(Fragment::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The full markdown message as delivered to the webhook.
    pub fn render(&self) -> String {
        format!("{}\n\n{}", self.header(), self.body())
    }

    pub fn failure_count(&self) -> usize {
        self.fragments.iter().filter(|f| f.is_failure()).count()
    }
}
