//! Markdown rendering of daily forecasts.

use chrono::Datelike;

use crate::model::DailyForecast;

pub const DIVIDER: &str = "──────────";

/// Renders one block per day, earliest first, in the order given.
pub fn format_forecasts(forecasts: &[DailyForecast]) -> String {
    forecasts
        .iter()
        .map(format_day)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_day(day: &DailyForecast) -> String {
    format!(
        "📅 **{month}月{dom}日 ({weekday})**\n\n\
         ☀️ 白天: {text_day} | 🌙 夜间: {text_night}\n\n\
         🌡️ 温度: {min}℃ ~ {max}℃\n\n\
         💨 风力: {wind_dir}{wind_scale}级\n\n\
         💧 湿度: {humidity}% | ☔ 降水: {precip:.1}mm\n\n\
         🌅 日出: {sunrise} | 🌇 日落: {sunset}\n\n\
         {DIVIDER}\n\n",
        month = day.date.month(),
        dom = day.date.day(),
        weekday = day.weekday_label(),
        text_day = day.text_day,
        text_night = day.text_night,
        min = day.temp_min,
        max = day.temp_max,
        wind_dir = day.wind_dir_day,
        wind_scale = day.wind_scale_day,
        humidity = day.humidity,
        precip = day.precip,
        sunrise = day.sunrise,
        sunset = day.sunset,
    )
}
