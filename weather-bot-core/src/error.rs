//! Error types for the broadcaster core.

use thiserror::Error;

/// Errors produced while resolving, fetching or delivering a report.
///
/// The `Display` text of each variant ends up verbatim in the failure
/// fragment of the report, so it is written for the chat reader.
#[derive(Error, Debug)]
pub enum WeatherBotError {
    /// Geocoding lookup returned a non-success code or no candidates.
    #[error("位置查询失败: {payload}")]
    Resolution { payload: String },

    /// Forecast endpoint returned a non-success code.
    #[error("天气查询失败: {payload}")]
    Fetch { payload: String },

    /// The HTTP layer failed (connect, timeout, body read).
    #[error("请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    /// A provider response could not be decoded.
    #[error("无法解析{what}响应: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Webhook delivery failed.
    #[error("Notification error: {message}")]
    Notify { message: String },
}

impl WeatherBotError {
    pub fn resolution(body: &str) -> Self {
        Self::Resolution {
            payload: truncate_body(body),
        }
    }

    pub fn fetch(body: &str) -> Self {
        Self::Fetch {
            payload: truncate_body(body),
        }
    }

    pub fn decode(what: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { what, source }
    }

    pub fn notify<S: Into<String>>(message: S) -> Self {
        Self::Notify {
            message: message.into(),
        }
    }
}

/// Shortens a raw response body so it stays readable inside a chat message.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
