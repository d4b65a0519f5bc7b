use async_trait::async_trait;
use std::fmt::Debug;

use crate::{WeatherBotError, model::CombinedReport};

pub mod dingtalk;

pub use dingtalk::DingTalkNotifier;

/// Delivers the combined report of a run.
#[async_trait]
pub trait Notifier: Send + Sync + Debug {
    async fn notify(&self, report: &CombinedReport) -> Result<(), WeatherBotError>;
}

/// Prints the message to stdout instead of posting it.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    title: String,
}

impl ConsoleNotifier {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, report: &CombinedReport) -> Result<(), WeatherBotError> {
        println!("[dry-run] {}\n{}", self.title, report.render());
        Ok(())
    }
}
