//! One broadcast pass over the configured areas.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    WeatherBotError,
    format::format_forecasts,
    model::{CombinedReport, Fragment, LocationRequest},
    notifier::Notifier,
    provider::{ForecastFetcher, LocationResolver},
};

/// Runs resolve → fetch → format for each area and hands the result to a notifier.
#[derive(Debug)]
pub struct Broadcaster<'a> {
    resolver: &'a dyn LocationResolver,
    fetcher: &'a dyn ForecastFetcher,
    notifier: &'a dyn Notifier,
}

impl<'a> Broadcaster<'a> {
    pub fn new(
        resolver: &'a dyn LocationResolver,
        fetcher: &'a dyn ForecastFetcher,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            notifier,
        }
    }

    /// Builds one fragment per request, in order, then notifies exactly once.
    ///
    /// Per-area errors become failure fragments; only a notifier error is returned.
    pub async fn run(
        &self,
        requests: &[LocationRequest],
        date: NaiveDate,
    ) -> Result<CombinedReport, WeatherBotError> {
        let mut fragments = Vec::with_capacity(requests.len());

        for request in requests {
            fragments.push(self.fragment_for(request).await);
        }

        let report = CombinedReport::new(date, fragments);
        info!(
            areas = requests.len(),
            failed = report.failure_count(),
            "report assembled"
        );

        self.notifier.notify(&report).await?;
        Ok(report)
    }

    async fn fragment_for(&self, request: &LocationRequest) -> Fragment {
        match self.report_for(request).await {
            Ok(body) => Fragment::Success {
                name: request.name.clone(),
                body,
            },
            Err(err) => {
                warn!(area = %request.name, error = %err, "area skipped");
                Fragment::Failure {
                    name: request.name.clone(),
                    detail: err.to_string(),
                }
            }
        }
    }

    async fn report_for(&self, request: &LocationRequest) -> Result<String, WeatherBotError> {
        let id = self.resolver.resolve(&request.name).await?;
        let forecasts = self.fetcher.fetch(&id, request.days).await?;
        info!(area = %request.name, %id, days = forecasts.len(), "forecast fetched");
        Ok(format_forecasts(&forecasts))
    }
}
