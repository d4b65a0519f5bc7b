use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use weather_bot_core::{
    Broadcaster, CombinedReport, Config, ConsoleNotifier, Credentials, DingTalkNotifier, Notifier,
    QWeatherClient,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-bot", version, about = "Daily weather broadcast to DingTalk")]
pub struct Cli {
    /// Log at debug level (overridden by WEATHER_BOT_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ConfigArg {
    /// Path to config.toml; defaults to the platform config directory.
    #[arg(long, short)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch forecasts for every configured area and send one report.
    Run {
        #[command(flatten)]
        config: ConfigArg,

        /// Print the message instead of posting it to the webhook.
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate the configuration file and list the configured areas.
    Check {
        #[command(flatten)]
        config: ConfigArg,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Run { config, dry_run } => broadcast(config, dry_run).await,
            Command::Check { config } => check(config),
        }
    }
}

async fn broadcast(arg: ConfigArg, dry_run: bool) -> anyhow::Result<()> {
    let config = Config::load(arg.config.as_deref())?;
    let credentials = Credentials::from_env()?;

    let client = QWeatherClient::new(credentials.api_key.clone(), &config.qweather)
        .context("Failed to build QWeather client")?;

    let notifier: Box<dyn Notifier> = if dry_run {
        Box::new(ConsoleNotifier::new(config.report.title.clone()))
    } else {
        Box::new(
            DingTalkNotifier::new(
                credentials.require_webhook()?,
                config.report.title.clone(),
                config.qweather.timeout(),
            )
            .context("Failed to build DingTalk notifier")?,
        )
    };

    info!(areas = config.areas.len(), dry_run, "starting broadcast");

    let report = Broadcaster::new(&client, &client, notifier.as_ref())
        .run(&config.areas, Local::now().date_naive())
        .await?;

    if let Some(text) = stdout_report(&report, dry_run) {
        println!("{text}");
    }
    info!(failed = report.failure_count(), "broadcast sent");

    Ok(())
}

/// The console notifier already prints the full message on a dry run.
fn stdout_report(report: &CombinedReport, dry_run: bool) -> Option<String> {
    (!dry_run).then(|| report.body())
}

fn check(arg: ConfigArg) -> anyhow::Result<()> {
    let path = match arg.config {
        Some(p) => p,
        None => Config::config_file_path()?,
    };
    let config = Config::load(Some(path.as_path()))?;

    println!("Config: {}", path.display());
    println!("API host: {}", config.qweather.api_host);
    println!("Areas ({}):", config.areas.len());
    for area in &config.areas {
        println!("  - {} ({}d)", area.name, area.days);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_dry_run_and_config() {
        let cli = Cli::try_parse_from(["weather-bot", "run", "--dry-run", "--config", "a.toml"])
            .unwrap();
        match cli.command {
            Command::Run { config, dry_run } => {
                assert!(dry_run);
                assert_eq!(config.config, Some(PathBuf::from("a.toml")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["weather-bot", "check", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Check { .. }));
    }

    #[test]
    fn report_is_echoed_only_when_posted() {
        let report = CombinedReport::new(
            chrono::NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            vec![weather_bot_core::Fragment::Failure {
                name: "A".into(),
                detail: "x".into(),
            }],
        );

        assert_eq!(stdout_report(&report, false).as_deref(), Some("❌ A播报失败: x"));
        assert_eq!(stdout_report(&report, true), None);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["weather-bot"]).is_err());
    }
}
