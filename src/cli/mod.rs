//! Command-line interface for firetop.
//!
//! Just run `firetop --demo` to watch a synthetic firehose with sensible
//! defaults.

use crate::application::Application;
use crate::core::config::{ConfigBuilder, LoggingConfig};
use crate::core::{Config, FiretopError, Result, ViewMode};
use clap::Parser;
use humantime_serde::re::humantime::format_duration;
use std::path::PathBuf;
use std::time::Duration;

/// Live top-style dashboard for a platform event firehose
#[derive(Parser, Debug)]
#[command(name = "firetop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.config/firetop/config.yaml)
    #[arg(short, long, env = "FIRETOP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Trailing window for rates and averages (e.g. 60s, 5m)
    #[arg(short, long, env = "FIRETOP_WINDOW", value_parser = parse_duration)]
    pub window: Option<Duration>,

    /// Table refresh interval (e.g. 1s, 500ms)
    #[arg(short, long, env = "FIRETOP_REFRESH", value_parser = parse_duration)]
    pub refresh: Option<Duration>,

    /// Enable debug logging
    #[arg(short, long, env = "FIRETOP_DEBUG")]
    pub debug: bool,

    /// Log the table through tracing instead of printing it
    #[arg(long, env = "FIRETOP_HEADLESS")]
    pub headless: bool,

    /// Generate synthetic events
    #[arg(long, conflicts_with = "no_demo")]
    pub demo: bool,

    /// Disable synthetic events even if the config enables them
    #[arg(long)]
    pub no_demo: bool,

    /// Validate configuration and exit
    #[arg(long)]
    pub check_config: bool,

    /// View shown at startup
    #[arg(long, value_enum)]
    pub view: Option<ViewMode>,

    /// Sort column for the startup view, primary first; prefix with '-' to
    /// flip its default direction
    #[arg(long = "sort", value_name = "COLUMN", allow_hyphen_values = true)]
    pub sort: Vec<String>,

    /// Filter for the startup view as COLUMN=TEXT
    #[arg(long = "filter", value_name = "COLUMN=TEXT", value_parser = parse_filter)]
    pub filter: Vec<(String, String)>,
}

fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(s).map_err(|e| e.to_string())
}

fn parse_filter(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((column, text)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), text.to_string()))
        },
        _ => Err(format!("expected COLUMN=TEXT, got '{s}'")),
    }
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Default config file location
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("firetop").join("config.yaml"))
    }

    /// Load configuration with proper precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Config file
    /// 3. Defaults (lowest priority)
    pub async fn load_config(&self) -> Result<Config> {
        let mut builder = ConfigBuilder::new();

        let config_path = match &self.config {
            Some(path) => Some(path.clone()),
            None => Self::default_config_path().filter(|p| p.exists()),
        };

        if let Some(path) = config_path {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => {
                    builder = builder.from_yaml(&content)?;
                    tracing::info!(path = %path.display(), "loaded configuration");
                },
                Err(e) if self.config.is_some() => {
                    return Err(FiretopError::config(format!(
                        "Failed to read config file {}: {}",
                        path.display(),
                        e
                    )));
                },
                Err(_) => {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                },
            }
        }

        self.build_config_from_args(builder)
    }

    fn build_config_from_args(&self, mut builder: ConfigBuilder) -> Result<Config> {
        if let Some(window) = self.window {
            builder = builder.rate_window(window);
        }
        if let Some(refresh) = self.refresh {
            builder = builder.refresh_rate(refresh);
        }
        if let Some(view) = self.view {
            builder = builder.default_view(view);
        }
        if self.demo {
            builder = builder.demo(true);
        } else if self.no_demo {
            builder = builder.demo(false);
        }

        builder.debug(self.debug).headless(self.headless).build()
    }

    /// Initialize logging: `--debug` wins, then `FIRETOP_LOG_LEVEL`, then the
    /// configured level.
    pub fn init_logging(&self, logging: &LoggingConfig) -> Result<()> {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

        let filter = if self.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_env("FIRETOP_LOG_LEVEL")
                .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()))
        };

        let file_layer = match &logging.file {
            Some(path) => {
                let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::sync::Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true),
                )
            },
            None => None,
        };
        let stderr_layer = logging.file.is_none().then(|| {
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(self.headless)
                .with_line_number(self.headless)
                .compact()
        });

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(stderr_layer)
            .try_init()
            .map_err(|e| FiretopError::config(format!("Failed to initialize logging: {}", e)))?;

        Ok(())
    }
}

/// Execute the firetop application.
pub async fn execute(cli: Cli) -> Result<()> {
    let config = cli.load_config().await?;

    if cli.check_config {
        println!("Configuration is valid!");
        println!("  Rate window: {}", format_duration(config.window.rate_window));
        println!("  Refresh rate: {}", format_duration(config.ui.refresh_rate));
        println!("  App timeout: {}", format_duration(config.stats.app_timeout));
        println!(
            "  Container timeout: {}",
            format_duration(config.stats.container_timeout)
        );
        println!("  Max user agents: {}", config.stats.max_user_agents);
        println!("  Default view: {:?}", config.ui.default_view);
        return Ok(());
    }

    cli.init_logging(&config.logging)?;

    let mut app = Application::new(config)?;
    apply_startup_table(&cli, &mut app)?;
    app.run().await
}

fn apply_startup_table(cli: &Cli, app: &mut Application) -> Result<()> {
    let dashboard = app.dashboard_mut();
    if !cli.sort.is_empty() {
        dashboard.apply_sort(&cli.sort)?;
    }
    if !cli.filter.is_empty() {
        dashboard.apply_filters(&cli.filter)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("firetop").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&[]);
        assert!(!cli.debug);
        assert!(!cli.demo);
        assert!(cli.window.is_none());
        assert!(cli.sort.is_empty());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = parse(&[
            "--window", "30s", "--refresh", "250ms", "--view", "user_agents", "--demo", "--sort", "-name",
            "--filter", "rps=>1.5",
        ]);
        assert_eq!(cli.window, Some(Duration::from_secs(30)));
        assert_eq!(cli.view, Some(ViewMode::UserAgents));
        assert_eq!(cli.sort, vec!["-name".to_string()]);
        assert_eq!(cli.filter, vec![("rps".to_string(), ">1.5".to_string())]);

        let config = cli.build_config_from_args(ConfigBuilder::new()).unwrap();
        assert_eq!(config.window.rate_window, Duration::from_secs(30));
        assert_eq!(config.ui.refresh_rate, Duration::from_millis(250));
        assert!(config.demo);
    }

    #[test]
    fn test_demo_flags_conflict() {
        assert!(Cli::try_parse_from(["firetop", "--demo", "--no-demo"]).is_err());
    }

    #[test]
    fn test_parse_filter() {
        assert!(parse_filter("name").is_err());
        assert!(parse_filter("=x").is_err());
        assert_eq!(parse_filter("name=app[ab]").unwrap(), ("name".to_string(), "app[ab]".to_string()));
    }

    #[test]
    fn test_cli_window_overrides_file() {
        let cli = parse(&["--window", "10s"]);
        let builder = ConfigBuilder::new()
            .from_yaml("window:\n  rate_window: 2m\nui:\n  default_view: hosts\n")
            .unwrap();
        let config = cli.build_config_from_args(builder).unwrap();
        assert_eq!(config.window.rate_window, Duration::from_secs(10));
        assert_eq!(config.ui.default_view, ViewMode::Hosts);
    }
}
