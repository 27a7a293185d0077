// # zonectl - zonedash command line
//
// Thin composition root over zonedash-core:
// 1. Reading configuration from environment variables and arguments
// 2. Initializing logging and the runtime
// 3. Wiring the config file store, HTTP fetcher and IP monitor
// 4. Running one command
//
// ## Configuration
//
// - `--config` / `ZONEDASH_CONFIG`: Path to the dashboard config file (default `config.json`)
// - `--log-level` / `ZONEDASH_LOG_LEVEL`: trace, debug, info, warn or error (default `info`)
//
// ## Commands
//
// - `ip`: Discover the current public IPs
// - `check-ip`: Compare the current public IPs with the stored ones
// - `watch`: Run `check-ip` every `autoUpdate.checkInterval` seconds
// - `parse <zone> <file>`: Print the records of a zone file as JSON
// - `export <zone> <records.json>`: Print a JSON record list as a zone file
//
// ## Example
//
// ```bash
// export ZONEDASH_CONFIG=/var/lib/zonedash/config.json
// zonectl check-ip
// zonectl parse example.com ./example.com.zone
// ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use zonedash_core::record::DnsRecord;
use zonedash_core::state::ConfigFileStore;
use zonedash_core::{DashboardConfig, IpMonitor, zone};
use zonedash_ip_http::HttpIpFetcher;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// - 0: Clean exit
/// - 1: Configuration or usage error
/// - 2: Runtime error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ZonectlExitCode {
    /// Clean exit
    Success = 0,
    /// Configuration error or bad usage
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<ZonectlExitCode> for ExitCode {
    fn from(code: ZonectlExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Parser, Debug)]
#[command(name = "zonectl")]
#[command(about = "Public IP monitoring and BIND zone files for zonedash", long_about = None)]
struct Config {
    /// Path to the dashboard config file
    #[arg(long, short = 'c', default_value = "config.json", env = "ZONEDASH_CONFIG")]
    config_path: PathBuf,

    /// Log level: trace, debug, info, warn or error
    #[arg(long, default_value = "info", env = "ZONEDASH_LOG_LEVEL", value_parser = parse_log_level)]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

/// Command selected on the command line
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Discover the current public IPs
    Ip,
    /// Compare the current public IPs with the stored ones
    CheckIp,
    /// Check for IP changes every autoUpdate.checkInterval seconds
    Watch,
    /// Print the records of a zone file as JSON
    Parse {
        /// Zone name, e.g. example.com
        zone: String,
        /// BIND zone file to read
        file: PathBuf,
    },
    /// Print a JSON record list as a zone file
    Export {
        /// Zone name, e.g. example.com
        zone: String,
        /// JSON file holding the record list
        records: PathBuf,
    },
}

impl Command {
    /// Whether the command drives the IP monitor (and so needs the config file)
    fn uses_monitor(&self) -> bool {
        matches!(self, Command::Ip | Command::CheckIp | Command::Watch)
    }
}

impl Config {
    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if self.config_path.as_os_str().is_empty() {
            anyhow::bail!("ZONEDASH_CONFIG cannot be empty");
        }
        Ok(())
    }
}

fn parse_log_level(level: &str) -> std::result::Result<Level, String> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(format!(
            "'{}' is not valid. Valid levels: trace, debug, info, warn, error",
            level
        )),
    }
}

fn main() -> ExitCode {
    let config = match Config::try_parse() {
        Ok(cfg) => cfg,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                ZonectlExitCode::ConfigError.into()
            } else {
                ZonectlExitCode::Success.into()
            };
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return ZonectlExitCode::ConfigError.into();
    }

    // Logs go to stderr, command output to stdout
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZonectlExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZonectlExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(config)).into()
}

async fn run(config: Config) -> ZonectlExitCode {
    if !config.command.uses_monitor() {
        return match run_zone_command(&config.command).await {
            Ok(()) => ZonectlExitCode::Success,
            Err(e) => {
                error!("{:#}", e);
                ZonectlExitCode::RuntimeError
            }
        };
    }

    let (store, dashboard) = match open_store(&config).await {
        Ok(opened) => opened,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return ZonectlExitCode::ConfigError;
        }
    };

    if config.command == Command::Watch && !dashboard.auto_update.enabled {
        error!("autoUpdate.enabled is false in {}", config.config_path.display());
        return ZonectlExitCode::ConfigError;
    }

    match run_ip_command(&config.command, store, dashboard).await {
        Ok(()) => ZonectlExitCode::Success,
        Err(e) => {
            error!("{:#}", e);
            ZonectlExitCode::RuntimeError
        }
    }
}

/// Load and validate the dashboard configuration
async fn open_store(config: &Config) -> Result<(ConfigFileStore, DashboardConfig)> {
    let store = ConfigFileStore::new(&config.config_path)
        .await
        .with_context(|| format!("Failed to open {}", config.config_path.display()))?;

    let dashboard = store.config().await;
    dashboard.validate()?;

    info!(
        "Loaded {}: {} account(s), {} IP provider(s)",
        config.config_path.display(),
        dashboard.accounts.len(),
        dashboard.ip_providers.len()
    );

    Ok((store, dashboard))
}

async fn run_zone_command(command: &Command) -> Result<()> {
    match command {
        Command::Parse { zone, file } => {
            let text = tokio::fs::read_to_string(file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let records = zone::parse(zone, &text);
            info!("Parsed {} record(s) from {}", records.len(), file.display());
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Export { zone, records } => {
            let json = tokio::fs::read_to_string(records)
                .await
                .with_context(|| format!("Failed to read {}", records.display()))?;
            let records: Vec<DnsRecord> =
                serde_json::from_str(&json).context("Invalid record list")?;
            print!("{}", zone::serialize(zone, &records));
        }
        Command::Ip | Command::CheckIp | Command::Watch => {
            anyhow::bail!("{:?} is not a zone-file command", command)
        }
    }

    Ok(())
}

async fn run_ip_command(
    command: &Command,
    store: ConfigFileStore,
    dashboard: DashboardConfig,
) -> Result<()> {
    let fetcher = HttpIpFetcher::new()?;
    let monitor = IpMonitor::new(
        Box::new(fetcher),
        Box::new(store),
        dashboard.ip_providers.clone(),
    );

    match command {
        Command::Ip => {
            let found = monitor.discover().await?;
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
        Command::CheckIp => {
            let report = monitor.check_for_change().await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Watch => watch(&monitor, &dashboard).await?,
        Command::Parse { .. } | Command::Export { .. } => {
            anyhow::bail!("{:?} does not use the IP monitor", command)
        }
    }

    Ok(())
}

/// Check for IP changes until a shutdown signal arrives
async fn watch(monitor: &IpMonitor, dashboard: &DashboardConfig) -> Result<()> {
    let period = Duration::from_secs(dashboard.auto_update.check_interval);
    let targets = &dashboard.auto_update.target_domains;

    info!(
        "Watching public IP every {:?} for {} domain(s)",
        period,
        targets.len()
    );

    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);

    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            received = &mut shutdown => {
                info!("Received shutdown signal: {}", received?);
                return Ok(());
            }
            _ = ticker.tick() => {
                match monitor.check_for_change().await {
                    Ok(report) if report.changed => {
                        for domain in targets {
                            info!(
                                "{}: address records are stale (ipv4 changed: {}, ipv6 changed: {})",
                                domain,
                                report.per_field_changed.ipv4,
                                report.per_field_changed.ipv6
                            );
                        }
                    }
                    Ok(_) => {}
                    Err(e) => warn!("IP check failed: {}", e),
                }
            }
        }
    }
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
