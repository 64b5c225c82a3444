//! CLI entry point for the netmon network monitor.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use netmon_state::FileStateStore;

use netmon_discover::config::MonitorConfig;
use netmon_discover::notify::HttpNotifier;
use netmon_discover::scanner::NmapScanner;
use netmon_discover::scheduler::ScanScheduler;

#[derive(Parser)]
#[command(name = "netmon")]
#[command(about = "Run nmap periodically and notify when new devices appear")]
struct Cli {
    /// Notification URL (env: NETMON_NOTIFICATION).
    #[arg(long)]
    notification: Option<String>,

    /// Subnet to scan (env: NETMON_SUBNET).
    #[arg(long)]
    subnet: Option<String>,

    /// Scan interval in minutes (env: NETMON_MINUTES).
    #[arg(long)]
    minutes: Option<u64>,

    /// Results file path (env: NETMON_RESULTS).
    #[arg(long)]
    results: Option<String>,

    /// Path to the nmap binary (env: NETMON_NMAP_PATH).
    #[arg(long)]
    nmap_path: Option<String>,

    /// Run a single cycle, print its report as JSON and exit.
    #[arg(long)]
    once: bool,

    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,

    /// Config file prefix (default: netmon).
    #[arg(short, long, default_value = "netmon")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.json_logs {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let monitor_config = resolve_config(&cli)?;
    monitor_config.validate()?;

    tracing::info!("Starting netmon");
    tracing::info!(
        notification_service = monitor_config.notification_service(),
        subnet = %monitor_config.subnet,
        minutes = monitor_config.minutes,
        results = %monitor_config.results,
        "Active configuration"
    );
    if !monitor_config.subnet_is_cidr() {
        tracing::warn!(
            subnet = %monitor_config.subnet,
            "Subnet is not CIDR notation, passing it to nmap as-is"
        );
    }

    let notifier = HttpNotifier::from_url(&monitor_config.notification)?;
    if !notifier.is_enabled() {
        tracing::warn!("No notification URL configured, new devices will only be logged");
    }

    // Verify nmap installation. A failure here is retried per cycle like any scan failure.
    let scanner = NmapScanner::new(&monitor_config.nmap_path);
    match scanner.verify_installation().await {
        Ok(version) => {
            let first_line = version.lines().next().unwrap_or_default();
            tracing::info!(nmap_version = %first_line.trim(), "Nmap verified");
        }
        Err(e) => tracing::warn!(error = %e, "Nmap check failed"),
    }

    let store = FileStateStore::new(&monitor_config.results);
    let scheduler = ScanScheduler::new(
        scanner,
        notifier,
        store,
        &monitor_config.subnet,
        monitor_config.interval(),
    );

    if cli.once {
        let report = scheduler.run_cycle().await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    scheduler
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!("Stopping netmon, bye bye");
    Ok(())
}

/// Defaults, then the optional config file, then `NETMON_*` variables,
/// then command-line flags.
fn resolve_config(cli: &Cli) -> anyhow::Result<MonitorConfig> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(&cli.config).required(false))
        .add_source(config::Environment::with_prefix("NETMON").try_parsing(true))
        .build()?;

    let mut monitor_config: MonitorConfig = cfg.try_deserialize()?;

    if let Some(notification) = &cli.notification {
        monitor_config.notification = notification.clone();
    }
    if let Some(subnet) = &cli.subnet {
        monitor_config.subnet = subnet.clone();
    }
    if let Some(minutes) = cli.minutes {
        monitor_config.minutes = minutes;
    }
    if let Some(results) = &cli.results {
        monitor_config.results = results.clone();
    }
    if let Some(nmap_path) = &cli.nmap_path {
        monitor_config.nmap_path = nmap_path.clone();
    }

    Ok(monitor_config)
}
