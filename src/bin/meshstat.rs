//! meshstat - snapshot and report on overlay network state.
//!
//! Usage:
//!   meshstat process-addrs weave        # processes attached to bridge "weave"
//!   meshstat status ./state.json        # aggregated status as JSON
//!   meshstat metrics ./state.json       # one scrape in Prometheus text format

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing::{Level, debug};
use tracing_subscriber::EnvFilter;

use meshstat::bridge::{BridgeProcessResolver, SysfsNetns, write_report};
use meshstat::metrics::{
    DEFAULT_NAMESPACE, MetricsCollector, PrometheusExporter, registry_with, render_text,
};
use meshstat::nameserver::DnsServerConfig;
#[cfg(not(target_os = "linux"))]
use meshstat::procfs::MockFs;
#[cfg(target_os = "linux")]
use meshstat::procfs::RealFs;
use meshstat::provider::StateFile;
use meshstat::status::StatusAggregator;

/// Snapshot and report on overlay network state.
#[derive(Parser)]
#[command(name = "meshstat", about = "Overlay network state reporter", version)]
struct Args {
    /// Increase logging verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List processes owning interfaces attached to a bridge.
    ///
    /// Prints one line per process: `<pid> <device> [<device> ...]`.
    /// Prints nothing if the bridge does not exist.
    ProcessAddrs {
        /// Bridge name.
        bridge: String,

        /// Path to /proc filesystem.
        #[arg(long, default_value = "/proc")]
        proc_path: PathBuf,

        /// Path to sysfs.
        #[arg(long, default_value = "/sys")]
        sys_path: PathBuf,
    },

    /// Print the aggregated status of a captured peer state as JSON.
    Status {
        /// State file (JSON).
        state: PathBuf,

        /// Read upstream resolvers from this resolv.conf instead of the state file.
        #[arg(long, value_name = "PATH")]
        resolv_conf: Option<PathBuf>,
    },

    /// Print one metrics scrape of a captured peer state.
    Metrics {
        /// State file (JSON).
        state: PathBuf,

        /// Prefix for metric names.
        #[arg(long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,
    },
}

/// Initializes the tracing subscriber on stderr, keeping stdout for reports.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn process_addrs(
    bridge: &str,
    proc_path: PathBuf,
    sys_path: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(target_os = "linux")]
    let fs = RealFs::new();
    #[cfg(not(target_os = "linux"))]
    let fs = MockFs::new();

    let resolver = BridgeProcessResolver::new(SysfsNetns::new(fs, proc_path, sys_path));
    let report = resolver.resolve(bridge)?;

    let mut stdout = std::io::stdout().lock();
    write_report(&report, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

fn status(state: PathBuf, resolv_conf: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let mut subsystems = StateFile::load(&state)?.into_subsystems()?;

    if let Some(path) = resolv_conf {
        let content = std::fs::read_to_string(&path)?;
        let config = subsystems
            .dns
            .as_deref()
            .cloned()
            .unwrap_or_else(DnsServerConfig::default)
            .with_upstream_from_resolv_conf(&content);
        debug!(upstream = ?config.upstream, "upstream from {}", path.display());
        subsystems.dns = Some(Arc::new(config));
    }

    match StatusAggregator::new(subsystems).aggregate() {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => println!("null"),
    }
    Ok(())
}

fn metrics(state: PathBuf, namespace: &str) -> Result<(), Box<dyn std::error::Error>> {
    let subsystems = StateFile::load(&state)?.into_subsystems()?;
    let exporter = PrometheusExporter::new(MetricsCollector::new(subsystems), namespace)?;
    let registry = registry_with(exporter)?;
    print!("{}", render_text(&registry)?);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let result = match args.command {
        Command::ProcessAddrs {
            bridge,
            proc_path,
            sys_path,
        } => process_addrs(&bridge, proc_path, sys_path),
        Command::Status { state, resolv_conf } => status(state, resolv_conf),
        Command::Metrics { state, namespace } => metrics(state, &namespace),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
