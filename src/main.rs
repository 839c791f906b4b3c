use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

use atem_scan_rs::types::{ScanConfig, ScanReport};
use atem_scan_rs::{logging, probe, scanner};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

/// atem-scan-rs: find ATEM video switchers next to this machine.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "atem-scan-rs",
    version,
    about = "Find ATEM video switchers on the local /24.",
    long_about = "Takes the IPv4 address(es) of --interface and probes the adjacent 254 addresses \
                  of each with an ATEM hello on UDP 9910. Prints one JSON line: \
                  {\"success\":true,\"addresses\":[...]}."
)]
struct Cli {
    /// Interface to query for our own IP address (e.g. eth0).
    #[arg(long)]
    interface: String,

    /// Number of concurrent probe workers.
    #[arg(long, default_value_t = ScanConfig::DEFAULT_WORKERS)]
    workers: usize,

    /// Reply wait per address in milliseconds.
    #[arg(long = "timeout-ms", default_value_t = 100)]
    timeout_ms: u64,

    /// Destination UDP port for the hello packet.
    #[arg(long, default_value_t = probe::ATEM_PORT)]
    port: u16,

    /// Also write the report as pretty JSON to this path.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log more to stderr (-v info, -vv debug, -vvv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_workers(self.workers)
            .with_port(self.port)
            .with_timeout(Duration::from_millis(self.timeout_ms))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose)?;

    let config = cli.scan_config();
    info!(
        interface = %cli.interface,
        workers = config.workers,
        port = config.port,
        timeout_ms = cli.timeout_ms,
        "starting scan"
    );

    let report = scanner::scan_interface(&cli.interface, &config).await?;

    println!("{}", serde_json::to_string(&report)?);

    if let Some(path) = cli.output.as_deref() {
        write_report_json(path, &report)?;
        info!(path = %path.display(), "wrote JSON report");
    }

    Ok(())
}

fn write_report_json(path: &Path, report: &ScanReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create report file: {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_policy() {
        let cli = Cli::try_parse_from(["atem-scan-rs", "--interface", "eth0"]).unwrap();
        assert_eq!(cli.scan_config(), ScanConfig::default());
        assert!(cli.output.is_none());
    }

    #[test]
    fn interface_is_required() {
        assert!(Cli::try_parse_from(["atem-scan-rs"]).is_err());
    }

    #[test]
    fn overrides_flow_into_config() {
        let cli = Cli::try_parse_from([
            "atem-scan-rs",
            "--interface",
            "en0",
            "--workers",
            "16",
            "--timeout-ms",
            "250",
            "--port",
            "19910",
            "-vv",
        ])
        .unwrap();
        let cfg = cli.scan_config();
        assert_eq!(cfg.workers, 16);
        assert_eq!(cfg.port, 19910);
        assert_eq!(cfg.timeout, Duration::from_millis(250));
        assert_eq!(cli.verbose, 2);
    }
}
