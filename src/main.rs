use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::{info, warn};
use netprobe::capability;
use netprobe::cli::{Cli, Command};
use netprobe::monitor::Monitor;
use netprobe::output::{MonitorReport, OutputFormat, ScanReport, TraceReport};
use netprobe::scanner::Scanner;
use netprobe::traceroute::Tracer;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let cli = Cli::parse();
    let format = cli.format();

    match &cli.command {
        Command::Scan { .. } => {
            let config = cli.to_scan_config()?;
            if format == OutputFormat::Table {
                print_banner("port scanner");
            }

            let results = Scanner::new(config).scan().await?;
            let report = ScanReport::new(results);
            report.print(format)?;

            if let Some(path) = &cli.output {
                if path.ends_with(".csv") {
                    report.to_csv_file(path)?;
                } else {
                    report.to_json_file(path)?;
                }
                info!("Report written to {}", path);
            }
            Ok(())
        }
        Command::Trace { .. } => {
            let config = cli.to_trace_config()?;
            if format == OutputFormat::Table {
                print_banner("traceroute");
            }
            if !capability::has_raw_socket_privilege() {
                warn!(
                    "Raw ICMP sockets usually need root or CAP_NET_RAW; \
                     grant it with: sudo setcap cap_net_raw+ep $(command -v netprobe)"
                );
            }

            let hops = Tracer::new(config).trace().await?;
            let report = TraceReport::new(hops);
            report.print(format)?;

            if let Some(path) = &cli.output {
                if path.ends_with(".csv") {
                    report.to_csv_file(path)?;
                } else {
                    report.to_json_file(path)?;
                }
                info!("Report written to {}", path);
            }
            Ok(())
        }
        Command::Monitor { .. } => {
            let config = cli.to_monitor_config()?;
            if format == OutputFormat::Table {
                print_banner("bandwidth monitor");
            }

            // Ctrl-C stops sampling early and renders what was collected.
            let cancel = CancellationToken::new();
            let handle = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("Interrupt received, stopping monitor");
                    handle.cancel();
                }
            });

            let samples = Monitor::new(config).run(cancel).await?;
            let report = MonitorReport::new(samples);
            report.print(format)?;

            if let Some(path) = &cli.output {
                if path.ends_with(".csv") {
                    report.to_csv_file(path)?;
                } else {
                    report.to_json_file(path)?;
                }
                info!("Report written to {}", path);
            }
            Ok(())
        }
    }
}

fn print_banner(mode: &str) {
    let title = format!("  netprobe v{}  [{}]  ", env!("CARGO_PKG_VERSION"), mode);
    let width = title.chars().count();
    println!("\n{}", format!("╔{}╗", "═".repeat(width)).blue().bold());
    println!(
        "{}{}{}",
        "║".blue().bold(),
        title.bright_green().bold(),
        "║".blue().bold()
    );
    println!("{}", format!("╚{}╝", "═".repeat(width)).blue().bold());
    println!();
}
