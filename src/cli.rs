use crate::monitor::MonitorConfig;
use crate::net::Target;
use crate::output::OutputFormat;
use crate::scanner::ScanConfig;
use crate::traceroute::TraceConfig;
use anyhow::{anyhow, bail};
use clap::{Parser, Subcommand};
use std::time::Duration;

/// Lowest scannable port.
pub const MIN_PORT: u32 = 1;
/// Highest scannable port.
pub const MAX_PORT: u32 = 65535;
/// Lowest usable TTL.
pub const MIN_TTL: u32 = 1;
/// Highest usable TTL.
pub const MAX_TTL: u32 = 255;

#[derive(Parser, Debug)]
#[command(
    name = "netprobe",
    version,
    about = "Sequential network diagnostics: port scanning, traceroute, and bandwidth monitoring",
    long_about = "netprobe probes IPv4 hosts one step at a time: TCP connect scans that tell \
                  open, closed, and filtered ports apart, ICMP traceroute with per-hop timings, \
                  and interface bandwidth sampling from /proc/net/dev.",
    after_help = "EXAMPLES:
    netprobe scan --target 192.168.1.1 --ports 1-1024
    netprobe scan --target example.com --ports 80-443 --json
    netprobe trace --target 8.8.8.8 --ttl 1-30
    netprobe trace --target example.com --no-rdns --csv
    netprobe monitor --iface eth0 --interval 500
    netprobe monitor --samples 20 -o stats.json"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, help = "Emit JSON instead of a table")]
    pub json: bool,

    #[arg(
        long,
        global = true,
        conflicts_with = "json",
        help = "Emit CSV instead of a table"
    )]
    pub csv: bool,

    #[arg(
        short,
        long,
        global = true,
        help = "Also write the report to a file (.csv for CSV, anything else for JSON)"
    )]
    pub output: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify TCP ports on a target as open, closed, or filtered
    Scan {
        #[arg(short, long, help = "Target IPv4 address or hostname")]
        target: String,

        #[arg(
            short,
            long,
            default_value = "1-1024",
            help = "Inclusive port range, e.g. 80-443"
        )]
        ports: String,

        #[arg(
            long,
            default_value_t = crate::scanner::DEFAULT_TIMEOUT_MS,
            help = "Per-port connect timeout in milliseconds"
        )]
        timeout: u64,
    },
    /// Trace the ICMP route to a target hop by hop
    Trace {
        #[arg(short, long, help = "Target IPv4 address or hostname")]
        target: String,

        #[arg(
            long,
            default_value = "1-30",
            help = "Inclusive TTL range, e.g. 1-30"
        )]
        ttl: String,

        #[arg(
            long,
            default_value_t = crate::traceroute::DEFAULT_TIMEOUT_MS,
            help = "Per-hop reply timeout in milliseconds"
        )]
        timeout: u64,

        #[arg(long, help = "Skip reverse DNS lookups for hop addresses")]
        no_rdns: bool,
    },
    /// Sample interface bandwidth from /proc/net/dev
    Monitor {
        #[arg(
            short,
            long,
            help = "Interface to watch (first non-loopback interface when omitted)"
        )]
        iface: Option<String>,

        #[arg(
            long,
            default_value_t = crate::monitor::DEFAULT_INTERVAL_MS,
            help = "Sampling interval in milliseconds"
        )]
        interval: u64,

        #[arg(
            long,
            default_value_t = crate::monitor::DEFAULT_SAMPLES,
            help = "Number of samples to collect"
        )]
        samples: usize,
    },
}

/// Parse an inclusive `FROM-TO` range such as `80-443`.
pub fn parse_range(raw: &str) -> Result<(u32, u32), anyhow::Error> {
    let (from_str, to_str) = raw
        .split_once('-')
        .ok_or_else(|| anyhow!("range must be FROM-TO (e.g. 80-443), got '{}'", raw))?;
    let from: u32 = from_str
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid number before '-' in '{}'", raw))?;
    let to: u32 = to_str
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid number after '-' in '{}'", raw))?;
    if from > to {
        bail!("range start {} exceeds end {}", from, to);
    }
    Ok((from, to))
}

impl Cli {
    /// Output format selected by the `--json`/`--csv` flags.
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.csv {
            OutputFormat::Csv
        } else {
            OutputFormat::Table
        }
    }

    /// Convert scan arguments into a validated scanner configuration.
    pub fn to_scan_config(&self) -> Result<ScanConfig, anyhow::Error> {
        let Command::Scan {
            target,
            ports,
            timeout,
        } = &self.command
        else {
            bail!("scan configuration requested for a different subcommand");
        };
        let (from, to) = parse_range(ports)?;
        if from < MIN_PORT || to > MAX_PORT {
            bail!("ports must lie in {}-{}, got {}-{}", MIN_PORT, MAX_PORT, from, to);
        }
        if *timeout == 0 {
            bail!("timeout must be positive");
        }
        Ok(ScanConfig {
            target: Target::parse(target)?,
            ports_from: from as u16,
            ports_to: to as u16,
            timeout: Duration::from_millis(*timeout),
        })
    }

    /// Convert trace arguments into a validated tracer configuration.
    pub fn to_trace_config(&self) -> Result<TraceConfig, anyhow::Error> {
        let Command::Trace {
            target,
            ttl,
            timeout,
            no_rdns,
        } = &self.command
        else {
            bail!("trace configuration requested for a different subcommand");
        };
        let (start, max) = parse_range(ttl)?;
        if start < MIN_TTL || max > MAX_TTL {
            bail!("TTL must lie in {}-{}, got {}-{}", MIN_TTL, MAX_TTL, start, max);
        }
        if *timeout == 0 {
            bail!("timeout must be positive");
        }
        Ok(TraceConfig {
            target: Target::parse(target)?,
            ttl_start: start as u8,
            ttl_max: max as u8,
            timeout: Duration::from_millis(*timeout),
            resolve_hostnames: !no_rdns,
        })
    }

    /// Convert monitor arguments into a validated monitor configuration.
    pub fn to_monitor_config(&self) -> Result<MonitorConfig, anyhow::Error> {
        let Command::Monitor {
            iface,
            interval,
            samples,
        } = &self.command
        else {
            bail!("monitor configuration requested for a different subcommand");
        };
        if let Some(name) = iface {
            if name.is_empty() {
                bail!("interface name must not be empty");
            }
        }
        if *interval == 0 {
            bail!("interval must be positive");
        }
        if *samples == 0 {
            bail!("sample count must be positive");
        }
        Ok(MonitorConfig {
            iface: iface.clone(),
            interval: Duration::from_millis(*interval),
            samples: *samples,
        })
    }
}
