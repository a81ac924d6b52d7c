use crate::error::NetprobeError;
use crate::net::{self, Target};
use log::{debug, info};
use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

/// Default per-port connect timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Classification of a single TCP port.
///
/// `Filtered` covers every probe that neither completed nor was refused:
/// silent timeouts, unreachable networks, and local socket errors all land
/// here. The classes are not distinguishable from the scan table alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    Open,
    Closed,
    Filtered,
}

impl PortState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortState::Open => "open",
            PortState::Closed => "closed",
            PortState::Filtered => "filtered",
        }
    }
}

/// One row of a scan table: the port, its classification, and the measured
/// round-trip for ports that answered. `latency_ms` is present exactly when
/// the state is not `Filtered`.
#[derive(Debug, Clone, Serialize)]
pub struct PortResult {
    pub port: u16,
    pub state: PortState,
    pub latency_ms: Option<u64>,
}

/// Configuration for a scan run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub target: Target,
    pub ports_from: u16,
    pub ports_to: u16,
    pub timeout: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            target: Target::Ip(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            ports_from: 1,
            ports_to: 1024,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

/// Sequential TCP connect scanner.
///
/// Ports are probed one at a time in ascending order, one connect attempt
/// per port, with the socket closed as soon as the outcome is known. No
/// banner is read and no payload is sent.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Reject bad port ranges before any resolution or socket work.
    fn validate(&self) -> Result<(), NetprobeError> {
        let (from, to) = (self.config.ports_from, self.config.ports_to);
        if from == 0 || to == 0 {
            return Err(NetprobeError::InvalidRange(format!(
                "ports must lie in 1-65535, got {}-{}",
                from, to
            )));
        }
        if from > to {
            return Err(NetprobeError::InvalidRange(format!(
                "port range start {} exceeds end {}",
                from, to
            )));
        }
        Ok(())
    }

    /// Run the scan and return one row per port, in ascending port order.
    pub async fn scan(&self) -> Result<Vec<PortResult>, NetprobeError> {
        self.validate()?;
        let addr = net::resolve(&self.config.target).await?;
        let (from, to) = (self.config.ports_from, self.config.ports_to);
        info!(
            "Scanning ports {}-{} on {} ({})",
            from, to, self.config.target, addr
        );
        let started = Instant::now();
        let mut results = Vec::with_capacity(usize::from(to - from) + 1);
        for port in from..=to {
            results.push(self.probe_port(addr, port));
        }
        let open = results
            .iter()
            .filter(|r| r.state == PortState::Open)
            .count();
        info!(
            "Scan finished in {:.2}s: {} ports, {} open",
            started.elapsed().as_secs_f64(),
            results.len(),
            open
        );
        Ok(results)
    }

    /// Probe a single port with one timed connect attempt.
    fn probe_port(&self, addr: Ipv4Addr, port: u16) -> PortResult {
        let sock_addr = SocketAddr::new(IpAddr::V4(addr), port);
        let started = Instant::now();
        match net::timed_connect(sock_addr, self.config.timeout) {
            Ok(connection) => {
                let latency = started.elapsed().as_millis() as u64;
                // Classification only; hang up without exchanging data.
                drop(connection);
                debug!("Port {} open ({} ms)", port, latency);
                PortResult {
                    port,
                    state: PortState::Open,
                    latency_ms: Some(latency),
                }
            }
            Err(NetprobeError::Refused) => {
                let latency = started.elapsed().as_millis() as u64;
                debug!("Port {} closed ({} ms)", port, latency);
                PortResult {
                    port,
                    state: PortState::Closed,
                    latency_ms: Some(latency),
                }
            }
            Err(e) => {
                debug!("Port {} filtered: {}", port, e);
                PortResult {
                    port,
                    state: PortState::Filtered,
                    latency_ms: None,
                }
            }
        }
    }
}

/// One-call scan entry point: parse the target, validate the range, probe
/// every port in it, and return the table.
pub async fn run_port_scan(
    target: &str,
    ports_from: u16,
    ports_to: u16,
    timeout_ms: u64,
) -> Result<Vec<PortResult>, NetprobeError> {
    let config = ScanConfig {
        target: Target::parse(target)?,
        ports_from,
        ports_to,
        timeout: Duration::from_millis(timeout_ms),
    };
    Scanner::new(config).scan().await
}
