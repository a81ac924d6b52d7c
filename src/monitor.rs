//! Interface bandwidth monitor backed by `/proc/net/dev`.
//!
//! Counters are read once per interval; each pair of readings yields one
//! sample with instantaneous and rolling-average bit rates. Parsing is kept
//! separate from sampling so the text format can be tested with fixtures.

use crate::error::NetprobeError;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::fs;
use std::io;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const PROC_NET_DEV: &str = "/proc/net/dev";

/// Samples held by the rolling-average window.
const WINDOW_SIZE: usize = 10;
/// Default number of samples per run.
pub const DEFAULT_SAMPLES: usize = 10;
/// Default sampling interval in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 100;

/// One bandwidth sample for an interface.
///
/// Rates are kept at full precision in memory; reports render them with
/// two decimals, so JSON serialization rounds to match the CSV columns.
#[derive(Debug, Clone, Serialize)]
pub struct IfaceSample {
    pub iface: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    #[serde(serialize_with = "two_decimals")]
    pub rx_bps: f64,
    #[serde(serialize_with = "two_decimals")]
    pub tx_bps: f64,
    #[serde(serialize_with = "two_decimals")]
    pub rx_avg_bps: f64,
    #[serde(serialize_with = "two_decimals")]
    pub tx_avg_bps: f64,
    #[serde(skip)]
    pub sampled_at: DateTime<Utc>,
}

fn two_decimals<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64((value * 100.0).round() / 100.0)
}

/// Configuration for a monitor run.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interface to watch; `None` picks the first non-loopback interface.
    pub iface: Option<String>,
    /// Time between samples.
    pub interval: Duration,
    /// Number of samples to collect before stopping.
    pub samples: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            iface: None,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            samples: DEFAULT_SAMPLES,
        }
    }
}

/// Raw RX/TX byte counters for one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfaceCounters {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Fixed-capacity window that smooths rates with a running mean.
///
/// Until the window fills, the mean covers only the values pushed so far;
/// afterwards each push evicts the oldest value.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    values: Vec<f64>,
    capacity: usize,
    head: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() < self.capacity {
            self.values.push(value);
        } else {
            self.values[self.head] = value;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }
}

/// Extract RX/TX byte counters for `iface` from `/proc/net/dev` text.
///
/// The first two lines are column headers. Data lines look like
/// `  eth0: 12345 67 0 0 0 0 0 0 54321 89 0 0 0 0 0 0`: receive bytes are
/// the first field after the colon, transmit bytes the ninth.
pub fn parse_counters(contents: &str, iface: &str) -> Result<IfaceCounters, NetprobeError> {
    for line in contents.lines().skip(2) {
        let Some((name, rest)) = line.split_once(':') else {
            continue;
        };
        if name.trim() != iface {
            continue;
        }
        let fields: Vec<&str> = rest.split_whitespace().collect();
        if fields.len() < 9 {
            return Err(NetprobeError::Os(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("malformed /proc/net/dev line for '{}'", iface),
            )));
        }
        let rx_bytes = parse_counter(fields[0], iface)?;
        let tx_bytes = parse_counter(fields[8], iface)?;
        return Ok(IfaceCounters { rx_bytes, tx_bytes });
    }
    Err(NetprobeError::Os(io::Error::new(
        io::ErrorKind::NotFound,
        format!("interface '{}' not present in /proc/net/dev", iface),
    )))
}

fn parse_counter(field: &str, iface: &str) -> Result<u64, NetprobeError> {
    field.parse().map_err(|_| {
        NetprobeError::Os(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("non-numeric counter '{}' for '{}'", field, iface),
        ))
    })
}

/// First non-loopback interface listed in `/proc/net/dev`.
pub fn detect_default_iface(contents: &str) -> Option<String> {
    contents
        .lines()
        .skip(2)
        .filter_map(|line| line.split_once(':'))
        .map(|(name, _)| name.trim())
        .find(|name| !name.is_empty() && *name != "lo")
        .map(str::to_string)
}

fn read_proc_net_dev() -> Result<String, NetprobeError> {
    Ok(fs::read_to_string(PROC_NET_DEV)?)
}

/// Periodic bandwidth sampler for a single interface.
#[derive(Debug, Clone)]
pub struct Monitor {
    config: MonitorConfig,
}

impl Monitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }

    /// Collect samples until the configured count is reached or the token
    /// is cancelled. Cancellation returns the samples gathered so far.
    pub async fn run(&self, cancel: CancellationToken) -> Result<Vec<IfaceSample>, NetprobeError> {
        if self.config.interval.is_zero() {
            return Err(NetprobeError::InvalidRange(
                "interval must be positive".to_string(),
            ));
        }
        let contents = read_proc_net_dev()?;
        let iface = match &self.config.iface {
            Some(name) => name.clone(),
            None => detect_default_iface(&contents).ok_or_else(|| {
                NetprobeError::Os(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no non-loopback interface found",
                ))
            })?,
        };
        // First reading primes the deltas; it produces no sample.
        let mut prev = parse_counters(&contents, &iface)?;
        let mut prev_at = Instant::now();
        info!(
            "Monitoring {} every {} ms for {} samples",
            iface,
            self.config.interval.as_millis(),
            self.config.samples
        );

        let mut rx_window = RollingWindow::new(WINDOW_SIZE);
        let mut tx_window = RollingWindow::new(WINDOW_SIZE);
        let mut series = Vec::with_capacity(self.config.samples);
        while series.len() < self.config.samples {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Monitor stopped after {} of {} samples", series.len(), self.config.samples);
                    break;
                }
                _ = tokio::time::sleep(self.config.interval) => {}
            }
            let counters = parse_counters(&read_proc_net_dev()?, &iface)?;
            let now = Instant::now();
            let elapsed = now.duration_since(prev_at).as_secs_f64();
            if elapsed <= 0.0 {
                continue;
            }
            let rx_bps = counters.rx_bytes.saturating_sub(prev.rx_bytes) as f64 * 8.0 / elapsed;
            let tx_bps = counters.tx_bytes.saturating_sub(prev.tx_bytes) as f64 * 8.0 / elapsed;
            rx_window.push(rx_bps);
            tx_window.push(tx_bps);
            let sample = IfaceSample {
                iface: iface.clone(),
                rx_bytes: counters.rx_bytes,
                tx_bytes: counters.tx_bytes,
                rx_bps,
                tx_bps,
                rx_avg_bps: rx_window.mean(),
                tx_avg_bps: tx_window.mean(),
                sampled_at: Utc::now(),
            };
            debug!(
                "[{}] {}: rx {:.2} bps (avg {:.2}), tx {:.2} bps (avg {:.2})",
                sample.sampled_at.format("%H:%M:%S%.3f"),
                iface,
                rx_bps,
                sample.rx_avg_bps,
                tx_bps,
                sample.tx_avg_bps
            );
            series.push(sample);
            prev = counters;
            prev_at = now;
        }
        Ok(series)
    }
}
