//! Report types for the three probe modes and their table, CSV, and JSON
//! renderings.
//!
//! The CSV and JSON layouts are part of the tool's contract: keys and
//! column orders stay fixed so downstream tooling can depend on them.

use crate::monitor::IfaceSample;
use crate::scanner::{PortResult, PortState};
use crate::traceroute::Hop;
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::Write;

/// How a report is rendered on stdout or to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn write_file(path: &str, contents: &str) -> Result<(), std::io::Error> {
    let mut file = File::create(path)?;
    file.write_all(contents.as_bytes())
}

/// Scan results ready for rendering.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    #[serde(rename = "type")]
    kind: &'static str,
    pub results: Vec<PortResult>,
}

impl ScanReport {
    pub fn new(results: Vec<PortResult>) -> Self {
        ScanReport {
            kind: "scan",
            results,
        }
    }

    pub fn print(&self, format: OutputFormat) -> Result<(), std::io::Error> {
        match format {
            OutputFormat::Table => self.print_table(),
            OutputFormat::Csv => print!("{}", self.to_csv()),
            OutputFormat::Json => println!("{}", serde_json::to_string(self)?),
        }
        Ok(())
    }

    fn print_table(&self) {
        println!("{:<5}  {:<9}  {}", "PORT", "STATE", "LATENCY(ms)");
        for row in &self.results {
            let state = format!("{:<9}", row.state.as_str());
            let state = match row.state {
                PortState::Open => state.green(),
                PortState::Closed => state.red(),
                PortState::Filtered => state.yellow(),
            };
            match row.latency_ms {
                Some(ms) => println!("{:<5}  {}  {}", row.port, state, ms),
                None => println!("{:<5}  {}  -", row.port, state),
            }
        }
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from("port,state,latency_ms\n");
        for row in &self.results {
            let latency = row
                .latency_ms
                .map(|ms| ms.to_string())
                .unwrap_or_default();
            out.push_str(&format!("{},{},{}\n", row.port, row.state.as_str(), latency));
        }
        out
    }

    pub fn to_json_file(&self, path: &str) -> Result<(), std::io::Error> {
        write_file(path, &serde_json::to_string_pretty(self)?)
    }

    pub fn to_csv_file(&self, path: &str) -> Result<(), std::io::Error> {
        write_file(path, &self.to_csv())
    }
}

/// Traceroute results ready for rendering.
#[derive(Debug, Serialize)]
pub struct TraceReport {
    #[serde(rename = "type")]
    kind: &'static str,
    pub hops: Vec<Hop>,
}

impl TraceReport {
    pub fn new(hops: Vec<Hop>) -> Self {
        TraceReport { kind: "trace", hops }
    }

    pub fn print(&self, format: OutputFormat) -> Result<(), std::io::Error> {
        match format {
            OutputFormat::Table => self.print_table(),
            OutputFormat::Csv => print!("{}", self.to_csv()),
            OutputFormat::Json => println!("{}", serde_json::to_string(self)?),
        }
        Ok(())
    }

    fn print_table(&self) {
        println!(
            "{:<3}  {:<16} {:<26} {:<7}  {}",
            "HOP", "IP", "HOST", "RTT(ms)", "STATUS"
        );
        for hop in &self.hops {
            let rtt = hop.rtt_ms.map(|ms| ms.to_string()).unwrap_or_else(|| "-".to_string());
            let status = if hop.timed_out {
                "TIMEOUT".yellow()
            } else {
                "OK".green()
            };
            println!(
                "{:<3}  {:<16} {:<26} {:<7}  {}",
                hop.hop, hop.ip, hop.host, rtt, status
            );
        }
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from("hop,ip,host,rtt_ms,timeout\n");
        for hop in &self.hops {
            let rtt = hop.rtt_ms.map(|ms| ms.to_string()).unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "{},{},{},{},{}\n",
                hop.hop, hop.ip, hop.host, rtt, hop.timed_out
            ));
        }
        out
    }

    pub fn to_json_file(&self, path: &str) -> Result<(), std::io::Error> {
        write_file(path, &serde_json::to_string_pretty(self)?)
    }

    pub fn to_csv_file(&self, path: &str) -> Result<(), std::io::Error> {
        write_file(path, &self.to_csv())
    }
}

/// Bandwidth samples ready for rendering.
#[derive(Debug, Serialize)]
pub struct MonitorReport {
    #[serde(rename = "type")]
    kind: &'static str,
    pub samples: Vec<IfaceSample>,
}

impl MonitorReport {
    pub fn new(samples: Vec<IfaceSample>) -> Self {
        MonitorReport {
            kind: "monitor",
            samples,
        }
    }

    pub fn print(&self, format: OutputFormat) -> Result<(), std::io::Error> {
        match format {
            OutputFormat::Table => self.print_table(),
            OutputFormat::Csv => print!("{}", self.to_csv()),
            OutputFormat::Json => println!("{}", serde_json::to_string(self)?),
        }
        Ok(())
    }

    fn print_table(&self) {
        println!(
            "{:<6} {:<10} {:<10} {:<11} {:<11} {:<12} {:<12}",
            "IFACE", "RX_BYTES", "TX_BYTES", "RX_BPS", "TX_BPS", "RX_AVG_BPS", "TX_AVG_BPS"
        );
        for s in &self.samples {
            println!(
                "{:<6} {:<10} {:<10} {:<11.2} {:<11.2} {:<12.2} {:<12.2}",
                s.iface, s.rx_bytes, s.tx_bytes, s.rx_bps, s.tx_bps, s.rx_avg_bps, s.tx_avg_bps
            );
        }
    }

    pub fn to_csv(&self) -> String {
        let mut out = String::from("iface,rx_bytes,tx_bytes,rx_bps,tx_bps,rx_avg_bps,tx_avg_bps\n");
        for s in &self.samples {
            out.push_str(&format!(
                "{},{},{},{:.2},{:.2},{:.2},{:.2}\n",
                s.iface, s.rx_bytes, s.tx_bytes, s.rx_bps, s.tx_bps, s.rx_avg_bps, s.tx_avg_bps
            ));
        }
        out
    }

    pub fn to_json_file(&self, path: &str) -> Result<(), std::io::Error> {
        write_file(path, &serde_json::to_string_pretty(self)?)
    }

    pub fn to_csv_file(&self, path: &str) -> Result<(), std::io::Error> {
        write_file(path, &self.to_csv())
    }
}
