//! # netprobe: sequential network diagnostics for IPv4 hosts.
//!
//! This library probes one thing at a time and reports exactly what it saw:
//! TCP connect scans that tell open, closed, and filtered ports apart, ICMP
//! traceroute with per-hop round-trip times, and interface bandwidth
//! sampling from `/proc/net/dev`.
//!
//! ## Features
//!
//! - **Port Scanning**: Sequential TCP connect scans with per-port timeouts
//!   and open/closed/filtered classification
//! - **Traceroute**: ICMP echo probes with increasing TTLs, reverse DNS for
//!   each hop, and early stop once the target answers
//! - **Bandwidth Monitoring**: Instantaneous and rolling-average bit rates
//!   for a network interface
//! - **Stable Reports**: Table, CSV, and JSON renderings with fixed schemas
//!
//! ## Example
//!
//! ```rust,no_run
//! use netprobe::{run_port_scan, PortState};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let table = run_port_scan("192.168.1.1", 1, 1024, 1000).await?;
//!     for row in &table {
//!         if row.state == PortState::Open {
//!             println!("Port {}: open ({:?} ms)", row.port, row.latency_ms);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod capability;
pub mod cli;
pub mod error;
pub mod icmp;
pub mod monitor;
pub mod net;
pub mod output;
pub mod scanner;
pub mod traceroute;

pub use capability::{has_cap_net_raw, has_raw_socket_privilege, is_root};
/// Command line interface for netprobe
pub use cli::Cli;
pub use error::NetprobeError;
/// Bandwidth monitoring
pub use monitor::{IfaceSample, Monitor, MonitorConfig};
/// Target addressing shared by the probing engines
pub use net::Target;
pub use output::{MonitorReport, OutputFormat, ScanReport, TraceReport};
/// Core scanner functionality
pub use scanner::{run_port_scan, PortResult, PortState, ScanConfig, Scanner};
/// Traceroute functionality
pub use traceroute::{run_traceroute, Hop, TraceConfig, Tracer};
