use crate::error::NetprobeError;
use crate::icmp::{self, IcmpMessage};
use crate::net::{self, Target};
use log::{debug, info};
use serde::Serialize;
use socket2::{SockAddr, Socket};
use std::mem::MaybeUninit;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Default per-hop reply timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Payload carried by every echo request; the sequence number is what
/// varies between probes.
const PROBE_PAYLOAD: [u8; 32] = [0u8; 32];

/// Configuration for a traceroute run.
#[derive(Debug, Clone)]
pub struct TraceConfig {
    /// Target to trace towards.
    pub target: Target,
    /// TTL of the first probe.
    pub ttl_start: u8,
    /// TTL of the last probe if the target is not reached earlier.
    pub ttl_max: u8,
    /// How long to wait for each hop's reply.
    pub timeout: Duration,
    /// Whether to reverse-resolve hop addresses to hostnames.
    pub resolve_hostnames: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            target: Target::Ip(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1))),
            ttl_start: 1,
            ttl_max: 30,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            resolve_hostnames: true,
        }
    }
}

/// A single probed hop on the path.
///
/// An unanswered probe still produces a row: `ip` is `*`, `host` is `?`,
/// `rtt_ms` is absent, and `icmp_type` is `-1`. `rtt_ms` is present exactly
/// when `timed_out` is false.
#[derive(Debug, Clone, Serialize)]
pub struct Hop {
    pub hop: u8,
    pub ip: String,
    pub host: String,
    pub rtt_ms: Option<u64>,
    #[serde(rename = "timeout")]
    pub timed_out: bool,
    #[serde(skip)]
    pub icmp_type: i32,
}

impl Hop {
    /// Placeholder row for a probe whose reply never came.
    pub fn unanswered(ttl: u8) -> Self {
        Hop {
            hop: ttl,
            ip: "*".to_string(),
            host: "?".to_string(),
            rtt_ms: None,
            timed_out: true,
            icmp_type: -1,
        }
    }
}

/// Sequential ICMP echo tracer.
///
/// One probe per TTL, strictly in order, on a single raw socket. Routers on
/// the path answer with time-exceeded messages; the target itself answers
/// with an echo reply, which ends the run early.
#[derive(Debug, Clone)]
pub struct Tracer {
    config: TraceConfig,
}

impl Tracer {
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    /// Reject bad TTL ranges before any resolution or socket work.
    fn validate(&self) -> Result<(), NetprobeError> {
        let (start, max) = (self.config.ttl_start, self.config.ttl_max);
        if start == 0 {
            return Err(NetprobeError::InvalidRange(format!(
                "TTL must lie in 1-255, got {}-{}",
                start, max
            )));
        }
        if start > max {
            return Err(NetprobeError::InvalidRange(format!(
                "TTL range start {} exceeds end {}",
                start, max
            )));
        }
        Ok(())
    }

    /// Run the trace and return one row per probed TTL.
    ///
    /// Setup failures (resolution, socket allocation, TTL control, sends)
    /// abort the whole run; only a quiet wire produces placeholder rows.
    pub async fn trace(&self) -> Result<Vec<Hop>, NetprobeError> {
        self.validate()?;
        let addr = net::resolve(&self.config.target).await?;
        let socket = net::open_raw_icmp_socket()?;
        socket.set_read_timeout(Some(self.config.timeout))?;
        let dest = SockAddr::from(SocketAddr::new(IpAddr::V4(addr), 0));
        let identifier = (std::process::id() & 0xFFFF) as u16;
        info!(
            "Tracing route to {} ({}), TTL {}-{}",
            self.config.target, addr, self.config.ttl_start, self.config.ttl_max
        );

        let mut hops = Vec::new();
        for ttl in self.config.ttl_start..=self.config.ttl_max {
            net::set_ttl(&socket, ttl)?;
            let packet = icmp::build_echo_request(identifier, u16::from(ttl), &PROBE_PAYLOAD);
            let started = Instant::now();
            socket.send_to(&packet, &dest)?;

            match self.await_reply(&socket, started)? {
                Some((peer, rtt, message)) => {
                    let ip = peer.to_string();
                    let host = match self.reverse_lookup(peer).await {
                        Some(name) => name,
                        None => ip.clone(),
                    };
                    debug!(
                        "Hop {}: {} ({}) type {} in {} ms",
                        ttl, ip, host, message.icmp_type, rtt
                    );
                    let reached = message.icmp_type == icmp::ECHO_REPLY;
                    hops.push(Hop {
                        hop: ttl,
                        ip,
                        host,
                        rtt_ms: Some(rtt),
                        timed_out: false,
                        icmp_type: i32::from(message.icmp_type),
                    });
                    if reached {
                        info!("Destination reached at hop {}", ttl);
                        break;
                    }
                }
                None => {
                    debug!("Hop {}: no reply within {} ms", ttl, self.config.timeout.as_millis());
                    hops.push(Hop::unanswered(ttl));
                }
            }
        }
        Ok(hops)
    }

    /// Wait for one datagram on the raw socket, bounded by its read timeout.
    ///
    /// Returns `None` when the wait elapses or the reply is unusable; short
    /// or malformed datagrams count as no answer rather than aborting the
    /// run.
    fn await_reply(
        &self,
        socket: &Socket,
        started: Instant,
    ) -> Result<Option<(IpAddr, u64, IcmpMessage)>, NetprobeError> {
        let mut buf = [MaybeUninit::<u8>::uninit(); 512];
        loop {
            match socket.recv_from(&mut buf) {
                Ok((received, peer)) => {
                    let rtt = started.elapsed().as_millis() as u64;
                    let datagram =
                        unsafe { std::slice::from_raw_parts(buf.as_ptr().cast::<u8>(), received) };
                    let Some(peer_ip) = peer.as_socket().map(|s| s.ip()) else {
                        debug!("Discarding reply with non-inet source address");
                        return Ok(None);
                    };
                    return match icmp::parse_response(datagram) {
                        Ok(message) => Ok(Some((peer_ip, rtt, message))),
                        Err(e) => {
                            debug!("Discarding reply from {}: {}", peer_ip, e);
                            Ok(None)
                        }
                    };
                }
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    return Ok(None);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(NetprobeError::Os(e)),
            }
        }
    }

    /// Reverse DNS for a hop address, bounded by the probe timeout.
    async fn reverse_lookup(&self, ip: IpAddr) -> Option<String> {
        if !self.config.resolve_hostnames {
            return None;
        }
        let mut opts = ResolverOpts::default();
        opts.timeout = self.config.timeout;
        let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), opts);
        match tokio::time::timeout(self.config.timeout, resolver.reverse_lookup(ip)).await {
            Ok(Ok(response)) => response
                .iter()
                .next()
                .map(|name| name.to_string().trim_end_matches('.').to_string()),
            Ok(Err(e)) => {
                debug!("Reverse lookup failed for {}: {}", ip, e);
                None
            }
            Err(_) => {
                debug!("Reverse lookup timed out for {}", ip);
                None
            }
        }
    }
}

/// One-call trace entry point: parse the target, validate the TTL range,
/// probe hop by hop, and return the path.
pub async fn run_traceroute(
    target: &str,
    ttl_start: u8,
    ttl_max: u8,
    timeout_ms: u64,
) -> Result<Vec<Hop>, NetprobeError> {
    let config = TraceConfig {
        target: Target::parse(target)?,
        ttl_start,
        ttl_max,
        timeout: Duration::from_millis(timeout_ms),
        resolve_hostnames: true,
    };
    Tracer::new(config).trace().await
}
