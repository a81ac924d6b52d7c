//! Low-level probe plumbing shared by the scanner and the tracer: target
//! resolution, deadline-bounded TCP connects, TTL control, and raw ICMP
//! socket allocation.

use crate::error::NetprobeError;
use log::debug;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};
use tokio::net::lookup_host;

/// A scan or trace target as given on the command line: either an address
/// literal or a hostname still to be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Ip(IpAddr),
    Domain(String),
}

impl Target {
    /// Classify a target string without touching the resolver.
    pub fn parse(raw: &str) -> Result<Self, NetprobeError> {
        if raw.is_empty() {
            return Err(NetprobeError::Resolution {
                host: raw.to_string(),
                reason: "target is empty".to_string(),
            });
        }
        match raw.parse::<IpAddr>() {
            Ok(ip) => Ok(Target::Ip(ip)),
            Err(_) => Ok(Target::Domain(raw.to_string())),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Ip(ip) => write!(f, "{}", ip),
            Target::Domain(domain) => write!(f, "{}", domain),
        }
    }
}

/// Resolve a target to its first IPv4 address.
///
/// Hostname resolution keeps the resolver's candidate order and takes the
/// first IPv4 entry. IPv6 literals and IPv6-only names fail with
/// [`NetprobeError::Resolution`]; probing is IPv4-only.
pub async fn resolve(target: &Target) -> Result<Ipv4Addr, NetprobeError> {
    match target {
        Target::Ip(IpAddr::V4(ip)) => Ok(*ip),
        Target::Ip(IpAddr::V6(ip)) => Err(NetprobeError::Resolution {
            host: ip.to_string(),
            reason: "IPv6 targets are not supported".to_string(),
        }),
        Target::Domain(domain) => {
            let addrs = lookup_host((domain.as_str(), 0))
                .await
                .map_err(|e| NetprobeError::Resolution {
                    host: domain.clone(),
                    reason: e.to_string(),
                })?;
            let ip = addrs
                .into_iter()
                .find_map(|addr| match addr.ip() {
                    IpAddr::V4(ip) => Some(ip),
                    IpAddr::V6(_) => None,
                })
                .ok_or_else(|| NetprobeError::Resolution {
                    host: domain.clone(),
                    reason: "no IPv4 addresses found".to_string(),
                })?;
            debug!("Resolved {} to {}", domain, ip);
            Ok(ip)
        }
    }
}

/// TCP connect with an explicit deadline, reporting why it failed.
///
/// The socket is switched to non-blocking, the connect is issued, and the
/// call waits up to `timeout` for the socket to become writable. Writability
/// alone is not trusted: a failed handshake also wakes the poller, so the
/// pending `SO_ERROR` is read back before the connect is declared good.
/// Every failure path drops the socket, releasing its descriptor.
pub fn timed_connect(addr: SocketAddr, timeout: Duration) -> Result<Socket, NetprobeError> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_nonblocking(true)?;
    match socket.connect(&SockAddr::from(addr)) {
        Ok(()) => return Ok(socket),
        Err(e) if e.raw_os_error() == Some(libc::EINPROGRESS) => {}
        Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
        Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
            return Err(NetprobeError::Refused)
        }
        Err(e) => return Err(NetprobeError::Os(e)),
    }
    if !wait_writable(&socket, timeout)? {
        return Err(NetprobeError::Timeout(timeout.as_millis() as u64));
    }
    match socket.take_error()? {
        None => Ok(socket),
        Some(e) if e.kind() == io::ErrorKind::ConnectionRefused => Err(NetprobeError::Refused),
        Some(e) => Err(NetprobeError::Os(e)),
    }
}

/// Poll a socket for writability until the deadline passes.
fn wait_writable(socket: &Socket, timeout: Duration) -> Result<bool, NetprobeError> {
    let deadline = Instant::now() + timeout;
    let mut pollfd = libc::pollfd {
        fd: socket.as_raw_fd(),
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let timeout_ms = remaining.as_millis().min(i32::MAX as u128) as libc::c_int;
        let rc = unsafe { libc::poll(&mut pollfd, 1, timeout_ms) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            return Err(NetprobeError::Os(err));
        }
        return Ok(rc > 0);
    }
}

/// Set the IPv4 TTL for packets sent on a socket.
pub fn set_ttl(socket: &Socket, ttl: u8) -> Result<(), NetprobeError> {
    socket.set_ttl(u32::from(ttl))?;
    Ok(())
}

/// Allocate a raw IPv4 ICMP socket.
///
/// Raw sockets are privilege-gated, so a kernel refusal surfaces as
/// [`NetprobeError::PermissionDenied`] and stays distinguishable from other
/// socket failures.
pub fn open_raw_icmp_socket() -> Result<Socket, NetprobeError> {
    match Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4)) {
        Ok(socket) => Ok(socket),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(NetprobeError::PermissionDenied(e))
        }
        Err(e) => Err(NetprobeError::Os(e)),
    }
}
