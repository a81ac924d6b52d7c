//! Privilege preflight for raw-socket operations.
//!
//! ICMP traceroute needs CAP_NET_RAW or an effective uid of 0. These checks
//! let the binary warn up front instead of failing on the first socket call;
//! they never escalate privileges themselves.

use log::debug;

/// Checks whether the effective uid is root.
///
/// Only meaningful on Unix like systems; elsewhere it returns false.
pub fn is_root() -> bool {
    #[cfg(target_family = "unix")]
    {
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(target_family = "unix"))]
    {
        false
    }
}

/// Checks whether the current binary carries the CAP_NET_RAW capability.
///
/// Shells out to `getcap` on the current executable. Only meaningful on
/// Unix like systems; elsewhere it returns false.
pub fn has_cap_net_raw() -> bool {
    #[cfg(target_family = "unix")]
    {
        let Ok(exe_path) = std::env::current_exe() else {
            return false;
        };
        match std::process::Command::new("getcap").arg(exe_path).output() {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).contains("cap_net_raw")
            }
            _ => false,
        }
    }

    #[cfg(not(target_family = "unix"))]
    {
        false
    }
}

/// Checks whether raw ICMP sockets can plausibly be opened.
pub fn has_raw_socket_privilege() -> bool {
    if is_root() {
        debug!("Running as root, raw sockets available");
        return true;
    }
    if has_cap_net_raw() {
        debug!("Binary carries CAP_NET_RAW");
        return true;
    }
    false
}
