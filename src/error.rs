use thiserror::Error;

/// Errors produced by the probing engines and their socket plumbing.
#[derive(Error, Debug)]
pub enum NetprobeError {
    #[error("Failed to resolve {host}: {reason}")]
    Resolution { host: String, reason: String },

    #[error("Raw socket requires elevated privileges (root or CAP_NET_RAW): {0}")]
    PermissionDenied(std::io::Error),

    #[error("No response within {0} ms")]
    Timeout(u64),

    #[error("Connection refused by peer")]
    Refused,

    #[error("Truncated ICMP response: need {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Network error: {0}")]
    Os(#[from] std::io::Error),
}
