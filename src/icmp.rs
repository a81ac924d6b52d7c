//! ICMP wire codec: RFC 1071 checksums, echo-request construction, and
//! response parsing.
//!
//! The codec is deliberately free of socket code. Everything here is a pure
//! function over byte slices so the packet layout can be tested without
//! privileges or a network.

use crate::error::NetprobeError;
use byteorder::{ByteOrder, NetworkEndian};

/// ICMP echo reply type.
pub const ECHO_REPLY: u8 = 0;
/// ICMP destination unreachable type.
pub const DEST_UNREACHABLE: u8 = 3;
/// ICMP echo request type.
pub const ECHO_REQUEST: u8 = 8;
/// ICMP time exceeded type, sent by routers when the TTL hits zero.
pub const TIME_EXCEEDED: u8 = 11;

/// Length of the fixed ICMP echo header: type, code, checksum, identifier,
/// sequence number.
pub const HEADER_LEN: usize = 8;

/// Smallest legal IPv4 header (IHL of 5 words).
const MIN_IP_HEADER_LEN: usize = 20;

/// Type and code lifted out of a received ICMP datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcmpMessage {
    pub icmp_type: u8,
    pub icmp_code: u8,
}

/// RFC 1071 internet checksum over `data`.
///
/// The buffer is folded as big-endian 16-bit words; an odd trailing byte is
/// padded with a zero low byte. Carries are folded back until the sum fits in
/// 16 bits, and the one's complement of the result is returned. A datagram
/// whose checksum field is already correct sums to zero.
pub fn checksum(data: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut words = data.chunks_exact(2);
    for word in words.by_ref() {
        sum = sum.wrapping_add(u32::from(NetworkEndian::read_u16(word)));
    }
    if let Some(&odd) = words.remainder().first() {
        sum = sum.wrapping_add(u32::from(odd) << 8);
    }
    while sum >> 16 != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !(sum as u16)
}

/// Build an ICMP echo request with the given identifier, sequence number,
/// and payload.
///
/// The checksum is computed over the full packet with the checksum field
/// zeroed, then written back in network byte order. Same inputs, same bytes:
/// the function touches no clocks and no sockets.
pub fn build_echo_request(identifier: u16, sequence: u16, payload: &[u8]) -> Vec<u8> {
    let mut packet = vec![0u8; HEADER_LEN + payload.len()];
    packet[0] = ECHO_REQUEST;
    packet[1] = 0;
    NetworkEndian::write_u16(&mut packet[4..6], identifier);
    NetworkEndian::write_u16(&mut packet[6..8], sequence);
    packet[HEADER_LEN..].copy_from_slice(payload);
    let sum = checksum(&packet);
    NetworkEndian::write_u16(&mut packet[2..4], sum);
    packet
}

/// Parse a raw-socket datagram that still carries its IPv4 header.
///
/// The IP header length comes from the IHL field (low nibble of the first
/// byte, in 32-bit words), and the ICMP type and code sit immediately after
/// it. Fails with [`NetprobeError::Truncated`] when the buffer cannot hold a
/// minimal IPv4 header, when the IHL field claims less than one, or when the
/// ICMP header behind it is cut short.
pub fn parse_response(buffer: &[u8]) -> Result<IcmpMessage, NetprobeError> {
    if buffer.len() < MIN_IP_HEADER_LEN {
        return Err(NetprobeError::Truncated {
            expected: MIN_IP_HEADER_LEN + HEADER_LEN,
            actual: buffer.len(),
        });
    }
    let header_len = usize::from(buffer[0] & 0x0F) * 4;
    let expected = header_len.max(MIN_IP_HEADER_LEN) + HEADER_LEN;
    if header_len < MIN_IP_HEADER_LEN || buffer.len() < expected {
        return Err(NetprobeError::Truncated {
            expected,
            actual: buffer.len(),
        });
    }
    Ok(IcmpMessage {
        icmp_type: buffer[header_len],
        icmp_code: buffer[header_len + 1],
    })
}
