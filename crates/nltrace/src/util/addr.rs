//! Address formatting utilities.

use std::net::{Ipv4Addr, Ipv6Addr};

/// IPv4 address family.
pub const AF_INET: u8 = libc::AF_INET as u8;
/// IPv6 address family.
pub const AF_INET6: u8 = libc::AF_INET6 as u8;

/// Format an IPv4 address from bytes.
pub fn format_ipv4(bytes: &[u8]) -> Option<String> {
    if bytes.len() >= 4 {
        Some(Ipv4Addr::new(bytes[0], bytes[1], bytes[2], bytes[3]).to_string())
    } else {
        None
    }
}

/// Format an IPv6 address from bytes.
pub fn format_ipv6(bytes: &[u8]) -> Option<String> {
    if bytes.len() >= 16 {
        let octets: [u8; 16] = bytes[..16].try_into().ok()?;
        Some(Ipv6Addr::from(octets).to_string())
    } else {
        None
    }
}

/// Format an address of the given family.
///
/// Returns `None` for families other than `AF_INET`/`AF_INET6` and for
/// buffers too short to hold an address of the family.
pub fn format_inet(family: u8, bytes: &[u8]) -> Option<String> {
    match family {
        AF_INET => format_ipv4(bytes),
        AF_INET6 => format_ipv6(bytes),
        _ => None,
    }
}
