//! Shared utilities for nltrace.

pub mod addr;
pub mod hexdump;
pub mod ifname;

pub use addr::{format_inet, format_ipv4, format_ipv6};
pub use hexdump::{format_hex, parse_hex};
pub use ifname::{IfNameResolver, NoIfNames, StaticIfNames, SysfsIfNames};
