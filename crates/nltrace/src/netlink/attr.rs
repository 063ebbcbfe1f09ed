//! Netlink attribute (nlattr) header handling.

use std::ops::Range;

use super::error::{Error, Result};
use super::memory::{ForeignMemory, fetch_exact};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Netlink attribute alignment.
pub const NLA_ALIGNTO: usize = 4;

/// Align a length to NLA_ALIGNTO boundary.
#[inline]
pub const fn nla_align(len: usize) -> usize {
    (len + NLA_ALIGNTO - 1) & !(NLA_ALIGNTO - 1)
}

/// Size of the attribute header.
pub const NLA_HDRLEN: usize = nla_align(std::mem::size_of::<NlAttr>());

/// Netlink attribute header (mirrors struct nlattr).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct NlAttr {
    /// Length including header.
    pub nla_len: u16,
    /// Attribute type, possibly with flag bits.
    pub nla_type: u16,
}

/// Attribute type flags.
pub const NLA_F_NESTED: u16 = 1 << 15;
pub const NLA_F_NET_BYTEORDER: u16 = 1 << 14;
pub const NLA_TYPE_MASK: u16 = !(NLA_F_NESTED | NLA_F_NET_BYTEORDER);

impl NlAttr {
    /// Create an attribute header.
    pub fn new(attr_type: u16, data_len: usize) -> Self {
        Self {
            nla_len: (NLA_HDRLEN + data_len) as u16,
            nla_type: attr_type,
        }
    }

    /// Get the attribute type without flags.
    pub fn kind(&self) -> u16 {
        self.nla_type & NLA_TYPE_MASK
    }

    /// Get the declared payload length (total length minus header).
    pub fn payload_len(&self) -> usize {
        (self.nla_len as usize).saturating_sub(NLA_HDRLEN)
    }

    /// Check if the declared length can even hold the header.
    pub fn is_malformed(&self) -> bool {
        (self.nla_len as usize) < NLA_HDRLEN
    }

    /// Convert to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: NLA_HDRLEN,
                actual: data.len(),
            })
    }
}

/// A parsed attribute header and where its payload claims to live.
///
/// The payload range is what the header declares. It is not checked against
/// the end of the enclosing stream: "payload cut short" and "payload absent"
/// are rendered differently, so that decision belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrHeader {
    /// The raw header.
    pub attr: NlAttr,
    /// Address of the header itself.
    pub addr: u64,
    /// Declared payload range.
    pub payload: Range<u64>,
}

/// Parse the attribute header at `addr` with `remaining` bytes left in the stream.
pub fn parse_header(mem: &dyn ForeignMemory, addr: u64, remaining: usize) -> Result<AttrHeader> {
    if remaining < NLA_HDRLEN {
        return Err(Error::Truncated {
            expected: NLA_HDRLEN,
            actual: remaining,
        });
    }

    let bytes = fetch_exact(mem, addr, NLA_HDRLEN)?;
    let attr = NlAttr::from_bytes(&bytes)?;
    // Saturate so a header in the last bytes of the address space
    // yields a clamped payload range instead of wrapping.
    let start = addr.saturating_add(NLA_HDRLEN as u64);

    Ok(AttrHeader {
        attr,
        addr,
        payload: start..start.saturating_add(attr.payload_len() as u64),
    })
}
