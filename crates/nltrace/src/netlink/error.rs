//! Error types for netlink decoding.

/// Result type for netlink decoding.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding netlink data.
///
/// None of these abort a trace session. Decoders recover from them locally
/// and surface them only as rendering artifacts (raw bytes, an address
/// placeholder, a "more data follows" marker). The variants exist so the
/// recovery decision is made on a typed value rather than a bare bool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// JSON serialization error.
    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fewer bytes than a header needs remain in the stream.
    #[error("message truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes the header needs.
        expected: usize,
        /// Bytes left in the stream.
        actual: usize,
    },

    /// Declared payload is shorter than the minimum for its type.
    #[error("{kind} payload too short: expected at least {expected} bytes, got {actual}")]
    PayloadTooShort {
        /// Name of the structure being decoded.
        kind: &'static str,
        /// Minimum size of the structure.
        expected: usize,
        /// Declared payload length.
        actual: usize,
    },

    /// Foreign memory could not be read.
    #[error("cannot read {len} bytes at {addr:#x}")]
    MemoryUnreadable {
        /// Start of the failed read.
        addr: u64,
        /// Length of the failed read.
        len: usize,
    },

    /// Attribute type has no registry entry.
    #[error("unknown attribute type {0}")]
    UnknownType(u16),

    /// Attribute type is known but has no decoder.
    #[error("attribute {0} is not implemented")]
    UnimplementedType(&'static str),

    /// Invalid input handed to a collaborator.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
