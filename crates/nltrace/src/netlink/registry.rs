//! Per-family attribute type registries.
//!
//! A registry maps an attribute type to what should be done with its
//! payload. The distinction between "no entry" and "entry without decoder"
//! is deliberate and visible in the output: unknown types are dumped as
//! raw bytes, known but undecoded types get an explicit marker.

use super::DecodeCtx;
use super::error::{Error, Result};
use crate::xlat::Xlat;

/// An attribute payload decoder.
///
/// Called with the payload address and its length, already clamped to the
/// enclosing stream. Returns `false` when the payload is too short to
/// attempt decoding; the caller then dumps it raw. Anything rendered so far
/// must be nothing in that case.
pub type AttrDecoder = fn(&mut DecodeCtx<'_>, u64, usize) -> bool;

/// A registry slot for a known attribute type.
#[derive(Clone, Copy)]
pub enum Entry {
    /// Known type whose payload is not decoded.
    Unimplemented,
    /// Known type with a decoder.
    Decoder(AttrDecoder),
}

/// Result of looking up an attribute type.
#[derive(Clone, Copy)]
pub enum Dispatch {
    /// No entry: render the payload as opaque bytes.
    Unknown,
    /// Entry without decoder: render an unimplemented marker.
    Unimplemented(&'static str),
    /// Entry with a decoder.
    Decoder(&'static str, AttrDecoder),
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Unimplemented(name) => write!(f, "Unimplemented({})", name),
            Self::Decoder(name, _) => write!(f, "Decoder({})", name),
        }
    }
}

/// Attribute names and payload decoders of one protocol family.
pub struct Registry {
    /// Attribute type names.
    pub names: &'static Xlat,
    /// Slots indexed by attribute type. Types past the end have no entry.
    pub entries: &'static [Option<Entry>],
}

impl Registry {
    /// Look up an attribute type (flag bits already masked off).
    pub fn lookup(&self, kind: u16) -> Dispatch {
        let Some(Some(entry)) = self.entries.get(kind as usize) else {
            return Dispatch::Unknown;
        };
        let name = self.names.lookup(kind as u64).unwrap_or(self.names.dflt);
        match entry {
            Entry::Unimplemented => Dispatch::Unimplemented(name),
            Entry::Decoder(decoder) => Dispatch::Decoder(name, *decoder),
        }
    }

    /// Look up the decoder of an attribute type.
    ///
    /// Fails with [`Error::UnknownType`] or [`Error::UnimplementedType`]
    /// when there is none.
    pub fn decoder(&self, kind: u16) -> Result<(&'static str, AttrDecoder)> {
        match self.lookup(kind) {
            Dispatch::Unknown => Err(Error::UnknownType(kind)),
            Dispatch::Unimplemented(name) => Err(Error::UnimplementedType(name)),
            Dispatch::Decoder(name, decoder) => Ok((name, decoder)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlat::NumFmt;

    static NAMES: Xlat = Xlat {
        dflt: "T_???",
        fmt: NumFmt::Hex,
        entries: &[(0, "T_NONE"), (1, "T_ONE"), (2, "T_TWO")],
    };

    fn accept(_: &mut DecodeCtx<'_>, _: u64, _: usize) -> bool {
        true
    }

    static REGISTRY: Registry = Registry {
        names: &NAMES,
        entries: &[None, Some(Entry::Decoder(accept)), Some(Entry::Unimplemented)],
    };

    #[test]
    fn test_three_way_lookup() {
        assert!(matches!(REGISTRY.lookup(0), Dispatch::Unknown));
        assert!(matches!(REGISTRY.lookup(1), Dispatch::Decoder("T_ONE", _)));
        assert!(matches!(REGISTRY.lookup(2), Dispatch::Unimplemented("T_TWO")));
        assert!(matches!(REGISTRY.lookup(3), Dispatch::Unknown));
        assert!(matches!(REGISTRY.lookup(0x3fff), Dispatch::Unknown));
    }

    #[test]
    fn test_decoder_errors() {
        assert!(matches!(REGISTRY.decoder(1), Ok(("T_ONE", _))));
        assert!(matches!(REGISTRY.decoder(0), Err(Error::UnknownType(0))));
        assert!(matches!(
            REGISTRY.decoder(2),
            Err(Error::UnimplementedType("T_TWO"))
        ));
    }

    #[test]
    fn test_debug_names_entry() {
        assert_eq!(format!("{:?}", REGISTRY.lookup(1)), "Decoder(T_ONE)");
        assert_eq!(format!("{:?}", REGISTRY.lookup(9)), "Unknown");
    }
}
