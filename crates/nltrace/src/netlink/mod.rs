//! Netlink attribute stream decoding.
//!
//! This module holds the protocol-independent machinery: the attribute
//! header parser, the per-family attribute [`Registry`], the stream walker
//! and the primitive attribute decoders. Protocol families plug their
//! registries into [`decode_nlattr`].
//!
//! # Decoding an attribute stream
//!
//! ```
//! use nltrace::netlink::{DecodeCtx, DecodeOptions, LocalMemory, decode_nlattr};
//! use nltrace::output::{OutputOptions, TextRenderer};
//! use nltrace::sockdiag::INET_DIAG_MSG_ATTRS;
//! use nltrace::util::NoIfNames;
//!
//! let bytes = vec![
//!     0x08, 0x00, // len = 8
//!     0x0f, 0x00, // type = INET_DIAG_MARK
//!     0xca, 0xad, 0xdf, 0xab, // mark
//! ];
//! let mem = LocalMemory::new(0x1000, bytes);
//! let mut out = TextRenderer::new(OutputOptions::default());
//! let opts = DecodeOptions::default();
//! let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &NoIfNames);
//!
//! decode_nlattr(&mut ctx, 0x1000, 8, &INET_DIAG_MSG_ATTRS);
//! assert_eq!(
//!     out.as_str(),
//!     "[{nla_len=8, nla_type=INET_DIAG_MARK}, 2883562954]"
//! );
//! ```

pub mod attr;
mod error;
pub mod fields;
pub mod memory;
pub mod message;
pub mod nla;
pub mod registry;
pub mod walker;

pub use attr::{AttrHeader, NLA_HDRLEN, NlAttr, nla_align, parse_header};
pub use error::{Error, Result};
pub use fields::{FieldFmt, FieldSpec, print_fields};
pub use memory::{Fetch, ForeignMemory, LocalMemory, fetch_exact};
#[cfg(target_os = "linux")]
pub use memory::ProcessMemory;
pub use message::{Direction, NLMSG_HDRLEN, NlMsgHdr, decode_sock_diag};
pub use registry::{AttrDecoder, Dispatch, Entry, Registry};
pub use walker::{AttrRecord, AttrStep, AttrWalker, decode_nlattr};

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::output::Renderer;
use crate::util::ifname::IfNameResolver;

/// Default cap on strings, raw dumps and array elements.
pub const DEFAULT_MAX_STRLEN: usize = 32;

/// Decoding options.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Cap on printed string bytes, raw bytes and array elements.
    pub max_strlen: usize,
    /// Print everything, ignoring `max_strlen`.
    pub verbose: bool,
    /// Resolve interface indices to names.
    pub resolve_ifnames: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_strlen: DEFAULT_MAX_STRLEN,
            verbose: false,
            resolve_ifnames: true,
        }
    }
}

impl DecodeOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the abbreviation cap.
    pub fn max_strlen(mut self, max: usize) -> Self {
        self.max_strlen = max;
        self
    }

    /// Disable abbreviation.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable or disable interface name resolution.
    pub fn resolve_ifnames(mut self, resolve: bool) -> Self {
        self.resolve_ifnames = resolve;
        self
    }
}

/// Everything a decoder needs for one decode call.
pub struct DecodeCtx<'a> {
    /// Memory of the traced process.
    pub mem: &'a dyn ForeignMemory,
    /// Where decoded structure goes.
    pub out: &'a mut dyn Renderer,
    /// Decoding options.
    pub opts: &'a DecodeOptions,
    /// Interface name lookup.
    pub ifnames: &'a dyn IfNameResolver,
}

impl<'a> DecodeCtx<'a> {
    /// Create a decode context.
    pub fn new(
        mem: &'a dyn ForeignMemory,
        out: &'a mut dyn Renderer,
        opts: &'a DecodeOptions,
        ifnames: &'a dyn IfNameResolver,
    ) -> Self {
        Self {
            mem,
            out,
            opts,
            ifnames,
        }
    }

    /// Check if output is abbreviated.
    pub fn abbrev(&self) -> bool {
        !self.opts.verbose
    }

    /// Read exactly `len` bytes.
    pub fn fetch(&self, addr: u64, len: usize) -> Result<Vec<u8>> {
        fetch_exact(self.mem, addr, len)
    }

    /// Read exactly `len` bytes, rendering the address if that fails.
    pub fn fetch_or_addr(&mut self, addr: u64, len: usize) -> Option<Vec<u8>> {
        match self.fetch(addr, len) {
            Ok(bytes) => Some(bytes),
            Err(_) => {
                self.out.address(addr);
                None
            }
        }
    }

    /// Read a whole structure, rendering the address if that fails.
    pub fn fetch_obj<T: FromBytes>(&mut self, addr: u64) -> Option<T> {
        let bytes = self.fetch_or_addr(addr, std::mem::size_of::<T>())?;
        T::read_from_bytes(&bytes).ok()
    }

    /// Read the first `min(len, size_of::<T>())` bytes of a structure.
    ///
    /// Bytes past `len` are zero. Callers must only show fields that fit in
    /// `len`.
    pub fn fetch_prefix<T>(&mut self, addr: u64, len: usize) -> Option<T>
    where
        T: FromBytes + IntoBytes + Immutable + KnownLayout,
    {
        let size = std::mem::size_of::<T>();
        let bytes = self.fetch_or_addr(addr, len.min(size))?;
        let mut buf = vec![0u8; size];
        buf[..bytes.len()].copy_from_slice(&bytes);
        T::read_from_bytes(&buf).ok()
    }

    /// Render `len` bytes at `addr` as an opaque hex string.
    pub fn print_raw(&mut self, addr: u64, len: usize) {
        let shown = if self.abbrev() {
            len.min(self.opts.max_strlen)
        } else {
            len
        };
        match self.fetch(addr, shown) {
            Ok(bytes) => self.out.raw(&bytes, shown < len),
            Err(_) => self.out.address(addr),
        }
    }

    /// Name of an interface, if resolution is enabled and it is known.
    pub fn ifname(&self, index: u32) -> Option<String> {
        if self.opts.resolve_ifnames {
            self.ifnames.name(index)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{OutputOptions, TextRenderer};
    use crate::util::ifname::{NoIfNames, StaticIfNames};

    #[test]
    fn test_options_builder() {
        let opts = DecodeOptions::new()
            .max_strlen(4)
            .verbose(true)
            .resolve_ifnames(false);
        assert_eq!(opts.max_strlen, 4);
        assert!(opts.verbose);
        assert!(!opts.resolve_ifnames);
    }

    #[test]
    fn test_print_raw_abbreviated() {
        let mem = LocalMemory::new(0x1000, (0u8..8).collect::<Vec<_>>());
        let mut out = TextRenderer::new(OutputOptions::default());
        let opts = DecodeOptions::new().max_strlen(2);
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &NoIfNames);

        ctx.print_raw(0x1000, 8);
        assert_eq!(out.as_str(), "\"\\x00\\x01\"...");
    }

    #[test]
    fn test_print_raw_verbose() {
        let mem = LocalMemory::new(0x1000, vec![1, 2, 3]);
        let mut out = TextRenderer::new(OutputOptions::default());
        let opts = DecodeOptions::new().max_strlen(2).verbose(true);
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &NoIfNames);

        ctx.print_raw(0x1000, 3);
        assert_eq!(out.as_str(), "\"\\x01\\x02\\x03\"");
    }

    #[test]
    fn test_print_raw_unreadable() {
        let mem = LocalMemory::new(0x1000, vec![1, 2, 3]);
        let mut out = TextRenderer::new(OutputOptions::default());
        let opts = DecodeOptions::default();
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &NoIfNames);

        ctx.print_raw(0x2000, 3);
        assert_eq!(out.as_str(), "0x2000");
    }

    #[test]
    fn test_fetch_prefix_zero_fills() {
        #[repr(C)]
        #[derive(Debug, FromBytes, IntoBytes, Immutable, KnownLayout)]
        struct Pair {
            a: u32,
            b: u32,
        }

        let mem = LocalMemory::new(0x1000, 7u32.to_ne_bytes().to_vec());
        let mut out = TextRenderer::new(OutputOptions::default());
        let opts = DecodeOptions::default();
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &NoIfNames);

        let pair: Pair = ctx.fetch_prefix(0x1000, 4).unwrap();
        assert_eq!((pair.a, pair.b), (7, 0));
        assert!(ctx.fetch_prefix::<Pair>(0x1004, 4).is_none());
        assert_eq!(out.as_str(), "0x1004");
    }

    #[test]
    fn test_ifname_resolution_toggle() {
        let mem = LocalMemory::default();
        let mut out = TextRenderer::default();
        let names = StaticIfNames::new().with(1, "lo");
        let opts = DecodeOptions::default();
        let ctx = DecodeCtx::new(&mem, &mut out, &opts, &names);
        assert_eq!(ctx.ifname(1).as_deref(), Some("lo"));

        let opts = DecodeOptions::default().resolve_ifnames(false);
        let ctx = DecodeCtx::new(&mem, &mut out, &opts, &names);
        assert_eq!(ctx.ifname(1), None);
    }
}
