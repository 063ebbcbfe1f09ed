//! Netlink message decoding for syscall tracers.
//!
//! This crate renders netlink messages captured from a traced process into
//! human-readable form. The traced process is stopped while its buffers are
//! decoded; everything is read through a [`ForeignMemory`] accessor and
//! written to a [`Renderer`], so the same decoders work on a live process,
//! a captured dump or a test fixture.
//!
//! The core is a generic attribute (TLV) walker with a pluggable
//! per-attribute-type registry. The socket diagnostics (`INET_DIAG`) family
//! is implemented on top of it, including the socket filter bytecode carried
//! in dump requests.
//!
//! # Features
//!
//! - `json` - JSON renderer backed by `serde_json`
//!
//! # Example
//!
//! ```ignore
//! use nltrace::netlink::{DecodeCtx, DecodeOptions, Direction, LocalMemory, decode_sock_diag};
//! use nltrace::output::{OutputOptions, TextRenderer};
//! use nltrace::util::ifname::NoIfNames;
//!
//! let mem = LocalMemory::new(0x1000, captured_bytes);
//! let mut out = TextRenderer::new(OutputOptions::default());
//! let opts = DecodeOptions::default();
//! let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &NoIfNames);
//!
//! decode_sock_diag(&mut ctx, 0x1000, mem.len(), Direction::Auto);
//! println!("{}", out.finish());
//! ```

pub mod fault;
pub mod netlink;
pub mod output;
pub mod sockdiag;
pub mod util;
pub mod xlat;

// Re-export common types at crate root for convenience
pub use netlink::{
    DecodeCtx, DecodeOptions, Error, ForeignMemory, LocalMemory, Result, decode_nlattr,
    decode_sock_diag,
};
pub use output::Renderer;
