//! Byte fixtures shared by the integration tests.
//!
//! Buffers are built the way the kernel lays them out: native-endian
//! headers, payloads padded to 4 bytes.

#![allow(dead_code)]

use nltrace::netlink::{
    DecodeCtx, DecodeOptions, Direction, LocalMemory, NlMsgHdr, Registry, decode_nlattr,
    decode_sock_diag,
};
use nltrace::output::TextRenderer;
use nltrace::util::StaticIfNames;

/// Base address every fixture is mapped at.
pub const BASE: u64 = 0x7f00_0000_1000;

fn pad4(buf: &mut Vec<u8>) {
    buf.resize((buf.len() + 3) & !3, 0);
}

/// One attribute record with its payload, padded.
pub fn nla(kind: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf = ((4 + payload.len()) as u16).to_ne_bytes().to_vec();
    buf.extend_from_slice(&kind.to_ne_bytes());
    buf.extend_from_slice(payload);
    pad4(&mut buf);
    buf
}

/// One netlink message with its payload, padded.
pub fn nlmsg(msg_type: u16, flags: u16, payload: &[u8]) -> Vec<u8> {
    let mut buf = NlMsgHdr::new(msg_type, flags, payload.len())
        .as_bytes()
        .to_vec();
    buf.extend_from_slice(payload);
    pad4(&mut buf);
    buf
}

/// Interface names known to the tests.
pub fn ifnames() -> StaticIfNames {
    StaticIfNames::new().with(1, "lo")
}

/// Render `len` bytes of attributes at `addr` in an arbitrary image.
pub fn render_attrs_in(mem: &LocalMemory, addr: u64, len: usize, registry: &Registry) -> String {
    let mut out = TextRenderer::default();
    let opts = DecodeOptions::default();
    let names = ifnames();
    let mut ctx = DecodeCtx::new(mem, &mut out, &opts, &names);
    decode_nlattr(&mut ctx, addr, len, registry);
    out.finish()
}

/// Render an attribute stream with default options.
pub fn render_attrs(data: &[u8], registry: &Registry) -> String {
    let mem = LocalMemory::new(BASE, data.to_vec());
    render_attrs_in(&mem, BASE, data.len(), registry)
}

/// Render a message buffer of `len` bytes, of which only `data` is mapped.
pub fn render_messages_with(
    data: &[u8],
    len: usize,
    opts: &DecodeOptions,
    direction: Direction,
) -> String {
    let mem = LocalMemory::new(BASE, data.to_vec());
    let mut out = TextRenderer::default();
    let names = ifnames();
    let mut ctx = DecodeCtx::new(&mem, &mut out, opts, &names);
    decode_sock_diag(&mut ctx, BASE, len, direction);
    out.finish()
}

/// Render a message buffer with default options.
pub fn render_messages(data: &[u8]) -> String {
    render_messages_with(data, data.len(), &DecodeOptions::default(), Direction::Auto)
}
