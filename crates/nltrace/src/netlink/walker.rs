//! Attribute stream walking.
//!
//! [`AttrWalker`] is a single-pass iterator over the records of an attribute
//! stream in foreign memory. It never reads past the stream end and always
//! makes progress: every step either advances by at least one aligned
//! header or ends the walk, so a stream of `len` bytes yields at most
//! `len / 4 + 1` steps whatever its contents.
//!
//! [`decode_nlattr`] drives a walker and renders each record through a
//! [`Registry`]. Any byte range can be walked, including one carved out of
//! a payload that is itself being decoded.

use super::DecodeCtx;
use super::attr::{NLA_HDRLEN, NlAttr, nla_align, parse_header};
use super::memory::ForeignMemory;
use super::error::Error;
use super::registry::Registry;
use crate::output::Value;

/// One attribute record as found in the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrRecord {
    /// The header as declared.
    pub header: NlAttr,
    /// Address of the header.
    pub addr: u64,
    /// Address of the payload.
    pub payload_addr: u64,
    /// Payload length, clamped to the end of the stream.
    pub payload_len: usize,
    /// The declared length runs past the end of the stream.
    pub truncated: bool,
    /// Another record follows.
    pub has_next: bool,
}

/// A step of the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrStep {
    /// A record with a readable header.
    Attr(AttrRecord),
    /// Fewer bytes than a header remain. Ends the walk.
    Partial {
        /// Address of the leftover bytes.
        addr: u64,
        /// Number of leftover bytes.
        len: usize,
    },
    /// The next header could not be read. Ends the walk.
    Unreadable {
        /// Address of the header.
        addr: u64,
    },
}

/// Iterator over the records of an attribute stream.
pub struct AttrWalker<'m> {
    mem: &'m dyn ForeignMemory,
    addr: u64,
    remaining: usize,
    done: bool,
}

impl<'m> AttrWalker<'m> {
    /// Walk `len` bytes starting at `addr`.
    pub fn new(mem: &'m dyn ForeignMemory, addr: u64, len: usize) -> Self {
        Self {
            mem,
            addr,
            remaining: len,
            done: len == 0,
        }
    }
}

impl Iterator for AttrWalker<'_> {
    type Item = AttrStep;

    fn next(&mut self) -> Option<AttrStep> {
        if self.done {
            return None;
        }

        if self.remaining < NLA_HDRLEN {
            self.done = true;
            return Some(AttrStep::Partial {
                addr: self.addr,
                len: self.remaining,
            });
        }

        let hdr = match parse_header(self.mem, self.addr, self.remaining) {
            Ok(hdr) => hdr,
            Err(e) => {
                tracing::debug!(addr = self.addr, error = %e, "attribute header unreadable");
                self.done = true;
                return Some(AttrStep::Unreadable { addr: self.addr });
            }
        };

        let nla_len = hdr.attr.nla_len as usize;
        let shown_len = nla_len.min(self.remaining);
        let truncated = nla_len > self.remaining;
        let advance = nla_align(nla_len);
        // A record reaching the top of the address space is the last one.
        let next_addr = self.addr.checked_add(advance as u64);
        let has_next = !hdr.attr.is_malformed() && self.remaining > advance && next_addr.is_some();

        if hdr.attr.is_malformed() {
            tracing::debug!(addr = self.addr, nla_len, "attribute shorter than its header");
        } else if truncated {
            tracing::debug!(
                addr = self.addr,
                nla_len,
                remaining = self.remaining,
                "attribute runs past the end of the stream"
            );
        }

        let record = AttrRecord {
            header: hdr.attr,
            addr: self.addr,
            payload_addr: hdr.payload.start,
            payload_len: shown_len.saturating_sub(NLA_HDRLEN),
            truncated,
            has_next,
        };

        match next_addr {
            Some(next) if has_next => {
                self.addr = next;
                self.remaining -= advance;
            }
            _ => self.done = true,
        }

        Some(AttrStep::Attr(record))
    }
}

fn decode_payload(ctx: &mut DecodeCtx<'_>, rec: &AttrRecord, registry: &Registry) {
    let kind = rec.header.kind();
    match registry.decoder(kind) {
        Ok((name, decoder)) => {
            if !decoder(ctx, rec.payload_addr, rec.payload_len) {
                tracing::trace!(name, len = rec.payload_len, "payload too short to decode");
                ctx.print_raw(rec.payload_addr, rec.payload_len);
            }
        }
        Err(Error::UnimplementedType(name)) => ctx.out.unimplemented(name),
        Err(e) => {
            tracing::trace!(error = %e, "no registry entry");
            ctx.print_raw(rec.payload_addr, rec.payload_len);
        }
    }
}

fn print_record(ctx: &mut DecodeCtx<'_>, rec: &AttrRecord, registry: &Registry) {
    let with_payload = rec.payload_len > 0;
    if with_payload {
        ctx.out.begin_array();
    }

    ctx.out.begin_struct();
    ctx.out.field("nla_len", Value::U(rec.header.nla_len as u64));
    ctx.out.next();
    ctx.out.field("nla_type", Value::AttrType(registry.names, rec.header.nla_type));
    ctx.out.end_struct();

    if with_payload {
        ctx.out.next();
        decode_payload(ctx, rec, registry);
        ctx.out.end_array();
    }
}

/// Decode and render the attribute stream of `len` bytes at `addr`.
///
/// Several records are rendered as an array. A record whose declared
/// length runs past the stream end is decoded as far as the stream goes
/// and followed by a "more data" marker. In abbreviated mode at most
/// `max_strlen` records are shown.
pub fn decode_nlattr(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize, registry: &Registry) {
    let mem = ctx.mem;
    let mut in_array = false;

    for (elt, step) in AttrWalker::new(mem, addr, len).enumerate() {
        if elt > 0 {
            ctx.out.next();
            if ctx.abbrev() && elt == ctx.opts.max_strlen {
                ctx.out.more_data();
                break;
            }
        }

        match step {
            AttrStep::Attr(rec) => {
                if !in_array && (rec.has_next || rec.truncated) {
                    ctx.out.begin_array();
                    in_array = true;
                }
                print_record(ctx, &rec, registry);
                if rec.truncated {
                    ctx.out.next();
                    ctx.out.more_data();
                }
            }
            AttrStep::Partial { addr, len } => {
                if elt == 0 {
                    ctx.print_raw(addr, len);
                } else {
                    ctx.out.more_data();
                }
            }
            AttrStep::Unreadable { addr } => {
                if elt == 0 {
                    ctx.out.address(addr);
                } else {
                    ctx.out.more_data_at(addr);
                }
            }
        }
    }

    if in_array {
        ctx.out.end_array();
    }
}
