//! Netlink message header and message stream decoding.

use super::DecodeCtx;
use super::error::{Error, Result};
use crate::output::Value;
use crate::sockdiag;
use crate::xlat::tables::{NETLINK_FLAGS, NL_SOCK_DIAG_TYPES};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Netlink message header alignment.
pub const NLMSG_ALIGNTO: usize = 4;

/// Align a length to NLMSG_ALIGNTO boundary.
#[inline]
pub const fn nlmsg_align(len: usize) -> usize {
    (len + NLMSG_ALIGNTO - 1) & !(NLMSG_ALIGNTO - 1)
}

/// Size of the netlink message header.
pub const NLMSG_HDRLEN: usize = nlmsg_align(std::mem::size_of::<NlMsgHdr>());

/// Netlink message header (mirrors struct nlmsghdr).
#[repr(C)]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout,
)]
pub struct NlMsgHdr {
    /// Length of message including header.
    pub nlmsg_len: u32,
    /// Message type.
    pub nlmsg_type: u16,
    /// Additional flags.
    pub nlmsg_flags: u16,
    /// Sequence number.
    pub nlmsg_seq: u32,
    /// Sending process port ID.
    pub nlmsg_pid: u32,
}

impl NlMsgHdr {
    /// Create a header for a message with `payload_len` bytes of payload.
    pub fn new(msg_type: u16, flags: u16, payload_len: usize) -> Self {
        Self {
            nlmsg_len: (NLMSG_HDRLEN + payload_len) as u32,
            nlmsg_type: msg_type,
            nlmsg_flags: flags,
            nlmsg_seq: 0,
            nlmsg_pid: 0,
        }
    }

    /// Check if this message carries the request flag.
    pub fn is_request(&self) -> bool {
        self.nlmsg_flags & NLM_F_REQUEST != 0
    }

    /// Check if this is a netlink control message (`NLMSG_*`).
    pub fn is_control(&self) -> bool {
        self.nlmsg_type < NLMSG_MIN_TYPE
    }

    /// Convert header to bytes.
    pub fn as_bytes(&self) -> &[u8] {
        <Self as IntoBytes>::as_bytes(self)
    }

    /// Parse header from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::read_from_prefix(data)
            .map(|(r, _)| r)
            .map_err(|_| Error::Truncated {
                expected: NLMSG_HDRLEN,
                actual: data.len(),
            })
    }
}

/// Netlink message types.
pub struct NlMsgType;

impl NlMsgType {
    /// No operation, message must be discarded.
    pub const NOOP: u16 = 1;
    /// Error message or ACK.
    pub const ERROR: u16 = 2;
    /// End of multipart message.
    pub const DONE: u16 = 3;
    /// Data lost, request resend.
    pub const OVERRUN: u16 = 4;

    /// Legacy TCP socket query.
    pub const TCPDIAG_GETSOCK: u16 = 18;
    /// Legacy DCCP socket query.
    pub const DCCPDIAG_GETSOCK: u16 = 19;
    /// Per-family socket query.
    pub const SOCK_DIAG_BY_FAMILY: u16 = 20;
    /// Socket destruction request.
    pub const SOCK_DESTROY: u16 = 21;
}

/// Types below this are netlink control messages.
pub const NLMSG_MIN_TYPE: u16 = 0x10;

/// Netlink message flags.
pub const NLM_F_REQUEST: u16 = 0x01;
pub const NLM_F_MULTI: u16 = 0x02;
pub const NLM_F_ACK: u16 = 0x04;
pub const NLM_F_ECHO: u16 = 0x08;

// Modifiers to GET request
pub const NLM_F_ROOT: u16 = 0x100;
pub const NLM_F_MATCH: u16 = 0x200;
pub const NLM_F_DUMP: u16 = NLM_F_ROOT | NLM_F_MATCH;

/// Which side of the socket a buffer was captured on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Direction {
    /// Decide per message from `NLM_F_REQUEST`.
    #[default]
    Auto,
    /// Sent to the kernel.
    Request,
    /// Received from the kernel.
    Response,
}

impl Direction {
    fn is_request(self, hdr: &NlMsgHdr) -> bool {
        match self {
            Self::Auto => hdr.is_request(),
            Self::Request => true,
            Self::Response => false,
        }
    }
}

fn print_header(ctx: &mut DecodeCtx<'_>, hdr: &NlMsgHdr) {
    ctx.out.begin_struct();
    ctx.out.field("nlmsg_len", Value::U(hdr.nlmsg_len as u64));
    ctx.out.next();
    ctx.out.field("nlmsg_type", Value::Sym(&NL_SOCK_DIAG_TYPES, hdr.nlmsg_type as u64));
    ctx.out.next();
    ctx.out.field(
        "nlmsg_flags",
        Value::Flags {
            table: &NETLINK_FLAGS,
            value: hdr.nlmsg_flags as u64,
            verbose: false,
        },
    );
    ctx.out.next();
    ctx.out.field("nlmsg_seq", Value::U(hdr.nlmsg_seq as u64));
    ctx.out.next();
    ctx.out.field("nlmsg_pid", Value::U(hdr.nlmsg_pid as u64));
    ctx.out.end_struct();
}

fn decode_payload(
    ctx: &mut DecodeCtx<'_>,
    hdr: &NlMsgHdr,
    addr: u64,
    len: usize,
    direction: Direction,
) {
    if hdr.is_control() {
        tracing::trace!(nlmsg_type = hdr.nlmsg_type, "control message payload");
        ctx.print_raw(addr, len);
        return;
    }

    let Some(family) = ctx.fetch_or_addr(addr, 1).map(|b| b[0]) else {
        return;
    };

    if direction.is_request(hdr) {
        sockdiag::decode_request(ctx, hdr, family, addr, len);
    } else {
        sockdiag::decode_response(ctx, hdr, family, addr, len);
    }
}

fn print_message(
    ctx: &mut DecodeCtx<'_>,
    hdr: &NlMsgHdr,
    addr: u64,
    len: usize,
    direction: Direction,
) {
    let shown = (hdr.nlmsg_len as usize).min(len);

    ctx.out.begin_struct();
    print_header(ctx, hdr);
    if shown > NLMSG_HDRLEN {
        ctx.out.next();
        decode_payload(
            ctx,
            hdr,
            addr.saturating_add(NLMSG_HDRLEN as u64),
            shown - NLMSG_HDRLEN,
            direction,
        );
    }
    ctx.out.end_struct();
}

/// Decode and render a buffer of `NETLINK_SOCK_DIAG` messages.
///
/// Messages follow one another at 4-byte alignment. Several messages are
/// rendered as an array. A buffer shorter than a message header is shown
/// as raw bytes. In abbreviated mode at most `max_strlen` messages are
/// shown.
pub fn decode_sock_diag(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize, direction: Direction) {
    let mut cur = addr;
    let mut remaining = len;
    let mut in_array = false;
    let mut elt = 0usize;

    loop {
        if elt > 0 {
            ctx.out.next();
            if ctx.abbrev() && elt == ctx.opts.max_strlen {
                ctx.out.more_data();
                break;
            }
        }

        if remaining < NLMSG_HDRLEN {
            ctx.print_raw(cur, remaining);
            break;
        }

        let hdr = match ctx.fetch(cur, NLMSG_HDRLEN).and_then(|b| NlMsgHdr::from_bytes(&b)) {
            Ok(hdr) => hdr,
            Err(e) => {
                tracing::debug!(addr = cur, error = %e, "message header unreadable");
                if elt == 0 {
                    ctx.out.address(cur);
                } else {
                    ctx.out.more_data_at(cur);
                }
                break;
            }
        };

        let msg_len = hdr.nlmsg_len as usize;
        let advance = nlmsg_align(msg_len);
        let next = cur.checked_add(advance as u64);
        let has_next = msg_len >= NLMSG_HDRLEN && remaining > advance && next.is_some();
        if msg_len < NLMSG_HDRLEN {
            tracing::debug!(addr = cur, msg_len, "message shorter than its header");
        }

        if !in_array && elt == 0 && has_next {
            ctx.out.begin_array();
            in_array = true;
        }

        print_message(ctx, &hdr, cur, remaining, direction);
        elt += 1;

        match next {
            Some(next) if has_next => cur = next,
            _ => break,
        }
        remaining -= advance;
    }

    if in_array {
        ctx.out.end_array();
    }
}
