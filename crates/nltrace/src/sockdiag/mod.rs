//! Socket diagnostics (`NETLINK_SOCK_DIAG`) decoders.
//!
//! The `INET_DIAG` family is decoded in full: request headers (legacy and
//! v2) with the socket filter bytecode they may carry, and response
//! headers with their attributes. Other families show the family and the
//! rest of the payload as raw bytes.
//!
//! # Registries
//!
//! [`INET_DIAG_MSG_ATTRS`] and [`INET_DIAG_REQ_ATTRS`] can be handed to
//! [`decode_nlattr`](crate::netlink::decode_nlattr) directly, for example to
//! decode an attribute stream captured on its own.

pub mod bytecode;
pub mod cong;
pub mod inet;
pub mod md5sig;
pub mod meminfo;
pub mod types;

pub use inet::{decode_inet_diag_msg, decode_inet_diag_req_compat, decode_inet_diag_req_v2};
pub use types::{
    InetDiagBcOp, InetDiagHostcond, InetDiagMarkcond, InetDiagMeminfo, InetDiagMsg, InetDiagReq,
    InetDiagReqV2, InetDiagSockId, TcpBbrInfo, TcpDctcpInfo, TcpDiagMd5sig, TcpVegasInfo,
};

use crate::netlink::message::NlMsgType;
use crate::netlink::nla::{
    FlagsOpts, decode_nla_flags, decode_nla_str, decode_nla_u8, decode_nla_u32, decode_nla_u64,
};
use crate::netlink::{DecodeCtx, Entry, NlMsgHdr, Registry};
use crate::output::Value;
use crate::util::addr::{AF_INET, AF_INET6};
use crate::xlat::tables::{
    ADDRFAMS, INET_DIAG_ATTRS, INET_DIAG_REQ_ATTRS as REQ_ATTR_NAMES, INET_DIAG_SHUTDOWN_FLAGS,
};

const SHUTDOWN_FLAGS: FlagsOpts = FlagsOpts {
    table: &INET_DIAG_SHUTDOWN_FLAGS,
    size: 1,
    verbose: true,
};

/// Decode `INET_DIAG_SHUTDOWN`. The flag names are not part of the kernel
/// ABI headers, so the number is always shown next to them.
fn decode_diag_shutdown(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) -> bool {
    decode_nla_flags(ctx, addr, len, &SHUTDOWN_FLAGS)
}

/// Attributes of an INET_DIAG response, indexed by `INET_DIAG_*`.
pub static INET_DIAG_MSG_ATTRS: Registry = Registry {
    names: &INET_DIAG_ATTRS,
    entries: &[
        None,                                                        // NONE
        Some(Entry::Decoder(meminfo::decode_inet_diag_meminfo)),     // MEMINFO
        Some(Entry::Unimplemented),                                  // INFO
        Some(Entry::Decoder(cong::decode_tcpvegas_info)),            // VEGASINFO
        Some(Entry::Decoder(decode_nla_str)),                        // CONG
        Some(Entry::Decoder(decode_nla_u8)),                         // TOS
        Some(Entry::Decoder(decode_nla_u8)),                         // TCLASS
        Some(Entry::Decoder(meminfo::decode_nla_meminfo)),           // SKMEMINFO
        Some(Entry::Decoder(decode_diag_shutdown)),                  // SHUTDOWN
        Some(Entry::Decoder(cong::decode_tcp_dctcp_info)),           // DCTCPINFO
        Some(Entry::Decoder(decode_nla_u8)),                         // PROTOCOL
        Some(Entry::Decoder(decode_nla_u8)),                         // SKV6ONLY
        Some(Entry::Unimplemented),                                  // LOCALS
        Some(Entry::Unimplemented),                                  // PEERS
        Some(Entry::Unimplemented),                                  // PAD
        Some(Entry::Decoder(decode_nla_u32)),                        // MARK
        Some(Entry::Decoder(cong::decode_tcp_bbr_info)),             // BBRINFO
        Some(Entry::Decoder(decode_nla_u32)),                        // CLASS_ID
        Some(Entry::Decoder(md5sig::decode_tcp_md5sig)),             // MD5SIG
        Some(Entry::Unimplemented),                                  // ULP_INFO
        None,                                                        // SK_BPF_STORAGES
        Some(Entry::Decoder(decode_nla_u64)),                        // CGROUP_ID
    ],
};

/// Attributes of an INET_DIAG request, indexed by `INET_DIAG_REQ_*`.
pub static INET_DIAG_REQ_ATTRS: Registry = Registry {
    names: &REQ_ATTR_NAMES,
    entries: &[
        None,                                                        // NONE
        Some(Entry::Decoder(bytecode::decode_inet_diag_bc_op)),      // BYTECODE
        None,                                                        // SK_BPF_STORAGES
        Some(Entry::Decoder(decode_nla_u32)),                        // PROTOCOL
    ],
};

/// Render a payload of a family without a decoder.
fn decode_family(ctx: &mut DecodeCtx<'_>, family: u8, addr: u64, len: usize) {
    ctx.out.begin_struct();
    ctx.out.field("family", Value::Sym(&ADDRFAMS, family as u64));
    if len > 1 {
        ctx.out.next();
        ctx.print_raw(addr + 1, len - 1);
    }
    ctx.out.end_struct();
}

fn is_inet(family: u8) -> bool {
    family == AF_INET || family == AF_INET6
}

/// Decode the payload of a request sent to the kernel.
///
/// `family` is the first payload byte, already read.
pub fn decode_request(ctx: &mut DecodeCtx<'_>, hdr: &NlMsgHdr, family: u8, addr: u64, len: usize) {
    if !is_inet(family) || len <= 1 {
        tracing::trace!(family, "no request decoder for family");
        decode_family(ctx, family, addr, len);
        return;
    }
    match hdr.nlmsg_type {
        NlMsgType::TCPDIAG_GETSOCK | NlMsgType::DCCPDIAG_GETSOCK => {
            decode_inet_diag_req_compat(ctx, family, addr, len)
        }
        _ => decode_inet_diag_req_v2(ctx, family, addr, len),
    }
}

/// Decode the payload of a response received from the kernel.
///
/// `family` is the first payload byte, already read.
pub fn decode_response(
    ctx: &mut DecodeCtx<'_>,
    _hdr: &NlMsgHdr,
    family: u8,
    addr: u64,
    len: usize,
) {
    if !is_inet(family) || len <= 1 {
        tracing::trace!(family, "no response decoder for family");
        decode_family(ctx, family, addr, len);
        return;
    }
    decode_inet_diag_msg(ctx, family, addr, len);
}
