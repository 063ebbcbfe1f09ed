//! Fixed headers of INET_DIAG requests and responses.
//!
//! Every header starts with the address family, which the message layer
//! has already read. The family is printed first; the rest of the header is
//! shown only when the payload holds all of it, and the attribute stream
//! after the aligned header is decoded only in that case.

use zerocopy::{FromBytes, Immutable, KnownLayout};

use super::types::{InetDiagMsg, InetDiagReq, InetDiagReqV2, InetDiagSockId};
use super::{INET_DIAG_MSG_ATTRS, INET_DIAG_REQ_ATTRS};
use crate::netlink::message::nlmsg_align;
use crate::netlink::{DecodeCtx, Registry, decode_nlattr};
use crate::output::Value;
use crate::xlat::Xlat;
use crate::xlat::tables::{
    ADDRFAMS, INET_DIAG_EXTENDED_FLAGS, INET_PROTOCOLS, TCP_STATE_FLAGS, TCP_STATES,
};

/// Render a socket identity. Addresses are interpreted per `family`.
pub fn print_sockid(ctx: &mut DecodeCtx<'_>, id: &InetDiagSockId, family: u8) {
    let out = &mut *ctx.out;
    out.begin_struct();
    out.field("idiag_sport", Value::NetPort(id.sport()));
    out.next();
    out.field("idiag_dport", Value::NetPort(id.dport()));
    out.next();
    out.field(
        "idiag_src",
        Value::InetAddr {
            family,
            bytes: &id.idiag_src,
        },
    );
    out.next();
    out.field(
        "idiag_dst",
        Value::InetAddr {
            family,
            bytes: &id.idiag_dst,
        },
    );
    out.next();

    let name = ctx.ifname(id.idiag_if);
    ctx.out.field("idiag_if", Value::IfIndex(id.idiag_if, name.as_deref()));
    ctx.out.next();
    ctx.out.field("idiag_cookie", Value::Cookie(id.idiag_cookie));
    ctx.out.end_struct();
}

fn flags(table: &'static Xlat, value: u64) -> Value<'static> {
    Value::Flags {
        table,
        value,
        verbose: false,
    }
}

/// Decode a header of type `T` whose first byte is the family, then the
/// attributes that follow it.
fn decode_header<T, F>(
    ctx: &mut DecodeCtx<'_>,
    family_field: &str,
    family: u8,
    addr: u64,
    len: usize,
    registry: &Registry,
    print_rest: F,
) where
    T: FromBytes + KnownLayout + Immutable,
    F: FnOnce(&mut DecodeCtx<'_>, &T),
{
    let size = std::mem::size_of::<T>();
    let mut decoded = false;

    ctx.out.begin_struct();
    ctx.out.field(family_field, Value::Sym(&ADDRFAMS, family as u64));
    ctx.out.next();

    if len >= size {
        if let Some(rest) = ctx.fetch_or_addr(addr + 1, size - 1) {
            let mut bytes = Vec::with_capacity(size);
            bytes.push(family);
            bytes.extend_from_slice(&rest);
            if let Ok(hdr) = T::read_from_bytes(&bytes) {
                print_rest(ctx, &hdr);
                decoded = true;
            }
        }
    } else {
        tracing::trace!(len, size, "header shorter than its structure");
        ctx.out.more_data();
    }
    ctx.out.end_struct();

    let offset = nlmsg_align(size);
    if decoded && len > offset {
        ctx.out.next();
        decode_nlattr(ctx, addr + offset as u64, len - offset, registry);
    }
}

/// Decode a legacy `inet_diag_req` request.
pub fn decode_inet_diag_req_compat(ctx: &mut DecodeCtx<'_>, family: u8, addr: u64, len: usize) {
    decode_header::<InetDiagReq, _>(
        ctx,
        "idiag_family",
        family,
        addr,
        len,
        &INET_DIAG_REQ_ATTRS,
        |ctx, req| {
            ctx.out.field("idiag_src_len", Value::U(req.idiag_src_len as u64));
            ctx.out.next();
            ctx.out.field("idiag_dst_len", Value::U(req.idiag_dst_len as u64));
            ctx.out.next();
            ctx.out.field("idiag_ext", flags(&INET_DIAG_EXTENDED_FLAGS, req.idiag_ext as u64));
            ctx.out.next();
            ctx.out.field_name("id");
            print_sockid(ctx, &req.id, req.idiag_family);
            ctx.out.next();
            ctx.out.field("idiag_states", flags(&TCP_STATE_FLAGS, req.idiag_states as u64));
            ctx.out.next();
            ctx.out.field("idiag_dbs", Value::U(req.idiag_dbs as u64));
        },
    );
}

/// Decode an `inet_diag_req_v2` request.
pub fn decode_inet_diag_req_v2(ctx: &mut DecodeCtx<'_>, family: u8, addr: u64, len: usize) {
    decode_header::<InetDiagReqV2, _>(
        ctx,
        "sdiag_family",
        family,
        addr,
        len,
        &INET_DIAG_REQ_ATTRS,
        |ctx, req| {
            ctx.out.field("sdiag_protocol", Value::Sym(&INET_PROTOCOLS, req.sdiag_protocol as u64));
            ctx.out.next();
            ctx.out.field("idiag_ext", flags(&INET_DIAG_EXTENDED_FLAGS, req.idiag_ext as u64));
            ctx.out.next();
            ctx.out.field("idiag_states", flags(&TCP_STATE_FLAGS, req.idiag_states as u64));
            ctx.out.next();
            ctx.out.field_name("id");
            print_sockid(ctx, &req.id, req.sdiag_family);
        },
    );
}

/// Decode an `inet_diag_msg` response.
pub fn decode_inet_diag_msg(ctx: &mut DecodeCtx<'_>, family: u8, addr: u64, len: usize) {
    decode_header::<InetDiagMsg, _>(
        ctx,
        "idiag_family",
        family,
        addr,
        len,
        &INET_DIAG_MSG_ATTRS,
        |ctx, msg| {
            ctx.out.field("idiag_state", Value::Sym(&TCP_STATES, msg.idiag_state as u64));
            ctx.out.next();
            ctx.out.field("idiag_timer", Value::U(msg.idiag_timer as u64));
            ctx.out.next();
            ctx.out.field("idiag_retrans", Value::U(msg.idiag_retrans as u64));
            ctx.out.next();
            ctx.out.field_name("id");
            print_sockid(ctx, &msg.id, msg.idiag_family);
            ctx.out.next();
            ctx.out.field("idiag_expires", Value::U(msg.idiag_expires as u64));
            ctx.out.next();
            ctx.out.field("idiag_rqueue", Value::U(msg.idiag_rqueue as u64));
            ctx.out.next();
            ctx.out.field("idiag_wqueue", Value::U(msg.idiag_wqueue as u64));
            ctx.out.next();
            ctx.out.field("idiag_uid", Value::U(msg.idiag_uid as u64));
            ctx.out.next();
            ctx.out.field("idiag_inode", Value::U(msg.idiag_inode as u64));
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::{DecodeOptions, LocalMemory};
    use crate::output::TextRenderer;
    use crate::util::addr::{AF_INET, AF_INET6};
    use crate::util::ifname::StaticIfNames;
    use zerocopy::IntoBytes;

    fn sockid_v4() -> InetDiagSockId {
        let mut id = InetDiagSockId {
            idiag_sport: 22u16.to_be(),
            idiag_if: 1,
            ..Default::default()
        };
        id.idiag_src[..4].copy_from_slice(&[10, 11, 12, 13]);
        id
    }

    fn render(data: Vec<u8>, f: fn(&mut DecodeCtx<'_>, u8, u64, usize)) -> String {
        let len = data.len();
        let family = data.first().copied().unwrap_or(0);
        let mem = LocalMemory::new(0x1000, data);
        let mut out = TextRenderer::default();
        let opts = DecodeOptions::default();
        let names = StaticIfNames::new().with(1, "lo");
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &names);
        f(&mut ctx, family, 0x1000, len);
        out.finish()
    }

    #[test]
    fn test_msg_v4() {
        let msg = InetDiagMsg {
            idiag_family: AF_INET,
            idiag_state: 10,
            id: sockid_v4(),
            idiag_inode: 4242,
            ..Default::default()
        };
        let s = render(msg.as_bytes().to_vec(), decode_inet_diag_msg);
        assert_eq!(
            s,
            "{idiag_family=AF_INET, idiag_state=TCP_LISTEN, idiag_timer=0, idiag_retrans=0, \
             id={idiag_sport=htons(22), idiag_dport=htons(0), idiag_src=inet_addr(\"10.11.12.13\"), \
             idiag_dst=inet_addr(\"0.0.0.0\"), idiag_if=if_nametoindex(\"lo\"), idiag_cookie=[0, 0]}, \
             idiag_expires=0, idiag_rqueue=0, idiag_wqueue=0, idiag_uid=0, idiag_inode=4242}"
        );
    }

    #[test]
    fn test_msg_short() {
        let s = render(vec![AF_INET, 1, 2], decode_inet_diag_msg);
        assert_eq!(s, "{idiag_family=AF_INET, ...}");
    }

    #[test]
    fn test_msg_unreadable_rest() {
        let msg = InetDiagMsg {
            idiag_family: AF_INET6,
            ..Default::default()
        };
        let mem = LocalMemory::new(0x1000, msg.as_bytes().to_vec()).with_hole(0x1010..0x1011);
        let mut out = TextRenderer::default();
        let opts = DecodeOptions::default();
        let names = StaticIfNames::new();
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &names);
        decode_inet_diag_msg(&mut ctx, AF_INET6, 0x1000, 72);
        assert_eq!(out.finish(), "{idiag_family=AF_INET6, 0x1001}");
    }

    #[test]
    fn test_req_v2_with_attr() {
        let req = InetDiagReqV2 {
            sdiag_family: AF_INET,
            sdiag_protocol: 6,
            idiag_ext: 1 << 0,
            idiag_states: 1 << 10,
            id: sockid_v4(),
            ..Default::default()
        };
        let mut data = req.as_bytes().to_vec();
        data.extend_from_slice(&[8, 0, 3, 0]);
        data.extend_from_slice(&17u32.to_ne_bytes());
        let s = render(data, decode_inet_diag_req_v2);
        assert!(
            s.starts_with(
                "{sdiag_family=AF_INET, sdiag_protocol=IPPROTO_TCP, idiag_ext=1<<(INET_DIAG_MEMINFO-1), \
                 idiag_states=1<<TCP_LISTEN, id={idiag_sport=htons(22)"
            ),
            "{}",
            s
        );
        assert!(
            s.ends_with("}}, [{nla_len=8, nla_type=INET_DIAG_REQ_PROTOCOL}, 17]"),
            "{}",
            s
        );
    }

    #[test]
    fn test_req_compat() {
        let req = InetDiagReq {
            idiag_family: AF_INET,
            idiag_src_len: 32,
            idiag_states: !0,
            idiag_dbs: 7,
            ..Default::default()
        };
        let s = render(req.as_bytes().to_vec(), decode_inet_diag_req_compat);
        assert!(
            s.starts_with("{idiag_family=AF_INET, idiag_src_len=32, idiag_dst_len=0, idiag_ext=0, id={"),
            "{}",
            s
        );
        assert!(s.contains("idiag_states=1<<TCP_ESTABLISHED|"), "{}", s);
        assert!(s.ends_with("|0xffffc001, idiag_dbs=7}"), "{}", s);
    }

    #[test]
    fn test_sockid_v6_and_unresolved_ifindex() {
        let mut id = InetDiagSockId {
            idiag_if: 9,
            idiag_cookie: [1, 2],
            ..Default::default()
        };
        id.idiag_dst[15] = 1;
        let mem = LocalMemory::default();
        let mut out = TextRenderer::default();
        let opts = DecodeOptions::default();
        let names = StaticIfNames::new();
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &names);
        print_sockid(&mut ctx, &id, AF_INET6);
        assert_eq!(
            out.finish(),
            "{idiag_sport=htons(0), idiag_dport=htons(0), inet_pton(AF_INET6, \"::\", &idiag_src), \
             inet_pton(AF_INET6, \"::1\", &idiag_dst), idiag_if=9, idiag_cookie=[1, 2]}"
        );
    }
}
