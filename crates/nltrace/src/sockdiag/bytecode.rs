//! Socket filter bytecode carried in `INET_DIAG_REQ_BYTECODE`.
//!
//! The payload starts with an operation header. Whatever follows it is the
//! operand of that operation, interpreted by the operation code. Operands
//! too short for their structure are shown as raw bytes.

use super::types::bc::*;
use super::types::{InetDiagBcOp, InetDiagHostcond, InetDiagMarkcond};
use crate::netlink::DecodeCtx;
use crate::output::{Renderer, Value};
use crate::util::addr::{AF_INET, AF_INET6};
use crate::xlat::tables::{ADDRFAMS, INET_DIAG_BYTECODES};

const OP_SIZE: usize = std::mem::size_of::<InetDiagBcOp>();

/// Render an operation header.
pub fn print_bc_op(out: &mut dyn Renderer, op: &InetDiagBcOp) {
    out.begin_struct();
    out.field("code", Value::Sym(&INET_DIAG_BYTECODES, op.code as u64));
    out.next();
    out.field("yes", Value::U(op.yes as u64));
    out.next();
    out.field("no", Value::U(op.no as u64));
    out.end_struct();
}

/// Render an address of `family` found at `addr` as the member `name`.
fn decode_inet_addr(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize, family: u8, name: &str) {
    let size = match family {
        AF_INET => 4,
        AF_INET6 => 16,
        _ => 0,
    };
    if size == 0 || len < size {
        ctx.out.field_name(name);
        ctx.print_raw(addr, len);
        return;
    }
    match ctx.fetch(addr, size) {
        Ok(bytes) => ctx.out.field(
            name,
            Value::InetAddr {
                family,
                bytes: &bytes,
            },
        ),
        Err(_) => {
            ctx.out.field_name(name);
            ctx.out.address(addr);
        }
    }
}

fn decode_hostcond(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) {
    let size = std::mem::size_of::<InetDiagHostcond>();
    if len < size {
        ctx.print_raw(addr, len);
        return;
    }
    let Some(cond) = ctx.fetch_obj::<InetDiagHostcond>(addr) else {
        return;
    };

    ctx.out.begin_struct();
    ctx.out.field("family", Value::Sym(&ADDRFAMS, cond.family as u64));
    ctx.out.next();
    ctx.out.field("prefix_len", Value::U(cond.prefix_len as u64));
    ctx.out.next();
    ctx.out.field("port", Value::U(cond.port as u32 as u64));
    if len > size {
        ctx.out.next();
        decode_inet_addr(ctx, addr + size as u64, len - size, cond.family, "addr");
    }
    ctx.out.end_struct();
}

fn decode_markcond(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) {
    if len < std::mem::size_of::<InetDiagMarkcond>() {
        ctx.print_raw(addr, len);
        return;
    }
    if let Some(cond) = ctx.fetch_obj::<InetDiagMarkcond>(addr) {
        ctx.out.begin_struct();
        ctx.out.field("mark", Value::U(cond.mark as u64));
        ctx.out.next();
        ctx.out.field("mask", Value::U(cond.mask as u64));
        ctx.out.end_struct();
    }
}

fn decode_devcond(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) {
    if len < std::mem::size_of::<u32>() {
        ctx.print_raw(addr, len);
        return;
    }
    if let Some(ifindex) = ctx.fetch_obj::<u32>(addr) {
        let name = ctx.ifname(ifindex);
        ctx.out.value(Value::IfIndex(ifindex, name.as_deref()));
    }
}

fn decode_port_op(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) {
    if len < OP_SIZE {
        ctx.print_raw(addr, len);
        return;
    }
    let Some(op) = ctx.fetch_obj::<InetDiagBcOp>(addr) else {
        return;
    };
    print_bc_op(&mut *ctx.out, &op);
    if len > OP_SIZE {
        ctx.out.next();
        ctx.print_raw(addr + OP_SIZE as u64, len - OP_SIZE);
    }
}

fn decode_cgroup_cond(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) {
    if len < std::mem::size_of::<u64>() {
        ctx.print_raw(addr, len);
        return;
    }
    if let Some(id) = ctx.fetch_obj::<u64>(addr) {
        ctx.out.value(Value::U(id));
    }
}

/// Render the operand following an operation with `code`.
pub fn decode_bytecode_data(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize, code: u8) {
    tracing::trace!(code, len, "bytecode operand");
    match code {
        INET_DIAG_BC_S_COND | INET_DIAG_BC_D_COND => decode_hostcond(ctx, addr, len),
        INET_DIAG_BC_DEV_COND => decode_devcond(ctx, addr, len),
        INET_DIAG_BC_S_GE | INET_DIAG_BC_S_LE | INET_DIAG_BC_D_GE | INET_DIAG_BC_D_LE
        | INET_DIAG_BC_S_EQ | INET_DIAG_BC_D_EQ => decode_port_op(ctx, addr, len),
        INET_DIAG_BC_MARK_COND => decode_markcond(ctx, addr, len),
        INET_DIAG_BC_CGROUP_COND => decode_cgroup_cond(ctx, addr, len),
        _ => ctx.print_raw(addr, len),
    }
}

/// Decode an `INET_DIAG_REQ_BYTECODE` payload.
pub fn decode_inet_diag_bc_op(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) -> bool {
    if len < OP_SIZE {
        return false;
    }
    let Some(op) = ctx.fetch_obj::<InetDiagBcOp>(addr) else {
        return true;
    };

    print_bc_op(&mut *ctx.out, &op);
    if len > OP_SIZE {
        ctx.out.next();
        decode_bytecode_data(ctx, addr + OP_SIZE as u64, len - OP_SIZE, op.code);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::{DecodeOptions, LocalMemory};
    use crate::output::TextRenderer;
    use crate::util::ifname::StaticIfNames;
    use zerocopy::IntoBytes;

    fn render(data: Vec<u8>) -> (bool, String) {
        let len = data.len();
        let mem = LocalMemory::new(0x1000, data);
        let mut out = TextRenderer::default();
        let opts = DecodeOptions::default();
        let names = StaticIfNames::new().with(1, "lo");
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &names);
        let ok = decode_inet_diag_bc_op(&mut ctx, 0x1000, len);
        (ok, out.finish())
    }

    fn op(code: u8, yes: u8, no: u16) -> Vec<u8> {
        InetDiagBcOp { code, yes, no }.as_bytes().to_vec()
    }

    #[test]
    fn test_too_short() {
        assert_eq!(render(vec![1, 2, 3]), (false, String::new()));
    }

    #[test]
    fn test_op_only() {
        assert_eq!(
            render(op(INET_DIAG_BC_JMP, 4, 8)),
            (true, "{code=INET_DIAG_BC_JMP, yes=4, no=8}".to_string())
        );
    }

    #[test]
    fn test_unknown_code_operand_raw() {
        let mut data = op(0xff, 0, 0);
        data.extend_from_slice(&[0xde, 0xad]);
        assert_eq!(
            render(data).1,
            "{code=0xff /* INET_DIAG_BC_??? */, yes=0, no=0}, \"\\xde\\xad\""
        );
    }

    #[test]
    fn test_hostcond_v4() {
        let mut data = op(INET_DIAG_BC_S_COND, 1, 2);
        let cond = InetDiagHostcond {
            family: AF_INET,
            prefix_len: 24,
            port: 443,
            ..Default::default()
        };
        data.extend_from_slice(cond.as_bytes());
        data.extend_from_slice(&[192, 168, 1, 0]);
        assert_eq!(
            render(data).1,
            "{code=INET_DIAG_BC_S_COND, yes=1, no=2}, \
             {family=AF_INET, prefix_len=24, port=443, addr=inet_addr(\"192.168.1.0\")}"
        );
    }

    #[test]
    fn test_hostcond_v6() {
        let mut data = op(INET_DIAG_BC_D_COND, 1, 2);
        let cond = InetDiagHostcond {
            family: AF_INET6,
            prefix_len: 128,
            ..Default::default()
        };
        data.extend_from_slice(cond.as_bytes());
        let mut v6 = [0u8; 16];
        v6[15] = 1;
        data.extend_from_slice(&v6);
        assert!(
            render(data)
                .1
                .ends_with("port=0, inet_pton(AF_INET6, \"::1\", &addr)}")
        );
    }

    #[test]
    fn test_hostcond_short_address() {
        let mut data = op(INET_DIAG_BC_S_COND, 1, 2);
        let cond = InetDiagHostcond {
            family: AF_INET,
            ..Default::default()
        };
        data.extend_from_slice(cond.as_bytes());
        data.extend_from_slice(&[10, 0]);
        assert!(render(data).1.ends_with("port=0, addr=\"\\x0a\\x00\"}"));
    }

    #[test]
    fn test_hostcond_too_short() {
        let mut data = op(INET_DIAG_BC_S_COND, 1, 2);
        data.extend_from_slice(&[2, 0]);
        assert!(render(data).1.ends_with("}, \"\\x02\\x00\""));
    }

    #[test]
    fn test_devcond() {
        let mut data = op(INET_DIAG_BC_DEV_COND, 1, 2);
        data.extend_from_slice(&1u32.to_ne_bytes());
        assert!(render(data).1.ends_with("}, if_nametoindex(\"lo\")"));

        let mut data = op(INET_DIAG_BC_DEV_COND, 1, 2);
        data.extend_from_slice(&7u32.to_ne_bytes());
        assert!(render(data).1.ends_with("}, 7"));
    }

    #[test]
    fn test_port_op_with_trailer() {
        let mut data = op(INET_DIAG_BC_S_GE, 1, 2);
        data.extend(op(INET_DIAG_BC_NOP, 0, 1024));
        data.extend_from_slice(&[0xaa]);
        assert_eq!(
            render(data).1,
            "{code=INET_DIAG_BC_S_GE, yes=1, no=2}, \
             {code=INET_DIAG_BC_NOP, yes=0, no=1024}, \"\\xaa\""
        );
    }

    #[test]
    fn test_markcond() {
        let mut data = op(INET_DIAG_BC_MARK_COND, 1, 2);
        data.extend_from_slice(InetDiagMarkcond { mark: 0xff, mask: 0xffff }.as_bytes());
        assert!(render(data).1.ends_with("}, {mark=255, mask=65535}"));
    }

    #[test]
    fn test_cgroup_cond() {
        let mut data = op(INET_DIAG_BC_CGROUP_COND, 1, 2);
        data.extend_from_slice(&12345u64.to_ne_bytes());
        assert!(render(data).1.ends_with("}, 12345"));
    }
}
