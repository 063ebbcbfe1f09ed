//! Socket memory attributes: `INET_DIAG_MEMINFO` and `INET_DIAG_SKMEMINFO`.

use super::types::InetDiagMeminfo;
use crate::netlink::DecodeCtx;
use crate::netlink::nla::print_array;
use crate::output::Value;
use crate::xlat::tables::SK_MEMINFO;

/// Decode an `inet_diag_meminfo` payload.
pub fn decode_inet_diag_meminfo(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) -> bool {
    if len < std::mem::size_of::<InetDiagMeminfo>() {
        return false;
    }
    let Some(minfo) = ctx.fetch_obj::<InetDiagMeminfo>(addr) else {
        return true;
    };

    let out = &mut *ctx.out;
    out.begin_struct();
    out.field("idiag_rmem", Value::U(minfo.idiag_rmem as u64));
    out.next();
    out.field("idiag_wmem", Value::U(minfo.idiag_wmem as u64));
    out.next();
    out.field("idiag_fmem", Value::U(minfo.idiag_fmem as u64));
    out.next();
    out.field("idiag_tmem", Value::U(minfo.idiag_tmem as u64));
    out.end_struct();
    true
}

/// Decode the `SK_MEMINFO_*` counter array.
///
/// Each `u32` is shown with its index name. Indices past the known ones
/// are shown numerically.
pub fn decode_nla_meminfo(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) -> bool {
    const ELEM: usize = std::mem::size_of::<u32>();
    let nmemb = len / ELEM;
    if nmemb == 0 {
        return false;
    }

    print_array(ctx, addr, nmemb, ELEM, |ctx, bytes, index| {
        if let Ok(raw) = <[u8; ELEM]>::try_from(bytes) {
            ctx.out.indexed(
                Value::Sym(&SK_MEMINFO, index as u64),
                Value::U(u32::from_ne_bytes(raw) as u64),
            );
        }
    });
    true
}
