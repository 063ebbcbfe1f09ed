//! Congestion control state attributes: Vegas, DCTCP and BBR.
//!
//! Newer kernels may append fields to these structures and older ones send
//! fewer, so each is described by a [`FieldSpec`] table and only the fields
//! covered by the payload are shown.

use std::mem::{offset_of, size_of};

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use super::types::{TcpBbrInfo, TcpDctcpInfo, TcpVegasInfo};
use crate::netlink::fields::check_min_len;
use crate::netlink::{DecodeCtx, FieldSpec, print_fields};
use crate::output::Renderer;

/// Fields of `tcpvegas_info`.
pub const TCPVEGAS_INFO_FIELDS: &[FieldSpec] = &[
    FieldSpec::u("tcpv_enabled", offset_of!(TcpVegasInfo, tcpv_enabled), size_of::<u32>()),
    FieldSpec::u("tcpv_rttcnt", offset_of!(TcpVegasInfo, tcpv_rttcnt), size_of::<u32>()),
    FieldSpec::u("tcpv_rtt", offset_of!(TcpVegasInfo, tcpv_rtt), size_of::<u32>()),
    FieldSpec::u("tcpv_minrtt", offset_of!(TcpVegasInfo, tcpv_minrtt), size_of::<u32>()),
];

/// Fields of `tcp_dctcp_info`.
pub const TCP_DCTCP_INFO_FIELDS: &[FieldSpec] = &[
    FieldSpec::u("dctcp_enabled", offset_of!(TcpDctcpInfo, dctcp_enabled), size_of::<u16>()),
    FieldSpec::u("dctcp_ce_state", offset_of!(TcpDctcpInfo, dctcp_ce_state), size_of::<u16>()),
    FieldSpec::u("dctcp_alpha", offset_of!(TcpDctcpInfo, dctcp_alpha), size_of::<u32>()),
    FieldSpec::u("dctcp_ab_ecn", offset_of!(TcpDctcpInfo, dctcp_ab_ecn), size_of::<u32>()),
    FieldSpec::u("dctcp_ab_tot", offset_of!(TcpDctcpInfo, dctcp_ab_tot), size_of::<u32>()),
];

/// Fields of `tcp_bbr_info`. Bandwidth halves are shown in hex.
pub const TCP_BBR_INFO_FIELDS: &[FieldSpec] = &[
    FieldSpec::x("bbr_bw_lo", offset_of!(TcpBbrInfo, bbr_bw_lo), size_of::<u32>()),
    FieldSpec::x("bbr_bw_hi", offset_of!(TcpBbrInfo, bbr_bw_hi), size_of::<u32>()),
    FieldSpec::u("bbr_min_rtt", offset_of!(TcpBbrInfo, bbr_min_rtt), size_of::<u32>()),
    FieldSpec::u("bbr_pacing_gain", offset_of!(TcpBbrInfo, bbr_pacing_gain), size_of::<u32>()),
    FieldSpec::u("bbr_cwnd_gain", offset_of!(TcpBbrInfo, bbr_cwnd_gain), size_of::<u32>()),
];

/// Render the fields of a Vegas state that fit in `len` bytes.
pub fn print_tcpvegas_info(out: &mut dyn Renderer, vegas: &TcpVegasInfo, len: usize) {
    print_fields(out, TCPVEGAS_INFO_FIELDS, vegas.as_bytes(), len);
}

/// Render the fields of a DCTCP state that fit in `len` bytes.
pub fn print_tcp_dctcp_info(out: &mut dyn Renderer, dctcp: &TcpDctcpInfo, len: usize) {
    print_fields(out, TCP_DCTCP_INFO_FIELDS, dctcp.as_bytes(), len);
}

/// Render the fields of a BBR state that fit in `len` bytes.
pub fn print_tcp_bbr_info(out: &mut dyn Renderer, bbr: &TcpBbrInfo, len: usize) {
    print_fields(out, TCP_BBR_INFO_FIELDS, bbr.as_bytes(), len);
}

fn decode_progressive<T>(
    ctx: &mut DecodeCtx<'_>,
    addr: u64,
    len: usize,
    kind: &'static str,
    fields: &[FieldSpec],
    print: fn(&mut dyn Renderer, &T, usize),
) -> bool
where
    T: FromBytes + IntoBytes + Immutable + KnownLayout,
{
    if let Err(e) = check_min_len(kind, fields, len) {
        tracing::trace!(error = %e, "not decoding");
        return false;
    }
    if let Some(info) = ctx.fetch_prefix::<T>(addr, len) {
        print(&mut *ctx.out, &info, len);
    }
    true
}

/// Decode an `INET_DIAG_VEGASINFO` payload.
pub fn decode_tcpvegas_info(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) -> bool {
    decode_progressive(
        ctx,
        addr,
        len,
        "tcpvegas_info",
        TCPVEGAS_INFO_FIELDS,
        print_tcpvegas_info,
    )
}

/// Decode an `INET_DIAG_DCTCPINFO` payload.
pub fn decode_tcp_dctcp_info(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) -> bool {
    decode_progressive(
        ctx,
        addr,
        len,
        "tcp_dctcp_info",
        TCP_DCTCP_INFO_FIELDS,
        print_tcp_dctcp_info,
    )
}

/// Decode an `INET_DIAG_BBRINFO` payload.
pub fn decode_tcp_bbr_info(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) -> bool {
    decode_progressive(
        ctx,
        addr,
        len,
        "tcp_bbr_info",
        TCP_BBR_INFO_FIELDS,
        print_tcp_bbr_info,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::{DecodeOptions, LocalMemory};
    use crate::output::TextRenderer;
    use crate::util::ifname::NoIfNames;

    fn render(data: Vec<u8>, f: fn(&mut DecodeCtx<'_>, u64, usize) -> bool) -> (bool, String) {
        let len = data.len();
        let mem = LocalMemory::new(0x1000, data);
        let mut out = TextRenderer::default();
        let opts = DecodeOptions::default();
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &NoIfNames);
        let ok = f(&mut ctx, 0x1000, len);
        (ok, out.finish())
    }

    #[test]
    fn test_tables_cover_structs() {
        for (fields, size) in [
            (TCPVEGAS_INFO_FIELDS, size_of::<TcpVegasInfo>()),
            (TCP_DCTCP_INFO_FIELDS, size_of::<TcpDctcpInfo>()),
            (TCP_BBR_INFO_FIELDS, size_of::<TcpBbrInfo>()),
        ] {
            assert_eq!(fields.last().map(FieldSpec::end), Some(size));
            assert!(fields.windows(2).all(|w| w[0].end() == w[1].offset));
        }
    }

    #[test]
    fn test_vegas_full() {
        let vegas = TcpVegasInfo {
            tcpv_enabled: 0xfadcacdb,
            tcpv_rttcnt: 0xbdabcada,
            tcpv_rtt: 0xbadbfafb,
            tcpv_minrtt: 0xfdacdadf,
        };
        let (ok, s) = render(vegas.as_bytes().to_vec(), decode_tcpvegas_info);
        assert!(ok);
        assert_eq!(
            s,
            "{tcpv_enabled=4208766171, tcpv_rttcnt=3182152410, tcpv_rtt=3135011579, tcpv_minrtt=4255963871}"
        );
    }

    #[test]
    fn test_dctcp_partial() {
        let dctcp = TcpDctcpInfo {
            dctcp_enabled: 1,
            dctcp_ce_state: 2,
            dctcp_alpha: 3,
            ..Default::default()
        };
        let (ok, s) = render(dctcp.as_bytes()[..9].to_vec(), decode_tcp_dctcp_info);
        assert!(ok);
        assert_eq!(s, "{dctcp_enabled=1, dctcp_ce_state=2, dctcp_alpha=3}");
    }

    #[test]
    fn test_bbr_only_first_field() {
        let (ok, s) = render(0xfdacdadfu32.to_ne_bytes().to_vec(), decode_tcp_bbr_info);
        assert!(ok);
        assert_eq!(s, "{bbr_bw_lo=0xfdacdadf}");
    }

    #[test]
    fn test_bbr_full() {
        let bbr = TcpBbrInfo {
            bbr_bw_lo: 0xfadcacdb,
            bbr_bw_hi: 0xbdabcada,
            bbr_min_rtt: 1,
            bbr_pacing_gain: 2,
            bbr_cwnd_gain: 3,
        };
        let (_, s) = render(bbr.as_bytes().to_vec(), decode_tcp_bbr_info);
        assert_eq!(
            s,
            "{bbr_bw_lo=0xfadcacdb, bbr_bw_hi=0xbdabcada, bbr_min_rtt=1, bbr_pacing_gain=2, bbr_cwnd_gain=3}"
        );
    }

    #[test]
    fn test_below_first_field() {
        assert_eq!(render(vec![1, 2, 3], decode_tcp_bbr_info), (false, String::new()));
        assert_eq!(render(vec![1], decode_tcp_dctcp_info), (false, String::new()));
    }
}
