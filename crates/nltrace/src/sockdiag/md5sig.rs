//! `INET_DIAG_MD5SIG`: the TCP-MD5 keys configured on a socket.

use zerocopy::FromBytes;

use super::types::TcpDiagMd5sig;
use crate::netlink::DecodeCtx;
use crate::netlink::nla::print_array;
use crate::output::{Renderer, Value};
use crate::xlat::tables::ADDRFAMS;

/// Render one key record. The key is shown in full, up to `tcpm_keylen`
/// bytes.
pub fn print_tcp_md5sig(out: &mut dyn Renderer, sig: &TcpDiagMd5sig) {
    out.begin_struct();
    out.field("tcpm_family", Value::Sym(&ADDRFAMS, sig.tcpm_family as u64));
    out.next();
    out.field("tcpm_prefixlen", Value::U(sig.tcpm_prefixlen as u64));
    out.next();
    out.field("tcpm_keylen", Value::U(sig.tcpm_keylen as u64));
    out.next();
    out.field(
        "tcpm_addr",
        Value::InetAddr {
            family: sig.tcpm_family,
            bytes: &sig.tcpm_addr,
        },
    );
    out.next();
    out.field("tcpm_key", Value::Bytes(sig.key()));
    out.end_struct();
}

/// Decode an array of `tcp_diag_md5sig` records. A trailing partial record
/// is ignored.
pub fn decode_tcp_md5sig(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) -> bool {
    let size = std::mem::size_of::<TcpDiagMd5sig>();
    let nmemb = len / size;
    if nmemb == 0 {
        return false;
    }

    print_array(ctx, addr, nmemb, size, |ctx, bytes, _| {
        if let Ok(sig) = TcpDiagMd5sig::read_from_bytes(bytes) {
            print_tcp_md5sig(&mut *ctx.out, &sig);
        }
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::{DecodeOptions, LocalMemory};
    use crate::output::TextRenderer;
    use crate::util::addr::{AF_INET, AF_INET6};
    use crate::util::ifname::NoIfNames;
    use zerocopy::{FromZeros, IntoBytes};

    fn render(data: Vec<u8>) -> (bool, String) {
        let len = data.len();
        let mem = LocalMemory::new(0x1000, data);
        let mut out = TextRenderer::default();
        let opts = DecodeOptions::default();
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &NoIfNames);
        let ok = decode_tcp_md5sig(&mut ctx, 0x1000, len);
        (ok, out.finish())
    }

    #[test]
    fn test_unspec_empty_key() {
        let sig = TcpDiagMd5sig::new_zeroed();
        let (ok, s) = render(sig.as_bytes().to_vec());
        assert!(ok);
        assert_eq!(
            s,
            format!(
                "[{{tcpm_family=AF_UNSPEC, tcpm_prefixlen=0, tcpm_keylen=0, tcpm_addr=\"{}\", tcpm_key=\"\"}}]",
                "\\x00".repeat(16)
            )
        );
    }

    #[test]
    fn test_ipv4_and_ipv6() {
        let mut v4 = TcpDiagMd5sig::new_zeroed();
        v4.tcpm_family = AF_INET;
        v4.tcpm_prefixlen = 32;
        v4.tcpm_keylen = 2;
        v4.tcpm_addr[..4].copy_from_slice(&[222, 237, 250, 206]);
        v4.tcpm_key[..2].copy_from_slice(&[0xab, 0xcd]);

        let mut v6 = TcpDiagMd5sig::new_zeroed();
        v6.tcpm_family = AF_INET6;
        v6.tcpm_addr = [
            0xde, 0xad, 0xfa, 0xce, 0xca, 0xfe, 0, 0, 0, 0, 0xfa, 0xce, 0xba, 0xdc, 0x0c, 0xed,
        ];

        let mut data = v4.as_bytes().to_vec();
        data.extend_from_slice(v6.as_bytes());
        let (_, s) = render(data);
        assert_eq!(
            s,
            "[{tcpm_family=AF_INET, tcpm_prefixlen=32, tcpm_keylen=2, \
             tcpm_addr=inet_addr(\"222.237.250.206\"), tcpm_key=\"\\xab\\xcd\"}, \
             {tcpm_family=AF_INET6, tcpm_prefixlen=0, tcpm_keylen=0, \
             inet_pton(AF_INET6, \"dead:face:cafe::face:badc:ced\", &tcpm_addr), tcpm_key=\"\"}]"
        );
    }

    #[test]
    fn test_unknown_family_long_key() {
        let mut sig = TcpDiagMd5sig::new_zeroed();
        sig.tcpm_family = 46;
        sig.tcpm_keylen = 45067;
        sig.tcpm_key = [0x61; 80];
        let (_, s) = render(sig.as_bytes().to_vec());
        assert!(s.starts_with("[{tcpm_family=0x2e /* AF_??? */"), "{}", s);
        assert!(s.contains("tcpm_keylen=45067, tcpm_addr=\"\\x00"), "{}", s);
        let key = format!("tcpm_key=\"{}\"}}]", "\\x61".repeat(80));
        assert!(s.ends_with(&key), "{}", s);
    }

    #[test]
    fn test_too_short() {
        assert_eq!(render(vec![0; 99]), (false, String::new()));
    }
}
