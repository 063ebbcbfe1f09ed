//! Decoders for common attribute payload shapes.
//!
//! These match [`AttrDecoder`](super::AttrDecoder) and can be placed
//! directly in a registry, or called by family-specific decoders that add
//! parameters (a name table, a fixed width).

use super::DecodeCtx;
use crate::output::Value;
use crate::xlat::{Xlat, XlatStyle};

macro_rules! decode_nla_int {
    ($(#[$meta:meta])* $name:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $name(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) -> bool {
            const SIZE: usize = std::mem::size_of::<$ty>();
            if len < SIZE {
                return false;
            }
            if let Some(bytes) = ctx.fetch_or_addr(addr, SIZE)
                && let Ok(raw) = <[u8; SIZE]>::try_from(bytes.as_slice())
            {
                ctx.out.value(Value::U(<$ty>::from_ne_bytes(raw) as u64));
            }
            true
        }
    };
}

decode_nla_int!(
    /// Decode a `u8` payload.
    decode_nla_u8,
    u8
);
decode_nla_int!(
    /// Decode a `u16` payload.
    decode_nla_u16,
    u16
);
decode_nla_int!(
    /// Decode a `u32` payload.
    decode_nla_u32,
    u32
);
decode_nla_int!(
    /// Decode a `u64` payload.
    decode_nla_u64,
    u64
);

/// Decode a NUL-terminated string payload.
///
/// At most `max_strlen` bytes are shown in abbreviated mode. A string that
/// is not terminated within what is shown is followed by an ellipsis.
pub fn decode_nla_str(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize) -> bool {
    let size = if ctx.abbrev() {
        len.min(ctx.opts.max_strlen)
    } else {
        len
    };
    if let Some(bytes) = ctx.fetch_or_addr(addr, size) {
        match bytes.iter().position(|&b| b == 0) {
            Some(nul) => ctx.out.value(Value::Str {
                bytes: &bytes[..nul],
                more: false,
            }),
            None => ctx.out.value(Value::Str {
                bytes: &bytes,
                more: true,
            }),
        }
    }
    true
}

/// Options for [`decode_nla_flags`].
#[derive(Debug, Clone, Copy)]
pub struct FlagsOpts {
    /// Flag names.
    pub table: &'static Xlat,
    /// Fixed width in bytes. Longer payloads are clamped to it.
    pub size: usize,
    /// Print as number plus names even in abbreviated style.
    pub verbose: bool,
}

/// Decode a bitmask payload of a fixed width.
pub fn decode_nla_flags(ctx: &mut DecodeCtx<'_>, addr: u64, len: usize, opts: &FlagsOpts) -> bool {
    if len == 0 || opts.size == 0 || opts.size > 8 {
        return false;
    }
    let width = len.min(opts.size);
    if let Some(bytes) = ctx.fetch_or_addr(addr, width) {
        let mut raw = [0u8; 8];
        if cfg!(target_endian = "big") {
            raw[8 - width..].copy_from_slice(&bytes);
        } else {
            raw[..width].copy_from_slice(&bytes);
        }
        let verbose = opts.verbose && ctx.out.xlat_style() != XlatStyle::Raw;
        ctx.out.value(Value::Flags {
            table: opts.table,
            value: u64::from_ne_bytes(raw),
            verbose,
        });
    }
    true
}

/// Render `nmemb` elements of `elem_size` bytes starting at `addr`.
///
/// Each element is fetched separately and handed to `print_elem` with its
/// index. A failed fetch ends the array: on the first element the address
/// is shown instead of the array, later ones get a "more data" marker. In
/// abbreviated mode at most `max_strlen` elements are shown.
pub fn print_array<'a, F>(
    ctx: &mut DecodeCtx<'a>,
    addr: u64,
    nmemb: usize,
    elem_size: usize,
    mut print_elem: F,
) where
    F: FnMut(&mut DecodeCtx<'a>, &[u8], usize),
{
    let mut opened = false;

    for i in 0..nmemb {
        let cur = addr + (i * elem_size) as u64;
        if i > 0 {
            ctx.out.next();
        }

        let bytes = match ctx.fetch(cur, elem_size) {
            Ok(bytes) => bytes,
            Err(_) => {
                if i == 0 {
                    ctx.out.address(cur);
                } else {
                    ctx.out.more_data_at(cur);
                }
                break;
            }
        };

        if i == 0 {
            ctx.out.begin_array();
            opened = true;
        }
        if ctx.abbrev() && i >= ctx.opts.max_strlen {
            ctx.out.more_data();
            break;
        }
        print_elem(ctx, &bytes, i);
    }

    if opened {
        ctx.out.end_array();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlink::{DecodeOptions, LocalMemory};
    use crate::output::{OutputOptions, TextRenderer};
    use crate::util::ifname::NoIfNames;
    use crate::xlat::tables::INET_DIAG_SHUTDOWN_FLAGS;

    fn run(
        data: Vec<u8>,
        opts: DecodeOptions,
        f: impl FnOnce(&mut DecodeCtx<'_>, u64, usize) -> bool,
    ) -> (bool, String) {
        let len = data.len();
        let mem = LocalMemory::new(0x1000, data);
        let mut out = TextRenderer::new(OutputOptions::default());
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &NoIfNames);
        let ok = f(&mut ctx, 0x1000, len);
        (ok, out.finish())
    }

    #[test]
    fn test_integers() {
        let opts = DecodeOptions::default();
        assert_eq!(run(vec![7], opts, decode_nla_u8), (true, "7".into()));
        assert_eq!(
            run(0xabdfadcau32.to_ne_bytes().to_vec(), opts, decode_nla_u32),
            (true, "2883562954".into())
        );
        assert_eq!(
            run(u64::MAX.to_ne_bytes().to_vec(), opts, decode_nla_u64),
            (true, "18446744073709551615".into())
        );
        assert_eq!(run(vec![1, 2], opts, decode_nla_u32), (false, String::new()));
    }

    #[test]
    fn test_integer_ignores_excess() {
        let (ok, s) = run(vec![5, 0, 9, 9], DecodeOptions::default(), decode_nla_u16);
        assert!(ok);
        assert_eq!(s, "5");
    }

    #[test]
    fn test_str_terminated() {
        let (_, s) = run(b"cubic\0".to_vec(), DecodeOptions::default(), decode_nla_str);
        assert_eq!(s, "\"cubic\"");
    }

    #[test]
    fn test_str_unterminated() {
        let data: Vec<u8> = (0..32).map(|i| b'0' + (i % 10) as u8).collect();
        let (_, s) = run(data, DecodeOptions::default(), decode_nla_str);
        assert_eq!(s, "\"01234567890123456789012345678901\"...");
    }

    #[test]
    fn test_str_terminated_at_cap() {
        let mut data: Vec<u8> = (0..32).map(|i| b'0' + (i % 10) as u8).collect();
        data[31] = 0;
        let (_, s) = run(data, DecodeOptions::default(), decode_nla_str);
        assert_eq!(s, "\"0123456789012345678901234567890\"");
    }

    #[test]
    fn test_str_longer_than_cap() {
        let opts = DecodeOptions::default().max_strlen(4);
        let (_, s) = run(b"reno-long\0".to_vec(), opts, decode_nla_str);
        assert_eq!(s, "\"reno\"...");
    }

    #[test]
    fn test_flags_clamped_to_size() {
        let opts = FlagsOpts {
            table: &INET_DIAG_SHUTDOWN_FLAGS,
            size: 1,
            verbose: true,
        };
        let (ok, s) = run(vec![3, 0xff, 0xff, 0xff], DecodeOptions::default(), |ctx, a, l| {
            decode_nla_flags(ctx, a, l, &opts)
        });
        assert!(ok);
        assert_eq!(s, "0x3 /* RCV_SHUTDOWN|SEND_SHUTDOWN */");

        let (ok, _) = run(Vec::new(), DecodeOptions::default(), |ctx, a, l| {
            decode_nla_flags(ctx, a, l, &opts)
        });
        assert!(!ok);
    }

    #[test]
    fn test_print_array_abbreviated() {
        let data: Vec<u8> = (0u8..6).collect();
        let opts = DecodeOptions::default().max_strlen(4);
        let (_, s) = run(data, opts, |ctx, a, l| {
            print_array(ctx, a, l, 1, |ctx, b, _| ctx.out.value(Value::U(b[0] as u64)));
            true
        });
        assert_eq!(s, "[0, 1, 2, 3, ...]");
    }

    #[test]
    fn test_print_array_unreadable_tail() {
        let mem = LocalMemory::new(0x1000, vec![1, 2]).with_hole(0x1001..0x1002);
        let mut out = TextRenderer::default();
        let opts = DecodeOptions::default();
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &NoIfNames);
        print_array(&mut ctx, 0x1000, 2, 1, |ctx, b, _| {
            ctx.out.value(Value::U(b[0] as u64))
        });
        assert_eq!(out.finish(), "[1, ... /* 0x1001 */]");
    }

    #[test]
    fn test_print_array_unreadable_head() {
        let mem = LocalMemory::default();
        let mut out = TextRenderer::default();
        let opts = DecodeOptions::default();
        let mut ctx = DecodeCtx::new(&mem, &mut out, &opts, &NoIfNames);
        print_array(&mut ctx, 0x1000, 2, 4, |_, _, _| {});
        assert_eq!(out.finish(), "0x1000");
    }
}
