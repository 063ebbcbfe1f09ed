//! Text rendering in syscall tracer notation.

use std::fmt::Write;

use super::{OutputOptions, Renderer, Value};
use crate::netlink::attr::NLA_TYPE_MASK;
use crate::util::addr::{AF_INET, AF_INET6, format_inet};
use crate::xlat::tables::NLA_TYPE_FLAGS;
use crate::xlat::{XlatStyle, c_hex};

/// Quote bytes as a C string literal.
///
/// Printable ASCII is kept, common control characters use their letter
/// escapes, everything else is written in octal.
pub fn quote_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 2);
    out.push('"');
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            0x0b => out.push_str("\\v"),
            0x0c => out.push_str("\\f"),
            b'\r' => out.push_str("\\r"),
            0x20..=0x7e => out.push(b as char),
            _ => {
                // Short octal escapes are ambiguous before a digit.
                let next_is_digit = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
                if next_is_digit {
                    let _ = write!(out, "\\{:03o}", b);
                } else {
                    let _ = write!(out, "\\{:o}", b);
                }
            }
        }
    }
    out.push('"');
    out
}

/// Quote bytes as a string of `\x` escapes.
pub fn quote_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4 + 2);
    out.push('"');
    for b in bytes {
        let _ = write!(out, "\\x{:02x}", b);
    }
    out.push('"');
    out
}

/// Renders into an in-memory string.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    buf: String,
    opts: OutputOptions,
}

impl TextRenderer {
    /// Create a renderer.
    pub fn new(opts: OutputOptions) -> Self {
        Self {
            buf: String::new(),
            opts,
        }
    }

    /// Text rendered so far.
    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Consume the renderer and return the text.
    pub fn finish(self) -> String {
        self.buf
    }

    fn format_value(&self, value: Value<'_>) -> String {
        let style = self.opts.xlat_style;
        match value {
            Value::U(v) => v.to_string(),
            Value::X(v) => c_hex(v),
            Value::Sym(table, v) => table.format(v, style),
            Value::Flags {
                table,
                value,
                verbose,
            } => {
                let style = if verbose && style != XlatStyle::Raw {
                    XlatStyle::Verbose
                } else {
                    style
                };
                table.format_flags(value, style)
            }
            Value::AttrType(table, raw) => {
                if style == XlatStyle::Raw {
                    return c_hex(raw as u64);
                }
                let (flags, _) = NLA_TYPE_FLAGS.decompose((raw & !NLA_TYPE_MASK) as u64);
                let mut s = String::new();
                for flag in flags {
                    s.push_str(flag);
                    s.push('|');
                }
                s.push_str(&table.format((raw & NLA_TYPE_MASK) as u64, style));
                s
            }
            Value::Str { bytes, more } => {
                let mut s = quote_string(bytes);
                if more {
                    s.push_str("...");
                }
                s
            }
            Value::Bytes(bytes) => quote_hex(bytes),
            Value::NetPort(port) => format!("htons({})", port),
            Value::InetAddr { family, bytes } => match (family, format_inet(family, bytes)) {
                (AF_INET, Some(addr)) => format!("inet_addr(\"{}\")", addr),
                (AF_INET6, Some(addr)) => format!("inet_pton(AF_INET6, \"{}\")", addr),
                _ => quote_hex(bytes),
            },
            Value::IfIndex(_, Some(name)) => format!("if_nametoindex(\"{}\")", name),
            Value::IfIndex(index, None) => index.to_string(),
            Value::Cookie([lo, hi]) => format!("[{}, {}]", lo, hi),
        }
    }
}

impl Renderer for TextRenderer {
    fn begin_struct(&mut self) {
        self.buf.push('{');
    }

    fn end_struct(&mut self) {
        self.buf.push('}');
    }

    fn begin_array(&mut self) {
        self.buf.push('[');
    }

    fn end_array(&mut self) {
        self.buf.push(']');
    }

    fn next(&mut self) {
        self.buf.push_str(", ");
    }

    fn field_name(&mut self, name: &str) {
        self.buf.push_str(name);
        self.buf.push('=');
    }

    fn value(&mut self, value: Value<'_>) {
        let s = self.format_value(value);
        self.buf.push_str(&s);
    }

    fn field(&mut self, name: &str, value: Value<'_>) {
        // An IPv6 member reads as the call that would fill it in.
        if let Value::InetAddr {
            family: AF_INET6,
            bytes,
        } = value
            && let Some(addr) = format_inet(AF_INET6, bytes)
        {
            let _ = write!(self.buf, "inet_pton(AF_INET6, \"{}\", &{})", addr, name);
            return;
        }
        self.field_name(name);
        self.value(value);
    }

    fn indexed(&mut self, index: Value<'_>, value: Value<'_>) {
        let index = self.format_value(index);
        let value = self.format_value(value);
        let _ = write!(self.buf, "[{}] = {}", index, value);
    }

    fn raw(&mut self, bytes: &[u8], more: bool) {
        self.buf.push_str(&quote_hex(bytes));
        if more {
            self.buf.push_str("...");
        }
    }

    fn address(&mut self, addr: u64) {
        if addr == 0 {
            self.buf.push_str("NULL");
        } else {
            let _ = write!(self.buf, "{:#x}", addr);
        }
    }

    fn more_data(&mut self) {
        self.buf.push_str("...");
    }

    fn more_data_at(&mut self, addr: u64) {
        let _ = write!(self.buf, "... /* {:#x} */", addr);
    }

    fn unimplemented(&mut self, name: &str) {
        let _ = write!(self.buf, "/* {}: unimplemented */", name);
    }

    fn xlat_style(&self) -> XlatStyle {
        self.opts.xlat_style
    }
}
