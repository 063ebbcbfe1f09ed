//! Symbolic name tables for numeric protocol constants.
//!
//! An [`Xlat`] maps values to names. Tables are immutable statics shared by
//! every decode call. Formatting follows the conventions of syscall tracers:
//!
//! ```
//! use nltrace::xlat::{XlatStyle, tables};
//!
//! assert_eq!(tables::ADDRFAMS.format(2, XlatStyle::Abbrev), "AF_INET");
//! assert_eq!(tables::ADDRFAMS.format(46, XlatStyle::Abbrev), "0x2e /* AF_??? */");
//! assert_eq!(
//!     tables::INET_DIAG_SHUTDOWN_FLAGS.format_flags(23, XlatStyle::Verbose),
//!     "0x17 /* RCV_SHUTDOWN|SEND_SHUTDOWN|0x14 */"
//! );
//! ```

pub mod tables;

use std::fmt::Write;

/// How symbolic constants are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum XlatStyle {
    /// Names only, numbers for what has no name.
    #[default]
    Abbrev,
    /// Numbers only.
    Raw,
    /// Numbers followed by names in a comment.
    Verbose,
}

/// Radix used for values that have no name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumFmt {
    /// `0x2e`
    Hex,
    /// `46`
    Dec,
}

/// Format a number the way C's `%#x` does: zero has no prefix.
pub fn c_hex(value: u64) -> String {
    if value == 0 {
        "0".to_string()
    } else {
        format!("{:#x}", value)
    }
}

/// A value-to-name table.
#[derive(Debug, PartialEq, Eq)]
pub struct Xlat {
    /// Placeholder for values missing from the table, e.g. `AF_???`.
    pub dflt: &'static str,
    /// Radix for unnamed values.
    pub fmt: NumFmt,
    /// Entries in match order. Flag decomposition is greedy in this order.
    pub entries: &'static [(u64, &'static str)],
}

impl Xlat {
    /// Look up the name of an exact value.
    pub fn lookup(&self, value: u64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, name)| *name)
    }

    /// Split a bitmask into known flag names and the residual unknown bits.
    pub fn decompose(&self, value: u64) -> (Vec<&'static str>, u64) {
        let mut names = Vec::new();
        let mut rest = value;
        for &(bits, name) in self.entries {
            if bits != 0 && rest & bits == bits {
                names.push(name);
                rest &= !bits;
            }
        }
        (names, rest)
    }

    fn number(&self, value: u64) -> String {
        match self.fmt {
            NumFmt::Hex => c_hex(value),
            NumFmt::Dec => value.to_string(),
        }
    }

    /// Format a single value.
    pub fn format(&self, value: u64, style: XlatStyle) -> String {
        let name = self.lookup(value);
        match (style, name) {
            (XlatStyle::Raw, _) => self.number(value),
            (XlatStyle::Abbrev, Some(name)) => name.to_string(),
            (_, Some(name)) => format!("{} /* {} */", self.number(value), name),
            (_, None) => format!("{} /* {} */", self.number(value), self.dflt),
        }
    }

    /// Format a bitmask as `A|B|0x14`.
    pub fn format_flags(&self, value: u64, style: XlatStyle) -> String {
        if value == 0 {
            return match (style, self.lookup(0)) {
                (XlatStyle::Abbrev, Some(name)) => name.to_string(),
                _ => "0".to_string(),
            };
        }
        if style == XlatStyle::Raw {
            return c_hex(value);
        }

        let (names, rest) = self.decompose(value);
        if names.is_empty() {
            return format!("{:#x} /* {} */", value, self.dflt);
        }

        let mut joined = names.join("|");
        if rest != 0 {
            let _ = write!(joined, "|{:#x}", rest);
        }
        match style {
            XlatStyle::Verbose => format!("{:#x} /* {} */", value, joined),
            _ => joined,
        }
    }
}
