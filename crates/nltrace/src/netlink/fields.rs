//! Length-aware rendering of versioned structures.
//!
//! Kernels grow some structures by appending fields, and a payload carries
//! only as many as the sender knew about. A structure is described by an
//! ordered table of [`FieldSpec`]s and [`print_fields`] shows exactly the
//! fields that fit in the supplied length. Missing fields are omitted, not
//! defaulted.

use super::error::{Error, Result};
use crate::output::{Renderer, Value};

/// How a field value is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFmt {
    /// Unsigned decimal.
    U,
    /// Hexadecimal.
    X,
}

/// One field of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name.
    pub name: &'static str,
    /// Byte offset within the structure.
    pub offset: usize,
    /// Size in bytes: 1, 2, 4 or 8.
    pub size: usize,
    /// Print format.
    pub fmt: FieldFmt,
}

impl FieldSpec {
    /// An unsigned decimal field.
    pub const fn u(name: &'static str, offset: usize, size: usize) -> Self {
        Self {
            name,
            offset,
            size,
            fmt: FieldFmt::U,
        }
    }

    /// A hexadecimal field.
    pub const fn x(name: &'static str, offset: usize, size: usize) -> Self {
        Self {
            name,
            offset,
            size,
            fmt: FieldFmt::X,
        }
    }

    /// End offset of the field.
    pub const fn end(&self) -> usize {
        self.offset + self.size
    }

    /// Read the field from a structure image in native byte order.
    pub fn read(&self, bytes: &[u8]) -> Option<u64> {
        let b = bytes.get(self.offset..self.end())?;
        let v = match self.size {
            1 => b[0] as u64,
            2 => u16::from_ne_bytes(b.try_into().ok()?) as u64,
            4 => u32::from_ne_bytes(b.try_into().ok()?) as u64,
            8 => u64::from_ne_bytes(b.try_into().ok()?),
            _ => return None,
        };
        Some(v)
    }
}

/// Minimum payload length for a structure: the end of its first field.
pub const fn min_len(fields: &[FieldSpec]) -> usize {
    if fields.is_empty() { 0 } else { fields[0].end() }
}

/// Check that `len` bytes of a `kind` structure cover its first field.
pub fn check_min_len(kind: &'static str, fields: &[FieldSpec], len: usize) -> Result<()> {
    let expected = min_len(fields);
    if len < expected {
        return Err(Error::PayloadTooShort {
            kind,
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Render the fields of `bytes` that fit within `len` as a structure.
pub fn print_fields(out: &mut dyn Renderer, fields: &[FieldSpec], bytes: &[u8], len: usize) {
    out.begin_struct();
    let mut first = true;
    for field in fields {
        if len < field.end() {
            break;
        }
        let Some(v) = field.read(bytes) else {
            break;
        };
        if !first {
            out.next();
        }
        first = false;
        let value = match field.fmt {
            FieldFmt::U => Value::U(v),
            FieldFmt::X => Value::X(v),
        };
        out.field(field.name, value);
    }
    out.end_struct();
}
