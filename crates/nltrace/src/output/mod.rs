//! Output rendering for decoded messages.
//!
//! Decoders never format text. They describe what they decoded through the
//! [`Renderer`] trait: structure and array delimiters, named fields, typed
//! [`Value`]s and a handful of markers for data that could not be shown.
//! [`TextRenderer`] produces the familiar syscall tracer notation; with the
//! `json` feature, [`JsonRenderer`] builds a `serde_json` tree instead.

#[cfg(feature = "json")]
mod json;
mod text;

#[cfg(feature = "json")]
pub use json::JsonRenderer;
pub use text::{TextRenderer, quote_hex, quote_string};

pub use crate::xlat::XlatStyle;
use crate::xlat::Xlat;

/// Output format options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    /// How symbolic constants are printed.
    pub xlat_style: XlatStyle,
    /// Pretty print (for JSON).
    pub pretty: bool,
}

impl OutputOptions {
    /// Set the constant printing style.
    pub fn xlat_style(mut self, style: XlatStyle) -> Self {
        self.xlat_style = style;
        self
    }

    /// Enable pretty printing.
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text output.
    #[default]
    Text,
    /// JSON output.
    Json,
}

/// A decoded scalar, tagged with how it should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    /// Unsigned decimal.
    U(u64),
    /// Unsigned hexadecimal.
    X(u64),
    /// A single value looked up in a name table.
    Sym(&'static Xlat, u64),
    /// A bitmask decomposed against a name table.
    Flags {
        table: &'static Xlat,
        value: u64,
        /// Print the number with names in a comment unless raw output is requested.
        verbose: bool,
    },
    /// An attribute `nla_type`: flag bits followed by the masked kind.
    AttrType(&'static Xlat, u16),
    /// A C string. `more` means it was cut short or is unterminated.
    Str { bytes: &'a [u8], more: bool },
    /// Bytes printed in full as a hex-escaped string.
    Bytes(&'a [u8]),
    /// A port in network byte order, already converted to host order.
    NetPort(u16),
    /// A socket address buffer of the given family.
    InetAddr { family: u8, bytes: &'a [u8] },
    /// An interface index and its name, if resolved.
    IfIndex(u32, Option<&'a str>),
    /// A 64-bit socket cookie as two 32-bit halves.
    Cookie([u32; 2]),
}

/// Receiver of decoded structure.
///
/// Calls arrive in document order. A decoder emits `next` between sibling
/// fields or array elements, never before the first one.
pub trait Renderer {
    /// Open a structure.
    fn begin_struct(&mut self);

    /// Close a structure.
    fn end_struct(&mut self);

    /// Open an array.
    fn begin_array(&mut self);

    /// Close an array.
    fn end_array(&mut self);

    /// Separate two siblings.
    fn next(&mut self);

    /// Name the structure member that follows.
    fn field_name(&mut self, name: &str);

    /// Emit a value.
    fn value(&mut self, value: Value<'_>);

    /// Emit a named structure member.
    fn field(&mut self, name: &str, value: Value<'_>) {
        self.field_name(name);
        self.value(value);
    }

    /// Emit an array element with an explicit index.
    fn indexed(&mut self, index: Value<'_>, value: Value<'_>);

    /// Emit opaque bytes. `more` means only a prefix is shown.
    fn raw(&mut self, bytes: &[u8], more: bool);

    /// Emit a foreign address in place of data that could not be read.
    fn address(&mut self, addr: u64);

    /// Mark that more data follows than is shown.
    fn more_data(&mut self);

    /// Mark that more data follows, starting at an unreadable address.
    fn more_data_at(&mut self, addr: u64);

    /// Mark a known attribute whose payload has no decoder.
    fn unimplemented(&mut self, name: &str);

    /// Style used for symbolic constants.
    fn xlat_style(&self) -> XlatStyle;
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn begin_struct(&mut self) {
        (**self).begin_struct()
    }

    fn end_struct(&mut self) {
        (**self).end_struct()
    }

    fn begin_array(&mut self) {
        (**self).begin_array()
    }

    fn end_array(&mut self) {
        (**self).end_array()
    }

    fn next(&mut self) {
        (**self).next()
    }

    fn field_name(&mut self, name: &str) {
        (**self).field_name(name)
    }

    fn value(&mut self, value: Value<'_>) {
        (**self).value(value)
    }

    fn field(&mut self, name: &str, value: Value<'_>) {
        (**self).field(name, value)
    }

    fn indexed(&mut self, index: Value<'_>, value: Value<'_>) {
        (**self).indexed(index, value)
    }

    fn raw(&mut self, bytes: &[u8], more: bool) {
        (**self).raw(bytes, more)
    }

    fn address(&mut self, addr: u64) {
        (**self).address(addr)
    }

    fn more_data(&mut self) {
        (**self).more_data()
    }

    fn more_data_at(&mut self, addr: u64) {
        (**self).more_data_at(addr)
    }

    fn unimplemented(&mut self, name: &str) {
        (**self).unimplemented(name)
    }

    fn xlat_style(&self) -> XlatStyle {
        (**self).xlat_style()
    }
}
