//! Parsing of captured buffers written as hex text.
//!
//! Accepts the forms produced by common tools and by the text renderer
//! itself: bare digit pairs (`14000000`), space or comma separated bytes,
//! `0x`-prefixed bytes, `\x`-escaped strings and `#` comments.
//!
//! ```
//! use nltrace::util::hexdump::parse_hex;
//!
//! assert_eq!(parse_hex("08 00 0f 00").unwrap(), vec![8, 0, 15, 0]);
//! assert_eq!(parse_hex("0x08, 0x00 # nla_len").unwrap(), vec![8, 0]);
//! assert_eq!(parse_hex("\"\\x08\\x00\"").unwrap(), vec![8, 0]);
//! ```

use winnow::ascii::multispace1;
use winnow::combinator::{alt, opt, preceded, repeat, terminated};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::stream::AsChar;
use winnow::token::{take_till, take_while};

/// Result type for winnow parsers.
pub type PResult<T> = core::result::Result<T, winnow::error::ErrMode<ContextError>>;

/// Error type for hex dump parsing.
#[derive(Debug, thiserror::Error)]
pub enum HexError {
    #[error("invalid hex dump at offset {offset}: {message}")]
    Invalid { offset: usize, message: String },
}

pub type Result<T> = std::result::Result<T, HexError>;

fn comment(input: &mut &str) -> PResult<()> {
    ("#", take_till(0.., '\n')).void().parse_next(input)
}

fn noise(input: &mut &str) -> PResult<()> {
    repeat(0.., alt((multispace1.void(), ",".void(), "\"".void(), comment))).parse_next(input)
}

fn hex_byte(input: &mut &str) -> PResult<u8> {
    preceded(
        opt(alt(("0x", "0X", "\\x"))),
        take_while(2, AsChar::is_hex_digit),
    )
    .try_map(|digits: &str| u8::from_str_radix(digits, 16))
    .parse_next(input)
}

fn hexdump(input: &mut &str) -> PResult<Vec<u8>> {
    noise.parse_next(input)?;
    repeat(0.., terminated(hex_byte, noise)).parse_next(input)
}

/// Parse a hex dump into bytes.
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    hexdump.parse(text).map_err(|e| HexError::Invalid {
        offset: e.offset(),
        message: e.inner().to_string(),
    })
}

/// Format bytes as a space separated hex dump, 16 bytes per line.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .chunks(16)
        .map(|line| {
            line.iter()
                .map(|b| format!("{:02x}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
