//! Fault injection through the per-thread `fail-nth` control file.
//!
//! Writing `n` to `/proc/<pid>/task/<tid>/fail-nth` makes the `n`-th
//! fault-injectable call of that thread fail. Reading it back tells whether
//! the fault has been consumed (the kernel resets it to `0`).
//!
//! This is independent of the decoders; the tracer uses it around a
//! syscall to force error paths it then decodes.

use std::fs;
use std::path::{Path, PathBuf};

/// Fault injection errors.
#[derive(Debug, thiserror::Error)]
pub enum FaultError {
    /// The control file could not be read or written.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The control file was empty.
    #[error("{0}: empty fail-nth value")]
    Empty(PathBuf),
}

/// Result type for fault injection.
pub type Result<T> = std::result::Result<T, FaultError>;

/// Handle on one thread's `fail-nth` control file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailNth {
    path: PathBuf,
}

impl FailNth {
    /// The control file of the main thread of `pid`.
    pub fn for_thread(pid: u32) -> Self {
        Self::at(format!("/proc/{pid}/task/{pid}/fail-nth"))
    }

    /// A control file at an explicit path.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the control file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> FaultError {
        FaultError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Arm a fault on the `n`-th injectable call.
    pub fn set(&self, n: i32) -> Result<()> {
        tracing::debug!(path = %self.path.display(), n, "arming fault");
        fs::write(&self.path, n.to_string()).map_err(|e| self.io_err(e))
    }

    /// Read the current value and reset it to `0`.
    ///
    /// A value of `0` after a syscall means the armed fault was injected.
    pub fn consume(&self) -> Result<i32> {
        let text = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        if text.is_empty() {
            return Err(FaultError::Empty(self.path.clone()));
        }
        let value = parse_leading_int(&text);
        fs::write(&self.path, "0").map_err(|e| self.io_err(e))?;
        tracing::debug!(path = %self.path.display(), value, "fault counter consumed");
        Ok(value)
    }
}

/// Parse an optionally signed decimal prefix, `0` if there is none.
fn parse_leading_int(text: &str) -> i32 {
    let text = text.trim_start();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1i64, &text[1..]),
        Some(b'+') => (1, &text[1..]),
        _ => (1, text),
    };
    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = (value * 10 + (b - b'0') as i64).min(i32::MAX as i64 + 1);
    }
    (sign * value).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Arm a fault on the `n`-th injectable call of `pid`.
pub fn set_fail_nth(pid: u32, n: i32) -> Result<()> {
    FailNth::for_thread(pid).set(n)
}

/// Read and reset the fault counter of `pid`.
pub fn consume_and_reset_fail_counter(pid: u32) -> Result<i32> {
    FailNth::for_thread(pid).consume()
}
