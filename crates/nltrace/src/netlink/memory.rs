//! Access to the traced process's address space.
//!
//! Decoders never dereference foreign pointers. They ask a [`ForeignMemory`]
//! for a byte copy and decode the copy. A read either returns everything
//! that was asked for, a shorter prefix, or nothing at all. Reads are never
//! retried: the stopped thread's memory at this instant is the only truth.

use std::ops::Range;

use super::error::{Error, Result};

/// Outcome of a foreign memory read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch {
    /// All requested bytes.
    Full(Vec<u8>),
    /// A readable prefix shorter than requested.
    Partial(Vec<u8>),
    /// Nothing could be read.
    Failed,
}

/// Read-only view of another process's memory.
pub trait ForeignMemory {
    /// Read up to `len` bytes starting at `addr`.
    fn read(&self, addr: u64, len: usize) -> Fetch;
}

impl<M: ForeignMemory + ?Sized> ForeignMemory for &M {
    fn read(&self, addr: u64, len: usize) -> Fetch {
        (**self).read(addr, len)
    }
}

/// Read exactly `len` bytes or fail with [`Error::MemoryUnreadable`].
pub fn fetch_exact(mem: &dyn ForeignMemory, addr: u64, len: usize) -> Result<Vec<u8>> {
    match mem.read(addr, len) {
        Fetch::Full(bytes) => Ok(bytes),
        Fetch::Partial(_) | Fetch::Failed => {
            tracing::trace!(addr, len, "foreign read failed");
            Err(Error::MemoryUnreadable { addr, len })
        }
    }
}

/// A captured image of foreign memory.
///
/// The image starts at `base` and may contain unreadable holes, which lets
/// tests and offline decoding reproduce "page not mapped" conditions.
#[derive(Debug, Clone, Default)]
pub struct LocalMemory {
    base: u64,
    data: Vec<u8>,
    holes: Vec<Range<u64>>,
}

impl LocalMemory {
    /// Create an image of `data` mapped at `base`.
    pub fn new(base: u64, data: impl Into<Vec<u8>>) -> Self {
        Self {
            base,
            data: data.into(),
            holes: Vec::new(),
        }
    }

    /// Mark an address range as unreadable.
    pub fn with_hole(mut self, range: Range<u64>) -> Self {
        self.holes.push(range);
        self
    }

    /// Address of the first byte.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Number of bytes in the image.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the image is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Length of the readable run starting at `addr`.
    ///
    /// Works on offsets from `base` so an image ending at the top of the
    /// address space stays readable up to its last byte.
    fn readable_from(&self, addr: u64) -> usize {
        let Some(offset) = addr.checked_sub(self.base) else {
            return 0;
        };
        let Some(mut avail) = (self.data.len() as u64).checked_sub(offset) else {
            return 0;
        };
        for hole in &self.holes {
            if hole.contains(&addr) {
                return 0;
            }
            if hole.start > addr {
                avail = avail.min(hole.start - addr);
            }
        }
        avail as usize
    }
}

impl ForeignMemory for LocalMemory {
    fn read(&self, addr: u64, len: usize) -> Fetch {
        if len == 0 {
            return Fetch::Full(Vec::new());
        }
        let avail = self.readable_from(addr);
        if avail == 0 {
            return Fetch::Failed;
        }
        let start = (addr - self.base) as usize;
        let n = avail.min(len);
        let bytes = self.data[start..start + n].to_vec();
        if n == len {
            Fetch::Full(bytes)
        } else {
            Fetch::Partial(bytes)
        }
    }
}

/// Memory of a live (stopped) process, read with `process_vm_readv(2)`.
#[cfg(target_os = "linux")]
#[derive(Debug, Clone, Copy)]
pub struct ProcessMemory {
    pid: libc::pid_t,
}

#[cfg(target_os = "linux")]
impl ProcessMemory {
    /// Attach to the address space of `pid`.
    pub fn new(pid: u32) -> Result<Self> {
        let pid = libc::pid_t::try_from(pid)
            .map_err(|_| Error::InvalidInput(format!("pid {} out of range", pid)))?;
        Ok(Self { pid })
    }

    /// Process ID being read.
    pub fn pid(&self) -> u32 {
        self.pid as u32
    }
}

#[cfg(target_os = "linux")]
impl ForeignMemory for ProcessMemory {
    fn read(&self, addr: u64, len: usize) -> Fetch {
        if len == 0 {
            return Fetch::Full(Vec::new());
        }
        let mut buf = vec![0u8; len];
        let local = libc::iovec {
            iov_base: buf.as_mut_ptr().cast(),
            iov_len: len,
        };
        let remote = libc::iovec {
            iov_base: addr as usize as *mut libc::c_void,
            iov_len: len,
        };
        // SAFETY: `local` points at `len` writable bytes owned by `buf`; the
        // kernel validates `remote` against the target's address space.
        let n = unsafe { libc::process_vm_readv(self.pid, &local, 1, &remote, 1, 0) };
        if n <= 0 {
            tracing::debug!(
                pid = self.pid,
                addr,
                len,
                error = %std::io::Error::last_os_error(),
                "process_vm_readv failed"
            );
            return Fetch::Failed;
        }
        let n = n as usize;
        buf.truncate(n);
        if n == len {
            Fetch::Full(buf)
        } else {
            Fetch::Partial(buf)
        }
    }
}
