//! Registry of buffers handed across the boundary.
//!
//! Every string and byte buffer returned to a host stays owned by the
//! registry until the host frees it. A free looks the pointer up first, so a
//! second free of the same pointer, or a free of a pointer the engine never
//! returned, is reported and ignored instead of reaching the allocator.

use crate::common::{Error, Result};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ffi::{CString, c_char};

#[derive(Debug)]
enum Allocation {
    Text(CString),
    Bytes(Box<[u8]>),
}

/// Live allocations keyed by address.
#[derive(Debug, Default)]
pub struct BufferRegistry {
    live: Mutex<HashMap<usize, Allocation>>,
}

static GLOBAL: Lazy<BufferRegistry> = Lazy::new(BufferRegistry::new);

impl BufferRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry behind the C ABI.
    #[inline]
    pub fn global() -> &'static BufferRegistry {
        &GLOBAL
    }

    /// Hand out a NUL-terminated copy of `text`.
    ///
    /// Text with an interior NUL cannot cross the boundary and fails with
    /// [`Error::RenderError`].
    pub fn alloc_string(&self, text: String) -> Result<*mut c_char> {
        let text = CString::new(text)
            .map_err(|e| Error::RenderError(format!("string contains NUL at {}", e.nul_position())))?;
        let ptr = text.as_ptr() as *mut c_char;
        self.live.lock().insert(ptr as usize, Allocation::Text(text));
        Ok(ptr)
    }

    /// Hand out a copy of `data`. Empty buffers are not allocated.
    pub fn alloc_bytes(&self, data: &[u8]) -> Result<(*mut u8, usize)> {
        if data.is_empty() {
            return Err(Error::InvalidArgument("empty buffer".to_string()));
        }
        let mut buffer: Box<[u8]> = data.into();
        let ptr = buffer.as_mut_ptr();
        let len = buffer.len();
        self.live.lock().insert(ptr as usize, Allocation::Bytes(buffer));
        Ok((ptr, len))
    }

    /// Release a string from [`alloc_string`](Self::alloc_string).
    ///
    /// Null is a no-op. Unknown pointers fail with [`Error::InvalidState`].
    pub fn free_string(&self, ptr: *const c_char) -> Result<()> {
        if ptr.is_null() {
            return Ok(());
        }
        let mut live = self.live.lock();
        match live.remove(&(ptr as usize)) {
            Some(Allocation::Text(_)) => Ok(()),
            Some(other) => {
                live.insert(ptr as usize, other);
                Err(reject(ptr as usize, "is a byte buffer, not a string"))
            },
            None => Err(reject(ptr as usize, "is not a live string")),
        }
    }

    /// Release a buffer from [`alloc_bytes`](Self::alloc_bytes).
    ///
    /// `len` must match the length returned at allocation.
    pub fn free_bytes(&self, ptr: *const u8, len: usize) -> Result<()> {
        if ptr.is_null() {
            return Ok(());
        }
        let mut live = self.live.lock();
        match live.remove(&(ptr as usize)) {
            Some(Allocation::Bytes(buffer)) if buffer.len() == len => Ok(()),
            Some(other) => {
                live.insert(ptr as usize, other);
                Err(reject(ptr as usize, "does not match the length or type it was allocated with"))
            },
            None => Err(reject(ptr as usize, "is not a live buffer")),
        }
    }

    /// Number of allocations not yet freed.
    pub fn live(&self) -> usize {
        self.live.lock().len()
    }
}

fn reject(address: usize, reason: &str) -> Error {
    log::warn!("free of {:#x} rejected: pointer {}", address, reason);
    Error::InvalidState(format!("pointer {:#x} {}", address, reason))
}
