//! Handle lifecycle bookkeeping.
//!
//! A handle is `Open` from a successful parse until its first release and
//! `Closed` forever after. [`HandleCell`] guards one value behind a read-write
//! lock: accessors hold the read side for the whole access, release takes the
//! write side, so a release never lands in the middle of an access.
//! [`HandleTable`] maps integer ids to shared handles for the id-based ABI.

use crate::common::{Error, Result};
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Open/closed state around an owned value.
#[derive(Debug)]
pub struct HandleCell<T> {
    state: RwLock<Option<T>>,
}

impl<T> HandleCell<T> {
    pub fn new(value: T) -> Self {
        Self {
            state: RwLock::new(Some(value)),
        }
    }

    /// Borrow the value for the duration of the guard.
    ///
    /// Fails with [`Error::InvalidState`] once the cell is closed.
    pub fn read(&self) -> Result<MappedRwLockReadGuard<'_, T>> {
        RwLockReadGuard::try_map(self.state.read(), Option::as_ref)
            .map_err(|_| Error::InvalidState("handle has been released".to_string()))
    }

    /// Drop the value. Returns whether this call did the closing.
    pub fn close(&self) -> bool {
        self.state.write().take().is_some()
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.state.read().is_some()
    }
}

/// Identifier handed out by a [`HandleTable`]. Zero is never issued.
pub type HandleId = u64;

/// Shared handles addressed by id.
///
/// Ids come from a monotonic counter and are never reused. Released entries
/// are removed from the map, so storage tracks the number of open handles.
#[derive(Debug)]
pub struct HandleTable<T> {
    next_id: AtomicU64,
    handles: RwLock<HashMap<HandleId, Arc<T>>>,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            handles: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, value: T) -> HandleId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handles.write().insert(id, Arc::new(value));
        log::trace!("handle {} opened", id);
        id
    }

    /// Look up an open handle.
    pub fn get(&self, id: HandleId) -> Result<Arc<T>> {
        self.handles
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::InvalidState(format!("handle {} is not open", id)))
    }

    /// Remove the entry and return what it held.
    ///
    /// Unknown and already released ids yield `None`.
    pub fn remove(&self, id: HandleId) -> Option<Arc<T>> {
        let removed = self.handles.write().remove(&id);
        match &removed {
            Some(_) => log::trace!("handle {} closed", id),
            None => log::debug!("release of handle {} ignored: not open", id),
        }
        removed
    }

    /// Number of open handles.
    #[inline]
    pub fn live(&self) -> usize {
        self.handles.read().len()
    }
}
