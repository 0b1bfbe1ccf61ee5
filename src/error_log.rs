//! In-memory log of raw submissions that failed validation.
//!
//! The log is owned by whoever builds the server and shared with the handlers
//! through `web::Data`. Every operation takes the same lock, so appends from
//! concurrent requests are never lost and a clear never interleaves with a read.

use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
pub struct ErrorLog {
    entries: Mutex<VecDeque<String>>,
    capacity: Option<NonZeroUsize>,
}

impl ErrorLog {
    /// Creates an empty log. With a capacity, the oldest entry is dropped once
    /// the log is full; `None` lets it grow without bound.
    pub fn new(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    /// Appends a raw submission and returns the entry evicted to make room, if any.
    pub fn append(&self, raw: impl Into<String>) -> Option<String> {
        let mut entries = self.lock();
        let evicted = match self.capacity {
            Some(capacity) if entries.len() >= capacity.get() => entries.pop_front(),
            _ => None,
        };
        entries.push_back(raw.into());
        evicted
    }

    /// Copy of the current entries in append order.
    pub fn snapshot(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    /// Removes every entry and returns how many were dropped.
    pub fn clear(&self) -> usize {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave the deque half-written,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::unbounded()
    }
}
