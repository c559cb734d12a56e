use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{CoreError, HistoryEntry, HistoryStore};

/// Matches the history view of the browser UI.
pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded, newest-first history kept in memory. Once full, recording a new
/// entry drops the oldest one.
pub struct InMemoryHistory {
    inner: Mutex<VecDeque<HistoryEntry>>,
    capacity: usize,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore for InMemoryHistory {
    fn record(&self, entry: HistoryEntry) -> Result<(), CoreError> {
        let mut entries = self
            .inner
            .lock()
            .map_err(|_| CoreError::History("mutex poisoned".into()))?;
        entries.push_front(entry);
        entries.truncate(self.capacity);
        Ok(())
    }

    fn recent(&self, limit: usize) -> Result<Vec<HistoryEntry>, CoreError> {
        let entries = self
            .inner
            .lock()
            .map_err(|_| CoreError::History("mutex poisoned".into()))?;
        Ok(entries.iter().take(limit).cloned().collect())
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.inner
            .lock()
            .map_err(|_| CoreError::History("mutex poisoned".into()))?
            .clear();
        Ok(())
    }
}
