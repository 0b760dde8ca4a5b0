//! Bounded linear undo/redo history of full-canvas snapshots.

use std::collections::VecDeque;

/// Default number of snapshots retained.
pub const DEFAULT_MAX_ENTRIES: usize = 50;

/// One immutable full-canvas snapshot, PNG-encoded.
#[derive(Clone)]
pub struct HistoryEntry {
    png: Vec<u8>,
}

impl HistoryEntry {
    pub fn new(png: Vec<u8>) -> Self {
        Self { png }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn memory_size(&self) -> usize {
        self.png.len()
    }
}

/// Bounded snapshot list with a current-index cursor.
///
/// Invariants: `0 <= index < len <= max_entries` whenever the history is
/// non-empty. Pushing while the cursor sits behind the tail discards the
/// now-unreachable future; overflowing the bound evicts the oldest entry and
/// pulls the cursor back with it.
pub struct SnapshotHistory {
    entries: VecDeque<HistoryEntry>,
    index: usize,
    max_entries: usize,
    /// Running byte total across all entries.
    total_memory: usize,
}

impl Default for SnapshotHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl SnapshotHistory {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: 0,
            max_entries: max_entries.max(1),
            total_memory: 0,
        }
    }

    /// Append a committed snapshot and move the cursor to it.
    pub fn push(&mut self, entry: HistoryEntry) {
        // Branch discard: entries after the cursor are unreachable once a
        // new mutation commits.
        while self.entries.len() > self.index + 1 {
            if let Some(e) = self.entries.pop_back() {
                self.total_memory = self.total_memory.saturating_sub(e.memory_size());
            }
        }

        self.total_memory += entry.memory_size();
        self.entries.push_back(entry);
        self.index = self.entries.len() - 1;

        while self.entries.len() > self.max_entries {
            if let Some(e) = self.entries.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(e.memory_size());
            }
            self.index = self.index.saturating_sub(1);
        }
    }

    /// Step the cursor back and return the entry to restore. No-op at the
    /// oldest entry.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if self.index == 0 || self.entries.is_empty() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index)
    }

    /// Step the cursor forward and return the entry to restore. No-op at the
    /// tail.
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index)
    }

    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte total across all retained snapshots (O(1), cached).
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = 0;
        self.total_memory = 0;
    }
}

// ============================================================================
// TESTS
// ============================================================================
