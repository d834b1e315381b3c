//! Bounded undo/redo ring for preview sessions

use super::params::PreviewParams;
use crate::assets::MeshHandle;
use std::collections::VecDeque;
use std::time::Instant;

/// Default number of entries kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// One recorded preview step
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Parameters the mesh was produced with
    pub params: PreviewParams,
    /// Resulting ghost mesh
    pub mesh: MeshHandle,
    /// When the step was recorded
    pub timestamp: Instant,
}

/// Ring of preview steps with a cursor at the current one
///
/// Pushing while the cursor is behind the tail drops the redo branch. When the
/// ring is full the oldest entry is evicted and the cursor stays at the tail.
#[derive(Debug, Clone)]
pub struct PreviewHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
    cursor: usize,
}

impl PreviewHistory {
    /// Empty history holding at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            cursor: 0,
        }
    }

    /// Record a step and move the cursor onto it
    pub fn push(&mut self, params: PreviewParams, mesh: MeshHandle) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(HistoryEntry {
            params,
            mesh,
            timestamp: Instant::now(),
        });
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back; returns the entry now under the cursor
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    /// Step forward; returns the entry now under the cursor
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    /// Whether an older entry exists
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a newer entry exists
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Entry under the cursor
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    /// Cursor position
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of recorded entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}

impl Default for PreviewHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
