//! Undo/redo history of full state snapshots.
//!
//! Snapshots are independent copies, never diffs. The history is linear: pushing after
//! an undo discards everything that could have been redone.

use std::collections::VecDeque;

/// Bounded linear history. The entry at `cursor` is the current state.
#[derive(Debug, Clone)]
pub struct UndoRedoController<T: Clone> {
    snapshots: VecDeque<T>,
    cursor: usize,
    capacity: usize,
}

impl<T: Clone> UndoRedoController<T> {
    /// Creates a history holding `initial` that keeps at most `capacity` snapshots.
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(initial: T, capacity: usize) -> Self {
        let mut snapshots = VecDeque::with_capacity(capacity.max(1));
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Records `state` as the new current snapshot, dropping the redo branch and, when
    /// full, the oldest snapshot.
    pub fn push(&mut self, state: T) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(state);
        if self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
        }
        self.cursor = self.snapshots.len() - 1;
    }

    /// Steps back one snapshot. Returns `None` when already at the oldest.
    pub fn undo(&mut self) -> Option<&T> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.snapshots.get(self.cursor)
    }

    /// Steps forward one snapshot. Returns `None` when already at the newest.
    pub fn redo(&mut self) -> Option<&T> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        self.snapshots.get(self.cursor)
    }

    /// Discards all history and starts over from `initial`.
    pub fn reset(&mut self, initial: T) {
        self.snapshots.clear();
        self.snapshots.push_back(initial);
        self.cursor = 0;
    }

    /// Snapshot at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.snapshots.get(self.cursor)
    }

    /// Whether an older snapshot exists.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether an undone snapshot can be re-applied.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Number of stored snapshots, including the current one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when no snapshot is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
