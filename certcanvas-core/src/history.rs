//! Linear undo/redo over full snapshots.
//!
//! ```text
//!   entries:  [s0] [s1] [s2] [s3]
//!                        ^cursor
//!   undo -> s1           redo -> s3
//!   record(s4) here drops s3 and appends: [s0] [s1] [s2] [s4]
//! ```
//!
//! Snapshots are owned values, so later edits to the live scene cannot
//! reach back into history.

/// Undo/redo stack of snapshots with a cursor at the current state.
#[derive(Debug, Clone)]
pub struct History<T> {
    entries: Vec<T>,
    /// Index of the current entry; `None` before the first record.
    cursor: Option<usize>,
    /// Maximum number of entries kept; oldest are dropped first.
    limit: Option<usize>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> History<T> {
    /// Create an empty, unbounded history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            limit: None,
        }
    }

    /// Create an empty history that keeps at most `limit` entries.
    ///
    /// A limit of zero is treated as one.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::new()
        }
    }

    /// Record a new current state, discarding any redo-able future.
    pub fn record(&mut self, snapshot: T) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(snapshot);

        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let excess = self.entries.len() - limit;
                self.entries.drain(..excess);
            }
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one entry. No-op at the start of history.
    pub fn undo(&mut self) -> Option<&T> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.entries.get(c - 1)
            }
            _ => None,
        }
    }

    /// Step forward one entry. No-op at the end of history.
    pub fn redo(&mut self) -> Option<&T> {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                self.entries.get(c + 1)
            }
            _ => None,
        }
    }

    /// The entry at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// Whether [`History::undo`] would move.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// Whether [`History::redo`] would move.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// Cursor position, `None` when empty.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of entries, past and future.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_is_inert() {
        let mut history: History<u32> = History::new();
        assert!(history.undo().is_none());
        assert!(history.redo().is_none());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.cursor(), None);
    }

    #[test]
    fn test_first_record_sets_cursor_zero() {
        let mut history = History::new();
        history.record("a");
        assert_eq!(history.cursor(), Some(0));
        assert_eq!(history.current(), Some(&"a"));
        // A single entry has nothing before it
        assert!(history.undo().is_none());
        assert_eq!(history.cursor(), Some(0));
    }

    #[test]
    fn test_undo_redo_walks_entries() {
        let mut history = History::new();
        for s in ["a", "b", "c"] {
            history.record(s);
        }
        assert_eq!(history.undo(), Some(&"b"));
        assert_eq!(history.undo(), Some(&"a"));
        assert!(history.undo().is_none());
        assert_eq!(history.redo(), Some(&"b"));
        assert_eq!(history.redo(), Some(&"c"));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_record_after_undo_discards_future() {
        let mut history = History::new();
        for s in ["a", "b", "c"] {
            history.record(s);
        }
        history.undo();
        history.record("d");
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
        assert_eq!(history.len(), 3);
        assert_eq!(history.undo(), Some(&"b"));
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::with_limit(2);
        for s in ["a", "b", "c"] {
            history.record(s);
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), Some(1));
        assert_eq!(history.undo(), Some(&"b"));
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_clear() {
        let mut history = History::new();
        history.record(1);
        history.clear();
        assert!(history.is_empty());
        assert!(history.current().is_none());
    }
}
