//! Change Log (undo/redo).
//!
//! The log is an arena of [`Change`] records plus one integer cursor: `current` counts the
//! records that are applied to the buffer. `current == 0` is the head of the history, which
//! can never be undone. Recording a change while `current` is behind the end discards the redo
//! branch.
//!
//! The log is not synchronized. Only the thread that edits the buffer should record, undo or
//! redo, and every buffer mutation must be recorded in the same step (see
//! [`crate::EditSession`]), otherwise the log no longer describes the buffer.

use crate::buffer::TextBuffer;
use crate::position::Position;
use tracing::trace;

/// Whether a change inserted or deleted its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A character was inserted. Undone by a deletion.
    Insertion,
    /// A character was deleted. Undone by an insertion.
    Deletion,
}

/// One reversible character-level edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    /// Kind of edit.
    pub kind: ChangeKind,
    /// The inserted or deleted character.
    pub payload: char,
    /// Cursor before the edit.
    pub before: Position,
    /// Cursor after the edit.
    pub after: Position,
}

impl Change {
    /// Record an insertion of `payload` that moved the cursor from `before` to `after`.
    pub fn insertion(payload: char, before: Position, after: Position) -> Self {
        Self {
            kind: ChangeKind::Insertion,
            payload,
            before,
            after,
        }
    }

    /// Record a deletion of `payload` that moved the cursor from `before` to `after`.
    pub fn deletion(payload: char, before: Position, after: Position) -> Self {
        Self {
            kind: ChangeKind::Deletion,
            payload,
            before,
            after,
        }
    }

    /// Where the edit was applied.
    pub fn position(&self) -> Position {
        self.before
    }

    fn revert(&self, buffer: &TextBuffer) {
        buffer.set_cursor(self.after, true);
        match self.kind {
            ChangeKind::Insertion => {
                buffer.delete_char();
            }
            ChangeKind::Deletion => {
                buffer.insert(self.payload);
            }
        }
    }

    fn replay(&self, buffer: &TextBuffer) {
        buffer.set_cursor(self.before, true);
        match self.kind {
            ChangeKind::Insertion => {
                buffer.insert(self.payload);
            }
            ChangeKind::Deletion => {
                buffer.delete_char();
            }
        }
    }
}

/// Linear undo/redo history.
///
/// # Example
///
/// ```rust
/// use editor_buffer::{Change, History, TextBuffer};
///
/// let buffer = TextBuffer::empty();
/// let mut history = History::new();
///
/// let before = buffer.cursor();
/// let after = buffer.insert('a');
/// history.add_change(Change::insertion('a', before, after));
///
/// assert!(history.undo(&buffer));
/// assert_eq!(buffer.line(0).as_deref(), Some("\n"));
/// assert!(history.redo(&buffer));
/// assert_eq!(buffer.line(0).as_deref(), Some("a\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct History {
    changes: Vec<Change>,
    current: usize,
    max_changes: Option<usize>,
}

impl History {
    /// Create an empty, unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a history that keeps at most `max_changes` applied changes, forgetting the
    /// oldest ones first.
    pub fn with_limit(max_changes: usize) -> Self {
        Self {
            max_changes: Some(max_changes),
            ..Self::default()
        }
    }

    /// Append a change that has just been applied to the buffer.
    ///
    /// Any changes that were undone and not redone are discarded.
    pub fn add_change(&mut self, change: Change) {
        if self.current < self.changes.len() {
            trace!(
                discarded = self.changes.len() - self.current,
                "pruning redo branch"
            );
            self.changes.truncate(self.current);
        }

        self.changes.push(change);
        self.current = self.changes.len();

        if let Some(max) = self.max_changes
            && self.changes.len() > max
        {
            let excess = self.changes.len() - max;
            self.changes.drain(..excess);
            self.current = self.changes.len();
        }
    }

    /// Revert the most recent applied change. Returns `false` at the head of the history.
    pub fn undo(&mut self, buffer: &TextBuffer) -> bool {
        if self.current == 0 {
            return false;
        }
        let change = self.changes[self.current - 1];
        trace!(kind = ?change.kind, at = %change.position(), "undo");
        change.revert(buffer);
        self.current -= 1;
        true
    }

    /// Re-apply the next undone change. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self, buffer: &TextBuffer) -> bool {
        let Some(change) = self.changes.get(self.current).copied() else {
            return false;
        };
        trace!(kind = ?change.kind, at = %change.position(), "redo");
        change.replay(buffer);
        self.current += 1;
        true
    }

    /// Can undo.
    pub fn can_undo(&self) -> bool {
        self.current > 0
    }

    /// Can redo.
    pub fn can_redo(&self) -> bool {
        self.current < self.changes.len()
    }

    /// Number of changes that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.current
    }

    /// Number of changes that can be redone.
    pub fn redo_depth(&self) -> usize {
        self.changes.len() - self.current
    }

    /// The change that the next [`History::undo`] reverts.
    pub fn current(&self) -> Option<&Change> {
        self.current.checked_sub(1).and_then(|i| self.changes.get(i))
    }

    /// Forget every change.
    pub fn clear(&mut self) {
        self.changes.clear();
        self.current = 0;
    }
}
