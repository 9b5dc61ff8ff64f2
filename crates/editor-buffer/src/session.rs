//! Editing session.
//!
//! [`EditSession`] is the foreground editor: it owns the [`History`] and pairs each buffer
//! mutation with its record, so the history always describes the buffer. The buffer itself is
//! shared, and background readers may hold clones of it.

use crate::buffer::TextBuffer;
use crate::error::Result;
use crate::history::{Change, History};
use crate::options::BufferOptions;
use crate::position::Position;
use std::path::Path;
use std::sync::Arc;

/// Foreground editor over a shared [`TextBuffer`].
///
/// # Example
///
/// ```rust
/// use editor_buffer::EditSession;
///
/// let mut session = EditSession::new("");
/// for ch in "abc".chars() {
///     session.insert(ch);
/// }
/// assert_eq!(session.buffer().line(0).as_deref(), Some("abc\n"));
///
/// while session.undo() {}
/// assert_eq!(session.buffer().line(0).as_deref(), Some("\n"));
/// ```
#[derive(Debug)]
pub struct EditSession {
    buffer: Arc<TextBuffer>,
    history: History,
}

impl EditSession {
    /// Create a session over a new buffer holding `text`.
    pub fn new(text: &str) -> Self {
        Self::from_buffer(Arc::new(TextBuffer::new(text)))
    }

    /// Create a session over an existing buffer.
    pub fn from_buffer(buffer: Arc<TextBuffer>) -> Self {
        Self {
            buffer,
            history: History::new(),
        }
    }

    /// Open `path` (a missing file is an empty document).
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, BufferOptions::default())
    }

    /// Open `path` with explicit buffer options.
    pub fn open_with_options(path: impl AsRef<Path>, options: BufferOptions) -> Result<Self> {
        let buffer = TextBuffer::open_with_options(path, options)?;
        Ok(Self::from_buffer(Arc::new(buffer)))
    }

    /// Replace the history, e.g. with a bounded one.
    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    /// The shared buffer. Clone the `Arc` to hand it to background readers.
    pub fn buffer(&self) -> &Arc<TextBuffer> {
        &self.buffer
    }

    /// The edit history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Current cursor.
    pub fn cursor(&self) -> Position {
        self.buffer.cursor()
    }

    /// Move the cursor (clamped). See [`TextBuffer::set_cursor`].
    pub fn set_cursor(&self, target: Position, allow_terminator: bool) -> Position {
        self.buffer.set_cursor(target, allow_terminator)
    }

    /// Insert `ch` before the cursor and record it.
    pub fn insert(&mut self, ch: char) -> Position {
        let (before, after) = self.buffer.insert_tracked(ch);
        self.history.add_change(Change::insertion(ch, before, after));
        after
    }

    /// Delete the character before the cursor and record it.
    pub fn delete_char(&mut self) -> Option<char> {
        let (ch, before, after) = self.buffer.delete_tracked()?;
        self.history.add_change(Change::deletion(ch, before, after));
        Some(ch)
    }

    /// Delete the character under the cursor and record it.
    ///
    /// Returns `None` when the cursor is on a line terminator.
    pub fn delete_forward(&mut self) -> Option<char> {
        let at = self.buffer.cursor();
        let next = Position::new(at.line, at.column + 1);
        if self.buffer.set_cursor(next, true) != next {
            self.buffer.set_cursor(at, true);
            return None;
        }

        let deleted = self.delete_char();
        let rest = self.buffer.cursor();
        self.buffer.set_cursor(rest, false);
        deleted
    }

    /// Overwrite the character under the cursor with `ch` and advance past it.
    ///
    /// Recorded as a deletion followed by an insertion. At the end of a line `ch` is
    /// inserted instead.
    pub fn replace_char(&mut self, ch: char) -> Position {
        let at = self.buffer.cursor();
        let next = Position::new(at.line, at.column + 1);
        if self.buffer.set_cursor(next, true) == next {
            self.delete_char();
        } else {
            self.buffer.set_cursor(at, true);
        }
        self.insert(ch)
    }

    /// Undo one change. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.history.undo(&self.buffer)
    }

    /// Redo one change. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.history.redo(&self.buffer)
    }

    /// Save the buffer to `path` and clear its dirty flag.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let was_dirty = self.buffer.take_dirty();
        if let Err(err) = self.buffer.save(path) {
            if was_dirty {
                self.buffer.set_dirty(true);
            }
            return Err(err);
        }
        Ok(())
    }
}
