//! The concurrent Line Store.
//!
//! [`TextBuffer`] owns the lines, their locks, the cursor and the dirty flag. It is `Sync`:
//! share it behind an [`Arc`](std::sync::Arc) between the foreground editing thread and
//! background readers such as [`crate::Autosave`] or a search worker.
//!
//! | operation                          | whole-buffer lock         | group lock            |
//! |------------------------------------|---------------------------|-----------------------|
//! | `insert` (no split), `delete_char` | shared                    | exclusive, one group  |
//! | `insert` of a terminator           | shared, then escalated    | rebuilt               |
//! | `delete_char` at column 0 (merge)  | exclusive                 | rebuilt               |
//! | `line`, `set_cursor`               | shared                    | shared, one group     |
//! | `save`, `text`, `search`, `dimensions` | shared                | shared, each group in turn |

use crate::error::Result;
use crate::line_ending::LineEnding;
use crate::lines;
use crate::locks::{LineGroups, LockManager};
use crate::options::BufferOptions;
use crate::position::Position;
use crate::search::{LineMatch, Matcher, SearchOptions};
use crate::words;
use ropey::Rope;
use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Size of a buffer as reported to the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Number of lines.
    pub line_count: usize,
    /// Number of characters, terminators included.
    pub char_count: usize,
}

/// A line-oriented text buffer safe for concurrent readers and a foreground editor.
///
/// # Example
///
/// ```rust
/// use editor_buffer::{Position, TextBuffer};
///
/// let buffer = TextBuffer::new("hello\n");
/// buffer.set_cursor(Position::new(0, 2), false);
/// buffer.insert('\n');
///
/// assert_eq!(buffer.line(0).as_deref(), Some("he\n"));
/// assert_eq!(buffer.line(1).as_deref(), Some("llo\n"));
/// assert_eq!(buffer.cursor(), Position::new(1, 0));
/// ```
#[derive(Debug)]
pub struct TextBuffer {
    locks: LockManager,
    cursor: Mutex<Position>,
    dirty: AtomicBool,
    line_ending: LineEnding,
    options: BufferOptions,
}

impl TextBuffer {
    /// Create a buffer holding `text`.
    pub fn new(text: &str) -> Self {
        Self::with_options(text, BufferOptions::default())
    }

    /// Create a buffer holding a single empty line.
    pub fn empty() -> Self {
        Self::new("")
    }

    /// Create a buffer holding `text` with explicit options.
    pub fn with_options(text: &str, options: BufferOptions) -> Self {
        let groups = LineGroups::new(lines::parse_lines(text), options.effective_group_size());
        Self {
            locks: LockManager::new(groups),
            cursor: Mutex::new(Position::default()),
            dirty: AtomicBool::new(false),
            line_ending: LineEnding::detect_in_text(text),
            options,
        }
    }

    /// Load a buffer from `path`.
    ///
    /// A missing file is a new document and yields an empty buffer; any other I/O failure is
    /// returned.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, BufferOptions::default())
    }

    /// Load a buffer from `path` with explicit options.
    pub fn open_with_options(path: impl AsRef<Path>, options: BufferOptions) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(text) => Ok(Self::with_options(&text, options)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "file not found, starting an empty buffer");
                Ok(Self::with_options("", options))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Options this buffer was created with.
    pub fn options(&self) -> BufferOptions {
        self.options
    }

    /// Line ending written by [`TextBuffer::save`].
    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    fn lock_cursor(&self) -> MutexGuard<'_, Position> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current cursor.
    pub fn cursor(&self) -> Position {
        *self.lock_cursor()
    }

    /// Move the cursor to `target`, clamped into the buffer, and return where it landed.
    ///
    /// The line is clamped to `0..line_count`. The column is clamped to the last content
    /// character, or to the terminator column when `allow_terminator` is set (the insert
    /// position at end of line). Content is never modified.
    pub fn set_cursor(&self, target: Position, allow_terminator: bool) -> Position {
        let shared = self.locks.shared();
        let mut cursor = self.lock_cursor();
        let clamped = clamp(&shared, target, allow_terminator);
        *cursor = clamped;
        clamped
    }

    /// Insert `ch` before the cursor and advance the cursor by one column.
    ///
    /// A terminator (`'\n'` or `'\r'`, stored as `'\n'`) splits the line at the cursor; the
    /// cursor then moves to column 0 of the new line. Returns the new cursor.
    pub fn insert(&self, ch: char) -> Position {
        self.insert_tracked(ch).1
    }

    /// Insert `ch` and return the cursor before and after the edit.
    pub(crate) fn insert_tracked(&self, ch: char) -> (Position, Position) {
        let shared = self.locks.shared();

        if !lines::is_terminator(ch) {
            let mut cursor = self.lock_cursor();
            let line = shared.clamp_line(cursor.line);
            let column = shared.with_line_mut(line, |rope| {
                let column = cursor.column.min(lines::max_column(rope, true));
                lines::insert_char(rope, column, ch);
                column
            });
            if let Some(column) = column {
                let before = Position::new(line, column);
                *cursor = Position::new(line, column + 1);
                self.dirty.store(true, Ordering::Release);
                return (before, *cursor);
            }
        }

        debug!("escalating to exclusive lock for line split");
        let mut exclusive = self.locks.escalate(shared);
        let mut cursor = self.lock_cursor();
        let before = exclusive.restructure(|all| {
            let line = cursor.line.min(all.len() - 1);
            let column = cursor.column.min(lines::max_column(&all[line], true));
            let tail = lines::insert_char(&mut all[line], column, ch);
            let before = Position::new(line, column);
            *cursor = match tail {
                Some(tail) => {
                    all.insert(line + 1, tail);
                    Position::new(line + 1, 0)
                }
                None => Position::new(line, column + 1),
            };
            before
        });
        self.dirty.store(true, Ordering::Release);
        (before, *cursor)
    }

    /// Delete the character before the cursor and move the cursor back one column.
    ///
    /// At column 0 of a later line, the line is merged into the previous one and the removed
    /// terminator is returned. At the very start of the buffer nothing is deleted and `None` is
    /// returned.
    pub fn delete_char(&self) -> Option<char> {
        self.delete_tracked().map(|(ch, _, _)| ch)
    }

    /// Delete before the cursor and return the removed character with the cursor before and
    /// after the edit.
    pub(crate) fn delete_tracked(&self) -> Option<(char, Position, Position)> {
        {
            let shared = self.locks.shared();
            let mut cursor = self.lock_cursor();
            let line = shared.clamp_line(cursor.line);
            let removed = shared
                .with_line_mut(line, |rope| {
                    let column = cursor.column.min(lines::max_column(rope, true));
                    if column == 0 {
                        return None;
                    }
                    lines::remove_char(rope, column - 1).map(|ch| (ch, column))
                })
                .flatten();

            if let Some((ch, column)) = removed {
                let before = Position::new(line, column);
                *cursor = Position::new(line, column - 1);
                self.dirty.store(true, Ordering::Release);
                return Some((ch, before, *cursor));
            }
            if line == 0 {
                return None;
            }
        }

        let mut exclusive = self.locks.exclusive();
        let mut cursor = self.lock_cursor();
        let line = exclusive.clamp_line(cursor.line);
        let column = exclusive
            .with_line(line, |rope| cursor.column.min(lines::max_column(rope, true)))
            .unwrap_or(0);
        let before = Position::new(line, column);

        let removed = if column > 0 {
            let ch = exclusive
                .with_line_mut(line, |rope| lines::remove_char(rope, column - 1))
                .flatten()?;
            *cursor = Position::new(line, column - 1);
            ch
        } else if line > 0 {
            let (ch, join_column) = exclusive.restructure(|all| {
                let next = all.remove(line);
                let join_column = lines::content_len(&all[line - 1]);
                (lines::join(&mut all[line - 1], next), join_column)
            });
            *cursor = Position::new(line - 1, join_column);
            ch?
        } else {
            return None;
        };

        self.dirty.store(true, Ordering::Release);
        Some((removed, before, *cursor))
    }

    /// A copy of line `index`, terminator included, or `None` past the end of the buffer.
    pub fn line(&self, index: usize) -> Option<String> {
        let shared = self.locks.shared();
        shared.with_line(index, |rope| rope.to_string())
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.locks.shared().line_count()
    }

    /// Number of line-group locks currently guarding the buffer.
    pub fn lock_group_count(&self) -> usize {
        self.locks.shared().group_count()
    }

    /// Line and character counts.
    pub fn dimensions(&self) -> Dimensions {
        let shared = self.locks.shared();
        let mut char_count = 0;
        for (_, group) in shared.groups() {
            let guard = crate::locks::read_lock(group);
            char_count += guard.iter().map(Rope::len_chars).sum::<usize>();
        }
        Dimensions {
            line_count: shared.line_count(),
            char_count,
        }
    }

    /// The whole buffer as one string, built group by group in line order.
    pub fn text(&self) -> String {
        let shared = self.locks.shared();
        let mut out = String::new();
        for (_, group) in shared.groups() {
            let guard = crate::locks::read_lock(group);
            for rope in guard.iter() {
                for chunk in rope.chunks() {
                    out.push_str(chunk);
                }
            }
        }
        out
    }

    /// Write every line to `path`, overwriting it.
    ///
    /// The content is collected under the read locks before the file is touched, so a failed
    /// write leaves the buffer unaffected. The dirty flag is not changed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.line_ending.apply_to_text(&self.text());
        fs::write(path, text.as_bytes())?;
        debug!(path = %path.display(), bytes = text.len(), "saved buffer");
        Ok(())
    }

    /// Whether the buffer changed since the flag was last cleared.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Set or clear the dirty flag.
    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.store(dirty, Ordering::Release);
    }

    /// Clear the dirty flag and return its previous value.
    pub fn take_dirty(&self) -> bool {
        self.dirty.swap(false, Ordering::AcqRel)
    }

    /// Start of the next word after the cursor. Does not move the cursor.
    ///
    /// Word navigation does not guard against concurrent edits: when another thread mutates
    /// the buffer during the scan, the result may mix old and new content.
    pub fn next_word(&self) -> Position {
        let shared = self.locks.shared();
        let from = self.cursor();
        words::next_word(&*shared, from)
    }

    /// Start of the current or previous word. Does not move the cursor.
    ///
    /// See [`TextBuffer::next_word`] for the concurrency caveat.
    pub fn prev_word(&self) -> Position {
        let shared = self.locks.shared();
        let from = self.cursor();
        words::prev_word(&*shared, from)
    }

    /// Last character of the current or next word. Does not move the cursor.
    ///
    /// See [`TextBuffer::next_word`] for the concurrency caveat.
    pub fn end_of_word(&self) -> Position {
        let shared = self.locks.shared();
        let from = self.cursor();
        words::end_of_word(&*shared, from)
    }

    /// Start positions of all non-overlapping matches of the regex `pattern`, in order.
    ///
    /// A malformed pattern is reported as [`crate::BufferError::InvalidPattern`].
    pub fn search(&self, pattern: &str) -> Result<Vec<Position>> {
        Ok(self
            .search_with(pattern, SearchOptions::regex())?
            .into_iter()
            .map(|m| m.position())
            .collect())
    }

    /// All matches of `query` under `options`, in line order.
    ///
    /// Each line is matched while its group lock is held, so no line is observed half
    /// written; lines in different groups may be observed at different moments.
    pub fn search_with(&self, query: &str, options: SearchOptions) -> Result<Vec<LineMatch>> {
        let Some(matcher) = Matcher::compile(query, options)? else {
            return Ok(Vec::new());
        };

        let shared = self.locks.shared();
        let mut matches = Vec::new();
        for (first_line, group) in shared.groups() {
            let guard = crate::locks::read_lock(group);
            for (offset, rope) in guard.iter().enumerate() {
                let content: Cow<'_, str> = rope.slice(..lines::content_len(rope)).into();
                matches.extend(matcher.find_in_line(first_line + offset, &content));
            }
        }
        Ok(matches)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

fn clamp(groups: &LineGroups, target: Position, allow_terminator: bool) -> Position {
    let line = groups.clamp_line(target.line);
    let max = groups
        .with_line(line, |rope| lines::max_column(rope, allow_terminator))
        .unwrap_or(0);
    Position::new(line, target.column.min(max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn all_lines(buffer: &TextBuffer) -> Vec<String> {
        (0..buffer.line_count())
            .filter_map(|i| buffer.line(i))
            .collect()
    }

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buffer = TextBuffer::empty();
        assert_eq!(all_lines(&buffer), vec!["\n"]);
        assert_eq!(
            buffer.dimensions(),
            Dimensions {
                line_count: 1,
                char_count: 1
            }
        );
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_insert_characters() {
        let buffer = TextBuffer::empty();
        for ch in ['a', 'b', 'c'] {
            buffer.insert(ch);
        }
        assert_eq!(buffer.line(0).as_deref(), Some("abc\n"));
        assert_eq!(buffer.cursor(), Position::new(0, 3));
        assert!(buffer.is_dirty());
    }

    #[test]
    fn test_insert_terminator_splits_line() {
        let buffer = TextBuffer::new("hello\n");
        buffer.set_cursor(Position::new(0, 2), false);
        assert_eq!(buffer.insert('\n'), Position::new(1, 0));
        assert_eq!(all_lines(&buffer), vec!["he\n", "llo\n"]);
    }

    #[test]
    fn test_insert_at_end_of_line() {
        let buffer = TextBuffer::new("ab\n");
        buffer.set_cursor(Position::new(0, 99), true);
        buffer.insert('\n');
        assert_eq!(all_lines(&buffer), vec!["ab\n", "\n"]);
        assert_eq!(buffer.cursor(), Position::new(1, 0));
    }

    #[test]
    fn test_delete_char() {
        let buffer = TextBuffer::new("abc\n");
        buffer.set_cursor(Position::new(0, 2), false);
        assert_eq!(buffer.delete_char(), Some('b'));
        assert_eq!(buffer.line(0).as_deref(), Some("ac\n"));
        assert_eq!(buffer.cursor(), Position::new(0, 1));
    }

    #[test]
    fn test_delete_at_start_of_buffer_is_noop() {
        let buffer = TextBuffer::new("abc\n");
        assert_eq!(buffer.delete_char(), None);
        assert_eq!(buffer.line(0).as_deref(), Some("abc\n"));
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_delete_at_line_start_merges() {
        let buffer = TextBuffer::new("he\nllo\n");
        buffer.set_cursor(Position::new(1, 0), false);
        assert_eq!(buffer.delete_char(), Some('\n'));
        assert_eq!(all_lines(&buffer), vec!["hello\n"]);
        assert_eq!(buffer.cursor(), Position::new(0, 2));
    }

    #[test]
    fn test_set_cursor_clamps() {
        let buffer = TextBuffer::new("abc\n\n");
        assert_eq!(
            buffer.set_cursor(Position::new(10, 10), false),
            Position::new(1, 0)
        );
        assert_eq!(
            buffer.set_cursor(Position::new(0, 10), false),
            Position::new(0, 2)
        );
        assert_eq!(
            buffer.set_cursor(Position::new(0, 10), true),
            Position::new(0, 3)
        );
    }

    #[test]
    fn test_line_out_of_range() {
        let buffer = TextBuffer::new("a\n");
        assert_eq!(buffer.line(1), None);
    }

    #[test]
    fn test_split_rebuilds_lock_groups() {
        let text: String = (0..10).map(|i| format!("{i}\n")).collect();
        let buffer = TextBuffer::with_options(&text, BufferOptions::default());
        assert_eq!(buffer.lock_group_count(), 1);

        buffer.set_cursor(Position::new(9, 1), true);
        buffer.insert('\n');
        assert_eq!(buffer.line_count(), 11);
        assert_eq!(buffer.lock_group_count(), 2);

        buffer.delete_char();
        assert_eq!(buffer.line_count(), 10);
        assert_eq!(buffer.lock_group_count(), 1);
    }

    #[test]
    fn test_dimensions_count_terminators() {
        let buffer = TextBuffer::new("ab\ncde\n");
        assert_eq!(
            buffer.dimensions(),
            Dimensions {
                line_count: 2,
                char_count: 7
            }
        );
    }

    #[test]
    fn test_take_dirty() {
        let buffer = TextBuffer::empty();
        buffer.insert('x');
        assert!(buffer.take_dirty());
        assert!(!buffer.take_dirty());
        assert!(!buffer.is_dirty());
    }

    #[test]
    fn test_search_scenario() {
        let buffer = TextBuffer::new("hello\nworld\n");
        assert_eq!(
            buffer.search("l+").unwrap(),
            vec![Position::new(0, 2), Position::new(1, 3)]
        );
    }
}
