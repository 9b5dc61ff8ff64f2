//! Line Store primitives.
//!
//! Each line is held in its own [`Rope`] and always ends with exactly one `'\n'` terminator.
//! No terminator ever appears inside a line: inserting one splits the line, removing one
//! merges two lines. These helpers implement those rules on single line values; the
//! partitioning of lines into lock groups is handled by the lock manager.

use crate::line_ending::LineEnding;
use ropey::Rope;

/// Terminator stored at the end of every line.
pub const LINE_TERMINATOR: char = '\n';

/// Returns `true` for characters that end a line (`'\n'` or `'\r'`).
pub fn is_terminator(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

/// Returns `true` for characters that separate words (space or a terminator).
pub fn is_word_separator(ch: char) -> bool {
    ch == ' ' || is_terminator(ch)
}

/// Build the line sequence for `text`.
///
/// Line endings are normalized to LF, a final line without terminator gets one, and empty
/// input yields a single empty line.
pub(crate) fn parse_lines(text: &str) -> Vec<Rope> {
    let normalized = LineEnding::normalize(text);
    let mut lines: Vec<Rope> = normalized
        .split_inclusive(LINE_TERMINATOR)
        .map(Rope::from_str)
        .collect();

    match lines.last_mut() {
        Some(last) if !ends_with_terminator(last) => {
            last.insert_char(last.len_chars(), LINE_TERMINATOR);
        }
        Some(_) => {}
        None => lines.push(empty_line()),
    }

    lines
}

/// A line holding only its terminator.
pub(crate) fn empty_line() -> Rope {
    Rope::from_str("\n")
}

pub(crate) fn ends_with_terminator(line: &Rope) -> bool {
    line.len_chars()
        .checked_sub(1)
        .and_then(|last| line.get_char(last))
        .is_some_and(is_terminator)
}

/// Number of characters before the terminator.
pub(crate) fn content_len(line: &Rope) -> usize {
    if ends_with_terminator(line) {
        line.len_chars() - 1
    } else {
        line.len_chars()
    }
}

/// Largest column a cursor may occupy on `line`.
///
/// With `allow_terminator` the cursor may sit on the terminator itself (insert position at end
/// of line), otherwise it stops on the last content character.
pub(crate) fn max_column(line: &Rope, allow_terminator: bool) -> usize {
    let len = content_len(line);
    if allow_terminator {
        len
    } else {
        len.saturating_sub(1)
    }
}

/// Insert `ch` before `column`.
///
/// A terminator splits the line: `line` keeps everything up to and including the new
/// terminator and the returned rope holds the rest, which becomes the following line.
pub(crate) fn insert_char(line: &mut Rope, column: usize, ch: char) -> Option<Rope> {
    let column = column.min(content_len(line));
    if is_terminator(ch) {
        line.insert_char(column, LINE_TERMINATOR);
        Some(line.split_off(column + 1))
    } else {
        line.insert_char(column, ch);
        None
    }
}

/// Remove and return the character at `column`, if it is a content character.
pub(crate) fn remove_char(line: &mut Rope, column: usize) -> Option<char> {
    if column >= content_len(line) {
        return None;
    }
    let ch = line.char(column);
    line.remove(column..column + 1);
    Some(ch)
}

/// Append `next` to `line`, dropping the terminator between them.
///
/// Returns the removed terminator.
pub(crate) fn join(line: &mut Rope, next: Rope) -> Option<char> {
    let removed = if ends_with_terminator(line) {
        let last = line.len_chars() - 1;
        let ch = line.char(last);
        line.remove(last..);
        Some(ch)
    } else {
        None
    };
    line.append(next);
    removed
}
