//! Word navigation.
//!
//! A *word* is a maximal run of characters that are neither a space nor a line terminator.
//! A line holding only its terminator is an *empty line*; it is a stop for [`next_word`] and
//! [`prev_word`] (except the line the search starts on) and is skipped by [`end_of_word`].
//! Running off the end of the buffer clamps to the last character of the last line.
//!
//! The functions here are generic over [`LineSource`] and take no locks of their own. The
//! buffer methods built on them read one character at a time, so a scan that runs while
//! another thread edits may combine content from before and after that edit.

use crate::lines::{is_terminator, is_word_separator};
use crate::position::Position;
use ropey::Rope;

/// Read-only character access to a sequence of terminated lines.
pub trait LineSource {
    /// Number of lines.
    fn line_count(&self) -> usize;

    /// Length of a line in characters, terminator included. `0` for a missing line.
    fn line_len(&self, line: usize) -> usize;

    /// The character at `(line, column)`, if any.
    fn char_at(&self, line: usize, column: usize) -> Option<char>;
}

impl LineSource for [Rope] {
    fn line_count(&self) -> usize {
        self.len()
    }

    fn line_len(&self, line: usize) -> usize {
        self.get(line).map_or(0, |l| l.len_chars())
    }

    fn char_at(&self, line: usize, column: usize) -> Option<char> {
        self.get(line)?.get_char(column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Blank,
    EmptyLine,
}

fn class_at<S: LineSource + ?Sized>(src: &S, p: Position) -> CharClass {
    match src.char_at(p.line, p.column) {
        Some(ch) if is_terminator(ch) && src.line_len(p.line) <= 1 => CharClass::EmptyLine,
        Some(ch) if is_word_separator(ch) => CharClass::Blank,
        Some(_) => CharClass::Word,
        None => CharClass::Blank,
    }
}

fn step_forward<S: LineSource + ?Sized>(src: &S, p: Position) -> Option<Position> {
    if p.column + 1 < src.line_len(p.line) {
        Some(Position::new(p.line, p.column + 1))
    } else if p.line + 1 < src.line_count() {
        Some(Position::new(p.line + 1, 0))
    } else {
        None
    }
}

fn step_backward<S: LineSource + ?Sized>(src: &S, p: Position) -> Option<Position> {
    if p.column > 0 {
        Some(Position::new(p.line, p.column - 1))
    } else if p.line > 0 {
        let line = p.line - 1;
        Some(Position::new(line, src.line_len(line).saturating_sub(1)))
    } else {
        None
    }
}

/// The last content character of the last line (column 0 on an empty line).
pub fn last_char<S: LineSource + ?Sized>(src: &S) -> Position {
    let line = src.line_count().saturating_sub(1);
    let len = src.line_len(line);
    let content = match len.checked_sub(1).and_then(|i| src.char_at(line, i)) {
        Some(ch) if is_terminator(ch) => len - 1,
        _ => len,
    };
    Position::new(line, content.saturating_sub(1))
}

/// Start of the next word after `from`, or the next empty line, whichever comes first.
pub fn next_word<S: LineSource + ?Sized>(src: &S, from: Position) -> Position {
    let mut p = from;

    match class_at(src, p) {
        CharClass::Word => {
            while class_at(src, p) == CharClass::Word {
                match step_forward(src, p) {
                    Some(next) => p = next,
                    None => return last_char(src),
                }
            }
        }
        CharClass::EmptyLine => match step_forward(src, p) {
            Some(next) => p = next,
            None => return last_char(src),
        },
        CharClass::Blank => {}
    }

    loop {
        match class_at(src, p) {
            CharClass::Word | CharClass::EmptyLine => return p,
            CharClass::Blank => match step_forward(src, p) {
                Some(next) => p = next,
                None => return last_char(src),
            },
        }
    }
}

/// Start of the word containing or preceding `from`.
///
/// From inside a word this lands on that word's first character; from a word start it moves
/// to the previous word. Empty lines are stops. The beginning of the buffer is `(0, 0)`.
pub fn prev_word<S: LineSource + ?Sized>(src: &S, from: Position) -> Position {
    let Some(mut p) = step_backward(src, from) else {
        return Position::new(0, 0);
    };

    loop {
        match class_at(src, p) {
            CharClass::Word => break,
            CharClass::EmptyLine => return p,
            CharClass::Blank => match step_backward(src, p) {
                Some(prev) => p = prev,
                None => return Position::new(0, 0),
            },
        }
    }

    while p.column > 0 {
        let prev = Position::new(p.line, p.column - 1);
        if class_at(src, prev) != CharClass::Word {
            break;
        }
        p = prev;
    }
    p
}

/// Last character of the word containing `from`, or of the next word if `from` is already on
/// a word's last character or between words.
pub fn end_of_word<S: LineSource + ?Sized>(src: &S, from: Position) -> Position {
    let Some(mut p) = step_forward(src, from) else {
        return last_char(src);
    };

    while class_at(src, p) != CharClass::Word {
        match step_forward(src, p) {
            Some(next) => p = next,
            None => return last_char(src),
        }
    }

    while let Some(next) = step_forward(src, p) {
        if next.line != p.line || class_at(src, next) != CharClass::Word {
            break;
        }
        p = next;
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::parse_lines;

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    #[test]
    fn test_next_word_same_line() {
        let lines = parse_lines("foo bar baz\n");
        assert_eq!(next_word(lines.as_slice(), pos(0, 0)), pos(0, 4));
        assert_eq!(next_word(lines.as_slice(), pos(0, 1)), pos(0, 4));
        assert_eq!(next_word(lines.as_slice(), pos(0, 3)), pos(0, 4));
        assert_eq!(next_word(lines.as_slice(), pos(0, 4)), pos(0, 8));
    }

    #[test]
    fn test_next_word_wraps_lines() {
        let lines = parse_lines("foo\n  bar\n");
        assert_eq!(next_word(lines.as_slice(), pos(0, 0)), pos(1, 2));
    }

    #[test]
    fn test_next_word_stops_on_empty_line() {
        let lines = parse_lines("foo\n\n\nbar\n");
        assert_eq!(next_word(lines.as_slice(), pos(0, 0)), pos(1, 0));
        assert_eq!(next_word(lines.as_slice(), pos(1, 0)), pos(2, 0));
        assert_eq!(next_word(lines.as_slice(), pos(2, 0)), pos(3, 0));
    }

    #[test]
    fn test_next_word_clamps_at_end_of_file() {
        let lines = parse_lines("foo bar\n");
        assert_eq!(next_word(lines.as_slice(), pos(0, 4)), pos(0, 6));

        let trailing = parse_lines("foo   \n");
        assert_eq!(next_word(trailing.as_slice(), pos(0, 0)), pos(0, 5));
    }

    #[test]
    fn test_next_word_from_last_empty_line() {
        let lines = parse_lines("foo\n\n");
        assert_eq!(next_word(lines.as_slice(), pos(1, 0)), pos(1, 0));
    }

    #[test]
    fn test_prev_word() {
        let lines = parse_lines("foo bar\nbaz\n");
        assert_eq!(prev_word(lines.as_slice(), pos(0, 6)), pos(0, 4));
        assert_eq!(prev_word(lines.as_slice(), pos(0, 4)), pos(0, 0));
        assert_eq!(prev_word(lines.as_slice(), pos(1, 0)), pos(0, 4));
        assert_eq!(prev_word(lines.as_slice(), pos(0, 0)), pos(0, 0));
    }

    #[test]
    fn test_prev_word_stops_on_empty_line() {
        let lines = parse_lines("foo\n\nbar\n");
        assert_eq!(prev_word(lines.as_slice(), pos(2, 0)), pos(1, 0));
        assert_eq!(prev_word(lines.as_slice(), pos(1, 0)), pos(0, 0));
    }

    #[test]
    fn test_prev_word_leading_blanks() {
        let lines = parse_lines("   foo\n");
        assert_eq!(prev_word(lines.as_slice(), pos(0, 3)), pos(0, 0));
    }

    #[test]
    fn test_end_of_word() {
        let lines = parse_lines("foo bar\nbaz\n");
        assert_eq!(end_of_word(lines.as_slice(), pos(0, 0)), pos(0, 2));
        assert_eq!(end_of_word(lines.as_slice(), pos(0, 2)), pos(0, 6));
        assert_eq!(end_of_word(lines.as_slice(), pos(0, 3)), pos(0, 6));
        assert_eq!(end_of_word(lines.as_slice(), pos(0, 6)), pos(1, 2));
        assert_eq!(end_of_word(lines.as_slice(), pos(1, 2)), pos(1, 2));
    }

    #[test]
    fn test_end_of_word_skips_empty_lines() {
        let lines = parse_lines("a\n\n\nbcd\n");
        assert_eq!(end_of_word(lines.as_slice(), pos(0, 0)), pos(3, 2));
    }

    #[test]
    fn test_tabs_are_word_characters() {
        let lines = parse_lines("a\tb c\n");
        assert_eq!(next_word(lines.as_slice(), pos(0, 0)), pos(0, 4));
    }

    #[test]
    fn test_last_char() {
        assert_eq!(last_char(parse_lines("ab\ncd\n").as_slice()), pos(1, 1));
        assert_eq!(last_char(parse_lines("ab\n\n").as_slice()), pos(1, 0));
    }
}
