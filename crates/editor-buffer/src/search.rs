//! Text search helpers.
//!
//! Queries are compiled once per search and matched against the content of each line
//! (terminator excluded). All columns are **character offsets**, not byte offsets. It supports:
//!
//! - plain substring search (escaped and compiled into a regex)
//! - regex search
//! - optional whole-word matching

use crate::error::Result;
use crate::position::Position;
use regex::{Regex, RegexBuilder};

/// Options that control how search is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    /// If `true`, performs a case-sensitive search.
    pub case_sensitive: bool,
    /// If `true`, matches only whole words (alphanumeric and `_`).
    pub whole_word: bool,
    /// If `true`, treats the query as a regex pattern.
    pub regex: bool,
}

impl SearchOptions {
    /// Case-sensitive regex search, the mode used by [`crate::TextBuffer::search`].
    pub fn regex() -> Self {
        Self {
            regex: true,
            ..Self::default()
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_word: false,
            regex: false,
        }
    }
}

/// A match within one line, expressed as a half-open character range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LineMatch {
    /// Line of the match.
    pub line: usize,
    /// Inclusive start column.
    pub start: usize,
    /// Exclusive end column.
    pub end: usize,
}

impl LineMatch {
    /// Position of the first matched character.
    pub fn position(&self) -> Position {
        Position::new(self.line, self.start)
    }

    /// Returns the length of the match in characters.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the match is empty.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

#[derive(Debug)]
struct CharIndex {
    char_to_byte: Vec<usize>,
    text_len: usize,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self {
            char_to_byte,
            text_len: text.len(),
        }
    }

    fn char_count(&self) -> usize {
        self.char_to_byte.len().saturating_sub(1)
    }

    fn byte_to_char(&self, byte_offset: usize) -> usize {
        let clamped = byte_offset.min(self.text_len);
        match self.char_to_byte.binary_search(&clamped) {
            Ok(idx) => idx,
            Err(idx) => idx,
        }
    }

    fn char_at(&self, text: &str, char_offset: usize) -> Option<char> {
        if char_offset >= self.char_count() {
            return None;
        }
        let start = self.char_to_byte[char_offset];
        let end = self.char_to_byte[char_offset + 1];
        text.get(start..end)?.chars().next()
    }
}

/// A compiled query, ready to be run over many lines.
#[derive(Debug, Clone)]
pub(crate) struct Matcher {
    re: Regex,
    whole_word: bool,
}

impl Matcher {
    /// Compile `query`. Returns `Ok(None)` for an empty query, which matches nothing.
    pub(crate) fn compile(query: &str, options: SearchOptions) -> Result<Option<Self>> {
        if query.is_empty() {
            return Ok(None);
        }

        let pattern = if options.regex {
            query.to_string()
        } else {
            regex::escape(query)
        };

        let re = RegexBuilder::new(&pattern)
            .case_insensitive(!options.case_sensitive)
            .build()?;

        Ok(Some(Self {
            re,
            whole_word: options.whole_word,
        }))
    }

    /// All non-overlapping, non-empty matches in `text`, as character ranges.
    pub(crate) fn find_in_line(&self, line: usize, text: &str) -> Vec<LineMatch> {
        let mut index: Option<CharIndex> = None;
        let mut matches = Vec::new();

        for m in self.re.find_iter(text) {
            if m.start() == m.end() {
                continue;
            }

            let index = index.get_or_insert_with(|| CharIndex::new(text));
            let candidate = LineMatch {
                line,
                start: index.byte_to_char(m.start()),
                end: index.byte_to_char(m.end()),
            };

            if self.whole_word && !is_whole_word(text, index, candidate) {
                continue;
            }
            matches.push(candidate);
        }

        matches
    }
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

fn is_whole_word(text: &str, index: &CharIndex, m: LineMatch) -> bool {
    if m.is_empty() {
        return false;
    }

    let before = if m.start == 0 {
        None
    } else {
        index.char_at(text, m.start - 1)
    };
    let after = index.char_at(text, m.end);

    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}
