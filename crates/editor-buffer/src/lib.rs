#![warn(missing_docs)]
//! Editor Buffer - Concurrent Line Store and Edit History
//!
//! # Overview
//!
//! `editor-buffer` is the text buffer behind a terminal editor. It holds the document as a
//! sequence of terminated lines, lets background work (autosave, search) read it while the
//! foreground thread edits, and keeps a reversible history of character-level edits.
//! Rendering, key dispatch and path handling belong to the caller.
//!
//! # Core Features
//!
//! - **Line Store**: one rope per line, every line ends with its terminator
//! - **Grouped Locking**: whole-buffer reader/writer lock, per-group locks for content edits,
//!   and an escalation guard for shared-to-exclusive transitions
//! - **Cursor & Navigation**: clamped cursor, vi-style word motions
//! - **Search**: regex or literal, per line, character columns
//! - **Change Log**: undo/redo over an arena of changes with redo-branch pruning
//! - **Autosave**: background thread saving dirty buffers
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  EditSession (edits paired with history)    │  ← Foreground editor
//! ├─────────────────────────────────────────────┤
//! │  History (Change Log)   │  Autosave         │  ← Collaborators
//! ├─────────────────────────────────────────────┤
//! │  TextBuffer (cursor, search, words, save)   │  ← Shared buffer
//! ├─────────────────────────────────────────────┤
//! │  Lock Manager (file / group / escalation)   │  ← Concurrency
//! ├─────────────────────────────────────────────┤
//! │  Line Store (terminated rope lines)         │  ← Storage
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use editor_buffer::{EditSession, Position};
//!
//! let mut session = EditSession::new("hello\nworld\n");
//!
//! session.set_cursor(Position::new(0, 5), true);
//! for ch in ", there".chars() {
//!     session.insert(ch);
//! }
//! assert_eq!(session.buffer().line(0).as_deref(), Some("hello, there\n"));
//!
//! let matches = session.buffer().search("o+").unwrap();
//! assert_eq!(matches[0], Position::new(0, 4));
//!
//! session.undo();
//! assert_eq!(session.buffer().line(0).as_deref(), Some("hello, ther\n"));
//! ```
//!
//! # Sharing the Buffer
//!
//! ```rust
//! use editor_buffer::TextBuffer;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let buffer = Arc::new(TextBuffer::new("one\ntwo\n"));
//! let reader = {
//!     let buffer = Arc::clone(&buffer);
//!     thread::spawn(move || buffer.dimensions().line_count)
//! };
//! buffer.insert('x');
//! assert_eq!(reader.join().unwrap(), 2);
//! ```
//!
//! # Module Description
//!
//! - [`buffer`] - the shared [`TextBuffer`]
//! - [`history`] - undo/redo log
//! - [`session`] - foreground editing with recorded changes
//! - [`words`] - word navigation over any [`LineSource`]
//! - [`search`] - search options and matches
//! - [`autosave`] - background saving
//! - [`lines`] - line terminator rules

pub mod autosave;
pub mod buffer;
mod error;
pub mod history;
pub mod line_ending;
pub mod lines;
mod locks;
pub mod options;
mod position;
pub mod search;
pub mod session;
pub mod words;

pub use autosave::{Autosave, save_if_dirty};
pub use buffer::{Dimensions, TextBuffer};
pub use error::{BufferError, Result};
pub use history::{Change, ChangeKind, History};
pub use line_ending::LineEnding;
pub use options::{AutosaveOptions, BufferOptions, DEFAULT_LOCK_GROUP_SIZE};
pub use position::Position;
pub use search::{LineMatch, SearchOptions};
pub use session::EditSession;
pub use words::LineSource;
