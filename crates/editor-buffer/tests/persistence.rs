use editor_buffer::{BufferError, EditSession, LineEnding, Position, TextBuffer};
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn test_save_then_open_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("doc.txt");

    let buffer = TextBuffer::new("alpha\n\nbeta gamma\n");
    buffer.save(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "alpha\n\nbeta gamma\n");

    let reopened = TextBuffer::open(&path).unwrap();
    assert_eq!(reopened.text(), buffer.text());
    assert_eq!(reopened.line_count(), 3);
    assert!(!reopened.is_dirty());
}

#[test]
fn test_open_missing_file_is_empty_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let buffer = TextBuffer::open(dir.path().join("new.txt")).unwrap();

    assert_eq!(buffer.line_count(), 1);
    assert_eq!(buffer.line(0).as_deref(), Some("\n"));
    assert_eq!(buffer.cursor(), Position::new(0, 0));
}

#[test]
fn test_open_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = TextBuffer::open(dir.path()).unwrap_err();
    assert!(matches!(err, BufferError::Io(_)));
}

#[test]
fn test_final_line_without_terminator() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unterminated.txt");
    fs::write(&path, "x\ny").unwrap();

    let buffer = TextBuffer::open(&path).unwrap();
    assert_eq!(buffer.line(1).as_deref(), Some("y\n"));

    buffer.save(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "x\ny\n");
}

#[test]
fn test_crlf_file_keeps_its_line_ending() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dos.txt");
    fs::write(&path, "one\r\ntwo\r\n").unwrap();

    let buffer = TextBuffer::open(&path).unwrap();
    assert_eq!(buffer.line_ending(), LineEnding::Crlf);
    assert_eq!(buffer.line(0).as_deref(), Some("one\n"));

    buffer.set_cursor(Position::new(1, 3), true);
    buffer.insert('!');
    buffer.save(&path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"one\r\ntwo!\r\n");
}

#[test]
fn test_failed_save_leaves_buffer_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let buffer = TextBuffer::new("keep me\n");
    buffer.insert('x');

    let err = buffer.save(dir.path()).unwrap_err();
    assert!(matches!(err, BufferError::Io(_)));
    assert_eq!(buffer.text(), "xkeep me\n");
    assert!(buffer.is_dirty());
}

#[test]
fn test_session_save_clears_dirty_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.txt");

    let mut session = EditSession::open(&path).unwrap();
    session.insert('h');
    session.insert('i');
    assert!(session.buffer().is_dirty());

    session.save(&path).unwrap();
    assert!(!session.buffer().is_dirty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "hi\n");

    assert!(session.save(dir.path()).is_err());
    assert!(!session.buffer().is_dirty());

    session.insert('!');
    assert!(session.save(dir.path()).is_err());
    assert!(session.buffer().is_dirty());
}

#[test]
fn test_save_does_not_touch_cursor_or_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cursor.txt");

    let mut session = EditSession::new("abc\n");
    session.set_cursor(Position::new(0, 2), false);
    session.delete_char();
    session.save(&path).unwrap();

    assert_eq!(session.cursor(), Position::new(0, 1));
    assert!(session.undo());
    assert_eq!(session.buffer().text(), "abc\n");
}
