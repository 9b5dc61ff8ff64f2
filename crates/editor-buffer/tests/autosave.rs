use editor_buffer::{Autosave, AutosaveOptions, EditSession, Position, TextBuffer};
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn test_autosave_writes_dirty_buffer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auto.txt");
    let buffer = Arc::new(TextBuffer::new("draft\n"));

    let autosave = Autosave::spawn(
        Arc::clone(&buffer),
        &path,
        AutosaveOptions::default().with_interval(Duration::from_millis(10)),
    )
    .unwrap();

    buffer.set_cursor(Position::new(0, 5), true);
    buffer.insert('!');

    assert!(wait_for(|| autosave.save_count() >= 1));
    assert!(wait_for(|| fs::read_to_string(&path).ok().as_deref() == Some("draft!\n")));
    assert!(autosave.stop() >= 1);
}

#[test]
fn test_stop_performs_final_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("final.txt");
    let buffer = Arc::new(TextBuffer::new("a\n"));

    let autosave = Autosave::spawn(
        Arc::clone(&buffer),
        &path,
        AutosaveOptions::default().with_interval(Duration::from_secs(3600)),
    )
    .unwrap();
    buffer.insert('b');

    assert_eq!(autosave.stop(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), "ba\n");
    assert!(!buffer.is_dirty());
}

#[test]
fn test_clean_buffer_is_never_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clean.txt");
    let buffer = Arc::new(TextBuffer::new("untouched\n"));

    let autosave = Autosave::spawn(
        Arc::clone(&buffer),
        &path,
        AutosaveOptions::default().with_interval(Duration::from_millis(5)),
    )
    .unwrap();
    thread::sleep(Duration::from_millis(50));

    assert_eq!(autosave.stop(), 0);
    assert!(!path.exists());
}

#[test]
fn test_autosave_alongside_foreground_edits() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("busy.txt");
    let mut session = EditSession::new("start\n");

    let autosave = Autosave::spawn(
        Arc::clone(session.buffer()),
        &path,
        AutosaveOptions::default().with_interval(Duration::from_millis(1)),
    )
    .unwrap();

    for i in 0..300 {
        if i % 25 == 0 {
            session.insert('\n');
        } else {
            session.insert('w');
        }
    }
    for _ in 0..100 {
        session.undo();
    }

    autosave.stop();
    assert_eq!(fs::read_to_string(&path).unwrap(), session.buffer().text());
}
