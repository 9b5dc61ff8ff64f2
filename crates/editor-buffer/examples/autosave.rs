use editor_buffer::{Autosave, AutosaveOptions, EditSession, Position};
use std::sync::Arc;
use std::time::Duration;

fn main() -> editor_buffer::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("notes.txt");

    let mut session = EditSession::open(&path)?;
    let autosave = Autosave::spawn(
        Arc::clone(session.buffer()),
        &path,
        AutosaveOptions::default().with_interval(Duration::from_millis(20)),
    )?;

    // Type two lines while the autosave thread runs.
    for ch in "first line\nsecond line".chars() {
        session.insert(ch);
    }
    std::thread::sleep(Duration::from_millis(50));

    // Fix a typo, then change our mind.
    session.set_cursor(Position::new(1, 0), false);
    session.replace_char('S');
    session.undo();
    session.undo();
    assert_eq!(session.buffer().line(1).as_deref(), Some("second line\n"));

    let matches = session.buffer().search(r"\bline\b")?;
    println!("matches: {matches:?}");

    let saves = autosave.stop();
    println!("autosaved {saves} time(s)");
    println!("{}", std::fs::read_to_string(&path)?);
    Ok(())
}
