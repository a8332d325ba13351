use std::thread;

use anyhow::{Context, Result};

use crate::{Code, Connection, ErrorKind, Null, OpenOptions};

use super::data;

#[test]
fn connection_open_read_only() -> Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;
    let path = dir.path().join("database.sqlite3");

    let c = Connection::open(&path)?;
    data::users(&c)?;
    c.close()?;

    let c = OpenOptions::new().read_only().open(&path)?;

    let e = c
        .execute("INSERT INTO users VALUES (2, 'Bob', NULL, NULL, NULL)")
        .unwrap_err();

    assert_eq!(e.kind(), ErrorKind::Execute);
    assert_eq!(e.code().primary(), Code::READONLY);

    let mut stmt = c.prepare("SELECT name FROM users")?;
    assert_eq!(stmt.next::<String>()?.as_deref(), Some("Alice"));
    Ok(())
}

#[test]
fn connection_open_missing() -> Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;

    let e = OpenOptions::new()
        .read_write()
        .open(dir.path().join("missing.sqlite3"))
        .unwrap_err();

    assert_eq!(e.kind(), ErrorKind::Open);
    assert_eq!(e.code().primary(), Code::CANTOPEN);
    Ok(())
}

#[test]
fn connection_busy_timeout() -> Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;
    let path = dir.path().join("database.sqlite3");

    let c = Connection::open(&path)?;
    data::users(&c)?;

    let mut guards = Vec::with_capacity(20);

    for id in 0..20i64 {
        let path = path.clone();

        guards.push(thread::spawn(move || -> Result<()> {
            let c = OpenOptions::new()
                .read_write()
                .busy_timeout(10_000)
                .open(path)?;

            let mut stmt = c.prepare("INSERT INTO users VALUES (?, ?, ?, ?, ?)")?;
            stmt.bind((id + 2, "Bob", 69.42, &[0x69u8, 0x42u8][..], Null))?;
            assert!(stmt.execute()?.is_done());
            Ok(())
        }));
    }

    for guard in guards {
        guard.join().expect("thread panicked")?;
    }

    let mut stmt = c.prepare("SELECT COUNT(*) FROM users")?;
    assert_eq!(stmt.next::<i64>()?, Some(21));
    Ok(())
}
