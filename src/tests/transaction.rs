use anyhow::Result;

use crate::{Code, Connection, ErrorKind, TransactionBehavior};

use super::data;

fn count(c: &Connection) -> crate::Result<i64> {
    let mut stmt = c.prepare("SELECT COUNT(*) FROM items")?;
    Ok(stmt.next::<i64>()?.unwrap_or_default())
}

#[test]
fn rollback_on_drop() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::items(&c)?;

    {
        let tx = c.begin()?;
        assert!(!c.is_autocommit());
        tx.execute("DELETE FROM items")?;
        assert_eq!(count(&tx)?, 0);
    }

    assert!(c.is_autocommit());
    assert_eq!(count(&c)?, 3);
    Ok(())
}

#[test]
fn commit_and_rollback() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::items(&c)?;

    let tx = c.begin_with(TransactionBehavior::Immediate)?;
    tx.execute("DELETE FROM items WHERE id = 1")?;
    tx.commit()?;
    assert_eq!(count(&c)?, 2);

    let tx = c.begin_with(TransactionBehavior::Exclusive)?;
    tx.execute("DELETE FROM items")?;
    tx.rollback()?;
    assert_eq!(count(&c)?, 2);
    Ok(())
}

#[test]
fn nested_begin() -> Result<()> {
    let c = Connection::open_in_memory()?;

    let tx = c.begin()?;

    let e = tx.begin().unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TransactionState);
    assert_eq!(e.code(), Code::MISUSE);

    tx.commit()?;
    c.begin()?.commit()?;
    Ok(())
}

#[test]
fn commit_after_manual_end() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::items(&c)?;

    let tx = c.begin()?;
    tx.execute("DELETE FROM items WHERE id = 2")?;
    tx.execute("ROLLBACK")?;

    let e = tx.commit().unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TransactionState);
    assert_eq!(count(&c)?, 3);

    let tx = c.begin()?;
    tx.execute("COMMIT")?;

    let e = tx.rollback().unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TransactionState);
    Ok(())
}

#[test]
fn statements_through_transaction() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::items(&c)?;

    let tx = c.begin()?;

    {
        let mut insert = tx.prepare("INSERT INTO items (price, desc) VALUES (?, ?)")?;

        for n in 4..=6 {
            insert.reset()?;
            insert.bind((n * 100, format!("item {n}")))?;
            insert.execute()?;
        }
    }

    assert_eq!(tx.last_insert_rowid(), 6);
    tx.commit()?;

    assert_eq!(count(&c)?, 6);
    Ok(())
}
