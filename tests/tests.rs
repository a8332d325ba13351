#![cfg(not(miri))]

use std::path::Path;

use anyhow::{Context, Result};
use sqlt::{Bind, Code, Connection, ErrorKind, OpenOptions, Row, Rows, State, Type};

#[derive(Debug, PartialEq, Bind, Row)]
struct Item {
    id: i64,
    price: i64,
    desc: String,
}

#[derive(Debug, PartialEq, Row)]
struct ItemRef<'stmt> {
    id: i64,
    desc: &'stmt str,
}

#[derive(Bind)]
#[sql(named)]
struct PriceRange {
    min: i64,
    max: i64,
}

fn setup_items(path: impl AsRef<Path>) -> Result<Connection> {
    let c = Connection::open(path)?;

    c.execute("CREATE TABLE items (id INTEGER PRIMARY KEY, price INTEGER, desc TEXT)")?;

    let mut insert = c.prepare("INSERT INTO items VALUES (?, ?, ?)")?;

    for (id, price, desc) in [
        (1, 998798, "item 1"),
        (2, 1000, "item 2"),
        (3, 1000000, "item 3"),
    ] {
        let item = Item {
            id,
            price,
            desc: desc.into(),
        };

        insert.reset()?;
        insert.bind(&item)?;
        assert_eq!(insert.execute()?, State::Done);
    }

    drop(insert);
    Ok(c)
}

#[test]
fn items_scenario() -> Result<()> {
    let c = setup_items(":memory:")?;

    let mut stmt = c.prepare("SELECT id, price, desc FROM items WHERE price > ? ORDER BY id")?;
    stmt.bind((50000,))?;

    let items = stmt.query::<Item>().collect::<sqlt::Result<Vec<_>>>()?;

    assert_eq!(
        items,
        [
            Item {
                id: 1,
                price: 998798,
                desc: "item 1".into()
            },
            Item {
                id: 3,
                price: 1000000,
                desc: "item 3".into()
            },
        ]
    );

    Ok(())
}

#[test]
fn rows_in_insertion_order() -> Result<()> {
    let c = Connection::open_in_memory()?;
    c.execute("CREATE TABLE test (id int, price bigint, desc text)")?;

    let mut insert = c.prepare("INSERT INTO test VALUES (?, ?, ?)")?;

    for row in [
        (1, 998798i64, "item 1"),
        (2, 203948394, "item 2"),
        (3, 10293812938, "item 3"),
    ] {
        insert.reset()?;
        insert.bind(row)?;
        insert.execute()?;
    }

    let mut stmt = c.prepare("SELECT id, price, desc FROM test WHERE id <> 2")?;
    let rows = stmt
        .query::<(i32, i64, String)>()
        .collect::<sqlt::Result<Vec<_>>>()?;

    assert_eq!(
        rows,
        [
            (1, 998798, "item 1".to_owned()),
            (3, 10293812938, "item 3".to_owned()),
        ]
    );

    Ok(())
}

#[test]
fn items_by_named_range() -> Result<()> {
    let c = setup_items(":memory:")?;

    let mut stmt =
        c.prepare("SELECT id, desc FROM items WHERE price BETWEEN :min AND :max ORDER BY id")?;
    stmt.bind(PriceRange {
        min: 500,
        max: 999_999,
    })?;

    let mut found = Vec::new();

    while let Some(item) = stmt.next::<ItemRef<'_>>()? {
        found.push((item.id, item.desc.to_owned()));
    }

    assert_eq!(found, [(1, "item 1".to_owned()), (2, "item 2".to_owned())]);
    Ok(())
}

#[test]
fn cursor_over_items() -> Result<()> {
    let c = setup_items(":memory:")?;

    let mut stmt = c.prepare("SELECT id, price, desc FROM items ORDER BY price DESC")?;
    let mut rows = Rows::<Item>::new(&mut stmt);
    let mut ids = Vec::new();

    while rows.advance()? {
        ids.push(rows.get()?.id);
    }

    assert_eq!(ids, [3, 1, 2]);
    assert!(!rows.advance()?);
    Ok(())
}

#[test]
fn commit_is_durable() -> Result<()> {
    let dir = tempfile::tempdir().context("tempdir")?;
    let path = dir.path().join("items.sqlite3");

    {
        let c = setup_items(&path)?;
        let tx = c.begin()?;
        tx.execute("UPDATE items SET price = price * 2")?;
        tx.commit()?;

        let tx = c.begin()?;
        tx.execute("DELETE FROM items")?;
        drop(tx);

        c.close()?;
    }

    let c = OpenOptions::new().read_only().open(&path)?;

    let mut stmt = c.prepare("SELECT price FROM items ORDER BY id")?;
    let prices = stmt.query::<i64>().collect::<sqlt::Result<Vec<_>>>()?;
    assert_eq!(prices, [1997596, 2000, 2000000]);
    Ok(())
}

#[test]
fn errors_carry_engine_details() -> Result<()> {
    let c = setup_items(":memory:")?;

    let e = c.prepare("SELECT * FROM nope").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Prepare);
    assert_eq!(e.message(), "no such table: nope");
    assert_eq!(
        e.to_string(),
        "failed to prepare statement: no such table: nope (ERROR)"
    );

    let mut stmt = c.prepare("INSERT INTO items VALUES (?, ?, ?)")?;
    stmt.bind((1, 1, "again"))?;

    let e = stmt.execute().unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Execute);
    assert_eq!(e.code().primary(), Code::CONSTRAINT);
    Ok(())
}

#[test]
fn column_types() -> Result<()> {
    let c = setup_items(":memory:")?;

    let mut stmt = c.prepare("SELECT id, price * 1.5, desc, CAST(desc AS BLOB), NULL FROM items")?;
    assert!(stmt.execute()?.is_row());

    let types = (0..stmt.column_count())
        .map(|i| stmt.column_type(i))
        .collect::<Vec<_>>();

    assert_eq!(
        types,
        [
            Type::INTEGER,
            Type::FLOAT,
            Type::TEXT,
            Type::BLOB,
            Type::NULL
        ]
    );
    Ok(())
}

#[test]
fn version() {
    let version = sqlt::lib_version();
    let number = sqlt::lib_version_number();

    assert!(version.starts_with("3."));
    assert_eq!(number / 1_000_000, 3);
}
