use anyhow::Result;

use crate::{Code, Connection, ErrorKind, Null, Type, Value};

use super::data;

#[test]
fn connection_change_count() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::users(&c)?;

    assert_eq!(c.changes(), 1);
    assert_eq!(c.total_changes(), 1);

    c.execute("INSERT INTO users VALUES (2, 'Bob', NULL, NULL, NULL)")?;
    assert_eq!(c.changes(), 1);
    assert_eq!(c.total_changes(), 2);

    c.execute("UPDATE users SET name = 'Bob' WHERE id = 1")?;
    assert_eq!(c.changes(), 1);
    assert_eq!(c.total_changes(), 3);

    c.execute("DELETE FROM users")?;
    assert_eq!(c.changes(), 2);
    assert_eq!(c.total_changes(), 5);
    Ok(())
}

#[test]
fn connection_error() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::users(&c)?;

    let e = c.execute(":)").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Execute);
    assert_eq!(e.code(), Code::ERROR);
    Ok(())
}

#[test]
fn connection_last_insert_rowid() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::items(&c)?;
    assert_eq!(c.last_insert_rowid(), 3);

    let mut stmt = c.prepare("INSERT INTO items (price, desc) VALUES (?, ?)")?;
    stmt.bind((42, "item 4"))?;
    assert!(stmt.execute()?.is_done());
    assert_eq!(c.last_insert_rowid(), 4);
    Ok(())
}

#[test]
fn connection_close() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::users(&c)?;
    c.close()?;

    let c = Connection::open_in_memory()?;
    data::users(&c)?;

    {
        let mut stmt = c.prepare("SELECT name FROM users")?;
        assert_eq!(stmt.next::<String>()?.as_deref(), Some("Alice"));
    }

    c.close()?;
    Ok(())
}

#[test]
fn constraint_violation() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::items(&c)?;

    let mut stmt = c.prepare("INSERT INTO items VALUES (?, ?, ?)")?;
    stmt.bind((1, 10, "duplicate"))?;

    let e = stmt.execute().unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Execute);
    assert_eq!(e.code(), Code::CONSTRAINT_PRIMARYKEY);
    assert_eq!(e.code().primary(), Code::CONSTRAINT);
    assert_eq!(e.message(), "UNIQUE constraint failed: items.id");

    stmt.reset()?;
    stmt.bind((5, Null, "no price"))?;

    let e = stmt.execute().unwrap_err();
    assert_eq!(e.code(), Code::CONSTRAINT_NOTNULL);
    Ok(())
}

#[test]
fn prepare_errors() -> Result<()> {
    let c = Connection::open_in_memory()?;

    let e = c.prepare("SELECT * FROM missing").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Prepare);
    assert_eq!(e.code(), Code::ERROR);
    assert_eq!(e.message(), "no such table: missing");

    let e = c.prepare("").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Prepare);
    assert_eq!(e.code(), Code::MISUSE);
    Ok(())
}

#[test]
fn statement_bind() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::users(&c)?;

    let mut stmt = c.prepare("INSERT INTO users VALUES (?, ?, ?, ?, ?)")?;

    stmt.bind_value(1, 2i64)?;
    stmt.bind_value(2, "Bob")?;
    stmt.bind_value(3, 69.42)?;
    stmt.bind_value(4, &[0x69u8, 0x42u8][..])?;
    stmt.bind_value(5, Null)?;

    assert!(stmt.execute()?.is_done());
    Ok(())
}

#[test]
fn statement_bind_with_nullable() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::users(&c)?;

    let mut stmt = c.prepare("INSERT INTO users VALUES (?, ?, ?, ?, ?)")?;

    stmt.bind_value(1, None::<i64>)?;
    stmt.bind_value(2, None::<&str>)?;
    stmt.bind_value(3, None::<f64>)?;
    stmt.bind_value(4, None::<&[u8]>)?;
    stmt.bind_value(5, None::<&str>)?;
    assert!(stmt.execute()?.is_done());

    stmt.reset()?;
    stmt.bind_value(1, Some(2i64))?;
    stmt.bind_value(2, Some("Bob"))?;
    stmt.bind_value(3, Some(69.42))?;
    stmt.bind_value(4, Some(&[0x69u8, 0x42u8][..]))?;
    stmt.bind_value(5, None::<&str>)?;
    assert!(stmt.execute()?.is_done());

    let mut stmt = c.prepare("SELECT COUNT(*) FROM users WHERE id IS NULL")?;
    assert_eq!(stmt.next::<i64>()?, Some(1));
    Ok(())
}

#[test]
fn statement_bind_by_name() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::users(&c)?;

    let mut stmt = c.prepare("INSERT INTO users VALUES (:id, :name, :age, :photo, :email)")?;

    stmt.bind_by_name(":id", 2i64)?;
    stmt.bind_by_name(":name", "Bob")?;
    stmt.bind_by_name(":age", 69.42)?;
    stmt.bind_by_name(":photo", &[0x69u8, 0x42u8][..])?;
    stmt.bind_by_name(":email", Null)?;

    let e = stmt.bind_by_name(":missing", 404).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Bind);

    assert!(stmt.execute()?.is_done());
    Ok(())
}

#[test]
fn statement_column_count() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::users(&c)?;

    let mut stmt = c.prepare("SELECT * FROM users")?;
    assert_eq!(stmt.column_count(), 5);
    assert!(stmt.execute()?.is_row());
    assert_eq!(stmt.column_count(), 5);
    Ok(())
}

#[test]
fn statement_column_name() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::users(&c)?;

    let stmt = c.prepare("SELECT id, name, age, photo AS user_photo FROM users")?;

    let names = stmt.column_names().collect::<Vec<_>>();
    assert_eq!(names, ["id", "name", "age", "user_photo"]);
    assert_eq!(stmt.column_name(3), Some("user_photo"));
    assert_eq!(stmt.column_name(4), None);

    let names = stmt.column_names().rev().collect::<Vec<_>>();
    assert_eq!(names, ["user_photo", "age", "name", "id"]);
    Ok(())
}

#[test]
fn statement_parameter_index() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::users(&c)?;

    let mut stmt = c.prepare("INSERT INTO users VALUES (:id, :name, :age, :photo, :email)")?;
    assert_eq!(stmt.parameter_count(), 5);

    for (name, value) in [
        (":id", Value::Integer(2)),
        (":name", Value::from("Bob")),
        (":age", Value::Float(69.42)),
        (":photo", Value::Blob(vec![0x69, 0x42])),
        (":email", Value::Null),
    ] {
        let index = stmt.parameter_index(name).expect("parameter should exist");
        assert_eq!(stmt.parameter_name(index), Some(name));
        stmt.bind_value(index, value)?;
    }

    assert_eq!(stmt.parameter_index(":missing"), None);
    assert_eq!(stmt.parameter_index("bad\0name"), None);
    assert!(stmt.execute()?.is_done());
    Ok(())
}

#[test]
fn statement_read() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::users(&c)?;

    let mut stmt = c.prepare("SELECT * FROM users")?;

    assert!(stmt.execute()?.is_row());
    assert_eq!(stmt.get::<i64>(0)?, 1);
    assert_eq!(stmt.get::<String>(1)?, "Alice");
    assert_eq!(stmt.get::<f64>(2)?, 42.69);
    assert_eq!(stmt.get::<Vec<u8>>(3)?, [0x42, 0x69]);
    assert_eq!(stmt.get::<Value>(4)?, Value::Null);
    assert!(stmt.execute()?.is_done());
    Ok(())
}

#[test]
fn statement_read_with_nullable() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::users(&c)?;

    let mut stmt = c.prepare("SELECT * FROM users")?;

    assert!(stmt.execute()?.is_row());
    assert_eq!(stmt.get::<Option<i64>>(0)?, Some(1));
    assert_eq!(stmt.get::<Option<String>>(1)?, Some(String::from("Alice")));
    assert_eq!(stmt.get::<Option<f64>>(2)?, Some(42.69));
    assert_eq!(stmt.get::<Option<Vec<u8>>>(3)?, Some(vec![0x42, 0x69]));
    assert_eq!(stmt.get::<Option<String>>(4)?, None);
    assert!(stmt.execute()?.is_done());
    Ok(())
}

#[test]
fn statement_read_null_defaults() -> Result<()> {
    let c = Connection::open_in_memory()?;

    let mut stmt = c.prepare("SELECT NULL, NULL, NULL, NULL")?;
    assert!(stmt.execute()?.is_row());

    assert_eq!(stmt.column_type(0), Type::NULL);
    assert_eq!(stmt.get::<i64>(0)?, 0);
    assert_eq!(stmt.get::<f64>(1)?, 0.0);
    assert_eq!(stmt.get::<String>(2)?, "");
    assert_eq!(stmt.get::<Vec<u8>>(3)?, Vec::<u8>::new());
    Ok(())
}

#[test]
fn statement_read_coerces() -> Result<()> {
    let c = Connection::open_in_memory()?;

    let mut stmt = c.prepare("SELECT 42, '17', 2.5")?;
    assert!(stmt.execute()?.is_row());

    assert_eq!(stmt.get::<String>(0)?, "42");
    assert_eq!(stmt.get::<i64>(1)?, 17);
    assert_eq!(stmt.get::<i64>(2)?, 2);
    assert!(stmt.get::<bool>(0)?);
    Ok(())
}

#[test]
fn statement_embedded_nul() -> Result<()> {
    let c = Connection::open_in_memory()?;
    c.execute("CREATE TABLE texts (value TEXT)")?;

    let mut stmt = c.prepare("INSERT INTO texts VALUES (?)")?;
    stmt.bind_value(1, "before\0after")?;
    stmt.execute()?;

    let mut stmt = c.prepare("SELECT value FROM texts")?;
    assert_eq!(stmt.next::<String>()?.as_deref(), Some("before\0after"));
    Ok(())
}

#[test]
fn borrowed_columns_are_never_converted() -> Result<()> {
    let c = Connection::open_in_memory()?;
    c.execute("CREATE TABLE files (data BLOB, name TEXT, size INTEGER)")?;

    let mut stmt = c.prepare("INSERT INTO files VALUES (?, ?, ?)")?;
    stmt.bind((vec![b'x'; 1 << 20], "large", 1 << 20))?;
    stmt.execute()?;

    let mut stmt = c.prepare("SELECT data, name, size FROM files")?;
    assert!(stmt.execute()?.is_row());

    let bytes = stmt.get::<&[u8]>(0)?;

    let e = stmt.get::<&str>(0).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Fetch);
    assert_eq!(e.code(), Code::MISMATCH);
    assert_eq!(e.message(), "column 0 holds BLOB, which cannot be borrowed as text");

    assert_eq!(stmt.get::<String>(0)?.len(), 1 << 20);
    assert_eq!(stmt.column_type(0), Type::BLOB);
    assert_eq!(bytes.len(), 1 << 20);
    assert!(bytes.iter().all(|&b| b == b'x'));

    let name = stmt.get::<&str>(1)?;
    assert_eq!(stmt.get::<&[u8]>(1).unwrap_err().code(), Code::MISMATCH);
    assert_eq!(stmt.get::<Vec<u8>>(1)?, b"large");
    assert_eq!(name, "large");

    assert_eq!(stmt.get::<&str>(2).unwrap_err().code(), Code::MISMATCH);
    assert_eq!(stmt.get::<String>(2)?, "1048576");
    Ok(())
}

#[test]
fn numbered_parameter_gaps_must_be_bound() -> Result<()> {
    let c = Connection::open_in_memory()?;

    let mut stmt = c.prepare("SELECT ?3")?;
    assert_eq!(stmt.parameter_count(), 3);
    assert_eq!(stmt.parameter_name(3), Some("?3"));
    assert_eq!(stmt.parameter_name(1), None);

    stmt.bind_value(3, 42)?;

    let e = stmt.execute().unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Bind);
    assert_eq!(e.message(), "parameter 1 is not bound");

    stmt.bind((Null, Null, 42))?;
    assert_eq!(stmt.next::<i64>()?, Some(42));
    Ok(())
}

#[test]
fn statement_integer_range() -> Result<()> {
    let c = Connection::open_in_memory()?;

    let mut stmt = c.prepare("SELECT ?, ?")?;
    stmt.bind((i64::MIN, -1))?;
    assert!(stmt.execute()?.is_row());

    assert_eq!(stmt.get::<i64>(0)?, i64::MIN);

    let e = stmt.get::<u64>(1).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Fetch);
    assert_eq!(e.code(), Code::MISMATCH);

    let e = stmt.get::<i32>(0).unwrap_err();
    assert_eq!(e.code(), Code::MISMATCH);

    stmt.reset()?;

    let e = stmt.bind_value(1, u64::MAX).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Bind);
    assert_eq!(e.code(), Code::MISMATCH);
    Ok(())
}

#[test]
fn statement_column_out_of_range() -> Result<()> {
    let c = Connection::open_in_memory()?;

    let mut stmt = c.prepare("SELECT 1, 2")?;
    assert!(stmt.execute()?.is_row());

    let e = stmt.get::<i64>(2).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Fetch);
    assert_eq!(e.code(), Code::RANGE);

    let e = stmt.get::<i64>(-1).unwrap_err();
    assert_eq!(e.code(), Code::RANGE);
    Ok(())
}

#[test]
fn statement_parameter_out_of_range() -> Result<()> {
    let c = Connection::open_in_memory()?;

    let mut stmt = c.prepare("SELECT ?")?;

    let e = stmt.bind_value(2, 1).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Bind);
    assert_eq!(e.code(), Code::RANGE);

    let e = stmt.bind((1, 2)).unwrap_err();
    assert_eq!(e.code(), Code::RANGE);
    Ok(())
}

#[test]
fn statement_wildcard() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::english(&c)?;

    let mut stmt = c.prepare("SELECT value FROM english WHERE value LIKE '%type'")?;

    let mut count = 0;

    while stmt.execute()?.is_row() {
        count += 1;
    }

    assert_eq!(count, 6);
    Ok(())
}

#[test]
fn statement_wildcard_with_binding() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::english(&c)?;

    let mut stmt = c.prepare("SELECT value FROM english WHERE value LIKE ?")?;
    stmt.bind_value(1, "%type")?;

    let values = stmt.query::<String>().collect::<crate::Result<Vec<_>>>()?;
    assert_eq!(values.len(), 6);
    assert!(values.iter().all(|v| v.ends_with("type")));
    Ok(())
}

#[test]
fn value_round_trip() -> Result<()> {
    let c = Connection::open_in_memory()?;
    c.execute("CREATE TABLE things (value)")?;

    let values = [
        Value::Null,
        Value::Integer(-7),
        Value::Float(0.5),
        Value::Text(String::from("text")),
        Value::Blob(vec![1, 2, 3]),
    ];

    let mut insert = c.prepare("INSERT INTO things VALUES (?)")?;

    for value in &values {
        insert.reset()?;
        insert.bind_value(1, value)?;
        insert.execute()?;
    }

    let mut select = c.prepare("SELECT value FROM things ORDER BY rowid")?;
    let read = select.query::<Value>().collect::<crate::Result<Vec<_>>>()?;
    assert_eq!(read, values);

    let types = read.iter().map(Value::ty).collect::<Vec<_>>();
    assert_eq!(types, [Type::NULL, Type::INTEGER, Type::FLOAT, Type::TEXT, Type::BLOB]);
    Ok(())
}

#[test]
fn reprepare_keeps_old_statement_on_failure() -> Result<()> {
    let c = Connection::open_in_memory()?;
    data::items(&c)?;

    let mut stmt = c.prepare("SELECT desc FROM items WHERE id = ?")?;

    let e = stmt.reprepare("SELECT nope FROM items").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Prepare);
    assert_eq!(stmt.sql(), "SELECT desc FROM items WHERE id = ?");

    stmt.bind_value(1, 2)?;
    assert_eq!(stmt.next::<String>()?.as_deref(), Some("item 2"));

    stmt.reprepare("SELECT price FROM items WHERE id = ?")?;
    assert_eq!(stmt.parameter_count(), 1);

    let e = stmt.execute().unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Bind);

    stmt.bind_value(1, 2)?;
    assert_eq!(stmt.next::<i64>()?, Some(1000));
    Ok(())
}
