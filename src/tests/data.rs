use crate::{Connection, Result};

pub(super) fn english(c: &Connection) -> Result<()> {
    c.execute(
        r#"
        CREATE TABLE english (value TEXT);

        INSERT INTO english VALUES ('cerotype');
        INSERT INTO english VALUES ('metatype');
        INSERT INTO english VALUES ('ozotype');
        INSERT INTO english VALUES ('phenotype');
        INSERT INTO english VALUES ('plastotype');
        INSERT INTO english VALUES ('undertype');
        INSERT INTO english VALUES ('nonsence');
        "#,
    )
}

pub(super) fn users(c: &Connection) -> Result<()> {
    c.execute(
        r#"
        CREATE TABLE users (id INTEGER, name TEXT, age REAL, photo BLOB, email TEXT);

        INSERT INTO users VALUES (1, 'Alice', 42.69, X'4269', NULL);
        "#,
    )
}

pub(super) fn items(c: &Connection) -> Result<()> {
    c.execute(
        r#"
        CREATE TABLE items (id INTEGER PRIMARY KEY, price INTEGER NOT NULL, desc TEXT);

        INSERT INTO items VALUES (1, 998798, 'item 1');
        INSERT INTO items VALUES (2, 1000, 'item 2');
        INSERT INTO items VALUES (3, 1000000, 'item 3');
        "#,
    )
}
