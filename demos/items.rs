//! Store a handful of items and list the expensive ones.
//!
//! Run with `RUST_LOG=sqlt=trace` to see every statement being stepped.

use sqlt::{Bind, Connection, Row};
use tracing_subscriber::EnvFilter;

#[derive(Bind)]
struct NewItem<'a> {
    id: i64,
    price: i64,
    desc: &'a str,
}

#[derive(Row)]
struct Item<'stmt> {
    id: i64,
    price: i64,
    desc: Option<&'stmt str>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let c = Connection::open_in_memory()?;

    c.execute(
        r#"
        CREATE TABLE items (
            id INTEGER PRIMARY KEY,
            price INTEGER NOT NULL,
            desc TEXT
        )
        "#,
    )?;

    let tx = c.begin()?;
    let mut insert = tx.prepare("INSERT INTO items (id, price, desc) VALUES (?, ?, ?)")?;

    for (id, price, desc) in [
        (1, 998798, "hand-knotted rug"),
        (2, 1000, "tea towel"),
        (3, 1000000, "grand piano"),
    ] {
        insert.reset()?;
        insert.bind(NewItem { id, price, desc })?;
        insert.execute()?;
    }

    drop(insert);
    tx.commit()?;

    let mut stmt = c.prepare("SELECT id, price, desc FROM items WHERE price > ? ORDER BY id")?;
    stmt.bind((50000,))?;

    println!("Items above 50000:");

    while let Some(item) = stmt.next::<Item<'_>>()? {
        println!(
            "  #{}: {} ({})",
            item.id,
            item.desc.unwrap_or("no description"),
            item.price
        );
    }

    Ok(())
}
