//! A small, safe interface to [SQLite] built around prepared statements.
//!
//! <br>
//!
//! ## Usage
//!
//! There are two ways to run SQL against a [`Connection`]. [`execute`] runs a
//! batch of statements and discards any rows they produce, which is what
//! schema setup wants. [`prepare`] compiles a single statement, which can then
//! have [parameters bound] to it and [rows read] from it.
//!
//! Prepared statements borrow the connection they came from, and cursors
//! borrow the statement they read from. The borrow checker therefore makes
//! sure nothing outlives what it depends on.
//!
//! <br>
//!
//! #### Connecting and querying
//!
//! ```
//! use sqlt::Connection;
//!
//! let c = Connection::open_in_memory()?;
//!
//! c.execute(r#"
//!     CREATE TABLE users (name TEXT, age INTEGER);
//!
//!     INSERT INTO users VALUES ('Alice', 42);
//!     INSERT INTO users VALUES ('Bob', 52);
//! "#)?;
//!
//! let results = c.prepare("SELECT name, age FROM users ORDER BY age")?
//!     .query::<(String, u32)>()
//!     .collect::<sqlt::Result<Vec<_>>>()?;
//!
//! assert_eq!(results, [("Alice".to_string(), 42), ("Bob".to_string(), 52)]);
//! # Ok::<_, sqlt::Error>(())
//! ```
//!
//! <br>
//!
//! #### Binding parameters
//!
//! Parameters are bound by 1-based position, or by name through
//! [`bind_by_name`]. Every parameter must be bound before a statement is
//! executed, and [`reset`] clears all bindings so that nothing leaks from one
//! execution into the next.
//!
//! ```
//! use sqlt::{Code, Connection, ErrorKind};
//!
//! let c = Connection::open_in_memory()?;
//! c.execute("CREATE TABLE items (id INTEGER, price INTEGER, desc TEXT)")?;
//!
//! let mut insert = c.prepare("INSERT INTO items VALUES (?, ?, ?)")?;
//!
//! for (id, price, desc) in [(1, 998798, "item 1"), (2, 1000, "item 2")] {
//!     insert.reset()?;
//!     insert.bind((id, price, desc))?;
//!     insert.execute()?;
//! }
//!
//! insert.reset()?;
//! insert.bind_value(1, 3)?;
//!
//! let e = insert.execute().unwrap_err();
//! assert_eq!(e.kind(), ErrorKind::Bind);
//! assert_eq!(e.code(), Code::MISUSE);
//! # Ok::<_, sqlt::Error>(())
//! ```
//!
//! <br>
//!
//! #### The [`Row`] and [`Bind`] traits
//!
//! Structs can be read from rows and bound as parameters through the [`Row`
//! derive] and the [`Bind` derive]. Rows can borrow text and blobs straight
//! out of the statement when read through [`next`].
//!
//! ```
//! use sqlt::{Bind, Connection, Row};
//!
//! #[derive(Bind, Row, Debug, PartialEq)]
//! struct Person<'stmt> {
//!     name: &'stmt str,
//!     age: u32,
//! }
//!
//! let c = Connection::open_in_memory()?;
//! c.execute("CREATE TABLE persons (name TEXT, age INTEGER)")?;
//!
//! let mut stmt = c.prepare("INSERT INTO persons (name, age) VALUES (?, ?)")?;
//!
//! for person in [Person { name: "Alice", age: 30 }, Person { name: "Bob", age: 40 }] {
//!     stmt.reset()?;
//!     stmt.bind(&person)?;
//!     stmt.execute()?;
//! }
//!
//! let mut query = c.prepare("SELECT name, age FROM persons ORDER BY age")?;
//! assert_eq!(query.next::<Person<'_>>()?, Some(Person { name: "Alice", age: 30 }));
//! assert_eq!(query.next::<Person<'_>>()?, Some(Person { name: "Bob", age: 40 }));
//! assert_eq!(query.next::<Person<'_>>()?, None);
//! # Ok::<_, sqlt::Error>(())
//! ```
//!
//! <br>
//!
//! #### Transactions
//!
//! [`begin`] returns a guard which rolls back on drop unless
//! [`Transaction::commit`] is called.
//!
//! ```
//! use sqlt::Connection;
//!
//! let c = Connection::open_in_memory()?;
//! c.execute("CREATE TABLE log (line TEXT)")?;
//!
//! let tx = c.begin()?;
//! tx.prepare_with("INSERT INTO log VALUES (?)", ("kept",))?.execute()?;
//! tx.commit()?;
//!
//! {
//!     let tx = c.begin()?;
//!     tx.prepare_with("INSERT INTO log VALUES (?)", ("lost",))?.execute()?;
//! }
//!
//! let lines = c.prepare("SELECT line FROM log")?
//!     .query::<String>()
//!     .collect::<sqlt::Result<Vec<_>>>()?;
//!
//! assert_eq!(lines, ["kept"]);
//! # Ok::<_, sqlt::Error>(())
//! ```
//!
//! <br>
//!
//! ## Features
//!
//! * `derive` - Add a dependency to and re-export of the [`Row` derive] and
//!   [`Bind` derive] macros. Enabled by default.
//! * `bundled` - Compile and statically link the SQLite version bundled with
//!   [`libsqlite3-sys`] instead of linking the system library. Enabled by
//!   default.
//!
//! <br>
//!
//! ## Logging
//!
//! Diagnostics are emitted through [`tracing`]. Opening and closing
//! databases, preparing statements and transaction boundaries are logged at
//! `debug`, individual steps at `trace`. Failures which can't be reported
//! because they happen on drop are logged at `warn`.
//!
//! [`begin`]: Connection::begin
//! [`bind_by_name`]: Statement::bind_by_name
//! [`Bind` derive]: derive@Bind
//! [`execute`]: Connection::execute
//! [`libsqlite3-sys`]: https://docs.rs/libsqlite3-sys
//! [`next`]: Statement::next
//! [`prepare`]: Connection::prepare
//! [`reset`]: Statement::reset
//! [`Row` derive]: derive@Row
//! [`tracing`]: https://docs.rs/tracing
//! [parameters bound]: Statement::bind
//! [rows read]: Rows
//! [SQLite]: https://www.sqlite.org

#![warn(rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(test)]
mod tests;

mod bind;
mod bind_value;
mod connection;
mod error;
mod ffi;
mod from_column;
mod open_options;
mod row;
mod rows;
mod statement;
mod transaction;
mod utils;
mod value;
mod version;

#[doc(inline)]
pub use self::bind::Bind;
#[doc(inline)]
pub use self::bind_value::BindValue;
#[doc(inline)]
pub use self::connection::Connection;
#[doc(inline)]
pub use self::error::{Code, Error, ErrorKind, Result};
#[doc(inline)]
pub use self::from_column::FromColumn;
#[doc(inline)]
pub use self::open_options::OpenOptions;
#[doc(inline)]
pub use self::row::Row;
#[doc(inline)]
pub use self::rows::Rows;
#[doc(inline)]
pub use self::statement::{ColumnNames, Null, State, Statement};
#[doc(inline)]
pub use self::transaction::{Transaction, TransactionBehavior};
#[doc(inline)]
pub use self::value::{Type, Value};
#[doc(inline)]
pub use self::version::{lib_version, lib_version_number};

/// Derive macro for [`Bind`].
///
/// Implements [`Bind`] for a struct by binding each field through
/// [`Statement::bind_value`]. By default fields are bound by position, the
/// first field to index 1 and each following field to the next index.
///
/// ```
/// use sqlt::Bind;
///
/// #[derive(Bind)]
/// struct Person<'a> {
///     name: &'a str,
///     age: u32,
/// }
/// ```
///
/// <br>
///
/// ## Container attributes
///
/// <br>
///
/// #### `#[sql(crate = ..)]`
///
/// Specify an alternative path to the `sqlt` crate, for when it has been
/// renamed.
///
/// ```
/// # extern crate sqlt as my_sqlt;
/// use my_sqlt::Bind;
///
/// #[derive(Bind)]
/// #[sql(crate = ::my_sqlt)]
/// struct Person<'a> {
///     name: &'a str,
///     age: u32,
/// }
/// ```
///
/// <br>
///
/// #### `#[sql(named)]`
///
/// Bind every field to the parameter named after it, prefixed with `:`.
///
/// ```
/// use sqlt::{Bind, Connection};
///
/// #[derive(Bind)]
/// #[sql(named)]
/// struct Person<'a> {
///     name: &'a str,
///     age: u32,
/// }
///
/// let c = Connection::open_in_memory()?;
/// c.execute("CREATE TABLE persons (name TEXT, age INTEGER)")?;
///
/// let mut stmt = c.prepare("INSERT INTO persons (age, name) VALUES (:age, :name)")?;
/// stmt.bind(Person { name: "Alice", age: 30 })?;
/// stmt.execute()?;
/// # Ok::<_, sqlt::Error>(())
/// ```
///
/// <br>
///
/// ## Field attributes
///
/// <br>
///
/// #### `#[sql(index = ..)]`
///
/// Override the index a field is bound to. Fields after it continue from the
/// given index.
///
/// ```
/// use sqlt::Bind;
///
/// #[derive(Bind)]
/// struct Person<'a> {
///     #[sql(index = 2)]
///     name: &'a str,
///     #[sql(index = 1)]
///     age: u32,
/// }
/// ```
///
/// <br>
///
/// #### `#[sql(name = "..")]`
///
/// Bind the field to an explicitly named parameter.
///
/// ```
/// use sqlt::{Bind, Connection};
///
/// #[derive(Bind)]
/// struct Person<'a> {
///     #[sql(name = ":who")]
///     name: &'a str,
///     #[sql(name = ":years")]
///     age: u32,
/// }
///
/// let c = Connection::open_in_memory()?;
/// c.execute("CREATE TABLE persons (name TEXT, age INTEGER)")?;
///
/// let mut stmt = c.prepare("INSERT INTO persons (name, age) VALUES (:who, :years)")?;
/// stmt.bind(Person { name: "Alice", age: 30 })?;
/// stmt.execute()?;
/// # Ok::<_, sqlt::Error>(())
/// ```
#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use sqlt_macros::Bind;

/// Derive macro for [`Row`].
///
/// Implements [`Row`] for a struct by reading each field through
/// [`Statement::get`]. By default fields are read by position, the first
/// field from column 0 and each following field from the next column.
///
/// If the struct has a lifetime parameter, the first one is used as the
/// lifetime of the statement, which allows fields to borrow from it.
///
/// ```
/// use sqlt::{Connection, Row};
///
/// #[derive(Row)]
/// struct Person<'stmt> {
///     name: &'stmt str,
///     age: u32,
/// }
///
/// #[derive(Row)]
/// struct PersonTuple(String, u32);
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE users (name TEXT, age INTEGER);
///     INSERT INTO users VALUES ('Alice', 42);
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT name, age FROM users")?;
///
/// while let Some(person) = stmt.next::<Person<'_>>()? {
///     assert_eq!((person.name, person.age), ("Alice", 42));
/// }
///
/// stmt.reset()?;
///
/// for row in stmt.query::<PersonTuple>() {
///     let PersonTuple(name, age) = row?;
///     assert_eq!((name.as_str(), age), ("Alice", 42));
/// }
/// # Ok::<_, sqlt::Error>(())
/// ```
///
/// <br>
///
/// ## Container attributes
///
/// <br>
///
/// #### `#[sql(crate = ..)]`
///
/// Specify an alternative path to the `sqlt` crate, for when it has been
/// renamed.
///
/// ```
/// # extern crate sqlt as my_sqlt;
/// use my_sqlt::Row;
///
/// #[derive(Row)]
/// #[sql(crate = ::my_sqlt)]
/// struct Person<'stmt> {
///     name: &'stmt str,
///     age: u32,
/// }
/// ```
///
/// <br>
///
/// ## Field attributes
///
/// <br>
///
/// #### `#[sql(index = ..)]`
///
/// Override the column a field is read from.
///
/// ```
/// use sqlt::{Connection, Row};
///
/// #[derive(Row)]
/// struct Person {
///     #[sql(index = 1)]
///     name: String,
///     #[sql(index = 0)]
///     age: u32,
/// }
///
/// let c = Connection::open_in_memory()?;
/// let mut stmt = c.prepare("SELECT 42, 'Alice'")?;
///
/// let person = stmt.next::<Person>()?.expect("a row");
/// assert_eq!((person.name.as_str(), person.age), ("Alice", 42));
/// # Ok::<_, sqlt::Error>(())
/// ```
#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use sqlt_macros::Row;
