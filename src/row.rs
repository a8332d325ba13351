use crate::error::Result;
use crate::from_column::FromColumn;
use crate::statement::Statement;
use crate::utils::repeat;

/// A type which can be decoded from a whole row.
///
/// This is implemented for every [`FromColumn`] type, which reads the first
/// column, and for tuples, which read one column per element starting from the
/// first. Structs can implement it through the [`Row` derive].
///
/// The `'stmt` lifetime allows the row to borrow text and blobs from the
/// statement.
///
/// [`Row` derive]: derive@crate::Row
///
/// # Examples
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
///     INSERT INTO users VALUES ('Bob', 52);
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT name, age FROM users ORDER BY age")?;
///
/// let person = stmt.next::<Person>()?.expect("a row");
/// assert_eq!((person.name, person.age), ("Alice", 42));
///
/// let PersonTuple(name, age) = stmt.next::<PersonTuple>()?.expect("a row");
/// assert_eq!((name.as_str(), age), ("Bob", 52));
/// # Ok::<_, sqlt::Error>(())
/// ```
pub trait Row<'stmt>: Sized {
    /// Decode the current row of `stmt`.
    fn from_row(stmt: &'stmt Statement<'_>) -> Result<Self>;
}

impl<'stmt, T> Row<'stmt> for T
where
    T: FromColumn<'stmt>,
{
    #[inline]
    fn from_row(stmt: &'stmt Statement<'_>) -> Result<Self> {
        stmt.get(0)
    }
}

macro_rules! implement_tuple {
    ($ty0:ident $var0:ident $column0:literal $index0:literal $(, $ty:ident $var:ident $column:literal $index:literal)* $(,)?) => {
        /// [`Row`] implementation for a tuple.
        ///
        /// Elements are read one after another starting from column 0.
        impl<'stmt, $ty0, $($ty,)*> Row<'stmt> for ($ty0, $($ty,)*)
        where
            $ty0: FromColumn<'stmt>,
            $($ty: FromColumn<'stmt>,)*
        {
            #[inline]
            fn from_row(stmt: &'stmt Statement<'_>) -> Result<Self> {
                let $var0 = stmt.get::<$ty0>($column0)?;
                $(let $var = stmt.get::<$ty>($column)?;)*
                Ok(($var0, $($var,)*))
            }
        }
    };
}

repeat!(implement_tuple);
