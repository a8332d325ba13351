use core::fmt;
use core::marker::PhantomData;

use crate::error::{ErrorKind, Result};
use crate::row::Row;
use crate::statement::{Position, State, Statement};

/// A forward-only cursor over the rows produced by a [`Statement`].
///
/// The cursor is driven by [`advance`], and the current row is read with
/// [`get`]. Once the statement has run out of rows the cursor stays
/// exhausted, and [`advance`] keeps returning `false` without stepping the
/// statement again.
///
/// If the statement was already stepped onto a row through
/// [`Statement::execute`], the first call to [`advance`] yields that row. A
/// row which [`Statement::next`] or another cursor already handed out is not
/// yielded again.
///
/// Rows are decoded into owned values. To borrow text or blobs from the
/// statement, use [`Statement::next`] instead. The cursor is also an
/// [`Iterator`].
///
/// [`advance`]: Self::advance
/// [`get`]: Self::get
///
/// # Examples
///
/// ```
/// use sqlt::{Connection, Rows};
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE items (id INTEGER, price INTEGER, desc TEXT);
///     INSERT INTO items VALUES (1, 998798, 'item 1');
///     INSERT INTO items VALUES (2, 1000, 'item 2');
///     INSERT INTO items VALUES (3, 1000000, 'item 3');
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT id, desc FROM items WHERE price > ? ORDER BY id")?;
/// stmt.bind((50000,))?;
///
/// let mut rows = Rows::<(i64, String)>::new(&mut stmt);
/// let mut seen = Vec::new();
///
/// while rows.advance()? {
///     seen.push(rows.get()?);
/// }
///
/// assert!(!rows.advance()?);
/// assert_eq!(seen, [(1, "item 1".to_owned()), (3, "item 3".to_owned())]);
/// # Ok::<_, sqlt::Error>(())
/// ```
pub struct Rows<'stmt, 'conn, R> {
    stmt: &'stmt mut Statement<'conn>,
    pending: bool,
    done: bool,
    _marker: PhantomData<fn() -> R>,
}

impl<'stmt, 'conn, R> Rows<'stmt, 'conn, R> {
    /// Construct a cursor over the rows of `stmt`.
    pub fn new(stmt: &'stmt mut Statement<'conn>) -> Self {
        let (pending, done) = match stmt.position() {
            Position::Ready | Position::Yielded => (false, false),
            Position::Row => (true, false),
            Position::Done => (false, true),
        };

        Self {
            stmt,
            pending,
            done,
            _marker: PhantomData,
        }
    }

    /// Move to the next row.
    ///
    /// Returns `true` if a row is available and `false` once the statement is
    /// exhausted. A failed step also exhausts the cursor.
    pub fn advance(&mut self) -> Result<bool> {
        if self.done {
            return Ok(false);
        }

        if self.pending {
            self.pending = false;
            self.stmt.mark_yielded();
            return Ok(true);
        }

        match self.stmt.step(ErrorKind::Fetch) {
            Ok(State::Row) => {
                self.stmt.mark_yielded();
                Ok(true)
            }
            Ok(State::Done) => {
                self.done = true;
                Ok(false)
            }
            Err(error) => {
                self.done = true;
                Err(error)
            }
        }
    }

    /// Decode the current row.
    ///
    /// # Errors
    ///
    /// Errors if the cursor is not positioned on a row, or if decoding fails.
    ///
    /// ```
    /// use sqlt::{Code, Connection, ErrorKind, Rows};
    ///
    /// let c = Connection::open_in_memory()?;
    /// let mut stmt = c.prepare("SELECT 1")?;
    /// let mut rows = Rows::<i64>::new(&mut stmt);
    ///
    /// let e = rows.get().unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::Fetch);
    /// assert_eq!(e.code(), Code::MISUSE);
    ///
    /// assert!(rows.advance()?);
    /// assert_eq!(rows.get()?, 1);
    /// assert!(!rows.advance()?);
    /// assert!(rows.get().is_err());
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    #[inline]
    pub fn get<'row>(&'row self) -> Result<R>
    where
        R: Row<'row>,
    {
        R::from_row(&*self.stmt)
    }

    /// Test if the cursor has run out of rows.
    #[inline]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Access the underlying statement.
    #[inline]
    pub fn statement(&self) -> &Statement<'conn> {
        &*self.stmt
    }
}

impl<R> fmt::Debug for Rows<'_, '_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows")
            .field("stmt", &self.stmt)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// Iterating over the decoded rows, stopping after the first error.
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE users (name TEXT, age INTEGER);
///     INSERT INTO users VALUES ('Alice', 42);
///     INSERT INTO users VALUES ('Bob', 69);
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT name, age FROM users ORDER BY age")?;
/// let users = stmt.query::<(String, u32)>().collect::<sqlt::Result<Vec<_>>>()?;
/// assert_eq!(users, [("Alice".to_owned(), 42), ("Bob".to_owned(), 69)]);
/// # Ok::<_, sqlt::Error>(())
/// ```
impl<R> Iterator for Rows<'_, '_, R>
where
    R: for<'row> Row<'row>,
{
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(error) => return Some(Err(error)),
        }

        match self.get() {
            Ok(row) => Some(Ok(row)),
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}
