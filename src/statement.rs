use core::ffi::c_int;
use core::fmt;
use core::ptr::{self, NonNull};

use crate::bind::Bind;
use crate::bind_value::BindValue;
use crate::connection::Connection;
use crate::error::{Code, Error, ErrorKind, Result};
use crate::ffi;
use crate::from_column::FromColumn;
use crate::row::Row;
use crate::rows::Rows;
use crate::utils;
use crate::value::Type;

/// A marker type representing a NULL value.
///
/// # Examples
///
/// ```
/// use sqlt::{Connection, Null};
///
/// let c = Connection::open_in_memory()?;
/// c.execute("CREATE TABLE users (name TEXT, age INTEGER)")?;
///
/// let mut stmt = c.prepare("INSERT INTO users VALUES (?, ?)")?;
/// stmt.bind(("Alice", Null))?;
/// stmt.execute()?;
///
/// let mut stmt = c.prepare("SELECT name, age FROM users")?;
/// assert_eq!(stmt.next::<(String, Option<i64>)>()?, Some(("Alice".to_string(), None)));
/// # Ok::<_, sqlt::Error>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Null;

/// The outcome of stepping a statement once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum State {
    /// There is a row available for reading.
    Row,
    /// The statement has been entirely evaluated.
    Done,
}

impl State {
    /// Test if the state is [`State::Row`].
    #[inline]
    pub fn is_row(self) -> bool {
        matches!(self, State::Row)
    }

    /// Test if the state is [`State::Done`].
    #[inline]
    pub fn is_done(self) -> bool {
        matches!(self, State::Done)
    }
}

/// Where a statement is in its step cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Position {
    /// Freshly prepared or reset, the next step starts a new execution.
    Ready,
    /// Positioned on a row produced by [`Statement::execute`] which nothing
    /// has read yet.
    Row,
    /// Positioned on a row which has already been handed out by
    /// [`Statement::next`] or a cursor.
    Yielded,
    /// Evaluation finished.
    Done,
}

/// A prepared statement.
///
/// Statements are created through [`Connection::prepare`] and borrow the
/// connection they were prepared on. The compiled statement is finalized when
/// this is dropped.
///
/// Parameters are bound by 1-based position, either one at a time through
/// [`bind_value`] or all at once from a tuple through [`bind`]. Every
/// parameter has to be bound before a statement is executed, and [`reset`]
/// clears all bindings.
///
/// Every position up to [`parameter_count`] counts as a parameter, including
/// positions a numbered parameter skips over. `SELECT ?3` has three
/// parameters, and positions 1 and 2 have to be bound as well, for example to
/// [`Null`].
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
/// c.execute("CREATE TABLE users (name TEXT, age INTEGER)")?;
///
/// let mut insert = c.prepare("INSERT INTO users VALUES (?, ?)")?;
///
/// for (name, age) in [("Alice", 42), ("Bob", 69)] {
///     insert.reset()?;
///     insert.bind((name, age))?;
///     insert.execute()?;
/// }
///
/// let mut select = c.prepare("SELECT name FROM users WHERE age > ?")?;
/// select.bind_value(1, 50)?;
///
/// let names = select.query::<String>().collect::<sqlt::Result<Vec<_>>>()?;
/// assert_eq!(names, ["Bob"]);
/// # Ok::<_, sqlt::Error>(())
/// ```
///
/// [`bind_value`]: Self::bind_value
/// [`bind`]: Self::bind
/// [`reset`]: Self::reset
/// [`parameter_count`]: Self::parameter_count
pub struct Statement<'conn> {
    conn: &'conn Connection,
    raw: NonNull<ffi::sqlite3_stmt>,
    sql: Box<str>,
    bound: Vec<bool>,
    position: Position,
}

impl fmt::Debug for Statement<'_> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &self.sql)
            .finish_non_exhaustive()
    }
}

impl<'conn> Statement<'conn> {
    pub(crate) fn new(conn: &'conn Connection, sql: &str) -> Result<Self> {
        let raw = compile(conn, sql)?;

        let mut stmt = Self {
            conn,
            raw,
            sql: sql.into(),
            bound: Vec::new(),
            position: Position::Ready,
        };

        stmt.bound = vec![false; stmt.parameter_count() as usize];
        Ok(stmt)
    }

    /// Compile new SQL text into this statement, replacing the old compiled
    /// statement.
    ///
    /// All bindings are lost. If compilation fails the old statement is kept
    /// as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::Connection;
    ///
    /// let c = Connection::open_in_memory()?;
    ///
    /// let mut stmt = c.prepare("SELECT 1")?;
    /// assert_eq!(stmt.next::<i64>()?, Some(1));
    ///
    /// stmt.reprepare("SELECT ? * 2")?;
    /// assert_eq!(stmt.sql(), "SELECT ? * 2");
    /// stmt.bind((21,))?;
    /// assert_eq!(stmt.next::<i64>()?, Some(42));
    ///
    /// assert!(stmt.reprepare("SELEC 3").is_err());
    /// assert_eq!(stmt.sql(), "SELECT ? * 2");
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    pub fn reprepare(&mut self, sql: impl AsRef<str>) -> Result<()> {
        let sql = sql.as_ref();
        let raw = compile(self.conn, sql)?;

        unsafe {
            ffi::sqlite3_finalize(self.raw.as_ptr());
        }

        self.raw = raw;
        self.sql = sql.into();
        self.bound = vec![false; self.parameter_count() as usize];
        self.position = Position::Ready;
        Ok(())
    }

    /// The SQL text this statement was prepared from.
    #[inline]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The connection this statement was prepared on.
    #[inline]
    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    /// Bind a value to a parameter by index.
    ///
    /// The first parameter has index 1.
    ///
    /// # Errors
    ///
    /// Binding to an index which is out of range is an error.
    ///
    /// ```
    /// use sqlt::{Code, Connection, ErrorKind};
    ///
    /// let c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT)")?;
    ///
    /// let mut stmt = c.prepare("SELECT * FROM users WHERE name = ?")?;
    /// let e = stmt.bind_value(0, "Bob").unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::Bind);
    /// assert_eq!(e.code(), Code::RANGE);
    /// assert_eq!(e.message(), "column index out of range");
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::Connection;
    ///
    /// let c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT)")?;
    ///
    /// let mut stmt = c.prepare("SELECT * FROM users WHERE name = ?")?;
    /// stmt.bind_value(1, "Bob")?;
    /// assert!(stmt.execute()?.is_done());
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    pub fn bind_value(&mut self, index: c_int, value: impl BindValue) -> Result<()> {
        value.bind_value(self, index)?;

        if let Some(slot) = usize::try_from(index)
            .ok()
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| self.bound.get_mut(i))
        {
            *slot = true;
        }

        Ok(())
    }

    /// Bind a value to a named parameter like `:name`, `@name` or `$name`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::{Code, Connection};
    ///
    /// let c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT)")?;
    ///
    /// let mut stmt = c.prepare("SELECT * FROM users WHERE name = :name")?;
    /// stmt.bind_by_name(":name", "Bob")?;
    ///
    /// let e = stmt.bind_by_name(":missing", "Bob").unwrap_err();
    /// assert_eq!(e.code(), Code::MISMATCH);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    pub fn bind_by_name(&mut self, name: &str, value: impl BindValue) -> Result<()> {
        let Some(index) = self.parameter_index(name) else {
            return Err(Error::new(
                ErrorKind::Bind,
                Code::MISMATCH,
                format_args!("no parameter named {name:?}"),
            ));
        };

        self.bind_value(index, value)
    }

    /// Bind a sequence of parameters starting at index 1.
    ///
    /// This is implemented for tuples of [`BindValue`] types and for structs
    /// deriving [`Bind`]. Binding stops at the first error.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::Connection;
    ///
    /// let c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE test (id INTEGER, price INTEGER, desc TEXT)")?;
    ///
    /// let mut stmt = c.prepare("INSERT INTO test VALUES (?, ?, ?)")?;
    /// stmt.bind((1, 998798i64, "item 1"))?;
    /// stmt.execute()?;
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    #[inline]
    pub fn bind(&mut self, params: impl Bind) -> Result<()> {
        params.bind(self)
    }

    /// Step the statement once.
    ///
    /// Returns [`State::Row`] if the statement produced a row and
    /// [`State::Done`] if it ran to completion.
    ///
    /// # Errors
    ///
    /// Starting an execution while some parameter is unbound is an error.
    ///
    /// ```
    /// use sqlt::{Code, Connection, ErrorKind};
    ///
    /// let c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT, age INTEGER)")?;
    ///
    /// let mut stmt = c.prepare("INSERT INTO users VALUES (?, ?)")?;
    /// stmt.bind_value(1, "Alice")?;
    ///
    /// let e = stmt.execute().unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::Bind);
    /// assert_eq!(e.code(), Code::MISUSE);
    /// assert_eq!(e.message(), "parameter 2 is not bound");
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    #[inline]
    pub fn execute(&mut self) -> Result<State> {
        self.step(ErrorKind::Execute)
    }

    /// Reset the statement so that it can be executed again, and clear all
    /// bound parameters.
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
    ///     INSERT INTO users VALUES ('Alice', 72);
    ///     INSERT INTO users VALUES ('Bob', 40);
    /// "#)?;
    ///
    /// let mut stmt = c.prepare("SELECT name FROM users WHERE age > ? ORDER BY age DESC")?;
    /// let mut results = Vec::new();
    ///
    /// for age in [30, 50] {
    ///     stmt.reset()?;
    ///     stmt.bind((age,))?;
    ///
    ///     while let Some(name) = stmt.next::<String>()? {
    ///         results.push(name);
    ///     }
    /// }
    ///
    /// assert_eq!(results, ["Alice", "Bob", "Alice"]);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    pub fn reset(&mut self) -> Result<()> {
        // The return value of reset repeats the error of the last step, which
        // has already been reported by the step itself.
        unsafe {
            ffi::sqlite3_reset(self.raw.as_ptr());
            ffi::sqlite3_clear_bindings(self.raw.as_ptr());
        }

        self.bound.fill(false);
        self.position = Position::Ready;
        Ok(())
    }

    /// Step the statement and read the resulting row as `R`.
    ///
    /// Returns `None` once the statement has finished. The statement has to be
    /// [`reset`] before it produces rows again.
    ///
    /// Unlike [`query`], this supports rows that borrow from the statement.
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
    ///     INSERT INTO users VALUES ('Bob', 52);
    /// "#)?;
    ///
    /// let mut stmt = c.prepare("SELECT name, age FROM users ORDER BY age")?;
    ///
    /// while let Some((name, age)) = stmt.next::<(&str, u32)>()? {
    ///     assert!(matches!((name, age), ("Alice", 42) | ("Bob", 52)));
    /// }
    ///
    /// assert_eq!(stmt.next::<(&str, u32)>()?, None);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    ///
    /// [`reset`]: Self::reset
    /// [`query`]: Self::query
    pub fn next<'stmt, R>(&'stmt mut self) -> Result<Option<R>>
    where
        R: Row<'stmt>,
    {
        if self.position == Position::Done {
            return Ok(None);
        }

        match self.step(ErrorKind::Fetch)? {
            State::Row => {
                self.position = Position::Yielded;
                R::from_row(self).map(Some)
            }
            State::Done => Ok(None),
        }
    }

    /// Construct a cursor which decodes every row as `R`.
    ///
    /// See [`Rows`].
    #[inline]
    pub fn query<R>(&mut self) -> Rows<'_, 'conn, R> {
        Rows::new(self)
    }

    /// Read a value from a column of the current row.
    ///
    /// The first column has index 0.
    ///
    /// # Errors
    ///
    /// Reading while the statement is not positioned on a row, or reading a
    /// column which doesn't exist, is an error.
    ///
    /// ```
    /// use sqlt::{Code, Connection, ErrorKind};
    ///
    /// let c = Connection::open_in_memory()?;
    ///
    /// let mut stmt = c.prepare("SELECT 1, 'two'")?;
    /// assert_eq!(stmt.get::<i64>(0).unwrap_err().code(), Code::MISUSE);
    ///
    /// assert!(stmt.execute()?.is_row());
    /// assert_eq!(stmt.get::<i64>(0)?, 1);
    /// assert_eq!(stmt.get::<&str>(1)?, "two");
    ///
    /// let e = stmt.get::<i64>(2).unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::Fetch);
    /// assert_eq!(e.code(), Code::RANGE);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    pub fn get<'stmt, T>(&'stmt self, index: c_int) -> Result<T>
    where
        T: FromColumn<'stmt>,
    {
        if !matches!(self.position, Position::Row | Position::Yielded) {
            return Err(Error::new(
                ErrorKind::Fetch,
                Code::MISUSE,
                "statement is not positioned on a row",
            ));
        }

        let count = self.column_count();

        if !(0..count).contains(&index) {
            return Err(Error::new(
                ErrorKind::Fetch,
                Code::RANGE,
                format_args!("column {index} is out of range for a row of {count} columns"),
            ));
        }

        T::from_column(self, index)
    }

    /// Return the number of parameters.
    #[inline]
    pub fn parameter_count(&self) -> c_int {
        unsafe { ffi::sqlite3_bind_parameter_count(self.raw.as_ptr()) }
    }

    /// Return the index for a named parameter if it exists.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::Connection;
    ///
    /// let c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT)")?;
    ///
    /// let stmt = c.prepare("SELECT * FROM users WHERE name = :name")?;
    /// assert_eq!(stmt.parameter_index(":name"), Some(1));
    /// assert_eq!(stmt.parameter_index(":asdf"), None);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    pub fn parameter_index(&self, name: &str) -> Option<c_int> {
        let name = utils::str_to_cstring(ErrorKind::Bind, name).ok()?;

        let index =
            unsafe { ffi::sqlite3_bind_parameter_index(self.raw.as_ptr(), name.as_ptr()) };

        match index {
            0 => None,
            _ => Some(index),
        }
    }

    /// Return the name of the parameter at the given index, if it is named.
    #[inline]
    pub fn parameter_name(&self, index: c_int) -> Option<&str> {
        unsafe { utils::cstr_to_str(ffi::sqlite3_bind_parameter_name(self.raw.as_ptr(), index)) }
    }

    /// Return the number of columns in a result row.
    #[inline]
    pub fn column_count(&self) -> c_int {
        unsafe { ffi::sqlite3_column_count(self.raw.as_ptr()) }
    }

    /// Return the name of a column.
    ///
    /// If an invalid index is specified, `None` is returned.
    ///
    /// ```
    /// use sqlt::Connection;
    ///
    /// let c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT, age INTEGER);")?;
    /// let stmt = c.prepare("SELECT * FROM users;")?;
    ///
    /// assert_eq!(stmt.column_name(0), Some("name"));
    /// assert_eq!(stmt.column_name(1), Some("age"));
    /// assert_eq!(stmt.column_name(2), None);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    #[inline]
    pub fn column_name(&self, index: c_int) -> Option<&str> {
        unsafe { utils::cstr_to_str(ffi::sqlite3_column_name(self.raw.as_ptr(), index)) }
    }

    /// Return an iterator of column names.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::Connection;
    ///
    /// let c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT, age INTEGER);")?;
    /// let stmt = c.prepare("SELECT * FROM users;")?;
    ///
    /// let column_names = stmt.column_names().collect::<Vec<_>>();
    /// assert_eq!(column_names, vec!["name", "age"]);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    #[inline]
    pub fn column_names(&self) -> ColumnNames<'_, 'conn> {
        ColumnNames {
            stmt: self,
            start: 0,
            end: self.column_count(),
        }
    }

    /// Return the storage class of a column in the current row.
    ///
    /// The first column has index 0. The type is [`Type::NULL`] unless the
    /// statement is positioned on a row.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::{Connection, Type};
    ///
    /// let c = Connection::open_in_memory()?;
    ///
    /// c.execute(r#"
    ///     CREATE TABLE users (id INTEGER, name TEXT, age REAL, photo BLOB);
    ///     INSERT INTO users VALUES (1, 'Bob', 30.5, X'01020304');
    /// "#)?;
    ///
    /// let mut stmt = c.prepare("SELECT * FROM users")?;
    /// assert!(stmt.execute()?.is_row());
    ///
    /// assert_eq!(stmt.column_type(0), Type::INTEGER);
    /// assert_eq!(stmt.column_type(1), Type::TEXT);
    /// assert_eq!(stmt.column_type(2), Type::FLOAT);
    /// assert_eq!(stmt.column_type(3), Type::BLOB);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    #[inline]
    pub fn column_type(&self, index: c_int) -> Type {
        unsafe { Type::from_raw(ffi::sqlite3_column_type(self.raw.as_ptr(), index)) }
    }

    /// Step the statement, reporting failures with the given kind.
    pub(crate) fn step(&mut self, kind: ErrorKind) -> Result<State> {
        if self.position == Position::Ready {
            self.check_bound()?;
        }

        let code = unsafe { ffi::sqlite3_step(self.raw.as_ptr()) };

        let state = match code {
            ffi::SQLITE_ROW => State::Row,
            ffi::SQLITE_DONE => State::Done,
            code => {
                // sqlite resets the statement on the next step.
                self.position = Position::Ready;
                return Err(Error::from_db(kind, self.db(), code));
            }
        };

        tracing::trace!(sql = &*self.sql, ?state, "step");

        self.position = match state {
            State::Row => Position::Row,
            State::Done => Position::Done,
        };

        Ok(state)
    }

    fn check_bound(&self) -> Result<()> {
        let Some(n) = self.bound.iter().position(|bound| !*bound) else {
            return Ok(());
        };

        let index = n as c_int + 1;

        let message = match self.parameter_name(index) {
            Some(name) => format!("parameter {index} ({name}) is not bound"),
            None => format!("parameter {index} is not bound"),
        };

        Err(Error::new(ErrorKind::Bind, Code::MISUSE, message))
    }

    #[inline]
    pub(crate) fn position(&self) -> Position {
        self.position
    }

    /// Mark the current row as handed out.
    #[inline]
    pub(crate) fn mark_yielded(&mut self) {
        if self.position == Position::Row {
            self.position = Position::Yielded;
        }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut ffi::sqlite3_stmt {
        self.raw.as_ptr()
    }

    #[inline]
    pub(crate) fn db(&self) -> *mut ffi::sqlite3 {
        self.conn.as_ptr()
    }
}

impl Drop for Statement<'_> {
    #[inline]
    fn drop(&mut self) {
        // Finalize returns the error of the most recent step, if any, which
        // has already been reported.
        unsafe {
            ffi::sqlite3_finalize(self.raw.as_ptr());
        }
    }
}

fn compile(conn: &Connection, sql: &str) -> Result<NonNull<ffi::sqlite3_stmt>> {
    let len = utils::len_to_c_int(ErrorKind::Prepare, sql.len())?;
    let mut raw = ptr::null_mut();

    let code = unsafe {
        ffi::sqlite3_prepare_v2(
            conn.as_ptr(),
            sql.as_ptr().cast(),
            len,
            &mut raw,
            ptr::null_mut(),
        )
    };

    if code != ffi::SQLITE_OK {
        return Err(Error::from_db(ErrorKind::Prepare, conn.as_ptr(), code));
    }

    let Some(raw) = NonNull::new(raw) else {
        return Err(Error::new(
            ErrorKind::Prepare,
            Code::MISUSE,
            "no SQL statement in input",
        ));
    };

    tracing::debug!(sql, "prepared statement");
    Ok(raw)
}

/// An iterator over the column names of a statement.
///
/// See [`Statement::column_names`].
pub struct ColumnNames<'a, 'conn> {
    stmt: &'a Statement<'conn>,
    start: c_int,
    end: c_int,
}

impl<'a> Iterator for ColumnNames<'a, '_> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.start >= self.end {
            return None;
        }

        let name = self.stmt.column_name(self.start);
        self.start += 1;
        name
    }
}

impl DoubleEndedIterator for ColumnNames<'_, '_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.start >= self.end {
            return None;
        }

        self.end -= 1;
        self.stmt.column_name(self.end)
    }
}
