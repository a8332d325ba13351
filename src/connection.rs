use core::ffi::{CStr, c_char, c_int};
use core::fmt;
use core::mem::ManuallyDrop;
use core::ptr::{self, NonNull};

use std::path::Path;

use crate::bind::Bind;
use crate::error::{Code, Error, ErrorKind, Result};
use crate::ffi::{self, sqlite3_try};
use crate::open_options::OpenOptions;
use crate::statement::Statement;
use crate::transaction::{Transaction, TransactionBehavior};
use crate::utils;

/// A SQLite database connection.
///
/// The connection owns exactly one native database handle, which is closed
/// when the connection is dropped or when [`close`] is called.
///
/// Statements and transactions borrow the connection they were created from,
/// so the connection cannot be closed while any of them are alive.
///
/// # Thread safety
///
/// A connection can be sent to another thread, but it cannot be shared
/// between threads. Use one connection per thread, or put it behind a mutex.
///
/// [`close`]: Self::close
pub struct Connection {
    raw: NonNull<ffi::sqlite3>,
}

/// Connection is `Send`.
unsafe impl Send for Connection {}

impl fmt::Debug for Connection {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

impl Connection {
    /// Construct a connection from an opened raw handle.
    ///
    /// # Safety
    ///
    /// The handle must be open and not owned by anything else.
    #[inline]
    pub(crate) unsafe fn from_raw(raw: NonNull<ffi::sqlite3>) -> Self {
        Self { raw }
    }

    /// Open a read-write connection to a new or existing database.
    ///
    /// The special path `:memory:` opens a private in-memory database.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::{Connection, ErrorKind};
    ///
    /// let dir = tempfile::tempdir()?;
    /// let c = Connection::open(dir.path().join("items.sqlite3"))?;
    /// c.execute("CREATE TABLE items (id INTEGER)")?;
    ///
    /// let e = Connection::open(dir.path().join("missing").join("items.sqlite3")).unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::Open);
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Connection> {
        OpenOptions::new().read_write().create().open(path)
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Connection> {
        OpenOptions::new().read_write().create().open_in_memory()
    }

    /// Execute one or more statements without processing any resulting rows.
    ///
    /// Statements are separated by `;`. This is useful for schema changes and
    /// other statements which take no parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::{Connection, ErrorKind};
    ///
    /// let c = Connection::open_in_memory()?;
    ///
    /// c.execute(r#"
    ///     CREATE TABLE users (name TEXT, age INTEGER);
    ///     INSERT INTO users VALUES ('Alice', 42);
    /// "#)?;
    ///
    /// let e = c.execute("INSERT INTO missing VALUES (1)").unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::Execute);
    /// assert_eq!(e.message(), "no such table: missing");
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    pub fn execute(&self, sql: impl AsRef<str>) -> Result<()> {
        let sql = utils::str_to_cstring(ErrorKind::Execute, sql.as_ref())?;
        let mut message: *mut c_char = ptr::null_mut();

        let code = unsafe {
            ffi::sqlite3_exec(
                self.raw.as_ptr(),
                sql.as_ptr(),
                None,
                ptr::null_mut(),
                &mut message,
            )
        };

        if message.is_null() {
            if code != ffi::SQLITE_OK {
                return Err(Error::from_db(ErrorKind::Execute, self.raw.as_ptr(), code));
            }

            return Ok(());
        }

        // SAFETY: The message was allocated by sqlite and must be released
        // with sqlite3_free once copied.
        let error = unsafe {
            let text = CStr::from_ptr(message).to_string_lossy().into_owned();
            ffi::sqlite3_free(message.cast());
            Error::new(ErrorKind::Execute, Code::new(code), text)
        };

        Err(error)
    }

    /// Compile a single SQL statement.
    ///
    /// Only the first statement in `sql` is compiled, anything after it is
    /// ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::{Code, Connection, ErrorKind};
    ///
    /// let c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT, age INTEGER)")?;
    ///
    /// let stmt = c.prepare("SELECT name, age FROM users")?;
    /// assert_eq!(stmt.column_count(), 2);
    ///
    /// let e = c.prepare("SELECT nope FROM users").unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::Prepare);
    /// assert_eq!(e.message(), "no such column: nope");
    ///
    /// let e = c.prepare("   -- nothing here").unwrap_err();
    /// assert_eq!(e.code(), Code::MISUSE);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    #[inline]
    pub fn prepare(&self, sql: impl AsRef<str>) -> Result<Statement<'_>> {
        Statement::new(self, sql.as_ref())
    }

    /// Compile a single SQL statement and immediately bind `params` to it.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::Connection;
    ///
    /// let c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (name TEXT, age INTEGER)")?;
    ///
    /// let mut insert = c.prepare_with("INSERT INTO users VALUES (?, ?)", ("Alice", 42))?;
    /// assert!(insert.execute()?.is_done());
    /// assert_eq!(c.changes(), 1);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    pub fn prepare_with(&self, sql: impl AsRef<str>, params: impl Bind) -> Result<Statement<'_>> {
        let mut stmt = self.prepare(sql)?;
        stmt.bind(params)?;
        Ok(stmt)
    }

    /// Begin a deferred transaction.
    ///
    /// The returned guard rolls the transaction back when dropped unless
    /// [`Transaction::commit`] has been called.
    ///
    /// # Errors
    ///
    /// Beginning a transaction while another one is active on this connection
    /// is an error.
    ///
    /// ```
    /// use sqlt::{Connection, ErrorKind};
    ///
    /// let c = Connection::open_in_memory()?;
    ///
    /// let tx = c.begin()?;
    /// let e = c.begin().unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::TransactionState);
    /// tx.commit()?;
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    #[inline]
    pub fn begin(&self) -> Result<Transaction<'_>> {
        Transaction::new(self, TransactionBehavior::Deferred)
    }

    /// Begin a transaction with the given locking behavior.
    #[inline]
    pub fn begin_with(&self, behavior: TransactionBehavior) -> Result<Transaction<'_>> {
        Transaction::new(self, behavior)
    }

    /// Return the rowid of the most recent successful `INSERT` on this
    /// connection, or 0 if there has not been one.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::Connection;
    ///
    /// let c = Connection::open_in_memory()?;
    /// c.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)")?;
    /// assert_eq!(c.last_insert_rowid(), 0);
    ///
    /// c.execute("INSERT INTO users (name) VALUES ('Alice'), ('Bob')")?;
    /// assert_eq!(c.last_insert_rowid(), 2);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    #[inline]
    pub fn last_insert_rowid(&self) -> i64 {
        unsafe { ffi::sqlite3_last_insert_rowid(self.raw.as_ptr()) }
    }

    /// Return the number of rows inserted, updated, or deleted by the most
    /// recent `INSERT`, `UPDATE`, or `DELETE` statement.
    #[inline]
    pub fn changes(&self) -> usize {
        unsafe { ffi::sqlite3_changes(self.raw.as_ptr()) as usize }
    }

    /// Return the total number of rows inserted, updated, and deleted by all
    /// statements since the connection was opened.
    #[inline]
    pub fn total_changes(&self) -> usize {
        unsafe { ffi::sqlite3_total_changes(self.raw.as_ptr()) as usize }
    }

    /// Test if the connection is in autocommit mode, which is the case unless
    /// a transaction is active.
    #[inline]
    pub fn is_autocommit(&self) -> bool {
        unsafe { ffi::sqlite3_get_autocommit(self.raw.as_ptr()) != 0 }
    }

    /// Set a timeout that makes operations retry while the database is locked
    /// by another connection, instead of failing with [`Code::BUSY`]
    /// immediately.
    ///
    /// A timeout of zero turns retrying off.
    pub fn set_busy_timeout(&mut self, milliseconds: u32) -> Result<()> {
        let ms = c_int::try_from(milliseconds).unwrap_or(c_int::MAX);

        unsafe {
            sqlite3_try! {
                ErrorKind::Execute,
                self.raw.as_ptr(),
                ffi::sqlite3_busy_timeout(self.raw.as_ptr(), ms)
            };
        }

        Ok(())
    }

    /// Close the connection, reporting any error from doing so.
    ///
    /// Dropping a connection closes it as well, but errors are only logged.
    pub fn close(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        let code = unsafe { ffi::sqlite3_close(this.raw.as_ptr()) };

        if code != ffi::SQLITE_OK {
            return Err(Error::from_code(ErrorKind::Execute, code));
        }

        tracing::debug!("closed database");
        Ok(())
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut ffi::sqlite3 {
        self.raw.as_ptr()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        // Statements borrow the connection so they have all been finalized by
        // now, and close can only fail on misuse.
        let code = unsafe { ffi::sqlite3_close(self.raw.as_ptr()) };

        if code != ffi::SQLITE_OK {
            tracing::warn!(code = %Code::new(code), "failed to close database");
        }
    }
}
