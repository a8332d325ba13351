use core::fmt;
use core::ops::Deref;

use crate::connection::Connection;
use crate::error::{Code, Error, ErrorKind, Result};

/// How a transaction acquires its locks.
///
/// See [`Connection::begin_with`] and the [SQLite documentation][1].
///
/// [1]: https://www.sqlite.org/lang_transaction.html
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TransactionBehavior {
    /// Locks are acquired when the database is first accessed.
    #[default]
    Deferred,
    /// A write lock is acquired immediately.
    Immediate,
    /// An exclusive lock is acquired immediately.
    Exclusive,
}

impl TransactionBehavior {
    fn begin_sql(self) -> &'static str {
        match self {
            TransactionBehavior::Deferred => "BEGIN DEFERRED",
            TransactionBehavior::Immediate => "BEGIN IMMEDIATE",
            TransactionBehavior::Exclusive => "BEGIN EXCLUSIVE",
        }
    }
}

/// A transaction guard.
///
/// Created through [`Connection::begin`]. The transaction is rolled back when
/// the guard is dropped unless it was committed. The guard dereferences to the
/// [`Connection`], so statements can be prepared through it.
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
/// c.execute("CREATE TABLE users (name TEXT)")?;
///
/// {
///     let tx = c.begin()?;
///     tx.execute("INSERT INTO users VALUES ('Alice')")?;
/// }
///
/// let tx = c.begin()?;
/// tx.prepare_with("INSERT INTO users VALUES (?)", ("Bob",))?.execute()?;
/// tx.commit()?;
///
/// let mut stmt = c.prepare("SELECT name FROM users")?;
/// let names = stmt.query::<String>().collect::<sqlt::Result<Vec<_>>>()?;
/// assert_eq!(names, ["Bob"]);
/// # Ok::<_, sqlt::Error>(())
/// ```
///
/// A transaction cannot be committed twice:
///
/// ```compile_fail
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
/// let tx = c.begin()?;
/// tx.commit()?;
/// tx.commit()?;
/// # Ok::<_, sqlt::Error>(())
/// ```
pub struct Transaction<'conn> {
    conn: &'conn Connection,
    pending: bool,
}

impl<'conn> Transaction<'conn> {
    pub(crate) fn new(conn: &'conn Connection, behavior: TransactionBehavior) -> Result<Self> {
        if !conn.is_autocommit() {
            return Err(Error::new(
                ErrorKind::TransactionState,
                Code::MISUSE,
                "a transaction is already active on this connection",
            ));
        }

        conn.execute(behavior.begin_sql())?;
        tracing::debug!(?behavior, "began transaction");

        Ok(Self {
            conn,
            pending: true,
        })
    }

    /// Commit the transaction.
    ///
    /// # Errors
    ///
    /// Errors if the transaction was already ended through other means, like
    /// an explicit `COMMIT` statement. If the commit itself fails the
    /// transaction is rolled back.
    ///
    /// ```
    /// use sqlt::{Connection, ErrorKind};
    ///
    /// let c = Connection::open_in_memory()?;
    ///
    /// let tx = c.begin()?;
    /// tx.execute("COMMIT")?;
    ///
    /// let e = tx.commit().unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::TransactionState);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    pub fn commit(mut self) -> Result<()> {
        self.finish("COMMIT")?;
        tracing::debug!("committed transaction");
        Ok(())
    }

    /// Roll the transaction back.
    ///
    /// This is what dropping the guard does, except that errors are reported.
    pub fn rollback(mut self) -> Result<()> {
        self.finish("ROLLBACK")?;
        tracing::debug!("rolled back transaction");
        Ok(())
    }

    /// The connection the transaction runs on.
    #[inline]
    pub fn connection(&self) -> &'conn Connection {
        self.conn
    }

    fn finish(&mut self, sql: &str) -> Result<()> {
        if self.conn.is_autocommit() {
            self.pending = false;

            return Err(Error::new(
                ErrorKind::TransactionState,
                Code::MISUSE,
                "the transaction has already been ended",
            ));
        }

        self.conn.execute(sql)?;
        self.pending = false;
        Ok(())
    }
}

impl Deref for Transaction<'_> {
    type Target = Connection;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.conn
    }
}

impl fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transaction")
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        // The engine may have rolled back on its own, for example after a
        // failed COMMIT or certain constraint errors.
        if !self.pending || self.conn.is_autocommit() {
            return;
        }

        match self.conn.execute("ROLLBACK") {
            Ok(()) => tracing::debug!("rolled back transaction"),
            Err(error) => tracing::warn!(%error, "failed to roll back transaction"),
        }
    }
}
