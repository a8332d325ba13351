use core::ffi::c_int;

use crate::error::{Code, Error, ErrorKind, Result};
use crate::ffi::{self, sqlite3_try};
use crate::statement::{Null, Statement};
use crate::utils;
use crate::value::Value;

/// A type suitable for binding to a parameter of a prepared statement.
///
/// This is typically used indirectly through [`Statement::bind_value`] or
/// [`Statement::bind`]. Bound values are copied by the database, so the value
/// only has to live for the duration of the call.
///
/// # Examples
///
/// ```
/// use core::ffi::c_int;
///
/// use sqlt::{BindValue, Connection, Result, Statement};
///
/// struct Id([u8; 8]);
///
/// impl BindValue for Id {
///     #[inline]
///     fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
///         self.0.bind_value(stmt, index)
///     }
/// }
///
/// let c = Connection::open_in_memory()?;
/// c.execute("CREATE TABLE ids (id BLOB NOT NULL)")?;
///
/// let mut stmt = c.prepare("INSERT INTO ids (id) VALUES (?)")?;
/// stmt.bind_value(1, Id(*b"abcdabcd"))?;
/// stmt.execute()?;
/// # Ok::<_, sqlt::Error>(())
/// ```
pub trait BindValue {
    /// Bind this value to the parameter at `index`, where the first parameter
    /// has index 1.
    ///
    /// Implementations must not be called directly to bind parameters, since
    /// that bypasses the check that every parameter is bound. Go through
    /// [`Statement::bind_value`] instead.
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()>;
}

impl<T> BindValue for &T
where
    T: ?Sized + BindValue,
{
    #[inline]
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        (**self).bind_value(stmt, index)
    }
}

/// [`BindValue`] implementation for [`Null`].
///
/// # Examples
///
/// ```
/// use sqlt::{Connection, Null};
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE users (name TEXT, age INTEGER);
///     INSERT INTO users (name, age) VALUES ('Alice', NULL), ('Bob', 30);
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT name FROM users WHERE age IS ?")?;
/// stmt.bind_value(1, Null)?;
///
/// let names = stmt.query::<String>().collect::<sqlt::Result<Vec<_>>>()?;
/// assert_eq!(names, ["Alice"]);
/// # Ok::<_, sqlt::Error>(())
/// ```
impl BindValue for Null {
    #[inline]
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        unsafe {
            sqlite3_try! {
                ErrorKind::Bind,
                stmt.db(),
                ffi::sqlite3_bind_null(stmt.as_ptr(), index)
            };
        }

        Ok(())
    }
}

impl BindValue for i64 {
    #[inline]
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        unsafe {
            sqlite3_try! {
                ErrorKind::Bind,
                stmt.db(),
                ffi::sqlite3_bind_int64(stmt.as_ptr(), index, *self)
            };
        }

        Ok(())
    }
}

impl BindValue for i32 {
    #[inline]
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        unsafe {
            sqlite3_try! {
                ErrorKind::Bind,
                stmt.db(),
                ffi::sqlite3_bind_int(stmt.as_ptr(), index, *self)
            };
        }

        Ok(())
    }
}

macro_rules! widen {
    ($($ty:ty => $as:ty),* $(,)?) => {
        $(
            #[doc = concat!("[`BindValue`] implementation for `", stringify!($ty), "`, bound as `", stringify!($as), "`.")]
            impl BindValue for $ty {
                #[inline]
                fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
                    <$as>::from(*self).bind_value(stmt, index)
                }
            }
        )*
    };
}

widen! {
    i8 => i32,
    i16 => i32,
    u8 => i32,
    u16 => i32,
    u32 => i64,
    bool => i32,
}

macro_rules! checked {
    ($($(#[$meta:meta])* $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("[`BindValue`] implementation for `", stringify!($ty), "`.")]
            ///
            /// Values which do not fit in a 64-bit signed integer cannot be
            /// bound.
            $(#[$meta])*
            impl BindValue for $ty {
                #[inline]
                fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
                    let Ok(value) = i64::try_from(*self) else {
                        return Err(Error::new(
                            ErrorKind::Bind,
                            Code::MISMATCH,
                            format_args!("{} is out of range for a 64-bit integer", self),
                        ));
                    };

                    value.bind_value(stmt, index)
                }
            }
        )*
    };
}

checked! {
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::{Code, Connection, ErrorKind};
    ///
    /// let c = Connection::open_in_memory()?;
    /// let mut stmt = c.prepare("SELECT ?")?;
    ///
    /// stmt.bind_value(1, i64::MAX as u64)?;
    /// assert_eq!(stmt.next::<u64>()?, Some(i64::MAX as u64));
    ///
    /// let e = stmt.bind_value(1, u64::MAX).unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::Bind);
    /// assert_eq!(e.code(), Code::MISMATCH);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    u64,
    isize,
    usize,
}

/// [`BindValue`] implementation for [`f64`].
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE measurements (value REAL);
///     INSERT INTO measurements VALUES (3.14), (2.71);
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT value FROM measurements WHERE value > ?")?;
/// stmt.bind_value(1, 3.0)?;
///
/// assert_eq!(stmt.next::<f64>()?, Some(3.14));
/// assert_eq!(stmt.next::<f64>()?, None);
/// # Ok::<_, sqlt::Error>(())
/// ```
impl BindValue for f64 {
    #[inline]
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        unsafe {
            sqlite3_try! {
                ErrorKind::Bind,
                stmt.db(),
                ffi::sqlite3_bind_double(stmt.as_ptr(), index, *self)
            };
        }

        Ok(())
    }
}

impl BindValue for f32 {
    #[inline]
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        f64::from(*self).bind_value(stmt, index)
    }
}

/// [`BindValue`] implementation for [`str`] slices.
///
/// The text is bound by length, so interior NUL bytes are preserved.
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
/// let mut stmt = c.prepare("SELECT length(?)")?;
///
/// stmt.bind_value(1, "a\0b")?;
/// assert_eq!(stmt.next::<i64>()?, Some(1));
///
/// stmt.reprepare("SELECT ?")?;
/// stmt.bind_value(1, "a\0b")?;
/// assert_eq!(stmt.next::<String>()?.as_deref(), Some("a\0b"));
/// # Ok::<_, sqlt::Error>(())
/// ```
impl BindValue for str {
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        let len = utils::len_to_c_int(ErrorKind::Bind, self.len())?;

        unsafe {
            sqlite3_try! {
                ErrorKind::Bind,
                stmt.db(),
                ffi::sqlite3_bind_text(
                    stmt.as_ptr(),
                    index,
                    self.as_ptr().cast(),
                    len,
                    ffi::SQLITE_TRANSIENT(),
                )
            };
        }

        Ok(())
    }
}

impl BindValue for String {
    #[inline]
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        self.as_str().bind_value(stmt, index)
    }
}

/// [`BindValue`] implementation for byte slices.
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE files (id INTEGER, data BLOB);
///     INSERT INTO files (id, data) VALUES (0, X'48656C6C6F20576F726C6421');
///     INSERT INTO files (id, data) VALUES (1, X'48656C6C6F');
///     INSERT INTO files (id, data) VALUES (2, X'');
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT id FROM files WHERE data = ?")?;
///
/// stmt.bind_value(1, &b"Hello"[..])?;
/// assert_eq!(stmt.next::<i64>()?, Some(1));
///
/// stmt.reset()?;
/// stmt.bind_value(1, &b""[..])?;
/// assert_eq!(stmt.next::<i64>()?, Some(2));
/// # Ok::<_, sqlt::Error>(())
/// ```
impl BindValue for [u8] {
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        let len = utils::len_to_c_int(ErrorKind::Bind, self.len())?;

        // A null pointer would bind NULL rather than an empty blob.
        let ptr = if self.is_empty() {
            b"".as_ptr()
        } else {
            self.as_ptr()
        };

        unsafe {
            sqlite3_try! {
                ErrorKind::Bind,
                stmt.db(),
                ffi::sqlite3_bind_blob(
                    stmt.as_ptr(),
                    index,
                    ptr.cast(),
                    len,
                    ffi::SQLITE_TRANSIENT(),
                )
            };
        }

        Ok(())
    }
}

impl BindValue for Vec<u8> {
    #[inline]
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        self.as_slice().bind_value(stmt, index)
    }
}

impl<const N: usize> BindValue for [u8; N] {
    #[inline]
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        self.as_slice().bind_value(stmt, index)
    }
}

/// [`BindValue`] implementation for [`Option`], binding `None` as NULL.
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
///     INSERT INTO users (name, age) VALUES ('Alice', NULL), ('Bob', 30);
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT name FROM users WHERE age IS ?")?;
///
/// stmt.bind_value(1, None::<i64>)?;
/// assert_eq!(stmt.next::<String>()?.as_deref(), Some("Alice"));
///
/// stmt.reset()?;
/// stmt.bind_value(1, Some(30))?;
/// assert_eq!(stmt.next::<String>()?.as_deref(), Some("Bob"));
/// # Ok::<_, sqlt::Error>(())
/// ```
impl<T> BindValue for Option<T>
where
    T: BindValue,
{
    #[inline]
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        match self {
            Some(value) => value.bind_value(stmt, index),
            None => Null.bind_value(stmt, index),
        }
    }
}

/// [`BindValue`] implementation for a dynamic [`Value`].
impl BindValue for Value {
    #[inline]
    fn bind_value(&self, stmt: &mut Statement<'_>, index: c_int) -> Result<()> {
        match self {
            Value::Null => Null.bind_value(stmt, index),
            Value::Integer(value) => value.bind_value(stmt, index),
            Value::Float(value) => value.bind_value(stmt, index),
            Value::Text(value) => value.bind_value(stmt, index),
            Value::Blob(value) => value.bind_value(stmt, index),
        }
    }
}
