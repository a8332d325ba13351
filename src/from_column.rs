use core::ffi::c_int;
use core::slice;
use core::str;

use crate::error::{Code, Error, ErrorKind, Result};
use crate::ffi;
use crate::statement::Statement;
use crate::value::{Type, Value};

/// A type suitable for reading a single column of the current row.
///
/// Use with [`Statement::get`], or through the [`Row`] implementations for
/// tuples and the [`Row` derive].
///
/// The engine coerces between storage classes as needed, so reading an
/// `INTEGER` column as a [`String`] produces its decimal text. NULL reads as
/// zero, the empty string or the empty blob. Use [`Option`] to tell NULL
/// apart.
///
/// Borrowed `&str` and `&[u8]` are the exception: they only read columns
/// stored as `TEXT` and `BLOB` respectively, or NULL. Anything else is a
/// [`Code::MISMATCH`] error, since converting a column invalidates earlier
/// borrows of it.
///
/// [`Row`]: crate::Row
/// [`Row` derive]: derive@crate::Row
///
/// # Examples
///
/// ```
/// use core::ffi::c_int;
///
/// use sqlt::{Connection, FromColumn, Result, Statement};
///
/// #[derive(Debug, PartialEq)]
/// struct Celsius(f64);
///
/// impl FromColumn<'_> for Celsius {
///     fn from_column(stmt: &Statement<'_>, index: c_int) -> Result<Self> {
///         Ok(Celsius(f64::from_column(stmt, index)?))
///     }
/// }
///
/// let c = Connection::open_in_memory()?;
/// let mut stmt = c.prepare("SELECT 21.5")?;
/// assert_eq!(stmt.next::<Celsius>()?, Some(Celsius(21.5)));
/// # Ok::<_, sqlt::Error>(())
/// ```
pub trait FromColumn<'stmt>: Sized {
    /// Read the column at `index` of the current row.
    ///
    /// This is called through [`Statement::get`], which has already checked
    /// that the statement is on a row and that `index` is in range.
    fn from_column(stmt: &'stmt Statement<'_>, index: c_int) -> Result<Self>;
}

/// [`FromColumn`] implementation for `i64`.
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE numbers (value INTEGER);
///     INSERT INTO numbers (value) VALUES (3), (-2), (NULL);
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT value FROM numbers")?;
/// let values = stmt.query::<i64>().collect::<sqlt::Result<Vec<_>>>()?;
/// assert_eq!(values, [3, -2, 0]);
/// # Ok::<_, sqlt::Error>(())
/// ```
impl FromColumn<'_> for i64 {
    #[inline]
    fn from_column(stmt: &Statement<'_>, index: c_int) -> Result<Self> {
        Ok(unsafe { ffi::sqlite3_column_int64(stmt.as_ptr(), index) })
    }
}

macro_rules! narrow {
    ($($(#[$meta:meta])* $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("[`FromColumn`] implementation for `", stringify!($ty), "`.")]
            ///
            /// The column is read as a 64-bit integer, and values which are out
            /// of range for the type are an error.
            $(#[$meta])*
            impl FromColumn<'_> for $ty {
                #[inline]
                fn from_column(stmt: &Statement<'_>, index: c_int) -> Result<Self> {
                    let value = i64::from_column(stmt, index)?;

                    let Ok(value) = <$ty>::try_from(value) else {
                        return Err(Error::new(
                            ErrorKind::Fetch,
                            Code::MISMATCH,
                            format_args!(
                                "value {value} in column {index} is out of range for {}",
                                stringify!($ty),
                            ),
                        ));
                    };

                    Ok(value)
                }
            }
        )*
    };
}

narrow! {
    i8,
    i16,
    i32,
    isize,
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::{Code, Connection, ErrorKind};
    ///
    /// let c = Connection::open_in_memory()?;
    ///
    /// let mut stmt = c.prepare("SELECT 255, 256")?;
    /// assert!(stmt.execute()?.is_row());
    ///
    /// assert_eq!(stmt.get::<u8>(0)?, 255);
    ///
    /// let e = stmt.get::<u8>(1).unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::Fetch);
    /// assert_eq!(e.code(), Code::MISMATCH);
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    u8,
    u16,
    u32,
    u64,
    usize,
}

/// [`FromColumn`] implementation for `bool`, which is true for any non-zero
/// integer.
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
/// let mut stmt = c.prepare("SELECT 0, 1, 7")?;
/// assert_eq!(stmt.next::<(bool, bool, bool)>()?, Some((false, true, true)));
/// # Ok::<_, sqlt::Error>(())
/// ```
impl FromColumn<'_> for bool {
    #[inline]
    fn from_column(stmt: &Statement<'_>, index: c_int) -> Result<Self> {
        Ok(i64::from_column(stmt, index)? != 0)
    }
}

/// [`FromColumn`] implementation for [`f64`].
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE numbers (value REAL);
///     INSERT INTO numbers (value) VALUES (3.5), (2);
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT value FROM numbers")?;
/// let values = stmt.query::<f64>().collect::<sqlt::Result<Vec<_>>>()?;
/// assert_eq!(values, [3.5, 2.0]);
/// # Ok::<_, sqlt::Error>(())
/// ```
impl FromColumn<'_> for f64 {
    #[inline]
    fn from_column(stmt: &Statement<'_>, index: c_int) -> Result<Self> {
        Ok(unsafe { ffi::sqlite3_column_double(stmt.as_ptr(), index) })
    }
}

impl FromColumn<'_> for f32 {
    #[inline]
    fn from_column(stmt: &Statement<'_>, index: c_int) -> Result<Self> {
        Ok(f64::from_column(stmt, index)? as f32)
    }
}

/// [`FromColumn`] implementation which borrows a [`str`] from the current row.
///
/// The text is only valid until the statement moves on, which the borrow
/// checker enforces.
///
/// # Errors
///
/// Text which isn't valid UTF-8 is an error, and so is a column stored as
/// anything other than `TEXT` or NULL.
///
/// ```
/// use sqlt::{Code, Connection, ErrorKind};
///
/// let c = Connection::open_in_memory()?;
/// let mut stmt = c.prepare("SELECT CAST(X'FF' AS TEXT)")?;
/// assert!(stmt.execute()?.is_row());
///
/// let e = stmt.get::<&str>(0).unwrap_err();
/// assert_eq!(e.kind(), ErrorKind::Fetch);
/// assert_eq!(e.code(), Code::MISMATCH);
/// # Ok::<_, sqlt::Error>(())
/// ```
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE users (name TEXT);
///     INSERT INTO users (name) VALUES ('Alice'), ('Bob');
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT name FROM users")?;
///
/// while let Some(name) = stmt.next::<&str>()? {
///     assert!(matches!(name, "Alice" | "Bob"));
/// }
/// # Ok::<_, sqlt::Error>(())
/// ```
impl<'stmt> FromColumn<'stmt> for &'stmt str {
    fn from_column(stmt: &'stmt Statement<'_>, index: c_int) -> Result<Self> {
        let bytes = match stmt.column_type(index) {
            Type::TEXT => unsafe { column_text(stmt, index) },
            Type::NULL => &[],
            ty => return Err(not_borrowable(index, ty, "text")),
        };

        utf8(bytes, index)
    }
}

/// [`FromColumn`] implementation which copies the text of a column into a
/// [`String`].
///
/// The text is copied by length, so embedded NUL bytes are kept.
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE users (name TEXT);
///     INSERT INTO users (name) VALUES ('Alice'), (NULL), (42);
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT name FROM users")?;
/// let names = stmt.query::<String>().collect::<sqlt::Result<Vec<_>>>()?;
/// assert_eq!(names, ["Alice", "", "42"]);
/// # Ok::<_, sqlt::Error>(())
/// ```
impl FromColumn<'_> for String {
    #[inline]
    fn from_column(stmt: &Statement<'_>, index: c_int) -> Result<Self> {
        // Only columns which can't be borrowed are converted.
        let bytes = match stmt.column_type(index) {
            Type::BLOB => unsafe { column_blob(stmt, index) },
            _ => unsafe { column_text(stmt, index) },
        };

        Ok(utf8(bytes, index)?.to_owned())
    }
}

/// [`FromColumn`] implementation which borrows a byte slice from the current
/// row.
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE files (data BLOB);
///     INSERT INTO files (data) VALUES (X'48656C6C6F'), (X'');
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT data FROM files")?;
/// assert_eq!(stmt.next::<&[u8]>()?, Some(&b"Hello"[..]));
/// assert_eq!(stmt.next::<&[u8]>()?, Some(&b""[..]));
/// assert_eq!(stmt.next::<&[u8]>()?, None);
/// # Ok::<_, sqlt::Error>(())
/// ```
impl<'stmt> FromColumn<'stmt> for &'stmt [u8] {
    fn from_column(stmt: &'stmt Statement<'_>, index: c_int) -> Result<Self> {
        match stmt.column_type(index) {
            Type::BLOB => Ok(unsafe { column_blob(stmt, index) }),
            Type::NULL => Ok(&[]),
            ty => Err(not_borrowable(index, ty, "bytes")),
        }
    }
}

impl FromColumn<'_> for Vec<u8> {
    #[inline]
    fn from_column(stmt: &Statement<'_>, index: c_int) -> Result<Self> {
        let bytes = match stmt.column_type(index) {
            Type::TEXT => unsafe { column_text(stmt, index) },
            _ => unsafe { column_blob(stmt, index) },
        };

        Ok(bytes.to_vec())
    }
}

/// [`FromColumn`] implementation for [`Option`], which reads NULL as `None`.
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
/// let mut stmt = c.prepare("SELECT name, age FROM users ORDER BY name")?;
///
/// assert_eq!(stmt.next::<(String, Option<u32>)>()?, Some(("Alice".to_string(), None)));
/// assert_eq!(stmt.next::<(String, Option<u32>)>()?, Some(("Bob".to_string(), Some(30))));
/// # Ok::<_, sqlt::Error>(())
/// ```
impl<'stmt, T> FromColumn<'stmt> for Option<T>
where
    T: FromColumn<'stmt>,
{
    #[inline]
    fn from_column(stmt: &'stmt Statement<'_>, index: c_int) -> Result<Self> {
        if stmt.column_type(index) == Type::NULL {
            return Ok(None);
        }

        T::from_column(stmt, index).map(Some)
    }
}

/// [`FromColumn`] implementation for a dynamic [`Value`], decoded according
/// to the storage class of the column.
impl FromColumn<'_> for Value {
    fn from_column(stmt: &Statement<'_>, index: c_int) -> Result<Self> {
        let value = match stmt.column_type(index) {
            Type::INTEGER => Value::Integer(i64::from_column(stmt, index)?),
            Type::FLOAT => Value::Float(f64::from_column(stmt, index)?),
            Type::TEXT => Value::Text(String::from_column(stmt, index)?),
            Type::BLOB => Value::Blob(Vec::from_column(stmt, index)?),
            Type::NULL => Value::Null,
            ty => {
                return Err(Error::new(
                    ErrorKind::UnsupportedType,
                    Code::MISMATCH,
                    format_args!("column {index} has unsupported storage class {ty}"),
                ));
            }
        };

        Ok(value)
    }
}

// Borrowed reads never let the engine convert a column. A conversion frees the
// buffer behind any pointer previously returned for it.
//
// See: https://sqlite.org/c3ref/column_blob.html
fn not_borrowable(index: c_int, ty: Type, what: &str) -> Error {
    Error::new(
        ErrorKind::Fetch,
        Code::MISMATCH,
        format_args!("column {index} holds {ty}, which cannot be borrowed as {what}"),
    )
}

fn utf8(bytes: &[u8], index: c_int) -> Result<&str> {
    match str::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(e) => Err(Error::new(
            ErrorKind::Fetch,
            Code::MISMATCH,
            format_args!("text in column {index} is not valid UTF-8: {e}"),
        )),
    }
}

/// Read a column as text.
///
/// # Safety
///
/// Unless the column is stored as `TEXT` or NULL this converts it, which the
/// caller must only allow if no borrow of the column is alive.
unsafe fn column_text<'stmt>(stmt: &'stmt Statement<'_>, index: c_int) -> &'stmt [u8] {
    // Fetch the pointer before the length, the length refers to the
    // representation produced by the last conversion.
    unsafe {
        let ptr = ffi::sqlite3_column_text(stmt.as_ptr(), index);
        let len = ffi::sqlite3_column_bytes(stmt.as_ptr(), index);
        column_slice(ptr, len)
    }
}

/// Read a column as a blob.
///
/// # Safety
///
/// Same as [`column_text`], for columns not stored as `BLOB` or NULL.
unsafe fn column_blob<'stmt>(stmt: &'stmt Statement<'_>, index: c_int) -> &'stmt [u8] {
    unsafe {
        let ptr = ffi::sqlite3_column_blob(stmt.as_ptr(), index);
        let len = ffi::sqlite3_column_bytes(stmt.as_ptr(), index);
        column_slice(ptr.cast(), len)
    }
}

/// Construct a slice over column memory owned by the statement.
///
/// A null pointer is either a NULL value or an empty blob, and reads as empty.
///
/// # Safety
///
/// The pointer and length must have been returned for the same column of the
/// current row, and the slice must not outlive the row.
unsafe fn column_slice<'a>(ptr: *const u8, len: c_int) -> &'a [u8] {
    if ptr.is_null() || len <= 0 {
        return &[];
    }

    unsafe { slice::from_raw_parts(ptr, len as usize) }
}
