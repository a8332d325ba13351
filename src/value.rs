use core::ffi::c_int;
use core::fmt;

use crate::ffi;

/// The storage class of a column value.
///
/// See [`Statement::column_type`].
///
/// [`Statement::column_type`]: crate::Statement::column_type
///
/// # Examples
///
/// ```
/// use sqlt::{Connection, Type};
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE test (value INTEGER);
///     INSERT INTO test (value) VALUES (42);
/// "#)?;
///
/// let mut select = c.prepare("SELECT value FROM test")?;
/// assert_eq!(select.column_type(0), Type::NULL);
///
/// assert!(select.execute()?.is_row());
/// assert_eq!(select.column_type(0), Type::INTEGER);
/// # Ok::<_, sqlt::Error>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Type {
    raw: c_int,
}

impl Type {
    /// The 64-bit signed integer class.
    pub const INTEGER: Self = Self::new(ffi::SQLITE_INTEGER);
    /// The 64-bit floating point class.
    pub const FLOAT: Self = Self::new(ffi::SQLITE_FLOAT);
    /// The text class.
    pub const TEXT: Self = Self::new(ffi::SQLITE_TEXT);
    /// The blob class.
    pub const BLOB: Self = Self::new(ffi::SQLITE_BLOB);
    /// The NULL class.
    pub const NULL: Self = Self::new(ffi::SQLITE_NULL);

    #[inline]
    const fn new(raw: c_int) -> Self {
        Self { raw }
    }

    #[inline]
    pub(crate) fn from_raw(raw: c_int) -> Self {
        Self::new(raw)
    }

    /// Return the raw storage class code.
    #[inline]
    pub const fn as_raw(self) -> c_int {
        self.raw
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::INTEGER => write!(f, "INTEGER"),
            Self::FLOAT => write!(f, "FLOAT"),
            Self::TEXT => write!(f, "TEXT"),
            Self::BLOB => write!(f, "BLOB"),
            Self::NULL => write!(f, "NULL"),
            Self { raw } => write!(f, "UNKNOWN({raw})"),
        }
    }
}

impl fmt::Debug for Type {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// An owned, dynamically typed value.
///
/// This can be both bound and read, for when the storage class of a column is
/// not known ahead of time.
///
/// # Examples
///
/// ```
/// use sqlt::{Connection, Value};
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE things (value);
///     INSERT INTO things VALUES (1), (2.5), ('three'), (X'04'), (NULL);
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT value FROM things")?;
/// let values = stmt.query::<Value>().collect::<sqlt::Result<Vec<_>>>()?;
///
/// assert_eq!(values, [
///     Value::Integer(1),
///     Value::Float(2.5),
///     Value::Text("three".into()),
///     Value::Blob(vec![4]),
///     Value::Null,
/// ]);
/// # Ok::<_, sqlt::Error>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// A NULL value.
    #[default]
    Null,
    /// An integer value.
    Integer(i64),
    /// A floating point value.
    Float(f64),
    /// A text value.
    Text(String),
    /// A blob value.
    Blob(Vec<u8>),
}

impl Value {
    /// The storage class of this value.
    ///
    /// ```
    /// use sqlt::{Type, Value};
    ///
    /// assert_eq!(Value::Integer(1).ty(), Type::INTEGER);
    /// assert_eq!(Value::Null.ty(), Type::NULL);
    /// ```
    pub fn ty(&self) -> Type {
        match self {
            Value::Null => Type::NULL,
            Value::Integer(..) => Type::INTEGER,
            Value::Float(..) => Type::FLOAT,
            Value::Text(..) => Type::TEXT,
            Value::Blob(..) => Type::BLOB,
        }
    }

    /// Test if the value is NULL.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the value as an integer, if it is one.
    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match *self {
            Value::Integer(value) => Some(value),
            _ => None,
        }
    }

    /// Get the value as a float, if it is one.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Float(value) => Some(value),
            _ => None,
        }
    }

    /// Get the value as text, if it is text.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Get the value as a blob, if it is one.
    #[inline]
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(value) => Some(value),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&[u8]> for Value {
    #[inline]
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    #[inline]
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Value::from(value),
            None => Value::Null,
        }
    }
}
