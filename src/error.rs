use core::ffi::{CStr, c_int};
use core::fmt;

use crate::ffi;

/// A result type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// A SQLite result code.
///
/// Connections are opened with extended result codes enabled by default, so
/// the code of an error might carry extra detail in its upper bits. Use
/// [`Code::primary`] to compare against the primary codes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Code {
    raw: c_int,
}

impl Code {
    /// Construct a new code from the specified raw code.
    #[inline]
    pub(crate) const fn new(raw: c_int) -> Self {
        Self { raw }
    }

    /// Return the numeric representation of the code.
    #[inline]
    pub const fn as_raw(self) -> c_int {
        self.raw
    }

    /// Strip any extended information from the code.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::Code;
    ///
    /// assert_eq!(Code::CONSTRAINT_UNIQUE.primary(), Code::CONSTRAINT);
    /// assert_eq!(Code::BUSY.primary(), Code::BUSY);
    /// ```
    #[inline]
    pub const fn primary(self) -> Self {
        Self::new(self.raw & 0xff)
    }

    /// The English language description of the code, as provided by SQLite.
    #[inline]
    pub fn message(self) -> &'static str {
        unsafe {
            let ptr = ffi::sqlite3_errstr(self.raw);

            if ptr.is_null() {
                return "unknown error";
            }

            CStr::from_ptr(ptr).to_str().unwrap_or("unknown error")
        }
    }
}

macro_rules! define_codes {
    ($(
        $vis:vis const $name:ident = $value:expr;
    )*) => {
        impl Code {
            $(
                #[doc = concat!("The `SQLITE_", stringify!($name), "` result code.")]
                $vis const $name: Code = Code::new($value);
            )*
        }

        impl fmt::Display for Code {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match *self {
                    $(Code::$name => write!(f, stringify!($name)),)*
                    Code { raw } => write!(f, "UNKNOWN({raw})"),
                }
            }
        }

        impl fmt::Debug for Code {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self, f)
            }
        }
    };
}

define_codes! {
    pub const OK = ffi::SQLITE_OK;
    pub const ERROR = ffi::SQLITE_ERROR;
    pub const INTERNAL = ffi::SQLITE_INTERNAL;
    pub const PERM = ffi::SQLITE_PERM;
    pub const ABORT = ffi::SQLITE_ABORT;
    pub const BUSY = ffi::SQLITE_BUSY;
    pub const LOCKED = ffi::SQLITE_LOCKED;
    pub const NOMEM = ffi::SQLITE_NOMEM;
    pub const READONLY = ffi::SQLITE_READONLY;
    pub const INTERRUPT = ffi::SQLITE_INTERRUPT;
    pub const IOERR = ffi::SQLITE_IOERR;
    pub const CORRUPT = ffi::SQLITE_CORRUPT;
    pub const NOTFOUND = ffi::SQLITE_NOTFOUND;
    pub const FULL = ffi::SQLITE_FULL;
    pub const CANTOPEN = ffi::SQLITE_CANTOPEN;
    pub const PROTOCOL = ffi::SQLITE_PROTOCOL;
    pub const EMPTY = ffi::SQLITE_EMPTY;
    pub const SCHEMA = ffi::SQLITE_SCHEMA;
    pub const TOOBIG = ffi::SQLITE_TOOBIG;
    pub const CONSTRAINT = ffi::SQLITE_CONSTRAINT;
    pub const MISMATCH = ffi::SQLITE_MISMATCH;
    pub const MISUSE = ffi::SQLITE_MISUSE;
    pub const NOLFS = ffi::SQLITE_NOLFS;
    pub const AUTH = ffi::SQLITE_AUTH;
    pub const FORMAT = ffi::SQLITE_FORMAT;
    pub const RANGE = ffi::SQLITE_RANGE;
    pub const NOTADB = ffi::SQLITE_NOTADB;
    pub const NOTICE = ffi::SQLITE_NOTICE;
    pub const WARNING = ffi::SQLITE_WARNING;
    pub const ROW = ffi::SQLITE_ROW;
    pub const DONE = ffi::SQLITE_DONE;
    pub const CONSTRAINT_CHECK = ffi::SQLITE_CONSTRAINT | (1 << 8);
    pub const CONSTRAINT_FOREIGNKEY = ffi::SQLITE_CONSTRAINT | (3 << 8);
    pub const CONSTRAINT_NOTNULL = ffi::SQLITE_CONSTRAINT | (5 << 8);
    pub const CONSTRAINT_PRIMARYKEY = ffi::SQLITE_CONSTRAINT | (6 << 8);
    pub const CONSTRAINT_UNIQUE = ffi::SQLITE_CONSTRAINT | (8 << 8);
    pub const CANTOPEN_ISDIR = ffi::SQLITE_CANTOPEN | (2 << 8);
    pub const READONLY_DBMOVED = ffi::SQLITE_READONLY | (4 << 8);
}

/// The operation an [`Error`] was raised from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The database could not be opened or created.
    Open,
    /// SQL text could not be compiled into a statement.
    Prepare,
    /// A parameter could not be bound, or a statement was executed with
    /// unbound parameters.
    Bind,
    /// Stepping a statement or running a batch failed.
    Execute,
    /// Advancing a cursor or decoding a column failed.
    Fetch,
    /// A transaction was begun or finished in the wrong state.
    TransactionState,
    /// A column held a value no decoder exists for.
    UnsupportedType,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Open => write!(f, "failed to open database"),
            ErrorKind::Prepare => write!(f, "failed to prepare statement"),
            ErrorKind::Bind => write!(f, "failed to bind parameter"),
            ErrorKind::Execute => write!(f, "failed to execute statement"),
            ErrorKind::Fetch => write!(f, "failed to fetch row"),
            ErrorKind::TransactionState => write!(f, "invalid transaction state"),
            ErrorKind::UnsupportedType => write!(f, "unsupported type"),
        }
    }
}

/// An error.
///
/// Carries the [`ErrorKind`] of the failing operation, the SQLite result
/// [`Code`] and the diagnostic message as reported by SQLite.
///
/// # Examples
///
/// ```
/// use sqlt::{Code, Connection, ErrorKind};
///
/// let c = Connection::open_in_memory()?;
///
/// let e = c.prepare("SELEC 1").unwrap_err();
/// assert_eq!(e.kind(), ErrorKind::Prepare);
/// assert_eq!(e.code(), Code::ERROR);
/// assert_eq!(e.message(), "near \"SELEC\": syntax error");
/// # Ok::<_, sqlt::Error>(())
/// ```
#[derive(Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message} ({code})")]
pub struct Error {
    kind: ErrorKind,
    code: Code,
    message: Box<str>,
}

impl Error {
    /// Construct an error with a message of our own.
    #[inline]
    pub(crate) fn new(kind: ErrorKind, code: Code, message: impl fmt::Display) -> Self {
        Self {
            kind,
            code,
            message: message.to_string().into_boxed_str(),
        }
    }

    /// Construct an error described by SQLite's generic message for `code`.
    #[inline]
    pub(crate) fn from_code(kind: ErrorKind, code: c_int) -> Self {
        let code = Code::new(code);
        Self::new(kind, code, code.message())
    }

    /// Construct an error from the state of a database handle after a call
    /// returned `code`.
    ///
    /// The connection message is only used if the connection agrees on the
    /// code, since some calls fail without recording anything on it.
    pub(crate) fn from_db(kind: ErrorKind, db: *mut ffi::sqlite3, code: c_int) -> Self {
        if db.is_null() {
            return Self::from_code(kind, code);
        }

        unsafe {
            if ffi::sqlite3_extended_errcode(db) != code && ffi::sqlite3_errcode(db) != code {
                return Self::from_code(kind, code);
            }

            let ptr = ffi::sqlite3_errmsg(db);

            if ptr.is_null() {
                return Self::from_code(kind, code);
            }

            let message = CStr::from_ptr(ptr).to_string_lossy();
            Self::new(kind, Code::new(code), message)
        }
    }

    /// The operation this error was raised from.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The error code that caused this error.
    #[inline]
    pub fn code(&self) -> Code {
        self.code
    }

    /// The diagnostic message, verbatim as SQLite reported it.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("code", &self.code)
            .field("message", &self.message)
            .finish()
    }
}
