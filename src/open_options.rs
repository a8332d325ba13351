use core::ffi::{CStr, c_int};
use core::ptr::{self, NonNull};

use std::path::Path;

use crate::error::{Code, Error, ErrorKind, Result};
use crate::ffi;
use crate::utils;
use crate::Connection;

/// Options that can be used to customize the opening of a SQLite database.
///
/// When using [`new`] the database is opened with [`extended_result_codes`]
/// enabled. A mode option like [`read_only`] or [`read_write`] must be set.
///
/// [`new`]: Self::new
/// [`extended_result_codes`]: Self::extended_result_codes
/// [`read_only`]: Self::read_only
/// [`read_write`]: Self::read_write
#[derive(Clone, Copy, Debug)]
pub struct OpenOptions {
    raw: c_int,
    extended_result_codes: bool,
    busy_timeout: Option<u32>,
}

impl OpenOptions {
    /// Create flags for opening a database connection.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::OpenOptions;
    ///
    /// let c = OpenOptions::new()
    ///     .read_write()
    ///     .create()
    ///     .open_in_memory()?;
    /// # Ok::<_, sqlt::Error>(())
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self {
            raw: 0,
            extended_result_codes: true,
            busy_timeout: None,
        }
    }

    /// Open the database for reading only. If the database does not already
    /// exist, an error is returned.
    #[inline]
    pub fn read_only(&mut self) -> &mut Self {
        self.raw |= ffi::SQLITE_OPEN_READONLY;
        self
    }

    /// Open the database for reading and writing if possible.
    #[inline]
    pub fn read_write(&mut self) -> &mut Self {
        self.raw |= ffi::SQLITE_OPEN_READWRITE;
        self
    }

    /// Create the database if it does not already exist.
    ///
    /// This has to be combined with [`read_write`].
    ///
    /// [`read_write`]: Self::read_write
    #[inline]
    pub fn create(&mut self) -> &mut Self {
        self.raw |= ffi::SQLITE_OPEN_CREATE;
        self
    }

    /// Interpret the path as a URI, like `file:data.db?mode=ro`.
    #[inline]
    pub fn uri(&mut self) -> &mut Self {
        self.raw |= ffi::SQLITE_OPEN_URI;
        self
    }

    /// Open the database in the multi-thread [threading mode][1].
    ///
    /// [1]: https://www.sqlite.org/threadsafe.html
    #[inline]
    pub fn no_mutex(&mut self) -> &mut Self {
        self.raw |= ffi::SQLITE_OPEN_NOMUTEX;
        self
    }

    /// Open the database in the serialized [threading mode][1].
    ///
    /// [1]: https://www.sqlite.org/threadsafe.html
    #[inline]
    pub fn full_mutex(&mut self) -> &mut Self {
        self.raw |= ffi::SQLITE_OPEN_FULLMUTEX;
        self
    }

    /// Report extended result codes like [`Code::CONSTRAINT_UNIQUE`] instead of
    /// only primary codes. Enabled by default.
    #[inline]
    pub fn extended_result_codes(&mut self, enabled: bool) -> &mut Self {
        self.extended_result_codes = enabled;
        self
    }

    /// Set the busy timeout of the opened connection in milliseconds.
    ///
    /// See [`Connection::set_busy_timeout`].
    #[inline]
    pub fn busy_timeout(&mut self, milliseconds: u32) -> &mut Self {
        self.busy_timeout = Some(milliseconds);
        self
    }

    /// Open a database connection with the current options.
    ///
    /// `path` can be a filesystem path, or `:memory:` to construct an in-memory
    /// database.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlt::{Code, ErrorKind, OpenOptions};
    ///
    /// let dir = tempfile::tempdir()?;
    /// let path = dir.path().join("data.sqlite3");
    ///
    /// let e = OpenOptions::new().read_only().open(&path).unwrap_err();
    /// assert_eq!(e.kind(), ErrorKind::Open);
    /// assert_eq!(e.code().primary(), Code::CANTOPEN);
    /// # Ok::<_, Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(&self, path: impl AsRef<Path>) -> Result<Connection> {
        let path = path.as_ref();
        let c_path = utils::path_to_cstring(path)?;
        let c = self.open_c(&c_path)?;
        tracing::debug!(path = %path.display(), "opened database");
        Ok(c)
    }

    /// Open an in-memory database connection with the current options.
    pub fn open_in_memory(&self) -> Result<Connection> {
        let c = self.open_c(c":memory:")?;
        tracing::debug!("opened in-memory database");
        Ok(c)
    }

    fn open_c(&self, path: &CStr) -> Result<Connection> {
        let mut raw = ptr::null_mut();

        let code = unsafe { ffi::sqlite3_open_v2(path.as_ptr(), &mut raw, self.raw, ptr::null()) };

        // Even on failure sqlite might hand us a handle, which carries the
        // error message and has to be closed.
        let Some(raw) = NonNull::new(raw) else {
            return Err(Error::from_code(ErrorKind::Open, code));
        };

        if code != ffi::SQLITE_OK {
            let error = Error::from_db(ErrorKind::Open, raw.as_ptr(), code);
            unsafe { ffi::sqlite3_close(raw.as_ptr()) };
            return Err(error);
        }

        // SAFETY: The handle was just opened and is owned by nothing else.
        let mut c = unsafe { Connection::from_raw(raw) };

        if self.extended_result_codes {
            let code = unsafe { ffi::sqlite3_extended_result_codes(c.as_ptr(), 1) };

            if code != ffi::SQLITE_OK {
                return Err(Error::new(
                    ErrorKind::Open,
                    Code::new(code),
                    "failed to enable extended result codes",
                ));
            }
        }

        if let Some(ms) = self.busy_timeout {
            c.set_busy_timeout(ms)?;
        }

        Ok(c)
    }
}

impl Default for OpenOptions {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
