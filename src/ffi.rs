pub(crate) use libsqlite3_sys::*;

/// Evaluate a sqlite3 call against a connection handle, returning an error of
/// the given kind if it did not succeed.
macro_rules! __sqlite3_try {
    ($kind:expr, $db:expr, $expr:expr) => {{
        let code = $expr;

        if code != $crate::ffi::SQLITE_OK {
            return Err($crate::error::Error::from_db($kind, $db, code));
        }
    }};
}

pub(crate) use __sqlite3_try as sqlite3_try;
