use core::ffi::{CStr, c_int};

use crate::ffi;

/// Return the version string of the linked SQLite library, like `"3.50.2"`.
///
/// # Examples
///
/// ```
/// assert!(sqlt::lib_version().starts_with("3."));
/// ```
#[inline]
pub fn lib_version() -> &'static str {
    unsafe {
        let ptr = ffi::sqlite3_libversion();

        if ptr.is_null() {
            return "";
        }

        CStr::from_ptr(ptr).to_str().unwrap_or_default()
    }
}

/// Return the version number of the linked SQLite library.
///
/// The version `3.50.2` as returned by [`lib_version`] corresponds to the
/// integer `3050002`.
///
/// # Examples
///
/// ```
/// assert!(matches!(sqlt::lib_version_number(), 3_000_000..4_000_000));
///
/// let [major, minor, patch] = {
///     let n = sqlt::lib_version_number();
///     [n / 1_000_000, n / 1_000 % 1_000, n % 1_000]
/// };
///
/// assert_eq!(sqlt::lib_version(), format!("{major}.{minor}.{patch}"));
/// ```
#[inline]
pub fn lib_version_number() -> c_int {
    unsafe { ffi::sqlite3_libversion_number() }
}
