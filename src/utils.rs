use core::ffi::{CStr, c_char, c_int};

use std::ffi::CString;
use std::path::Path;

use crate::error::{Code, Error, ErrorKind, Result};

/// Borrow a c-string returned by sqlite as a rust string.
///
/// Returns `None` for null pointers and for names which are not valid UTF-8.
pub(crate) unsafe fn cstr_to_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }

    unsafe { CStr::from_ptr(ptr).to_str().ok() }
}

/// Convert a byte length into the length type sqlite expects.
pub(crate) fn len_to_c_int(kind: ErrorKind, len: usize) -> Result<c_int> {
    match c_int::try_from(len) {
        Ok(len) => Ok(len),
        Err(..) => Err(Error::new(
            kind,
            Code::TOOBIG,
            format_args!("{len} bytes is too large for sqlite"),
        )),
    }
}

pub(crate) fn str_to_cstring(kind: ErrorKind, s: &str) -> Result<CString> {
    match CString::new(s) {
        Ok(string) => Ok(string),
        Err(..) => Err(Error::new(
            kind,
            Code::MISUSE,
            format_args!("{s:?} contains an interior nul byte"),
        )),
    }
}

#[cfg(unix)]
pub(crate) fn path_to_cstring(p: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;

    match CString::new(p.as_os_str().as_bytes()) {
        Ok(string) => Ok(string),
        Err(..) => Err(Error::new(
            ErrorKind::Open,
            Code::MISUSE,
            format_args!("path {} contains an interior nul byte", p.display()),
        )),
    }
}

#[cfg(not(unix))]
pub(crate) fn path_to_cstring(p: &Path) -> Result<CString> {
    let Some(s) = p.to_str() else {
        return Err(Error::new(
            ErrorKind::Open,
            Code::MISUSE,
            format_args!("path {} is not valid UTF-8", p.display()),
        ));
    };

    str_to_cstring(ErrorKind::Open, s)
}

/// Invoke `$m` once for every tuple arity we support.
///
/// Each element is passed as `<type> <variable> <column index> <parameter
/// index>`.
macro_rules! repeat {
    ($m:ident) => {
        $m!(A a 0 1);
        $m!(A a 0 1, B b 1 2);
        $m!(A a 0 1, B b 1 2, C c 2 3);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5, F f 5 6);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5, F f 5 6, G g 6 7);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5, F f 5 6, G g 6 7, H h 7 8);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5, F f 5 6, G g 6 7, H h 7 8, I i 8 9);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5, F f 5 6, G g 6 7, H h 7 8, I i 8 9, J j 9 10);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5, F f 5 6, G g 6 7, H h 7 8, I i 8 9, J j 9 10, K k 10 11);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5, F f 5 6, G g 6 7, H h 7 8, I i 8 9, J j 9 10, K k 10 11, L l 11 12);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5, F f 5 6, G g 6 7, H h 7 8, I i 8 9, J j 9 10, K k 10 11, L l 11 12, M m 12 13);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5, F f 5 6, G g 6 7, H h 7 8, I i 8 9, J j 9 10, K k 10 11, L l 11 12, M m 12 13, N n 13 14);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5, F f 5 6, G g 6 7, H h 7 8, I i 8 9, J j 9 10, K k 10 11, L l 11 12, M m 12 13, N n 13 14, O o 14 15);
        $m!(A a 0 1, B b 1 2, C c 2 3, D d 3 4, E e 4 5, F f 5 6, G g 6 7, H h 7 8, I i 8 9, J j 9 10, K k 10 11, L l 11 12, M m 12 13, N n 13 14, O o 14 15, P p 15 16);
    };
}

pub(crate) use repeat;
