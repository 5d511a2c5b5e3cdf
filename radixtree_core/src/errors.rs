//! Error handling and C-ABI error codes for radixtree

use std::cell::RefCell;
use std::collections::TryReserveError;
use std::fmt;
use std::os::raw::c_char;

/// Error type for RadixTree operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Arena or key allocation failed, or the configured node limit was hit.
    OutOfMemory,
    /// Caller-supplied serialization buffer is too short.
    BufferTooSmall { needed: usize, available: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfMemory => f.write_str("out of memory"),
            Error::BufferTooSmall { needed, available } => write!(
                f,
                "buffer too small: need {needed} bytes, have {available}"
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Error::OutOfMemory
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,
    OutOfMemory = 1,
    BufferTooSmall = 2,
    InvalidHandle = 3,
    NullPointer = 4,
    Unknown = 255,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Success => "Success",
            ErrorCode::OutOfMemory => "Out of memory",
            ErrorCode::BufferTooSmall => "Buffer too small",
            ErrorCode::InvalidHandle => "Invalid handle",
            ErrorCode::NullPointer => "Null pointer",
            ErrorCode::Unknown => "Unknown error",
        }
    }

    fn as_cstr(self) -> &'static [u8] {
        match self {
            ErrorCode::Success => b"Success\0",
            ErrorCode::OutOfMemory => b"Out of memory\0",
            ErrorCode::BufferTooSmall => b"Buffer too small\0",
            ErrorCode::InvalidHandle => b"Invalid handle\0",
            ErrorCode::NullPointer => b"Null pointer\0",
            ErrorCode::Unknown => b"Unknown error\0",
        }
    }
}

impl From<&Error> for ErrorCode {
    fn from(e: &Error) -> Self {
        match e {
            Error::OutOfMemory => ErrorCode::OutOfMemory,
            Error::BufferTooSmall { .. } => ErrorCode::BufferTooSmall,
        }
    }
}

// Thread-local last error for C-ABI
thread_local! {
    static LAST_ERROR: RefCell<ErrorCode> = const { RefCell::new(ErrorCode::Success) };
}

pub fn set_last_error(code: ErrorCode) {
    LAST_ERROR.with(|cell| *cell.borrow_mut() = code);
}

pub fn get_last_error() -> ErrorCode {
    LAST_ERROR.with(|cell| *cell.borrow())
}

/// Records `code` as the calling thread's last error and hands it back.
pub fn record(code: ErrorCode) -> ErrorCode {
    set_last_error(code);
    code
}

#[no_mangle]
pub extern "C" fn radixtree_last_error() -> ErrorCode {
    get_last_error()
}

/// Static, NUL-terminated description of `code`.
#[no_mangle]
pub extern "C" fn radixtree_strerror(code: ErrorCode) -> *const c_char {
    code.as_cstr().as_ptr() as *const c_char
}
