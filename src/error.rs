use crate::Fd;

/// A specialized [`Result`] type for harness runs and fallible tests.
///
/// This type is generally useful for fallible test cases, i.e. where you want
/// to use the `?` operator to fail the test rather than writing unwrap
/// everywhere.
///
/// [`Result`]: std::result::Result
pub type Result<T = ()> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Result of a single call into a file subsystem.
pub type SysResult<T> = std::result::Result<T, SysError>;

/// Failure reported by a file subsystem.
///
/// This replaces the `-1` sentinel of a raw syscall interface: a call either
/// produced a value or one of these tagged reasons.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SysError {
    #[error("no such file")]
    NotFound,

    #[error("file name too long: {len} bytes with terminator, limit {limit}")]
    NameTooLong { len: usize, limit: usize },

    #[error("invalid file name")]
    InvalidName,

    #[error("bad file descriptor: {0}")]
    BadDescriptor(Fd),

    #[error("too many open files")]
    TooManyOpenFiles,

    #[error("file is open")]
    Busy,

    #[error("no space left on device")]
    NoSpace,

    #[error("I/O error")]
    Io,

    #[error("file exists")]
    AlreadyExists,

    #[error("permission denied")]
    PermissionDenied,

    #[error("process has terminated")]
    Terminated,

    #[error("{message}")]
    Os { code: Option<i32>, message: String },
}

impl From<std::io::Error> for SysError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => SysError::NotFound,
            ErrorKind::AlreadyExists => SysError::AlreadyExists,
            ErrorKind::PermissionDenied => SysError::PermissionDenied,
            _ => SysError::Os {
                code: err.raw_os_error(),
                message: err.to_string(),
            },
        }
    }
}
