use std::fmt;

use serde::Serialize;

use crate::SysResult;

/// Opaque handle returned by [`FileSystem::create`] and [`FileSystem::open`].
///
/// Kept as a newtype so a valid handle can never be confused with an error
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Fd(pub u64);

impl fmt::Display for Fd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The syscall surface under test.
///
/// Names are raw bytes without a terminator. A subsystem counts the implicit
/// terminator against its name length limit, so with a limit of 256 a name of
/// 255 bytes is the longest one accepted.
pub trait FileSystem {
    /// Creates `name`, truncating it if it already exists, and opens it.
    fn create(&mut self, name: &[u8]) -> SysResult<Fd>;

    /// Opens an existing file.
    fn open(&mut self, name: &[u8]) -> SysResult<Fd>;

    /// Closes `fd`. Closing a handle twice must fail.
    fn close(&mut self, fd: Fd) -> SysResult<()>;

    /// Reads up to `buf.len()` bytes at the handle's position.
    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> SysResult<usize>;

    /// Writes `buf` at the handle's position.
    fn write(&mut self, fd: Fd, buf: &[u8]) -> SysResult<usize>;

    /// Removes `name`.
    fn delete(&mut self, name: &[u8]) -> SysResult<()>;

    /// Terminates the calling process with `code`.
    ///
    /// A real process never comes back from this. Simulated subsystems
    /// return after recording the status, and from then on every call fails
    /// with [`SysError::Terminated`](crate::SysError::Terminated).
    fn exit(&mut self, code: i32);
}

impl<F: FileSystem + ?Sized> FileSystem for &mut F {
    fn create(&mut self, name: &[u8]) -> SysResult<Fd> {
        (**self).create(name)
    }

    fn open(&mut self, name: &[u8]) -> SysResult<Fd> {
        (**self).open(name)
    }

    fn close(&mut self, fd: Fd) -> SysResult<()> {
        (**self).close(fd)
    }

    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> SysResult<usize> {
        (**self).read(fd, buf)
    }

    fn write(&mut self, fd: Fd, buf: &[u8]) -> SysResult<usize> {
        (**self).write(fd, buf)
    }

    fn delete(&mut self, name: &[u8]) -> SysResult<()> {
        (**self).delete(name)
    }

    fn exit(&mut self, code: i32) {
        (**self).exit(code)
    }
}

/// Renders a file name for diagnostics.
///
/// Long names are shortened to their head and length so boundary names do not
/// flood the output.
pub(crate) fn display_name(name: &[u8]) -> String {
    const HEAD: usize = 16;

    let text = String::from_utf8_lossy(name);
    if name.len() <= 32 {
        text.into_owned()
    } else {
        let head: String = text.chars().take(HEAD).collect();
        format!("{head}...({} bytes)", name.len())
    }
}
