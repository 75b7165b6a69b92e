use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::PathBuf;

use indexmap::IndexMap;

use crate::sys::display_name;
use crate::{Fd, FileSystem, SysError, SysResult, TRACING_TARGET};

/// The host operating system's file syscalls, confined to one directory.
///
/// Every name is a single path component under `root`. Name bytes are passed
/// to the OS unchanged, so the OS applies its own length limit.
///
/// Handles are allocated here rather than taken from the OS so that a closed
/// handle is never handed out again and a double close is always detectable.
pub struct HostFs {
    root: PathBuf,

    /// Open files by handle
    files: IndexMap<Fd, File>,

    /// Next handle to hand out; 0 and 1 belong to the console
    next_fd: u64,
}

impl HostFs {
    /// Use `root` as the directory holding every test file. The directory
    /// must already exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: IndexMap::new(),
            next_fd: 2,
        }
    }

    pub fn open_handles(&self) -> usize {
        self.files.len()
    }

    fn path(&self, name: &[u8]) -> SysResult<PathBuf> {
        let special = name == b"." || name == b"..";
        if name.is_empty() || special || name.contains(&b'/') || name.contains(&0) {
            return Err(SysError::InvalidName);
        }

        #[cfg(unix)]
        let component = {
            use std::os::unix::ffi::OsStrExt;
            std::ffi::OsStr::from_bytes(name)
        };

        #[cfg(not(unix))]
        let component = std::str::from_utf8(name).map_err(|_| SysError::InvalidName)?;

        Ok(self.root.join(component))
    }

    fn insert(&mut self, file: File) -> Fd {
        let fd = Fd(self.next_fd);
        self.next_fd += 1;
        self.files.insert(fd, file);
        fd
    }

    fn file(&mut self, fd: Fd) -> SysResult<&mut File> {
        self.files.get_mut(&fd).ok_or(SysError::BadDescriptor(fd))
    }
}

impl FileSystem for HostFs {
    fn create(&mut self, name: &[u8]) -> SysResult<Fd> {
        let path = self.path(name)?;
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let fd = self.insert(file);
        tracing::trace!(target: TRACING_TARGET, name = %display_name(name), %fd, "Create");
        Ok(fd)
    }

    fn open(&mut self, name: &[u8]) -> SysResult<Fd> {
        let path = self.path(name)?;
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        let fd = self.insert(file);
        tracing::trace!(target: TRACING_TARGET, name = %display_name(name), %fd, "Open");
        Ok(fd)
    }

    fn close(&mut self, fd: Fd) -> SysResult<()> {
        self.files
            .shift_remove(&fd)
            .ok_or(SysError::BadDescriptor(fd))?;

        tracing::trace!(target: TRACING_TARGET, %fd, "Close");
        Ok(())
    }

    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> SysResult<usize> {
        let n = self.file(fd)?.read(buf)?;
        tracing::trace!(target: TRACING_TARGET, %fd, len = n, "Read");
        Ok(n)
    }

    fn write(&mut self, fd: Fd, buf: &[u8]) -> SysResult<usize> {
        let n = self.file(fd)?.write(buf)?;
        tracing::trace!(target: TRACING_TARGET, %fd, len = n, "Write");
        Ok(n)
    }

    fn delete(&mut self, name: &[u8]) -> SysResult<()> {
        let path = self.path(name)?;
        std::fs::remove_file(path)?;

        tracing::trace!(target: TRACING_TARGET, name = %display_name(name), "Delete");
        Ok(())
    }

    fn exit(&mut self, code: i32) {
        tracing::trace!(target: TRACING_TARGET, code, "Exit");
        std::process::exit(code)
    }
}
