//! Simulated file subsystem.
//!
//! [`SimFs`] implements [`FileSystem`] entirely in memory so the harness can
//! be exercised deterministically, with fault injection, and without a
//! kernel underneath.
//!
//! # Durability Model
//!
//! - File contents written through a handle go to a "pending" queue
//! - Closing a handle is the flush point: the file's pending writes become
//!   durable
//! - Pending writes may also become durable at random, see
//!   [`FsConfig::sync_probability`]
//! - On [`SimFs::crash`] all pending writes and open handles are lost;
//!   durable data survives
//!
//! Directory entries (create, delete) take effect immediately and are always
//! durable. Deleting a name that is still open follows POSIX unlink
//! semantics by default: the name disappears, open handles keep working, and
//! the file is reclaimed when its last handle is closed.

use indexmap::IndexMap;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::sys::display_name;
use crate::{Fd, FileSystem, SysError, SysResult, TRACING_TARGET};

/// Handles 0 and 1 belong to the console.
const FIRST_FILE_FD: u64 = 2;

/// What [`SimFs`] does when asked to delete a file that is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteOpen {
    /// Remove the name; open handles stay valid until closed.
    #[default]
    Allow,
    /// Fail the delete with [`SysError::Busy`].
    Reject,
}

/// Configuration for the simulated file subsystem.
///
/// Use builder-style methods to configure behavior:
///
/// ```
/// use fsconform::fs::FsConfig;
///
/// let fs = FsConfig::default()
///     .name_limit(256)
///     .max_open_files(16)
///     .io_error_probability(0.01)
///     .rng_seed(7)
///     .build();
/// ```
///
/// ## Defaults
///
/// - `name_limit`: 256 (name bytes plus terminator)
/// - `max_open_files`: None (unlimited)
/// - `capacity`: None (unlimited)
/// - `sync_probability`: 0.0 (writes only durable on close)
/// - `io_error_probability`: 0.0 (no random I/O errors)
/// - `corruption_probability`: 0.0 (no silent corruption)
/// - `delete_open`: [`DeleteOpen::Allow`]
/// - `rng_seed`: None (seeded from the OS)
#[derive(Debug, Clone)]
pub struct FsConfig {
    /// Longest accepted name, counting the implicit terminator
    pub(crate) name_limit: usize,
    /// Open file handle limit (None = unlimited)
    pub(crate) max_open_files: Option<usize>,
    /// Disk capacity in bytes (None = unlimited)
    pub(crate) capacity: Option<u64>,
    /// Probability that a write is immediately flushed to durable storage
    pub(crate) sync_probability: f64,
    /// Probability of I/O errors on reads and writes
    pub(crate) io_error_probability: f64,
    /// Probability of silent data corruption on reads
    pub(crate) corruption_probability: f64,
    /// Policy for deleting open files
    pub(crate) delete_open: DeleteOpen,
    /// Seed for fault injection
    pub(crate) rng_seed: Option<u64>,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            name_limit: 256,
            max_open_files: None,
            capacity: None,
            sync_probability: 0.0,
            io_error_probability: 0.0,
            corruption_probability: 0.0,
            delete_open: DeleteOpen::Allow,
            rng_seed: None,
        }
    }
}

impl FsConfig {
    /// Set the longest accepted name, counting the implicit terminator.
    ///
    /// Default: 256
    pub fn name_limit(&mut self, bytes: usize) -> &mut Self {
        assert!(bytes >= 2, "name_limit must leave room for one byte and a terminator");
        self.name_limit = bytes;
        self
    }

    /// Set how many file handles may be open at once.
    ///
    /// Default: None (unlimited). Once reached, create and open fail with
    /// [`SysError::TooManyOpenFiles`].
    pub fn max_open_files(&mut self, count: usize) -> &mut Self {
        self.max_open_files = Some(count);
        self
    }

    /// Set the disk capacity in bytes.
    ///
    /// Default: None (unlimited). Writes that would exceed the capacity fail
    /// with [`SysError::NoSpace`].
    pub fn capacity(&mut self, bytes: u64) -> &mut Self {
        self.capacity = Some(bytes);
        self
    }

    /// Set the probability that a write is flushed to durable storage right
    /// away instead of waiting for the handle to be closed (0.0 - 1.0).
    ///
    /// Default: 0.0
    pub fn sync_probability(&mut self, value: f64) -> &mut Self {
        assert!(
            (0.0..=1.0).contains(&value),
            "sync_probability must be between 0.0 and 1.0"
        );
        self.sync_probability = value;
        self
    }

    /// Set the probability of I/O errors on reads and writes (0.0 - 1.0).
    ///
    /// Default: 0.0
    pub fn io_error_probability(&mut self, value: f64) -> &mut Self {
        assert!(
            (0.0..=1.0).contains(&value),
            "io_error_probability must be between 0.0 and 1.0"
        );
        self.io_error_probability = value;
        self
    }

    /// Set the probability of silent data corruption on reads (0.0 - 1.0).
    ///
    /// A corrupted read succeeds and returns the right number of bytes, with
    /// one byte flipped. Only a content comparison can catch it.
    ///
    /// Default: 0.0
    pub fn corruption_probability(&mut self, value: f64) -> &mut Self {
        assert!(
            (0.0..=1.0).contains(&value),
            "corruption_probability must be between 0.0 and 1.0"
        );
        self.corruption_probability = value;
        self
    }

    /// Set the policy for deleting a file that still has open handles.
    ///
    /// Default: [`DeleteOpen::Allow`]
    pub fn delete_open(&mut self, policy: DeleteOpen) -> &mut Self {
        self.delete_open = policy;
        self
    }

    /// Seed the random number generator used for fault injection.
    pub fn rng_seed(&mut self, value: u64) -> &mut Self {
        self.rng_seed = Some(value);
        self
    }

    /// Build a subsystem with the settings from this config.
    pub fn build(&self) -> SimFs {
        SimFs::new(self.clone())
    }
}

/// A data operation that hasn't been flushed to durable storage.
#[derive(Debug, Clone)]
enum PendingOp {
    /// Write data to a file
    Write { ino: u64, offset: u64, data: Vec<u8> },
    /// Truncate/extend a file
    SetLen { ino: u64, len: u64 },
}

impl PendingOp {
    fn ino(&self) -> u64 {
        match self {
            PendingOp::Write { ino, .. } | PendingOp::SetLen { ino, .. } => *ino,
        }
    }

    fn apply(&self, content: &mut Vec<u8>) {
        match self {
            PendingOp::Write { offset, data, .. } => {
                let start = *offset as usize;
                let end = start + data.len();
                if end > content.len() {
                    content.resize(end, 0);
                }
                content[start..end].copy_from_slice(data);
            }
            PendingOp::SetLen { len, .. } => content.resize(*len as usize, 0),
        }
    }
}

/// Stored file data.
#[derive(Debug, Default)]
struct Inode {
    /// Content that survives a crash
    durable: Vec<u8>,
    /// Whether a name still points at this inode
    linked: bool,
    /// Number of open handles
    open: usize,
}

#[derive(Debug)]
struct Handle {
    ino: u64,
    name: Vec<u8>,
    /// Position for the next read or write
    cursor: u64,
}

/// In-memory file subsystem with a pending/durable write model.
///
/// See the [module documentation](self) for the semantics.
pub struct SimFs {
    /// Inode data, by inode number
    inodes: IndexMap<u64, Inode>,
    /// Directory entries: name -> inode
    entries: IndexMap<Vec<u8>, u64>,
    /// Queue of data operations not yet durable (lost on crash)
    pending: Vec<PendingOp>,
    /// Open handles
    handles: IndexMap<Fd, Handle>,
    /// Next handle to assign; handles are never reused
    next_fd: u64,
    /// Next inode number to assign
    next_ino: u64,
    config: FsConfig,
    rng: SmallRng,
    /// Set once the simulated process has exited
    exit_status: Option<i32>,
}

impl SimFs {
    /// Create an empty subsystem.
    pub fn new(config: FsConfig) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        Self {
            inodes: IndexMap::new(),
            entries: IndexMap::new(),
            pending: Vec::new(),
            handles: IndexMap::new(),
            next_fd: FIRST_FILE_FD,
            next_ino: 1,
            config,
            rng,
            exit_status: None,
        }
    }

    /// Returns true if `name` currently has a directory entry.
    pub fn exists(&self, name: &[u8]) -> bool {
        self.entries.contains_key(name)
    }

    /// Current content of `name`, pending writes included.
    pub fn content(&self, name: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(name).map(|ino| self.live_content(*ino))
    }

    /// Content of `name` that would survive a crash.
    pub fn durable_content(&self, name: &[u8]) -> Option<&[u8]> {
        let ino = self.entries.get(name)?;
        self.inodes.get(ino).map(|inode| inode.durable.as_slice())
    }

    /// Number of open file handles.
    pub fn open_handles(&self) -> usize {
        self.handles.len()
    }

    /// Number of writes not yet flushed.
    pub fn pending_ops(&self) -> usize {
        self.pending.len()
    }

    /// Exit status recorded by [`FileSystem::exit`], if the simulated
    /// process has exited.
    pub fn exit_status(&self) -> Option<i32> {
        self.exit_status
    }

    /// Simulate a power loss.
    ///
    /// Pending writes are discarded, every handle is dropped without being
    /// flushed, and files that were deleted while open are reclaimed. The
    /// subsystem accepts calls again afterwards, as if freshly booted.
    pub fn crash(&mut self) {
        tracing::debug!(
            target: TRACING_TARGET,
            pending = self.pending.len(),
            handles = self.handles.len(),
            "Crash"
        );

        self.pending.clear();
        self.handles.clear();
        self.inodes.retain(|_, inode| {
            inode.open = 0;
            inode.linked
        });
        self.exit_status = None;
    }

    fn check_alive(&self) -> SysResult<()> {
        match self.exit_status {
            Some(_) => Err(SysError::Terminated),
            None => Ok(()),
        }
    }

    fn validate(&self, name: &[u8]) -> SysResult<()> {
        if name.is_empty() || name.contains(&0) {
            return Err(SysError::InvalidName);
        }

        // The terminator counts against the limit.
        let len = name.len() + 1;
        if len > self.config.name_limit {
            return Err(SysError::NameTooLong {
                len,
                limit: self.config.name_limit,
            });
        }
        Ok(())
    }

    fn check_handle_limit(&self) -> SysResult<()> {
        match self.config.max_open_files {
            Some(max) if self.handles.len() >= max => Err(SysError::TooManyOpenFiles),
            _ => Ok(()),
        }
    }

    fn alloc_fd(&mut self, ino: u64, name: &[u8]) -> Fd {
        let fd = Fd(self.next_fd);
        self.next_fd += 1;

        if let Some(inode) = self.inodes.get_mut(&ino) {
            inode.open += 1;
        }
        self.handles.insert(
            fd,
            Handle {
                ino,
                name: name.to_vec(),
                cursor: 0,
            },
        );
        fd
    }

    /// Content of an inode with pending operations applied in order.
    fn live_content(&self, ino: u64) -> Vec<u8> {
        let mut content = self
            .inodes
            .get(&ino)
            .map(|inode| inode.durable.clone())
            .unwrap_or_default();

        for op in self.pending.iter().filter(|op| op.ino() == ino) {
            op.apply(&mut content);
        }
        content
    }

    /// Total bytes used, pending writes included.
    fn used_bytes(&self) -> u64 {
        self.inodes
            .keys()
            .map(|ino| self.live_content(*ino).len() as u64)
            .sum()
    }

    /// Check if growing a file by `additional` bytes would exceed capacity.
    fn check_space(&self, additional: u64) -> SysResult<()> {
        if let Some(cap) = self.config.capacity {
            if self.used_bytes().saturating_add(additional) > cap {
                return Err(SysError::NoSpace);
            }
        }
        Ok(())
    }

    /// Make every pending operation on `ino` durable.
    fn flush(&mut self, ino: u64) {
        let (to_flush, to_keep): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|op| op.ino() == ino);
        self.pending = to_keep;

        if let Some(inode) = self.inodes.get_mut(&ino) {
            for op in &to_flush {
                op.apply(&mut inode.durable);
            }
        }
    }

    /// Drop an inode once it has neither a name nor an open handle.
    fn reclaim(&mut self, ino: u64) {
        let orphaned = self
            .inodes
            .get(&ino)
            .is_some_and(|inode| !inode.linked && inode.open == 0);

        if orphaned {
            self.inodes.swap_remove(&ino);
            self.pending.retain(|op| op.ino() != ino);
        }
    }

    fn random_bool(&mut self, probability: f64) -> bool {
        probability > 0.0 && self.rng.random_bool(probability)
    }
}

impl Default for SimFs {
    fn default() -> Self {
        Self::new(FsConfig::default())
    }
}

impl FileSystem for SimFs {
    fn create(&mut self, name: &[u8]) -> SysResult<Fd> {
        self.check_alive()?;
        self.validate(name)?;
        self.check_handle_limit()?;

        let ino = match self.entries.get(name) {
            Some(&ino) => {
                self.pending.push(PendingOp::SetLen { ino, len: 0 });
                ino
            }
            None => {
                let ino = self.next_ino;
                self.next_ino += 1;
                self.inodes.insert(
                    ino,
                    Inode {
                        linked: true,
                        ..Inode::default()
                    },
                );
                self.entries.insert(name.to_vec(), ino);
                ino
            }
        };

        let fd = self.alloc_fd(ino, name);
        tracing::trace!(target: TRACING_TARGET, name = %display_name(name), %fd, "Create");
        Ok(fd)
    }

    fn open(&mut self, name: &[u8]) -> SysResult<Fd> {
        self.check_alive()?;
        self.validate(name)?;

        let ino = *self.entries.get(name).ok_or(SysError::NotFound)?;
        self.check_handle_limit()?;

        let fd = self.alloc_fd(ino, name);
        tracing::trace!(target: TRACING_TARGET, name = %display_name(name), %fd, "Open");
        Ok(fd)
    }

    fn close(&mut self, fd: Fd) -> SysResult<()> {
        self.check_alive()?;

        let handle = self
            .handles
            .swap_remove(&fd)
            .ok_or(SysError::BadDescriptor(fd))?;

        self.flush(handle.ino);
        if let Some(inode) = self.inodes.get_mut(&handle.ino) {
            inode.open -= 1;
        }
        self.reclaim(handle.ino);

        tracing::trace!(target: TRACING_TARGET, name = %display_name(&handle.name), %fd, "Close");
        Ok(())
    }

    fn read(&mut self, fd: Fd, buf: &mut [u8]) -> SysResult<usize> {
        self.check_alive()?;

        let (ino, cursor) = self
            .handles
            .get(&fd)
            .map(|h| (h.ino, h.cursor))
            .ok_or(SysError::BadDescriptor(fd))?;

        if self.random_bool(self.config.io_error_probability) {
            return Err(SysError::Io);
        }

        let content = self.live_content(ino);
        let start = (cursor as usize).min(content.len());
        let n = buf.len().min(content.len() - start);
        buf[..n].copy_from_slice(&content[start..start + n]);

        if n > 0 && self.random_bool(self.config.corruption_probability) {
            let at = self.rng.random_range(0..n);
            let flip: u8 = self.rng.random();
            buf[at] ^= flip.max(1);
            tracing::debug!(target: TRACING_TARGET, %fd, offset = cursor + at as u64, "Corrupt");
        }

        if let Some(handle) = self.handles.get_mut(&fd) {
            handle.cursor += n as u64;
        }

        tracing::trace!(target: TRACING_TARGET, %fd, len = n, "Read");
        Ok(n)
    }

    fn write(&mut self, fd: Fd, buf: &[u8]) -> SysResult<usize> {
        self.check_alive()?;

        let (ino, cursor) = self
            .handles
            .get(&fd)
            .map(|h| (h.ino, h.cursor))
            .ok_or(SysError::BadDescriptor(fd))?;

        if self.random_bool(self.config.io_error_probability) {
            return Err(SysError::Io);
        }

        let current_len = self.live_content(ino).len() as u64;
        let additional = (cursor + buf.len() as u64).saturating_sub(current_len);
        if additional > 0 {
            self.check_space(additional)?;
        }

        if !buf.is_empty() {
            self.pending.push(PendingOp::Write {
                ino,
                offset: cursor,
                data: buf.to_vec(),
            });
        }
        if let Some(handle) = self.handles.get_mut(&fd) {
            handle.cursor += buf.len() as u64;
        }

        // Maybe flush early (simulates the OS writing back on its own)
        if self.random_bool(self.config.sync_probability) {
            self.flush(ino);
        }

        tracing::trace!(target: TRACING_TARGET, %fd, len = buf.len(), "Write");
        Ok(buf.len())
    }

    fn delete(&mut self, name: &[u8]) -> SysResult<()> {
        self.check_alive()?;
        self.validate(name)?;

        let ino = *self.entries.get(name).ok_or(SysError::NotFound)?;
        let open = self.inodes.get(&ino).map_or(0, |inode| inode.open);
        if open > 0 && self.config.delete_open == DeleteOpen::Reject {
            return Err(SysError::Busy);
        }

        self.entries.swap_remove(name);
        if let Some(inode) = self.inodes.get_mut(&ino) {
            inode.linked = false;
        }
        self.reclaim(ino);

        tracing::trace!(target: TRACING_TARGET, name = %display_name(name), open, "Delete");
        Ok(())
    }

    fn exit(&mut self, code: i32) {
        if self.exit_status.is_some() {
            return;
        }

        // Process teardown closes every handle, which flushes it.
        let fds: Vec<Fd> = self.handles.keys().copied().collect();
        for fd in fds {
            let _ = self.close(fd);
        }

        self.exit_status = Some(code);
        tracing::trace!(target: TRACING_TARGET, code, "Exit");
    }
}
