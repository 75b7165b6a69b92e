//! Bulk create, open, close and delete over every tracked file.
//!
//! Each operation walks the table in index order, issues one call per file,
//! and classifies the result against the caller's expectation. A failure on
//! one file never stops the walk.

use crate::report::{Check, Expect, Op};
use crate::table::{Binding, DescriptorTable};
use crate::FileSystem;

/// Create every file, binding the returned handles.
///
/// A file that is already bound is re-created and rebound; its previous
/// handle is no longer tracked.
pub fn create_all<F: FileSystem + ?Sized>(
    fs: &mut F,
    table: &mut DescriptorTable,
    expect: Expect,
) -> Vec<Check> {
    table
        .iter_mut()
        .map(|file| {
            let result = fs.create(file.name().as_bytes());
            if let Ok(fd) = result {
                file.bind(fd);
            }
            Check::from_result(Op::Create, file.name(), expect, result.as_ref().ok().copied(), &result)
        })
        .collect()
}

/// Open every file, binding the returned handles.
pub fn open_all<F: FileSystem + ?Sized>(
    fs: &mut F,
    table: &mut DescriptorTable,
    expect: Expect,
) -> Vec<Check> {
    table
        .iter_mut()
        .map(|file| {
            let result = fs.open(file.name().as_bytes());
            if let Ok(fd) = result {
                file.bind(fd);
            }
            Check::from_result(Op::Open, file.name(), expect, result.as_ref().ok().copied(), &result)
        })
        .collect()
}

/// Close every file.
///
/// `expect` applies to bound files. A file that is not bound is always
/// expected to fail: a released handle is closed a second time so the
/// subsystem can reject it, and a never-bound file is recorded as a no-op
/// without calling into the subsystem.
pub fn close_all<F: FileSystem + ?Sized>(
    fs: &mut F,
    table: &mut DescriptorTable,
    expect: Expect,
) -> Vec<Check> {
    table
        .iter_mut()
        .map(|file| match file.binding() {
            Binding::Bound(fd) => {
                let result = fs.close(fd);
                if result.is_ok() {
                    file.release();
                }
                Check::from_result(Op::Close, file.name(), expect, Some(fd), &result)
            }
            Binding::Released(fd) => {
                let result = fs.close(fd);
                Check::from_result(Op::Close, file.name(), Expect::Failure, Some(fd), &result)
                    .with_detail("handle already closed")
            }
            Binding::Unbound => Check::not_issued(
                Op::Close,
                file.name(),
                Expect::Failure,
                "never bound, nothing to close",
            ),
        })
        .collect()
}

/// Delete every file, whether or not it is bound.
///
/// Bindings are left alone: a handle to a deleted file stays tracked until
/// it is closed.
pub fn delete_all<F: FileSystem + ?Sized>(
    fs: &mut F,
    table: &mut DescriptorTable,
    expect: Expect,
) -> Vec<Check> {
    table
        .iter()
        .map(|file| {
            let result = fs.delete(file.name().as_bytes());
            Check::from_result(Op::Delete, file.name(), expect, file.binding().fd(), &result)
        })
        .collect()
}
