//! Write, close, reopen, read back, compare.

use std::fmt;

use crate::report::{Check, Expect, Op, Outcome};
use crate::table::{DescriptorTable, TestFile};
use crate::{Fd, FileSystem, SysError};

/// Where a round trip stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The file had no live handle to write to.
    NotBound,
    Write,
    /// The write returned fewer bytes than requested.
    ShortWrite,
    Close,
    Reopen,
    Read,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::NotBound => "not bound",
            Stage::Write => "write",
            Stage::ShortWrite => "short write",
            Stage::Close => "close",
            Stage::Reopen => "reopen",
            Stage::Read => "read",
        };
        f.write_str(s)
    }
}

/// Round trip every file in index order.
pub fn round_trip_all<F: FileSystem + ?Sized>(
    fs: &mut F,
    table: &mut DescriptorTable,
) -> Vec<Check> {
    let mut checks = Vec::with_capacity(table.len());

    for index in 0..table.len() {
        let expected = table.expected(index);
        if let Some(file) = table.get_mut(index) {
            checks.push(round_trip(fs, file, &expected));
        }
    }

    checks
}

/// Round trip one file through its bound handle.
///
/// On success the file is left bound to the reopened handle with its
/// position at the end of the content.
pub fn round_trip<F: FileSystem + ?Sized>(
    fs: &mut F,
    file: &mut TestFile,
    expected: &[u8],
) -> Check {
    let Some(fd) = file.binding().fd() else {
        return stage_failure(file.name(), Stage::NotBound, None, None);
    };

    match fs.write(fd, expected) {
        Ok(n) if n == expected.len() => {}
        Ok(n) => {
            return stage_failure(file.name(), Stage::ShortWrite, Some(fd), None)
                .with_detail(format!("stage: short write, {n} of {} bytes", expected.len()))
        }
        Err(e) => return stage_failure(file.name(), Stage::Write, Some(fd), Some(e)),
    }

    if let Err(e) = fs.close(fd) {
        return stage_failure(file.name(), Stage::Close, Some(fd), Some(e));
    }
    file.release();

    let fd = match fs.open(file.name().as_bytes()) {
        Ok(fd) => fd,
        Err(e) => return stage_failure(file.name(), Stage::Reopen, None, Some(e)),
    };
    file.bind(fd);

    let mut actual = vec![0; expected.len()];
    let n = match fs.read(fd, &mut actual) {
        Ok(n) => n,
        Err(e) => return stage_failure(file.name(), Stage::Read, Some(fd), Some(e)),
    };

    let mut check = Check::from_result(
        Op::RoundTrip,
        file.name(),
        Expect::Success,
        Some(fd),
        &Ok(()),
    );
    if let Some(offset) = first_difference(expected, &actual[..n]) {
        check.outcome = Outcome::ContentMismatch;
        check.detail = Some(if offset == n && n < expected.len() {
            format!("short read: {n} of {} bytes", expected.len())
        } else {
            format!("first difference at offset {offset}")
        });
    }
    check
}

fn stage_failure(name: &str, stage: Stage, fd: Option<Fd>, err: Option<SysError>) -> Check {
    let detail = format!("stage: {stage}");
    let mut check = Check::not_issued(Op::RoundTrip, name, Expect::Success, detail);
    check.fd = fd;
    check.error = err.map(|e| e.to_string());
    check
}

/// Offset of the first byte where `actual` departs from `expected`,
/// counting a missing tail as a difference.
fn first_difference(expected: &[u8], actual: &[u8]) -> Option<usize> {
    expected
        .iter()
        .zip(actual)
        .position(|(a, b)| a != b)
        .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())))
}
