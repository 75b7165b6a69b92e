//! Name length limit checks.
//!
//! Each operation is issued once with the longest name the limit accepts and
//! once with a name one byte longer. The first must succeed and the second
//! must fail, whatever the operation.

use crate::names::BoundaryNames;
use crate::report::{Check, Expect, Op};
use crate::sys::display_name;
use crate::{Fd, FileSystem, SysResult};

/// Runs the create, open and delete checks against a pair of boundary
/// names.
#[derive(Debug, Clone)]
pub struct BoundarySuite {
    names: BoundaryNames,
}

impl BoundarySuite {
    pub fn new(limit: usize) -> Self {
        Self {
            names: BoundaryNames::new(limit),
        }
    }

    pub fn names(&self) -> &BoundaryNames {
        &self.names
    }

    /// The names in the order they are checked, with the expectation for
    /// each.
    fn cases(&self) -> [(&[u8], Expect); 2] {
        [
            (self.names.at_limit(), Expect::Success),
            (self.names.over_limit(), Expect::Failure),
        ]
    }

    /// Create both names.
    ///
    /// Handles from a successful create are not closed here; they stay open
    /// until the process exits.
    pub fn create<F: FileSystem + ?Sized>(&self, fs: &mut F) -> Vec<Check> {
        self.run(Op::Create, |name| fs.create(name).map(Some))
    }

    /// Open both names. Expects the create checks to have run first.
    pub fn open<F: FileSystem + ?Sized>(&self, fs: &mut F) -> Vec<Check> {
        self.run(Op::Open, |name| fs.open(name).map(Some))
    }

    /// Delete both names.
    pub fn delete<F: FileSystem + ?Sized>(&self, fs: &mut F) -> Vec<Check> {
        self.run(Op::Delete, |name| fs.delete(name).map(|()| None))
    }

    fn run(&self, op: Op, mut call: impl FnMut(&[u8]) -> SysResult<Option<Fd>>) -> Vec<Check> {
        self.cases()
            .into_iter()
            .map(|(name, expect)| {
                let result = call(name);
                let fd = result.as_ref().ok().copied().flatten();
                Check::from_result(op, display_name(name), expect, fd, &result)
                    .with_detail(format!("{} byte name", name.len()))
            })
            .collect()
    }
}
