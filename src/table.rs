//! The descriptor table: which handle each test file is bound to.

use crate::buffers::Pattern;
use crate::names::file_name;
use crate::Fd;

/// Handle state of one test file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    /// No create or open has succeeded yet.
    #[default]
    Unbound,
    /// Returned by the most recent successful create or open, not yet closed.
    Bound(Fd),
    /// Was bound to this handle, which has since been closed.
    Released(Fd),
}

impl Binding {
    /// The live handle, if any.
    pub fn fd(&self) -> Option<Fd> {
        match self {
            Binding::Bound(fd) => Some(*fd),
            _ => None,
        }
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Binding::Bound(_))
    }
}

/// One tracked test file.
#[derive(Debug, Clone)]
pub struct TestFile {
    index: usize,
    name: String,
    binding: Binding,
}

impl TestFile {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub(crate) fn bind(&mut self, fd: Fd) {
        self.binding = Binding::Bound(fd);
    }

    /// Marks the live handle closed. Returns it, or `None` if nothing was
    /// bound.
    pub(crate) fn release(&mut self) -> Option<Fd> {
        let fd = self.binding.fd()?;
        self.binding = Binding::Released(fd);
        Some(fd)
    }
}

/// Every tracked test file, indexed `0..len`.
///
/// Names are assigned once at construction and never change; only bindings
/// move. Expected contents are not stored, see [`DescriptorTable::expected`].
#[derive(Debug, Clone)]
pub struct DescriptorTable {
    files: Vec<TestFile>,
    pattern: Pattern,
    buffer_len: usize,
}

impl DescriptorTable {
    pub fn new(prefix: &str, count: usize, pattern: Pattern, buffer_len: usize) -> Self {
        let files = (0..count)
            .map(|index| TestFile {
                index,
                name: file_name(prefix, index),
                binding: Binding::Unbound,
            })
            .collect();

        Self {
            files,
            pattern,
            buffer_len,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    pub fn get(&self, index: usize) -> Option<&TestFile> {
        self.files.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut TestFile> {
        self.files.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestFile> {
        self.files.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TestFile> {
        self.files.iter_mut()
    }

    /// Expected content of file `index`, recomputed on every call.
    pub fn expected(&self, index: usize) -> Vec<u8> {
        self.pattern.fill(index, self.buffer_len)
    }

    /// Number of files currently bound to a live handle.
    pub fn bound(&self) -> usize {
        self.files.iter().filter(|f| f.binding.is_bound()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DescriptorTable {
        DescriptorTable::new("file", 3, Pattern::default(), 8)
    }

    #[test]
    fn starts_unbound() {
        let table = table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.bound(), 0);
        assert_eq!(table.get(2).unwrap().name(), "file2");
        assert!(table.iter().all(|f| f.binding() == Binding::Unbound));
    }

    #[test]
    fn bind_release() {
        let mut table = table();
        let file = table.get_mut(1).unwrap();
        assert_eq!(file.release(), None);

        file.bind(Fd(7));
        assert_eq!(file.binding().fd(), Some(Fd(7)));
        assert_eq!(file.release(), Some(Fd(7)));
        assert_eq!(file.binding(), Binding::Released(Fd(7)));
        assert_eq!(file.release(), None);
    }

    #[test]
    fn expected_is_stable() {
        let table = table();
        assert_eq!(table.expected(1), table.expected(1));
        assert_eq!(table.expected(1).len(), 8);
        assert_eq!(table.expected(0), Pattern::default().fill(0, 8));
    }
}
