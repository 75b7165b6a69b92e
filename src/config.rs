use std::path::PathBuf;

use crate::buffers::Pattern;

#[derive(Clone, Debug)]
pub(crate) struct Config {
    /// How many test files the descriptor table tracks
    pub(crate) file_count: usize,

    /// Length of each file's content, in bytes
    pub(crate) buffer_len: usize,

    /// Test files are named `<prefix><index>`
    pub(crate) name_prefix: String,

    /// Generates each file's content
    pub(crate) pattern: Pattern,

    /// Name length limit under test, terminator included
    pub(crate) name_limit: usize,

    /// Exit non-zero when any check failed
    pub(crate) strict: bool,

    /// Where to write the JSON-lines journal, if anywhere
    pub(crate) journal: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            file_count: 14,
            buffer_len: 256,
            name_prefix: "file".to_string(),
            pattern: Pattern::default(),
            name_limit: 256,
            strict: false,
            journal: None,
        }
    }
}
