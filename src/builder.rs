use std::io;
use std::path::PathBuf;

use crate::buffers::Pattern;
use crate::config::Config;
use crate::journal::Journal;
use crate::{FileSystem, Scenario};

/// A builder that can be used to configure a conformance run.
///
/// ## Examples
///
/// You can use the builder to run the standard scenario against a simulated
/// subsystem:
///
/// ```
/// let mut scenario = fsconform::Builder::new().build(fsconform::fs::SimFs::default())?;
/// let report = scenario.run()?;
/// assert!(report.is_success());
/// # Ok::<(), std::io::Error>(())
/// ```
///
/// If you want to vary the workload, use the respective Builder methods:
///
/// ```
/// use fsconform::{fs::SimFs, Pattern};
///
/// let _scenario = fsconform::Builder::new()
///     .file_count(4)
///     .buffer_len(1024)
///     .pattern(Pattern::new(26, b'a'))
///     .build(SimFs::default())?;
/// # Ok::<(), std::io::Error>(())
/// ```
///
/// A builder can be reused to run the same scenario against several
/// subsystems.
pub struct Builder {
    config: Config,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// How many test files to create.
    pub fn file_count(&mut self, value: usize) -> &mut Self {
        assert!(value > 0, "file count must be positive");
        self.config.file_count = value;
        self
    }

    /// How many bytes to write to, and read back from, each file.
    pub fn buffer_len(&mut self, value: usize) -> &mut Self {
        assert!(value > 0, "buffer length must be positive");
        self.config.buffer_len = value;
        self
    }

    /// Prefix of the test file names. File `i` is named `<prefix><i>`.
    pub fn name_prefix(&mut self, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        assert!(
            !value.is_empty() && !value.contains(['/', '\0']),
            "name prefix must be a non-empty single path component"
        );
        self.config.name_prefix = value;
        self
    }

    /// Generator for file contents.
    pub fn pattern(&mut self, value: Pattern) -> &mut Self {
        self.config.pattern = value;
        self
    }

    /// The name length limit to probe, counting the terminator.
    pub fn name_limit(&mut self, value: usize) -> &mut Self {
        assert!(value >= 2, "name limit must be at least 2");
        self.config.name_limit = value;
        self
    }

    /// Exit with a non-zero status when any check fails.
    pub fn strict(&mut self, value: bool) -> &mut Self {
        self.config.strict = value;
        self
    }

    /// Write every check to a JSON-lines file as it is made.
    pub fn journal(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.config.journal = Some(path.into());
        self
    }

    /// Build a scenario against `fs` with the settings from the builder.
    ///
    /// Fails only if the journal file cannot be created.
    pub fn build<F: FileSystem>(&self, fs: F) -> io::Result<Scenario<F>> {
        let journal = match &self.config.journal {
            Some(path) => Journal::new(path)?,
            None => Journal::none(),
        };

        Ok(Scenario::new(self.config.clone(), fs, journal))
    }
}
