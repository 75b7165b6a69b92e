use std::fs::File;
use std::io::{self, prelude::*, BufWriter};
use std::path::Path;

use crate::report::Check;

/// Records every check as one JSON line, in the order the checks were made.
pub(crate) struct Journal {
    writer: Option<BufWriter<File>>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "snake_case")]
struct Entry<'a> {
    /// Position of the check in the run, starting at 0.
    seq: u64,

    /// Scenario step that produced the check.
    step: &'a str,

    #[serde(flatten)]
    check: &'a Check,
}

impl Journal {
    /// Journal to the file, truncating it.
    pub(crate) fn new(path: &Path) -> io::Result<Journal> {
        let file = File::create(path)?;

        Ok(Journal {
            writer: Some(BufWriter::new(file)),
        })
    }

    /// Don't journal
    pub(crate) fn none() -> Journal {
        Journal { writer: None }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub(crate) fn record(&mut self, seq: u64, step: &str, check: &Check) -> io::Result<()> {
        if let Some(writer) = &mut self.writer {
            serde_json::to_writer(&mut *writer, &Entry { seq, step, check })?;
            writeln!(writer)?;
        }
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        match &mut self.writer {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Expect, Op};
    use crate::Fd;

    #[test]
    fn one_line_per_check() -> crate::Result {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("journal.jsonl");

        let mut journal = Journal::new(&path)?;
        assert!(journal.enabled());

        let ok = Check::from_result(Op::Create, "file0", Expect::Success, Some(Fd(2)), &Ok(()));
        let dup = Check::from_result(Op::Close, "file0", Expect::Failure, Some(Fd(2)), &Ok(()));
        journal.record(0, "create-all", &ok)?;
        journal.record(1, "close-all (double close)", &dup)?;
        journal.flush()?;

        let text = std::fs::read_to_string(&path)?;
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(serde_json::from_str)
            .collect::<std::result::Result<_, _>>()?;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["step"], "create-all");
        assert_eq!(lines[0]["target"], "file0");
        assert_eq!(lines[1]["seq"], 1);
        assert_eq!(lines[1]["outcome"], "unexpected_success");
        Ok(())
    }

    #[test]
    fn disabled() -> crate::Result {
        let mut journal = Journal::none();
        assert!(!journal.enabled());

        let check = Check::from_result(Op::Delete, "file1", Expect::Success, None, &Ok(()));
        journal.record(0, "delete-all", &check)?;
        journal.flush()?;
        Ok(())
    }
}
