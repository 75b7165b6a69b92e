use std::io;

use crate::boundary::BoundarySuite;
use crate::config::Config;
use crate::journal::Journal;
use crate::lifecycle::{close_all, create_all, delete_all, open_all};
use crate::report::{Check, Expect, Op, Outcome, Report, SuiteReport};
use crate::roundtrip::round_trip_all;
use crate::table::DescriptorTable;
use crate::{FileSystem, SysError, TRACING_TARGET};

/// A conformance run against one file subsystem.
///
/// Owns the subsystem, the descriptor table and the report. Every step
/// borrows them in turn; nothing runs concurrently.
///
/// Built with [`Builder`](crate::Builder).
pub struct Scenario<F> {
    config: Config,
    fs: F,
    table: DescriptorTable,
    boundary: BoundarySuite,
    journal: Journal,
    report: Report,

    /// Number of checks recorded so far
    seq: u64,
}

impl<F: FileSystem> Scenario<F> {
    pub(crate) fn new(config: Config, fs: F, journal: Journal) -> Self {
        let table = DescriptorTable::new(
            &config.name_prefix,
            config.file_count,
            config.pattern,
            config.buffer_len,
        );
        let boundary = BoundarySuite::new(config.name_limit);

        Self {
            config,
            fs,
            table,
            boundary,
            journal,
            report: Report::default(),
            seq: 0,
        }
    }

    pub fn fs(&self) -> &F {
        &self.fs
    }

    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    pub fn table(&self) -> &DescriptorTable {
        &self.table
    }

    pub fn boundary(&self) -> &BoundarySuite {
        &self.boundary
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn into_report(self) -> Report {
        self.report
    }

    /// Run every step of the scenario, in order, and return the report.
    ///
    /// Does not terminate. A scenario is meant to run once; running it again
    /// starts from whatever state the previous run left behind.
    ///
    /// Fails only if the journal cannot be written.
    pub fn run(&mut self) -> io::Result<&Report> {
        tracing::info!(
            target: TRACING_TARGET,
            files = self.table.len(),
            buffer_len = self.table.buffer_len(),
            name_limit = self.config.name_limit,
            journal = self.journal.enabled(),
            "Start"
        );

        self.round_trip_phase()?;
        self.descriptor_table_phase()?;
        self.boundary_phase()?;

        self.journal.flush()?;
        Ok(&self.report)
    }

    /// Run the scenario, emit the summary and terminate with
    /// [`exit_code`](Self::exit_code).
    ///
    /// Against a real process this never returns. If the subsystem's exit
    /// does return, a single probe checks that the subsystem refuses further
    /// calls; the probe is recorded under the `terminate` step.
    pub fn run_to_exit(&mut self) -> io::Result<&Report> {
        self.run()?;
        self.report.summarize();
        self.terminate()?;
        Ok(&self.report)
    }

    /// 0, or 1 when the run is strict and any check failed.
    pub fn exit_code(&self) -> i32 {
        if self.config.strict && !self.report.is_success() {
            1
        } else {
            0
        }
    }

    /// Terminate through the subsystem. Returns the post-exit probe if the
    /// subsystem's exit returned.
    pub fn terminate(&mut self) -> io::Result<Check> {
        let code = self.exit_code();
        tracing::info!(target: TRACING_TARGET, code, "Exit");

        // Nothing after this point is guaranteed to run.
        self.journal.flush()?;
        self.fs.exit(code);

        let probe = self.probe_after_exit();
        self.step("terminate", vec![probe.clone()])?;
        self.journal.flush()?;
        Ok(probe)
    }

    fn probe_after_exit(&mut self) -> Check {
        let name = match self.table.get(0) {
            Some(file) => file.name().to_string(),
            None => return Check::not_issued(Op::Exit, "", Expect::Failure, "no file to probe"),
        };

        let result = self.fs.open(name.as_bytes());
        let fd = result.as_ref().ok().copied();
        let mut check = Check::from_result(Op::Exit, name, Expect::Failure, fd, &result);

        match result {
            Err(SysError::Terminated) => {}
            Err(_) => {
                check.outcome = Outcome::UnexpectedFailure;
                check.detail = Some("calls after exit must report termination".to_string());
            }
            Ok(_) => {
                check.detail = Some("process did not terminate".to_string());
            }
        }
        check
    }

    fn round_trip_phase(&mut self) -> io::Result<()> {
        let checks = create_all(&mut self.fs, &mut self.table, Expect::Success);
        self.step("round trip / create-all", checks)?;

        let checks = round_trip_all(&mut self.fs, &mut self.table);
        self.step("round trip / round-trip-all", checks)?;

        let checks = delete_all(&mut self.fs, &mut self.table, Expect::Success);
        self.step("round trip / delete-all", checks)?;

        let checks = close_all(&mut self.fs, &mut self.table, Expect::Success);
        self.step("round trip / close-all", checks)
    }

    fn descriptor_table_phase(&mut self) -> io::Result<()> {
        use Expect::{Failure, Success};

        type Bulk<S> = fn(&mut S, &mut DescriptorTable, Expect) -> Vec<Check>;

        let steps: [(&str, Bulk<F>, Expect); 11] = [
            ("descriptor table / create-all", create_all, Success),
            ("descriptor table / open-all", open_all, Success),
            ("descriptor table / close-all", close_all, Success),
            ("descriptor table / reopen-all", open_all, Success),
            ("descriptor table / close-all (after reopen)", close_all, Success),
            ("descriptor table / close-all (double close)", close_all, Failure),
            ("descriptor table / delete-all", delete_all, Success),
            ("descriptor table / open-all (after delete)", open_all, Failure),
            ("descriptor table / create-all (after delete)", create_all, Success),
            ("descriptor table / delete-all (cleanup)", delete_all, Success),
            ("descriptor table / close-all (cleanup)", close_all, Success),
        ];

        for (name, op, expect) in steps {
            let checks = op(&mut self.fs, &mut self.table, expect);
            self.step(name, checks)?;
        }
        Ok(())
    }

    fn boundary_phase(&mut self) -> io::Result<()> {
        let checks = self.boundary.create(&mut self.fs);
        self.step("boundary / create", checks)?;

        let checks = self.boundary.open(&mut self.fs);
        self.step("boundary / open", checks)?;

        let checks = self.boundary.delete(&mut self.fs);
        self.step("boundary / delete", checks)
    }

    /// Emit, journal and record the checks of one step.
    fn step(&mut self, name: &str, checks: Vec<Check>) -> io::Result<()> {
        tracing::info!(target: TRACING_TARGET, step = name, "Step");

        for check in &checks {
            check.emit(name);
            self.journal.record(self.seq, name, check)?;
            self.seq += 1;
        }

        self.report.push(SuiteReport::new(name, checks));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::fs::{FsConfig, SimFs};
    use crate::report::Outcome;
    use crate::Builder;

    #[test]
    fn conforming_subsystem_passes() -> crate::Result {
        let mut scenario = Builder::new().build(SimFs::default())?;
        let report = scenario.run()?;

        assert!(report.is_success(), "{report:#?}");
        assert_eq!(report.suites.len(), 18);

        let open_after_delete = report
            .suite("descriptor table / open-all (after delete)")
            .unwrap();
        assert!(open_after_delete
            .checks
            .iter()
            .all(|c| c.outcome == Outcome::ExpectedFailure));
        Ok(())
    }

    #[test]
    fn every_file_is_gone_at_the_end() -> crate::Result {
        let mut scenario = Builder::new().file_count(3).build(SimFs::default())?;
        scenario.run()?;

        for file in scenario.table().iter() {
            assert!(!scenario.fs().exists(file.name().as_bytes()));
        }
        assert_eq!(scenario.table().bound(), 0);
        Ok(())
    }

    #[test]
    fn exit_is_observed() -> crate::Result {
        let mut scenario = Builder::new().file_count(2).build(SimFs::default())?;
        scenario.run_to_exit()?;

        assert_eq!(scenario.fs().exit_status(), Some(0));
        let terminate = scenario.report().suite("terminate").unwrap();
        assert_eq!(terminate.checks[0].outcome, Outcome::ExpectedFailure);
        Ok(())
    }

    #[test]
    fn strict_exit_code() -> crate::Result {
        let fs = FsConfig::default().name_limit(300).build();
        let mut scenario = Builder::new().file_count(2).strict(true).build(fs)?;
        scenario.run_to_exit()?;

        assert!(!scenario.report().is_success());
        assert_eq!(scenario.exit_code(), 1);
        assert_eq!(scenario.fs().exit_status(), Some(1));
        Ok(())
    }
}
