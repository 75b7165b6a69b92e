//! Classified results of every syscall the harness issues.

use std::fmt;

use serde::Serialize;

use crate::{Fd, SysError, SysResult, TRACING_TARGET};

/// What the harness expects a call to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expect {
    Success,
    Failure,
}

/// The syscall (or harness stage) a check covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    Create,
    Open,
    Close,
    Read,
    Write,
    Delete,
    RoundTrip,
    Exit,
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Op::Create => "create",
            Op::Open => "open",
            Op::Close => "close",
            Op::Read => "read",
            Op::Write => "write",
            Op::Delete => "delete",
            Op::RoundTrip => "round-trip",
            Op::Exit => "exit",
        };
        f.write_str(s)
    }
}

/// How a check came out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Expected to succeed and did.
    Pass,
    /// Expected to fail and did.
    ExpectedFailure,
    /// Expected to succeed, failed.
    UnexpectedFailure,
    /// Expected to fail, succeeded.
    UnexpectedSuccess,
    /// A round trip completed but read back different bytes.
    ContentMismatch,
}

impl Outcome {
    pub fn classify(expect: Expect, succeeded: bool) -> Self {
        match (expect, succeeded) {
            (Expect::Success, true) => Outcome::Pass,
            (Expect::Success, false) => Outcome::UnexpectedFailure,
            (Expect::Failure, false) => Outcome::ExpectedFailure,
            (Expect::Failure, true) => Outcome::UnexpectedSuccess,
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Pass | Outcome::ExpectedFailure)
    }
}

/// The verified result of one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check {
    pub op: Op,
    /// File name (or a shortened form of it for long names).
    pub target: String,
    pub expect: Expect,
    pub outcome: Outcome,
    /// Handle involved: the one returned on success, or the one passed in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fd: Option<Fd>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Check {
    /// Classify the result of a call that hands back a value.
    pub fn from_result<T>(
        op: Op,
        target: impl Into<String>,
        expect: Expect,
        fd: Option<Fd>,
        result: &SysResult<T>,
    ) -> Self {
        Check {
            op,
            target: target.into(),
            expect,
            outcome: Outcome::classify(expect, result.is_ok()),
            fd,
            error: result.as_ref().err().map(SysError::to_string),
            detail: None,
        }
    }

    /// A call the harness did not issue. Classified as a failed call.
    pub fn not_issued(
        op: Op,
        target: impl Into<String>,
        expect: Expect,
        detail: impl Into<String>,
    ) -> Self {
        Check {
            op,
            target: target.into(),
            expect,
            outcome: Outcome::classify(expect, false),
            fd: None,
            error: None,
            detail: Some(detail.into()),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_failure(&self) -> bool {
        self.outcome.is_failure()
    }

    /// Emit this check as a tracing event: INFO when it passed, WARN when it
    /// did not.
    pub fn emit(&self, step: &str) {
        let fd = self.fd.map(|fd| fd.0);
        let error = self.error.as_deref().unwrap_or_default();
        let detail = self.detail.as_deref().unwrap_or_default();

        if self.is_failure() {
            tracing::warn!(
                target: TRACING_TARGET,
                step,
                op = %self.op,
                file = %self.target,
                fd,
                outcome = ?self.outcome,
                error,
                detail,
                "FAIL"
            );
        } else {
            tracing::info!(
                target: TRACING_TARGET,
                step,
                op = %self.op,
                file = %self.target,
                fd,
                outcome = ?self.outcome,
                error,
                "ok"
            );
        }
    }
}

/// Checks produced by one step of the scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    pub name: String,
    pub checks: Vec<Check>,
}

impl SuiteReport {
    pub fn new(name: impl Into<String>, checks: Vec<Check>) -> Self {
        Self {
            name: name.into(),
            checks,
        }
    }

    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| !c.is_failure()).count()
    }

    pub fn failed(&self) -> usize {
        self.checks.iter().filter(|c| c.is_failure()).count()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Aggregate result of a scenario run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub suites: Vec<SuiteReport>,
}

impl Report {
    pub fn push(&mut self, suite: SuiteReport) {
        self.suites.push(suite);
    }

    /// The first suite with the given name.
    pub fn suite(&self, name: &str) -> Option<&SuiteReport> {
        self.suites.iter().find(|s| s.name == name)
    }

    pub fn checks(&self) -> impl Iterator<Item = &Check> {
        self.suites.iter().flat_map(|s| s.checks.iter())
    }

    pub fn passed(&self) -> usize {
        self.suites.iter().map(SuiteReport::passed).sum()
    }

    pub fn failed(&self) -> usize {
        self.suites.iter().map(SuiteReport::failed).sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Emit one summary line per suite, then a total.
    pub fn summarize(&self) {
        for suite in &self.suites {
            tracing::info!(
                target: TRACING_TARGET,
                suite = %suite.name,
                passed = suite.passed(),
                failed = suite.failed(),
                "Summary"
            );
        }
        tracing::info!(
            target: TRACING_TARGET,
            passed = self.passed(),
            failed = self.failed(),
            "Total"
        );
    }
}

/// One line per suite with the failing checks under it, then a total.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for suite in &self.suites {
            writeln!(
                f,
                "{:<48} {:>3} passed {:>3} failed",
                suite.name,
                suite.passed(),
                suite.failed()
            )?;

            for check in suite.checks.iter().filter(|c| c.is_failure()) {
                let error = check.error.as_deref().unwrap_or("-");
                let detail = check.detail.as_deref().unwrap_or("");
                writeln!(
                    f,
                    "    FAIL {} {}: {:?} ({error}) {detail}",
                    check.op, check.target, check.outcome
                )?;
            }
        }

        writeln!(
            f,
            "total: {} passed, {} failed",
            self.passed(),
            self.failed()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(Outcome::classify(Expect::Success, true), Outcome::Pass);
        assert_eq!(
            Outcome::classify(Expect::Success, false),
            Outcome::UnexpectedFailure
        );
        assert_eq!(
            Outcome::classify(Expect::Failure, false),
            Outcome::ExpectedFailure
        );
        assert_eq!(
            Outcome::classify(Expect::Failure, true),
            Outcome::UnexpectedSuccess
        );
        assert!(!Outcome::ExpectedFailure.is_failure());
        assert!(Outcome::ContentMismatch.is_failure());
    }

    #[test]
    fn check_from_error() {
        let result: SysResult<Fd> = Err(SysError::NotFound);
        let check = Check::from_result(Op::Open, "file0", Expect::Failure, None, &result);
        assert_eq!(check.outcome, Outcome::ExpectedFailure);
        assert_eq!(check.error.as_deref(), Some("no such file"));
    }

    #[test]
    fn report_totals() {
        let ok = Check::from_result(Op::Delete, "a", Expect::Success, None, &Ok(()));
        let bad = Check::from_result(Op::Delete, "b", Expect::Failure, None, &Ok(()));

        let mut report = Report::default();
        report.push(SuiteReport::new("delete-all", vec![ok, bad]));
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert_eq!(report.suite("delete-all").unwrap().checks.len(), 2);
    }

    #[test]
    fn json_shape() {
        let check = Check::from_result(Op::Create, "file0", Expect::Success, Some(Fd(2)), &Ok(()));
        let json = serde_json::to_value(&check).unwrap();
        assert_eq!(json["op"], "create");
        assert_eq!(json["outcome"], "pass");
        assert_eq!(json["fd"], 2);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn human_rendering() {
        let ok = Check::from_result(Op::Create, "file0", Expect::Success, Some(Fd(2)), &Ok(()));
        let missing: SysResult<Fd> = Err(SysError::NotFound);
        let bad = Check::from_result(Op::Open, "file1", Expect::Success, None, &missing);

        let mut report = Report::default();
        report.push(SuiteReport::new("create-all", vec![ok]));
        report.push(SuiteReport::new("open-all", vec![bad]));

        let text = report.to_string();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("create-all "));
        assert!(lines[0].ends_with("1 passed   0 failed"));
        assert_eq!(
            lines[2].trim_end(),
            "    FAIL open file1: UnexpectedFailure (no such file)"
        );
        assert_eq!(lines[3], "total: 1 passed, 1 failed");
    }
}
