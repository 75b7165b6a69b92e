//! fsconform is a conformance harness for a minimal file syscall surface:
//! create, open, close, read, write, delete and exit. It drives a subsystem
//! through a fixed scenario and reports, per call, whether the subsystem did
//! what a conforming implementation must do.
//!
//! # Subsystems
//!
//! Anything implementing [`FileSystem`] can be put under test. Two
//! implementations ship with the crate:
//!
//! * [`HostFs`], the host operating system's files under a root directory.
//! * [`fs::SimFs`], a deterministic in-memory subsystem with configurable
//!   limits and fault injection, built through [`fs::FsConfig`].
//!
//! ```
//! use fsconform::{fs::SimFs, Builder};
//!
//! let mut scenario = Builder::new().build(SimFs::default())?;
//! let report = scenario.run()?;
//!
//! assert!(report.is_success());
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! # The scenario
//!
//! A [`Scenario`] tracks a fixed set of test files in a
//! [`DescriptorTable`]. Each file's name and content are derived from its
//! index alone, so nothing needs to be stored to verify a read.
//!
//! 1. Round trip: every file is created, written, closed, reopened, read back
//!    and compared, then deleted and closed.
//! 2. Descriptor table: bulk create, open and close, including a double
//!    close and an open after delete, both of which must fail.
//! 3. Boundary: create, open and delete with the longest accepted name and
//!    with a name one byte longer.
//! 4. Terminate through [`FileSystem::exit`].
//!
//! Every call produces a [`Check`]. A failure on one file never stops the
//! run; it is recorded and the scenario moves on.
//!
//! # Tracing
//!
//! Checks are emitted through `tracing` on the `fsconform` target: passing
//! checks at `INFO`, failing ones at `WARN`. Every syscall issued by the
//! bundled subsystems is traced at `TRACE`, so `RUST_LOG=fsconform=trace`
//! shows the full call sequence.

pub mod boundary;
pub use boundary::BoundarySuite;

mod buffers;
pub use buffers::Pattern;

mod builder;
pub use builder::Builder;

mod config;

mod error;
pub use error::{Result, SysError, SysResult};

pub mod fs;

mod host;
pub use host::HostFs;

mod journal;

pub mod lifecycle;

mod names;
pub use names::{file_name, BoundaryNames};

mod report;
pub use report::{Check, Expect, Op, Outcome, Report, SuiteReport};

pub mod roundtrip;

mod scenario;
pub use scenario::Scenario;

mod sys;
pub use sys::{Fd, FileSystem};

mod table;
pub use table::{Binding, DescriptorTable, TestFile};

const TRACING_TARGET: &str = "fsconform";
