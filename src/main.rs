use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use fsconform::fs::FsConfig;
use fsconform::{Builder, FileSystem, HostFs, Report, Scenario};

/// Conformance harness for the create/open/close/read/write/delete/exit
/// file syscalls.
#[derive(Parser, Debug)]
#[command(name = "fsconform", version, about)]
struct Cli {
    /// File subsystem to put under test.
    #[arg(long, value_enum, default_value = "host")]
    backend: Backend,

    /// Directory holding the test files (host backend). Created if missing.
    /// Defaults to `fsconform` under the system temp directory.
    #[arg(long)]
    root: Option<PathBuf>,

    /// Number of test files.
    #[arg(long, default_value_t = 14, value_parser = clap::value_parser!(u64).range(1..))]
    files: u64,

    /// Bytes written to and read back from each file.
    #[arg(long, default_value_t = 256, value_parser = clap::value_parser!(u64).range(1..))]
    buffer_len: u64,

    /// Prefix of the test file names.
    #[arg(long, default_value = "file")]
    prefix: String,

    /// Name length limit to probe, counting the terminator.
    #[arg(long, default_value_t = 256, value_parser = clap::value_parser!(u64).range(2..))]
    name_limit: u64,

    /// Seed for the simulated backend's fault injection.
    #[arg(long)]
    seed: Option<u64>,

    /// Write every check to this file as JSON lines.
    #[arg(long)]
    journal: Option<PathBuf>,

    /// Output format for the final report.
    #[arg(long, value_enum, default_value = "human")]
    format: OutputFormat,

    /// Exit with status 1 when any check fails.
    #[arg(long)]
    strict: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// The host operating system.
    Host,
    /// The in-memory simulated subsystem.
    Sim,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Single JSON object on stdout.
    Json,
    /// Human-readable summary on stdout.
    #[default]
    Human,
}

/// Failures of the harness itself, as opposed to failed checks.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("cannot prepare root directory {}: {source}", path.display())]
    Root { path: PathBuf, source: io::Error },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Every harness failure is an infrastructure error.
    fn exit_code(&self) -> ExitCode {
        ExitCode::from(2)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fsconform=info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!(target: "fsconform", error = %e, "Aborted");
            eprintln!("fsconform: {e}");
            e.exit_code()
        }
    }
}

fn run(cli: Cli) -> Result<u8, CliError> {
    if cli.prefix.is_empty() || cli.prefix.contains(['/', '\0']) {
        return Err(CliError::InvalidArgument(format!(
            "prefix {:?} is not a single path component",
            cli.prefix
        )));
    }

    let name_limit = to_usize("name-limit", cli.name_limit)?;

    let mut builder = Builder::new();
    builder
        .file_count(to_usize("files", cli.files)?)
        .buffer_len(to_usize("buffer-len", cli.buffer_len)?)
        .name_prefix(cli.prefix.as_str())
        .name_limit(name_limit)
        .strict(cli.strict);
    if let Some(path) = &cli.journal {
        builder.journal(path);
    }

    match cli.backend {
        Backend::Host => {
            let root = cli
                .root
                .unwrap_or_else(|| std::env::temp_dir().join("fsconform"));
            std::fs::create_dir_all(&root).map_err(|source| CliError::Root {
                path: root.clone(),
                source,
            })?;

            // The host's exit ends the process, so the report goes out first.
            finish(builder.build(HostFs::new(root))?, cli.format, false)
        }
        Backend::Sim => {
            let mut config = FsConfig::default();
            config.name_limit(name_limit);
            if let Some(seed) = cli.seed {
                config.rng_seed(seed);
            }

            finish(builder.build(config.build())?, cli.format, true)
        }
    }
}

/// Converts a numeric flag to `usize`, rejecting values the target cannot
/// address.
fn to_usize(flag: &str, value: u64) -> Result<usize, CliError> {
    usize::try_from(value).map_err(|_| {
        CliError::InvalidArgument(format!("--{flag} {value} is too large for this platform"))
    })
}

/// Run the scenario, print the report and terminate.
///
/// When `exit_returns` the report is printed after termination and includes
/// the post-exit probe. Returns only when the subsystem's exit returned, with
/// the status to exit the real process with.
fn finish<F: FileSystem>(
    mut scenario: Scenario<F>,
    format: OutputFormat,
    exit_returns: bool,
) -> Result<u8, CliError> {
    scenario.run()?;
    scenario.report().summarize();

    let probe = if exit_returns {
        let probe = scenario.terminate()?;
        print_report(scenario.report(), format)?;
        probe
    } else {
        print_report(scenario.report(), format)?;
        scenario.terminate()?
    };

    if probe.is_failure() {
        eprintln!("fsconform: subsystem did not terminate properly");
        return Ok(1);
    }

    Ok(scenario.exit_code() as u8)
}

fn print_report(report: &Report, format: OutputFormat) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        OutputFormat::Human => print!("{report}"),
    }
    Ok(())
}
