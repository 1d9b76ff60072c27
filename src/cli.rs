// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `devbin`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devbin",
    version,
    about = "Launch a project's tests, dev server or coverage run under supervision.",
    long_about = None
)]
pub struct Cli {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVBIN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the test suite.
    Test(TestArgs),
    /// Run the test suite with coverage.
    Cov(CovArgs),
    /// Start the server in local dev mode.
    Dev(DevArgs),
}

/// Flags shared by every command.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Directory of the application, defaults to the current working directory.
    #[arg(long, alias = "base-dir", value_name = "DIR")]
    pub base: Option<PathBuf>,

    /// Require the given module before the child starts (repeatable).
    #[arg(short = 'r', long = "require", value_name = "MODULE")]
    pub require: Vec<String>,

    /// Show the full command line only, execute nothing.
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Run with the TypeScript toolchain.
    #[arg(long, overrides_with = "no_typescript")]
    pub typescript: bool,

    /// Run with the plain JavaScript toolchain.
    #[arg(long, overrides_with = "typescript")]
    pub no_typescript: bool,

    /// Deprecated form of --typescript/--no-typescript.
    #[arg(long = "ts", value_name = "true|false", hide = true)]
    pub ts_legacy: Option<String>,

    /// TypeScript compiler register module.
    #[arg(long, value_name = "MODULE")]
    pub tscompiler: Option<String>,

    /// Generate typings before the command runs.
    #[arg(long, alias = "dts")]
    pub declarations: bool,
}

impl CommonArgs {
    /// The explicit boolean flag pair folded into a tri-state.
    pub fn typescript_flag(&self) -> Option<bool> {
        if self.typescript {
            Some(true)
        } else if self.no_typescript {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct TestArgs {
    /// File(s) to test; comma-separated values are accepted.
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,

    /// Only run tests matching <pattern> (repeatable).
    #[arg(short = 'g', long = "grep", value_name = "PATTERN")]
    pub grep: Vec<String>,

    /// Set test-case timeout in milliseconds, default is 60000.
    #[arg(short = 't', long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Disable test-case timeouts.
    #[arg(long)]
    pub no_timeout: bool,

    /// Abort ("bail") after the first test failure.
    #[arg(short = 'b', long)]
    pub bail: bool,

    /// Only run changed test files under the test directory.
    #[arg(short = 'c', long)]
    pub changed: bool,

    /// Runner parallel mode.
    #[arg(short = 'p', long)]
    pub parallel: bool,

    /// Number of jobs to run in parallel mode.
    #[arg(long, value_name = "N")]
    pub jobs: Option<u32>,

    /// Enable the mochawesome reporter (default).
    #[arg(long, overrides_with = "no_mochawesome")]
    pub mochawesome: bool,

    /// Disable the mochawesome reporter.
    #[arg(long, overrides_with = "mochawesome")]
    pub no_mochawesome: bool,

    /// Activate the inspector on the child process.
    #[arg(long)]
    pub inspect: bool,

    /// Activate the inspector and break on the first line.
    #[arg(long)]
    pub inspect_brk: bool,
}

impl TestArgs {
    pub fn mochawesome_enabled(&self) -> bool {
        !self.no_mochawesome
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct CovArgs {
    #[command(flatten)]
    pub test: TestArgs,

    /// Prerequire application files for coverage instrumentation.
    #[arg(long)]
    pub prerequire: bool,

    /// Coverage ignore pattern (repeatable).
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Coverage-tool passthrough arguments.
    #[arg(
        long,
        value_name = "ARGS",
        default_value = "--temp-directory node_modules/.c8_output -r text-summary -r json-summary -r json -r lcov -r cobertura"
    )]
    pub c8: String,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DevArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Listening port, default to 7001.
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Number of app workers.
    #[arg(short = 'c', long, alias = "cluster", value_name = "N", default_value_t = 1)]
    pub workers: u32,

    /// Framework, either an absolute path or a package name.
    #[arg(long, value_name = "NAME_OR_PATH")]
    pub framework: Option<String>,

    /// Start a sticky cluster server.
    #[arg(long)]
    pub sticky: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `Cli::parse()`.
pub fn parse() -> Cli {
    Cli::parse()
}
