// src/targets/args.rs

//! Assembly of the runner argument vector.

pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Effective per-test timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    Millis(u64),
    Disabled,
}

impl Default for Timeout {
    fn default() -> Self {
        Timeout::Millis(DEFAULT_TIMEOUT_MS)
    }
}

impl Timeout {
    /// Zero means unlimited, same as an explicit disable.
    fn as_arg(self) -> String {
        match self {
            Timeout::Disabled | Timeout::Millis(0) => "--no-timeout".to_string(),
            Timeout::Millis(ms) => format!("--timeout={ms}"),
        }
    }
}

/// A resolved reporter selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reporter {
    pub module: String,
    pub options: Option<String>,
}

/// Everything that goes into the runner argument vector, already
/// resolved by the command layer.
#[derive(Debug, Clone, Default)]
pub struct RunnerArgsSpec {
    pub dry_run: bool,
    pub bail: bool,
    pub grep: Vec<String>,
    pub timeout: Timeout,
    pub parallel: bool,
    pub jobs: Option<u32>,
    pub reporter: Option<Reporter>,
    pub requires: Vec<String>,
    pub files: Vec<String>,
}

/// Timeout precedence: the inspector override wins over everything,
/// then the explicit disable, the explicit value, the environment
/// override, and finally the default.
pub fn resolve_timeout(
    no_timeout: bool,
    flag: Option<u64>,
    env_value: Option<&str>,
    inspector_disabled: bool,
) -> Timeout {
    if inspector_disabled || no_timeout {
        return Timeout::Disabled;
    }
    if let Some(ms) = flag {
        return Timeout::Millis(ms);
    }
    if let Some(ms) = env_value.and_then(|value| value.trim().parse().ok()) {
        return Timeout::Millis(ms);
    }
    Timeout::Millis(DEFAULT_TIMEOUT_MS)
}

/// Assemble the argument vector in its documented order; blank entries
/// are filtered out at the end, the file list always comes last.
pub fn build_runner_args(spec: &RunnerArgsSpec) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    if spec.dry_run {
        args.push("--dry-run".to_string());
    }
    // Force exit once the suite is done.
    args.push("--exit".to_string());
    if spec.bail {
        args.push("--bail".to_string());
    }
    for pattern in &spec.grep {
        args.push(format!("--grep={pattern}"));
    }
    args.push(spec.timeout.as_arg());
    if spec.parallel {
        args.push("--parallel".to_string());
        if let Some(jobs) = spec.jobs {
            args.push(format!("--jobs={jobs}"));
        }
    }
    if let Some(reporter) = &spec.reporter {
        args.push(format!("--reporter={}", reporter.module));
        if let Some(options) = &reporter.options {
            args.push(format!("--reporter-options={options}"));
        }
    }
    for module in &spec.requires {
        args.push(format!("--require={module}"));
    }
    args.extend(spec.files.iter().cloned());
    args.retain(|arg| !arg.trim().is_empty());
    args
}
