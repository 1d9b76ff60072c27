// src/targets/mod.rs

//! Test-target resolution: the ordered file list and the runner
//! argument vector derived from it.

pub mod args;
pub mod changed;
pub mod requires;
pub mod resolver;

pub use args::{
    DEFAULT_TIMEOUT_MS, Reporter, RunnerArgsSpec, Timeout, build_runner_args, resolve_timeout,
};
pub use requires::collect_requires;
pub use resolver::{TargetOutcome, expand_patterns, resolve_targets};
