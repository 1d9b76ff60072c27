// src/context.rs

//! Immutable per-invocation context shared by all resolvers.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use crate::errors::Result;

/// Created once at command start and never mutated afterwards.
///
/// Resolvers read environment variables from the snapshot taken here, not
/// from `std::env`, so the precedence cascades stay testable as plain
/// data flow.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    base: PathBuf,
    env: HashMap<String, String>,
    tool_dir: PathBuf,
}

impl InvocationContext {
    pub fn new(base: PathBuf, env: HashMap<String, String>, tool_dir: PathBuf) -> Self {
        Self { base, env, tool_dir }
    }

    /// Snapshot the current process: resolve `base` against the working
    /// directory and locate the tool's own install directory (used to
    /// find bundled node modules and scripts).
    pub fn from_current_process(base: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir()?;
        let base = match base {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => cwd.join(dir),
            None => cwd,
        };
        let env_snapshot: HashMap<String, String> = env::vars().collect();
        let tool_dir = match env_snapshot.get("DEVBIN_HOME") {
            Some(dir) => PathBuf::from(dir),
            None => env::current_exe()?
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };
        Ok(Self::new(base, env_snapshot, tool_dir))
    }

    /// Absolute project root this invocation operates on.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// The inherited process environment, snapshotted at command start.
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    /// Where devbin itself is installed.
    pub fn tool_dir(&self) -> &Path {
        &self.tool_dir
    }
}
