// src/supervisor/mod.rs

//! Child-process supervision: the single spawn point, signal
//! forwarding and exit translation.

pub mod registry;

pub use registry::{ChildRegistry, TermSignal};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use anyhow::Context as _;
use tokio::process::Command;
use tracing::{debug, info};

use crate::errors::{DevbinError, Result};

/// A fully resolved child invocation: program plus flag-escaped argv.
#[derive(Debug, Clone)]
pub struct ChildCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ChildCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `node <exec-argv> <script> <script-args>`, the shape every devbin
    /// command launches.
    pub fn node(exec_argv: &[String], script: &Path, script_args: &[String]) -> Self {
        let mut args = exec_argv.to_vec();
        args.push(script.display().to_string());
        args.extend(script_args.iter().cloned());
        Self::new("node", args)
    }

    /// The command line shown in dry-run output and failure messages;
    /// what a caller needs to reproduce the run manually.
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[derive(Debug, Clone)]
pub struct LaunchOptions {
    /// Working directory for the child.
    pub cwd: PathBuf,
    /// The already-merged environment the child runs with.
    pub env: HashMap<String, String>,
    /// Print the command line instead of spawning.
    pub dry_run: bool,
}

static SIGNAL_HOOK: Once = Once::new();

/// Owns the child registry; the only place children are spawned.
#[derive(Debug, Clone)]
pub struct Supervisor {
    registry: Arc<ChildRegistry>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ChildRegistry::new()),
        }
    }

    pub fn registry(&self) -> &ChildRegistry {
        &self.registry
    }

    /// Spawn the child and wait for it to exit.
    ///
    /// Dry-run prints the assembled command line and returns before any
    /// OS resource is touched; the registry is never mutated. A zero
    /// exit resolves `Ok`; any other termination is a
    /// `ChildProcessFailure` carrying the command line and the exit
    /// code — `None` when the child was terminated by a signal.
    pub async fn launch(&self, cmd: &ChildCommand, options: &LaunchOptions) -> Result<()> {
        if options.dry_run {
            println!("dry run: $ {}", cmd.display_line());
            return Ok(());
        }

        self.install_signal_handlers();

        let mut command = Command::new(&cmd.program);
        command
            .args(&cmd.args)
            .current_dir(&options.cwd)
            .env_clear()
            .envs(&options.env)
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .with_context(|| format!("spawning {}", cmd.display_line()))?;

        let pid = child.id().unwrap_or_default();
        self.registry.register(pid, &cmd.display_line());
        info!(pid, command = %cmd.display_line(), "child started");

        let status = child.wait().await;
        self.registry.deregister(pid);
        let status = status.with_context(|| format!("waiting for {}", cmd.display_line()))?;

        debug!(pid, code = ?status.code(), "child exited");
        if status.success() {
            Ok(())
        } else {
            Err(DevbinError::ChildProcessFailure {
                command: cmd.display_line(),
                code: status.code(),
            })
        }
    }

    /// Kill any children still registered; the normal-exit counterpart
    /// of the signal path.
    pub fn shutdown(&self) {
        let killed = self.registry.kill_all();
        if killed > 0 {
            debug!(killed, "killed children left at shutdown");
        }
    }

    /// Installed once per process, at the first real spawn.
    fn install_signal_handlers(&self) {
        SIGNAL_HOOK.call_once(|| {
            #[cfg(unix)]
            {
                spawn_signal_listener(self.registry.clone(), TermSignal::Interrupt);
                spawn_signal_listener(self.registry.clone(), TermSignal::Quit);
                spawn_signal_listener(self.registry.clone(), TermSignal::Terminate);
            }
        });
    }
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

/// On receipt: record the signal, forward it to every registered child,
/// then leave with a clean exit code.
#[cfg(unix)]
fn spawn_signal_listener(registry: Arc<ChildRegistry>, term: TermSignal) {
    use tokio::signal::unix::{SignalKind, signal};

    let kind = match term {
        TermSignal::Interrupt => SignalKind::interrupt(),
        TermSignal::Quit => SignalKind::quit(),
        TermSignal::Terminate => SignalKind::terminate(),
    };

    tokio::spawn(async move {
        let mut stream = match signal(kind) {
            Ok(stream) => stream,
            Err(err) => {
                tracing::warn!(signal = %term, error = %err, "cannot listen for signal");
                return;
            }
        };
        if stream.recv().await.is_some() {
            registry.record_signal(term);
            let killed = registry.kill_all();
            info!(signal = %term, killed, "terminated by signal, children stopped");
            std::process::exit(0);
        }
    });
}
