// src/commands/cov.rs

//! `devbin cov`: the test invocation wrapped in the coverage tool.

use std::path::PathBuf;

use tracing::debug;

use crate::cli::CovArgs;
use crate::context::InvocationContext;
use crate::errors::Result;
use crate::resolve::resolve_module;
use crate::supervisor::{ChildCommand, LaunchOptions, Supervisor};

use super::test::{self, UNHANDLED_REJECTIONS};

const C8_ENTRY: &str = "c8/bin/c8.js";
const OUTPUT_DIR: &str = "node_modules/.c8_output";
const COVERAGE_DIR: &str = "coverage";
const PREREQUIRE_ENV: &str = "DEVBIN_PREREQUIRE";
/// Root marker consumed by the coverage tool's process wrapper.
const SHIM_ROOT_ENV: &str = "SPAWN_WRAP_SHIM_ROOT";

/// Patterns always excluded from instrumentation.
const DEFAULT_EXCLUDES: &[&str] = &[
    "example/",
    "examples/",
    "mocks**/",
    "docs/",
    "test/**",
    "test{,-*}.js",
    "**/*.test.js",
    "**/__tests__/**",
    "**/node_modules/**",
    "typings",
    "**/*.d.ts",
];

pub async fn run(ctx: &InvocationContext, supervisor: &Supervisor, args: &CovArgs) -> Result<()> {
    let Some(mut invocation) = test::prepare(ctx, &args.test).await? else {
        return Ok(());
    };

    if args.prerequire {
        invocation.runtime.env.set(PREREQUIRE_ENV, "true");
    }

    let mut c8_args: Vec<String> = args.c8.split_whitespace().map(str::to_string).collect();
    if invocation.runtime.typescript.enabled {
        invocation.runtime.env.set(
            SHIM_ROOT_ENV,
            ctx.base().join("node_modules").display().to_string(),
        );
        c8_args.push("--extension".to_string());
        c8_args.push(".ts".to_string());
    }
    for exclude in collect_excludes(ctx, &args.exclude) {
        c8_args.push("-x".to_string());
        c8_args.push(exclude);
    }

    let c8_file = resolve_module(
        C8_ENTRY,
        &[ctx.base().to_path_buf(), ctx.tool_dir().to_path_buf()],
    )?;

    // Stale instrumentation output skews the report.
    remove_dir_quiet(ctx.base().join(OUTPUT_DIR)).await;
    remove_dir_quiet(ctx.base().join(COVERAGE_DIR)).await;

    // $ node c8.js <c8 args> node <exec argv> _mocha <mocha args>
    let mut child_args = vec![c8_file.display().to_string()];
    child_args.extend(c8_args);
    child_args.push("node".to_string());
    child_args.push(UNHANDLED_REJECTIONS.to_string());
    child_args.push(invocation.mocha_file.display().to_string());
    child_args.extend(invocation.runner_args.iter().cloned());

    let cmd = ChildCommand::new("node", child_args);
    let options = LaunchOptions {
        cwd: ctx.base().to_path_buf(),
        env: invocation.runtime.env.merged(ctx.env()),
        dry_run: args.test.common.dry_run,
    };
    supervisor.launch(&cmd, &options).await
}

/// Env override first, then the built-in list, then explicit flags;
/// insertion order is kept, duplicates and blanks dropped.
fn collect_excludes(ctx: &InvocationContext, flags: &[String]) -> Vec<String> {
    let env_excludes: Vec<String> = ctx
        .env_var("COV_EXCLUDES")
        .map(|value| value.split(',').map(str::to_string).collect())
        .unwrap_or_default();

    let mut excludes: Vec<String> = Vec::new();
    for exclude in env_excludes
        .into_iter()
        .chain(DEFAULT_EXCLUDES.iter().map(|s| s.to_string()))
        .chain(flags.iter().cloned())
    {
        if !exclude.trim().is_empty() && !excludes.contains(&exclude) {
            excludes.push(exclude);
        }
    }
    excludes
}

async fn remove_dir_quiet(path: PathBuf) {
    if let Err(err) = tokio::fs::remove_dir_all(&path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            debug!(path = %path.display(), error = %err, "could not remove coverage output");
        }
    }
}
