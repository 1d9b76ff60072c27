// src/runtime/resolver.rs

//! Assembles the child's execution environment from the resolved
//! language variant: compiler injection, env markers, the typings
//! prerequisite, security reverts and inspector flags.

use std::path::PathBuf;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::context::InvocationContext;
use crate::errors::Result;
use crate::manifest::{self, PackageManifest};
use crate::resolve::{file_url, resolve_bin, resolve_module};
use crate::runtime::env::RuntimeEnv;
use crate::runtime::probes::{TsDecision, TsProbeInput, resolve_typescript};

/// Marker telling the child (and in-process consumers) that the
/// TypeScript toolchain is active.
pub const TYPESCRIPT_ENV: &str = "DEVBIN_TYPESCRIPT";
/// Marker enabling startup-file auto-loading in the child.
pub const AUTOLOAD_ENV: &str = "DEVBIN_AUTOLOAD";
/// Environment override for the compiler register module.
pub const TSCOMPILER_ENV: &str = "DEVBIN_TSCOMPILER";
/// Set by JetBrains IDEs when they debug the process.
const IDE_DEBUG_ENV: &str = "JB_DEBUG_FILE";

const DEFAULT_COMPILER: &str = "ts-node/register";
const ESM_LOADER: &str = "ts-node/esm";
const TYPINGS_HELPER_BIN: &str = "ets";

/// What the command layer asked the resolver to decide.
#[derive(Debug, Clone, Default)]
pub struct RuntimeRequest {
    pub typescript_flag: Option<bool>,
    pub legacy_ts_flag: Option<String>,
    pub tscompiler: Option<String>,
    pub declarations: bool,
    pub inspect: bool,
    pub inspect_brk: bool,
    pub command_default_ts: Option<bool>,
    /// Also write the markers into the current process environment.
    /// Commands set this; tests leave the process environment alone.
    pub mutate_process_env: bool,
}

/// Immutable result record merged by the command layer; nothing mutates
/// shared options after resolution.
#[derive(Debug, Clone)]
pub struct ResolvedRuntime {
    pub typescript: TsDecision,
    pub compiler: Option<PathBuf>,
    pub env: RuntimeEnv,
    /// The inspector/IDE override: when set, the effective test timeout
    /// is unlimited regardless of any other timeout configuration.
    pub timeout_disabled: bool,
}

pub async fn resolve_runtime(
    ctx: &InvocationContext,
    manifest: &PackageManifest,
    req: &RuntimeRequest,
) -> Result<ResolvedRuntime> {
    let has_tsconfig = manifest::has_tsconfig(ctx.base()).await;
    let compiler_spec = req
        .tscompiler
        .clone()
        .or_else(|| ctx.env_var(TSCOMPILER_ENV).map(str::to_string));

    let typescript = resolve_typescript(&TsProbeInput {
        cli_flag: req.typescript_flag,
        legacy_flag: req.legacy_ts_flag.as_deref(),
        env_value: ctx.env_var(TYPESCRIPT_ENV),
        manifest,
        has_tsconfig,
        compiler_override: compiler_spec.is_some(),
        command_default: req.command_default_ts,
    });

    let mut env = RuntimeEnv::new();
    let mut compiler = None;

    if typescript.enabled {
        let spec = compiler_spec.as_deref().unwrap_or(DEFAULT_COMPILER);
        // The project root joins the search only when the compiler was
        // overridden explicitly; the default always ships with the tool.
        let search = if compiler_spec.is_some() {
            vec![ctx.base().to_path_buf(), ctx.tool_dir().to_path_buf()]
        } else {
            vec![ctx.tool_dir().to_path_buf()]
        };
        let compiler_path = resolve_module(spec, &search)?;
        debug!(compiler = %compiler_path.display(), "resolved compiler register module");

        if manifest.is_esm() {
            let loader = resolve_module(ESM_LOADER, &search)?;
            env.append_node_options("--no-warnings");
            env.append_node_options(&format!("--import {}", file_url(&compiler_path)));
            env.append_node_options(&format!("--loader {}", file_url(&loader)));
        } else {
            env.append_node_options(&format!("--require {}", compiler_path.display()));
        }

        env.set(TYPESCRIPT_ENV, "true");
        if ctx.env_var(AUTOLOAD_ENV).is_none() {
            env.set(AUTOLOAD_ENV, "true");
        }
        if req.mutate_process_env {
            apply_process_markers(ctx);
        }
        compiler = Some(compiler_path);
    }

    if req.declarations || manifest.devbin.declarations == Some(true) {
        run_typings_helper(ctx).await?;
    }

    for revert in manifest.security_reverts() {
        env.append_node_options(&format!("--security-revert={revert}"));
    }

    if req.inspect {
        env.append_node_options("--inspect");
    }
    if req.inspect_brk {
        env.append_node_options("--inspect-brk");
    }
    let timeout_disabled = req.inspect || req.inspect_brk || ctx.env_var(IDE_DEBUG_ENV).is_some();

    Ok(ResolvedRuntime {
        typescript,
        compiler,
        env,
        timeout_disabled,
    })
}

/// The one sanctioned mutation of the parent's live environment: the two
/// markers are also visible to in-process consumers, everything else
/// travels in the overlay.
fn apply_process_markers(ctx: &InvocationContext) {
    // SAFETY: called from the command layer before any child is spawned
    // and before the commands read the environment again; the markers are
    // additive string values.
    unsafe {
        std::env::set_var(TYPESCRIPT_ENV, "true");
        if ctx.env_var(AUTOLOAD_ENV).is_none() {
            std::env::set_var(AUTOLOAD_ENV, "true");
        }
    }
}

/// Typings generation is a blocking prerequisite: it runs to completion
/// before the main command, but its own exit code is reported rather
/// than propagated.
async fn run_typings_helper(ctx: &InvocationContext) -> Result<()> {
    let helper = resolve_bin(
        TYPINGS_HELPER_BIN,
        &[ctx.base().to_path_buf(), ctx.tool_dir().to_path_buf()],
    )?;
    debug!(helper = %helper.display(), "generating typings");
    let status = Command::new(&helper)
        .current_dir(ctx.base())
        .status()
        .await?;
    if !status.success() {
        warn!(
            helper = %helper.display(),
            code = ?status.code(),
            "typings generation failed"
        );
    }
    Ok(())
}
