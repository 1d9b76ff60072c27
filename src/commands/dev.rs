// src/commands/dev.rs

//! `devbin dev`: start the dev server under supervision.

use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::debug;

use crate::cli::DevArgs;
use crate::context::InvocationContext;
use crate::errors::Result;
use crate::manifest::PackageManifest;
use crate::resolve::{file_url, resolve_module};
use crate::runtime::{RuntimeRequest, resolve_port, resolve_runtime};
use crate::supervisor::{ChildCommand, LaunchOptions, Supervisor};
use crate::targets::collect_requires;

const SERVER_SCRIPT: &str = "scripts/start-cluster.mjs";
const DEFAULT_FRAMEWORK: &str = "devbin-framework";

pub async fn run(ctx: &InvocationContext, supervisor: &Supervisor, args: &DevArgs) -> Result<()> {
    super::test::ensure_base_exists(ctx)?;

    let manifest = PackageManifest::load(ctx.base()).await;
    let mut runtime = resolve_runtime(
        ctx,
        &manifest,
        &RuntimeRequest {
            typescript_flag: args.common.typescript_flag(),
            legacy_ts_flag: args.common.ts_legacy.clone(),
            tscompiler: args.common.tscompiler.clone(),
            declarations: args.common.declarations,
            command_default_ts: None,
            mutate_process_env: true,
            ..Default::default()
        },
    )
    .await?;

    if ctx.env_var("NODE_ENV").is_none() {
        runtime.env.set("NODE_ENV", "development");
    }

    let framework = resolve_framework(ctx, &manifest, args.framework.as_deref())?;
    let port = resolve_port(ctx, args.port).await;

    let start_options = json!({
        "baseDir": ctx.base(),
        "workers": args.workers,
        "port": port,
        "framework": framework,
        "typescript": runtime.typescript.enabled,
        "tscompiler": args.common.tscompiler,
        "sticky": args.sticky,
    });
    debug!(%start_options, "dev server start options");

    // Requires are injected as exec argv so they load before the server
    // script itself.
    let mut exec_argv: Vec<String> = Vec::new();
    for module in collect_requires(ctx, &manifest, &args.common.require) {
        exec_argv.extend(format_import_module(&module, manifest.is_esm()));
    }

    let server = ctx.tool_dir().join(SERVER_SCRIPT);
    let cmd = ChildCommand::node(&exec_argv, &server, &[start_options.to_string()]);
    let options = LaunchOptions {
        cwd: ctx.base().to_path_buf(),
        env: runtime.env.merged(ctx.env()),
        dry_run: args.common.dry_run,
    };
    supervisor.launch(&cmd, &options).await
}

/// Framework precedence: the flag (path or package name), the manifest
/// field, then the default framework package.
fn resolve_framework(
    ctx: &InvocationContext,
    manifest: &PackageManifest,
    flag: Option<&str>,
) -> Result<PathBuf> {
    let spec = flag
        .map(str::to_string)
        .or_else(|| manifest.framework_name().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FRAMEWORK.to_string());
    resolve_module(&spec, &[ctx.base().to_path_buf()])
}

fn format_import_module(module: &str, esm: bool) -> Vec<String> {
    if esm {
        // --import wants file URLs for on-disk paths; bare specifiers
        // pass through for node to resolve.
        let target = if Path::new(module).is_absolute() {
            file_url(Path::new(module))
        } else {
            module.to_string()
        };
        vec!["--import".to_string(), target]
    } else {
        vec!["--require".to_string(), module.to_string()]
    }
}
