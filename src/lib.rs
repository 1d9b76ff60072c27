// src/lib.rs

pub mod cli;
pub mod commands;
pub mod context;
pub mod errors;
pub mod logging;
pub mod manifest;
pub mod resolve;
pub mod runtime;
pub mod supervisor;
pub mod targets;

use crate::cli::{Cli, Commands};
use crate::context::InvocationContext;
use crate::errors::Result;
use crate::supervisor::Supervisor;

/// High-level entry point used by `main.rs`.
///
/// Builds the immutable invocation context, dispatches to the chosen
/// command, and makes sure no child outlives the run.
pub async fn run(cli: Cli) -> Result<()> {
    let supervisor = Supervisor::new();

    let result = match &cli.command {
        Commands::Test(args) => {
            let ctx = InvocationContext::from_current_process(args.common.base.as_deref())?;
            commands::test::run(&ctx, &supervisor, args).await
        }
        Commands::Cov(args) => {
            let ctx = InvocationContext::from_current_process(args.test.common.base.as_deref())?;
            commands::cov::run(&ctx, &supervisor, args).await
        }
        Commands::Dev(args) => {
            let ctx = InvocationContext::from_current_process(args.common.base.as_deref())?;
            commands::dev::run(&ctx, &supervisor, args).await
        }
    };

    supervisor.shutdown();
    result
}
