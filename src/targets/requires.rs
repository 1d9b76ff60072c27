// src/targets/requires.rs

//! Auxiliary `--require` module collection.

use tracing::debug;

use crate::context::InvocationContext;
use crate::manifest::{PackageManifest, ProjectKind};
use crate::resolve::resolve_module;

/// Module the runner preloads to register the mocking library.
const MOCK_REGISTER: &str = "devbin-mock/register";

/// Collect the modules the runner must preload: explicit flags first,
/// then manifest declarations, then the best-effort mock
/// auto-registration for application projects.
pub fn collect_requires(
    ctx: &InvocationContext,
    manifest: &PackageManifest,
    explicit: &[String],
) -> Vec<String> {
    let mut requires: Vec<String> = explicit.to_vec();
    requires.extend(manifest.tool_requires());

    // Frameworks and plugins test against their own harness; only
    // applications get the mock registration by default.
    if manifest.kind() == ProjectKind::Application {
        match resolve_module(MOCK_REGISTER, &[ctx.base().to_path_buf()]) {
            Ok(path) => {
                debug!(module = %path.display(), "auto registering mock library");
                requires.push(path.display().to_string());
            }
            Err(err) => {
                debug!(error = %err, "mock library not available, skipping auto registration");
            }
        }
    }

    requires
}
