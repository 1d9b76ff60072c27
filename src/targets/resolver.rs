// src/targets/resolver.rs

//! Turns explicit arguments, environment overrides, version-control
//! diffs and directory globbing into one deterministic file list.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use anyhow::Context as _;
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::context::InvocationContext;
use crate::errors::Result;
use crate::targets::changed;

/// Directory subtrees never considered test targets.
const STANDING_EXCLUSIONS: &[&str] = &["test/fixtures", "test/node_modules"];

/// Directories never worth descending into while expanding globs.
const SKIP_DIRS: &[&str] = &[".git", "node_modules"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// The resolved file list: unique, sorted, setup file first.
    Files(Vec<String>),
    /// The pattern tier matched nothing on disk. A configuration
    /// outcome, not a failure.
    NoTestFiles { patterns: Vec<String> },
    /// `--changed` was requested and the diff holds no test files.
    /// Resolution stops here; it never falls through to the glob tier.
    NoChangedTestFiles,
}

/// Resolve the target file list for a test run.
///
/// Precedence, first non-empty tier wins: explicit arguments, the
/// changed-files diff, the `TESTS` environment override, the default
/// recursive glob. Whatever the tier, the result is intersected with
/// the standing exclusions, expanded against the filesystem and sorted.
pub async fn resolve_targets(
    ctx: &InvocationContext,
    explicit: &[String],
    use_changed: bool,
    ext: &str,
) -> Result<TargetOutcome> {
    let patterns = if !explicit.is_empty() {
        split_comma_patterns(explicit)
    } else if use_changed {
        let files = changed::changed_test_files(ctx.base(), ext).await?;
        if files.is_empty() {
            return Ok(TargetOutcome::NoChangedTestFiles);
        }
        debug!(?files, "changed test files");
        files
    } else if let Some(env_list) = ctx.env_var("TESTS") {
        env_list
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        vec![format!("test/**/*.test.{ext}")]
    };

    let mut files = expand_patterns(ctx.base(), &patterns)?;
    if files.is_empty() {
        return Ok(TargetOutcome::NoTestFiles { patterns });
    }

    // The conventionally named setup file always runs first, glob order
    // aside.
    let setup = format!("test/.setup.{ext}");
    if ctx.base().join(&setup).is_file() {
        files.retain(|file| file != &setup);
        files.insert(0, setup);
    }

    Ok(TargetOutcome::Files(files))
}

/// Expand patterns against the filesystem under `root`, drop the
/// standing exclusions, and return unique relative paths in
/// lexicographic order (forward slashes).
pub fn expand_patterns(root: &Path, patterns: &[String]) -> Result<Vec<String>> {
    let include = build_globset(patterns)?;
    let exclude = build_exclusion_set()?;

    let mut matches = BTreeSet::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(rel) = relative_str(root, &path) else {
                continue;
            };
            if exclude.is_match(&rel) {
                continue;
            }
            if path.is_dir() {
                if !skip_dir(&path) {
                    stack.push(path);
                }
            } else if path.is_file() && include.is_match(&rel) {
                matches.insert(rel);
            }
        }
    }

    Ok(matches.into_iter().collect())
}

fn split_comma_patterns(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob =
            Glob::new(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;
        builder.add(glob);
    }
    Ok(builder.build().context("building test-file globset")?)
}

/// The standing exclusions cover both the directory itself and its
/// whole subtree.
fn build_exclusion_set() -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for dir in STANDING_EXCLUSIONS {
        builder.add(Glob::new(dir).with_context(|| format!("invalid exclusion: {dir}"))?);
        let subtree = format!("{dir}/**");
        builder.add(Glob::new(&subtree).with_context(|| format!("invalid exclusion: {subtree}"))?);
    }
    Ok(builder.build().context("building exclusion globset")?)
}

fn skip_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| SKIP_DIRS.contains(&name))
}

fn relative_str(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}
