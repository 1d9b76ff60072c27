// src/targets/changed.rs

//! Changed-files mode: the version-control diff restricted to the test
//! directory.

use std::path::Path;

use anyhow::{Context as _, anyhow};
use tokio::process::Command;

use crate::errors::Result;

/// Changed files under `test/` that look like test files for `ext`.
///
/// Deleted entries may still be reported here; the later filesystem
/// expansion drops anything that no longer exists.
pub async fn changed_test_files(base: &Path, ext: &str) -> Result<Vec<String>> {
    let output = Command::new("git")
        .args(["status", "--porcelain", "--", "test"])
        .current_dir(base)
        .output()
        .await
        .context("running git status for --changed")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("git status failed: {}", stderr.trim()).into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(filter_changed_paths(stdout.lines(), ext))
}

/// Pure filter over porcelain status lines: keep `*.test.<ext>` entries,
/// resolve renames to their new path, normalize separators to `/`.
pub fn filter_changed_paths<'a>(lines: impl Iterator<Item = &'a str>, ext: &str) -> Vec<String> {
    let suffix = format!(".test.{ext}");
    let mut files = Vec::new();
    for line in lines {
        if line.len() < 4 {
            continue;
        }
        // Porcelain v1: two status columns, a space, then the path.
        let entry = line[3..].trim();
        // Renames read "old -> new"; the new path is the one on disk.
        let path = match entry.split_once(" -> ") {
            Some((_, new)) => new,
            None => entry,
        };
        let path = path.trim_matches('"').replace('\\', "/");
        if path.ends_with(&suffix) {
            files.push(path);
        }
    }
    files.sort();
    files
}
