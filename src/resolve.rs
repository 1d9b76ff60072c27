// src/resolve.rs

//! On-disk resolution of node modules and helper binaries.
//!
//! devbin never loads these modules itself; it only needs paths to hand
//! to the child process, so resolution is a plain ordered probe over
//! `node_modules` directories.

use std::path::{Path, PathBuf};

use crate::errors::{DevbinError, Result};

/// Resolve a module specifier against an ordered list of search roots.
///
/// Path-like specifiers (absolute, or starting with `.`) are resolved
/// against the first search root; bare specifiers are probed under each
/// root's `node_modules`. The first existing candidate wins.
pub fn resolve_module(specifier: &str, search_dirs: &[PathBuf]) -> Result<PathBuf> {
    if specifier.starts_with('/') || specifier.starts_with('.') {
        let base = if Path::new(specifier).is_absolute() {
            PathBuf::from(specifier)
        } else {
            match search_dirs.first() {
                Some(dir) => dir.join(specifier),
                None => PathBuf::from(specifier),
            }
        };
        if let Some(found) = find_entry(base) {
            return Ok(found);
        }
    } else {
        for dir in search_dirs {
            let base = dir.join("node_modules").join(specifier);
            if let Some(found) = find_entry(base) {
                return Ok(found);
            }
        }
    }

    Err(DevbinError::ModuleNotFound {
        specifier: specifier.to_string(),
        searched: search_dirs.to_vec(),
    })
}

/// Resolve an installed helper binary (`node_modules/.bin/<name>`).
pub fn resolve_bin(name: &str, search_dirs: &[PathBuf]) -> Result<PathBuf> {
    for dir in search_dirs {
        let candidate = dir.join("node_modules").join(".bin").join(name);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    Err(DevbinError::ModuleNotFound {
        specifier: name.to_string(),
        searched: search_dirs.to_vec(),
    })
}

/// `file://` form of a path, as module loaders expect for `--loader` and
/// `--import` arguments.
pub fn file_url(path: &Path) -> String {
    let p = path.to_string_lossy().replace('\\', "/");
    if p.starts_with('/') {
        format!("file://{p}")
    } else {
        format!("file:///{p}")
    }
}

/// Probe a candidate in the order node itself would find it: the exact
/// file, common extensions, then the package directory.
fn find_entry(base: PathBuf) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base);
    }
    for ext in ["js", "mjs", "cjs"] {
        let with_ext = PathBuf::from(format!("{}.{ext}", base.display()));
        if with_ext.is_file() {
            return Some(with_ext);
        }
    }
    if base.is_dir() {
        return Some(base);
    }
    None
}
