#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::{Map, Value, json};
use tempfile::TempDir;

use devbin::context::InvocationContext;

/// Builder for on-disk fixture projects used by the integration tests.
///
/// Writes a `package.json`, optional `tsconfig.json`, test files and
/// fake `node_modules` entries into a temp directory.
pub struct ProjectBuilder {
    manifest: Map<String, Value>,
    files: Vec<(String, String)>,
    tsconfig: bool,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            manifest: Map::new(),
            files: Vec::new(),
            tsconfig: false,
        }
    }

    /// Set an arbitrary top-level manifest field.
    pub fn manifest_field(mut self, key: &str, value: Value) -> Self {
        self.manifest.insert(key.to_string(), value);
        self
    }

    /// Set the `devbin` configuration block.
    pub fn tool_section(self, value: Value) -> Self {
        self.manifest_field("devbin", value)
    }

    pub fn dependency(mut self, name: &str) -> Self {
        let deps = self
            .manifest
            .entry("dependencies")
            .or_insert_with(|| json!({}));
        deps.as_object_mut()
            .expect("dependencies must be an object")
            .insert(name.to_string(), json!("*"));
        self
    }

    pub fn dev_dependency(mut self, name: &str) -> Self {
        let deps = self
            .manifest
            .entry("devDependencies")
            .or_insert_with(|| json!({}));
        deps.as_object_mut()
            .expect("devDependencies must be an object")
            .insert(name.to_string(), json!("*"));
        self
    }

    pub fn esm(self) -> Self {
        self.manifest_field("type", json!("module"))
    }

    pub fn tsconfig(mut self) -> Self {
        self.tsconfig = true;
        self
    }

    pub fn file(mut self, rel: &str, contents: &str) -> Self {
        self.files.push((rel.to_string(), contents.to_string()));
        self
    }

    /// A file under `test/`.
    pub fn test_file(self, rel: &str) -> Self {
        let path = format!("test/{rel}");
        self.file(&path, "// fixture test\n")
    }

    /// Fake installed package: `node_modules/<name>/index.js`.
    pub fn module(self, name: &str) -> Self {
        let path = format!("node_modules/{name}/index.js");
        self.file(&path, "module.exports = {};\n")
    }

    /// Fake module entry file under `node_modules/`, e.g.
    /// `mocha/bin/_mocha` or `ts-node/register.js`.
    pub fn module_file(self, rel: &str) -> Self {
        let path = format!("node_modules/{rel}");
        self.file(&path, "#!/usr/bin/env node\n")
    }

    pub fn build(self) -> TestProject {
        let dir = TempDir::new().expect("creating fixture dir");
        if !self.manifest.is_empty() {
            let manifest = Value::Object(self.manifest);
            let pretty =
                serde_json::to_string_pretty(&manifest).expect("serializing fixture manifest");
            fs::write(dir.path().join("package.json"), pretty).expect("writing package.json");
        }
        if self.tsconfig {
            fs::write(dir.path().join("tsconfig.json"), "{}\n").expect("writing tsconfig.json");
        }
        for (rel, contents) in &self.files {
            let path = dir.path().join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("creating fixture parents");
            }
            fs::write(&path, contents).expect("writing fixture file");
        }
        TestProject { dir }
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built fixture project; the directory is removed on drop.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// An invocation context rooted here with an empty env snapshot and
    /// the project itself as the tool dir (so tool-dir module searches
    /// also hit the fixture's `node_modules`).
    pub fn context(&self) -> InvocationContext {
        self.context_with_env(&[])
    }

    pub fn context_with_env(&self, vars: &[(&str, &str)]) -> InvocationContext {
        let env = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        InvocationContext::new(
            self.path().to_path_buf(),
            env,
            self.path().to_path_buf(),
        )
    }
}
