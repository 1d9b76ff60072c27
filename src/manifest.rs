// src/manifest.rs

//! The project manifest (`package.json`) as far as devbin cares about it.
//!
//! A missing or unparseable manifest degrades to the defaults; the
//! commands must work in a bare directory.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: Option<String>,

    /// `"module"` marks an ESM project; anything else is CommonJS.
    #[serde(rename = "type")]
    pub module_type: Option<String>,

    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,

    /// The `devbin` configuration block.
    pub devbin: ToolSection,

    /// Present on plugin packages; the value itself is not interpreted.
    pub devbin_plugin: Option<Value>,
}

/// `"devbin": { ... }` in the manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ToolSection {
    pub typescript: Option<bool>,
    pub declarations: Option<bool>,
    pub require: Option<StringOrList>,
    pub revert: Option<StringOrList>,

    /// For applications a string naming the framework package; `true`
    /// marks the package itself as a framework.
    pub framework: Option<Value>,
}

/// Manifest fields that accept both a single string and a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrList {
    One(String),
    Many(Vec<String>),
}

impl StringOrList {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            StringOrList::One(s) if !s.is_empty() => vec![s.clone()],
            StringOrList::One(_) => Vec::new(),
            StringOrList::Many(list) => list.clone(),
        }
    }
}

/// What kind of package the project root holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Application,
    Framework,
    Plugin,
}

impl PackageManifest {
    /// Read `<base>/package.json`; any failure yields the default
    /// manifest with a debug log, never an error.
    pub async fn load(base: &Path) -> Self {
        let path = base.join("package.json");
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "no readable package.json");
                return Self::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(manifest) => manifest,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "ignoring unparseable package.json");
                Self::default()
            }
        }
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependencies.contains_key(name) || self.dev_dependencies.contains_key(name)
    }

    pub fn is_esm(&self) -> bool {
        self.module_type.as_deref() == Some("module")
    }

    /// The framework package configured for an application, when the
    /// field carries a name rather than the framework marker.
    pub fn framework_name(&self) -> Option<&str> {
        self.devbin.framework.as_ref().and_then(Value::as_str)
    }

    pub fn kind(&self) -> ProjectKind {
        if self.devbin_plugin.is_some() {
            return ProjectKind::Plugin;
        }
        if self.devbin.framework.as_ref().and_then(Value::as_bool) == Some(true) {
            return ProjectKind::Framework;
        }
        ProjectKind::Application
    }

    pub fn tool_requires(&self) -> Vec<String> {
        self.devbin
            .require
            .as_ref()
            .map(StringOrList::to_vec)
            .unwrap_or_default()
    }

    pub fn security_reverts(&self) -> Vec<String> {
        self.devbin
            .revert
            .as_ref()
            .map(StringOrList::to_vec)
            .unwrap_or_default()
    }
}

/// Whether the project root carries a TypeScript configuration file.
pub async fn has_tsconfig(base: &Path) -> bool {
    tokio::fs::try_exists(base.join("tsconfig.json"))
        .await
        .unwrap_or(false)
}
