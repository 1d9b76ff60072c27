// src/runtime/env.rs

//! The environment overlay passed to the child process.

use std::collections::{BTreeMap, HashMap};

/// Variable carrying the accumulated runtime flags (interpreter options).
pub const NODE_OPTIONS: &str = "NODE_OPTIONS";

/// Environment assignments plus an ordered runtime-flags list.
///
/// Plain variables overwrite on merge; the runtime-flags variable only
/// ever accumulates, so loader injection, inspector flags and security
/// reverts coexist without clobbering one another.
#[derive(Debug, Clone, Default)]
pub struct RuntimeEnv {
    vars: BTreeMap<String, String>,
    node_options: Vec<String>,
}

impl RuntimeEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.vars.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Append a runtime flag; repeated appends of the same flag are
    /// ignored so resolution steps stay idempotent.
    pub fn append_node_options(&mut self, flag: &str) {
        if !self.node_options.iter().any(|existing| existing == flag) {
            self.node_options.push(flag.to_string());
        }
    }

    pub fn node_options(&self) -> &[String] {
        &self.node_options
    }

    pub fn vars(&self) -> &BTreeMap<String, String> {
        &self.vars
    }

    /// Merge into the inherited environment snapshot: the overlay wins
    /// per key, except the runtime-flags variable, which keeps the
    /// parent's value and appends the accumulated flags after it.
    pub fn merged(&self, parent: &HashMap<String, String>) -> HashMap<String, String> {
        let mut merged = parent.clone();
        for (key, value) in &self.vars {
            merged.insert(key.clone(), value.clone());
        }
        if !self.node_options.is_empty() {
            let joined = self.node_options.join(" ");
            let value = match parent.get(NODE_OPTIONS) {
                Some(existing) if !existing.trim().is_empty() => format!("{existing} {joined}"),
                _ => joined,
            };
            merged.insert(NODE_OPTIONS.to_string(), value);
        }
        merged
    }
}
