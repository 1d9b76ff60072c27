// src/runtime/probes.rs

//! The language-variant decision cascade.
//!
//! Each source is a pure probe returning an optional decision; the
//! resolver folds the ordered list and takes the first defined result,
//! which keeps the precedence explicit and each probe testable on its
//! own.

use tracing::debug;

use crate::manifest::PackageManifest;

/// Where a TypeScript decision came from; earlier sources always win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsSource {
    CliFlag,
    LegacyCliFlag,
    EnvVar,
    ManifestField,
    ManifestDependency,
    TsConfig,
    CompilerOverride,
    CommandDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TsDecision {
    pub enabled: bool,
    pub source: TsSource,
}

/// Inputs to the cascade, assembled by the command layer.
#[derive(Debug, Clone)]
pub struct TsProbeInput<'a> {
    /// `--typescript` / `--no-typescript`.
    pub cli_flag: Option<bool>,
    /// The deprecated `--ts true|false` form.
    pub legacy_flag: Option<&'a str>,
    /// The `DEVBIN_TYPESCRIPT` process environment value.
    pub env_value: Option<&'a str>,
    pub manifest: &'a PackageManifest,
    /// `tsconfig.json` present at the project root.
    pub has_tsconfig: bool,
    /// A compiler override was given; its mere presence implies TypeScript.
    pub compiler_override: bool,
    /// What the command itself defaults to when nothing matched.
    pub command_default: Option<bool>,
}

type Probe = fn(&TsProbeInput<'_>) -> Option<TsDecision>;

const PROBES: &[(&str, Probe)] = &[
    ("cli-flag", probe_cli_flag),
    ("legacy-cli-flag", probe_legacy_flag),
    ("env-var", probe_env_var),
    ("manifest-field", probe_manifest_field),
    ("manifest-dependency", probe_manifest_dependency),
    ("tsconfig", probe_tsconfig),
    ("compiler-override", probe_compiler_override),
    ("command-default", probe_command_default),
];

/// Fold the probe list; the first probe with an opinion wins.
pub fn resolve_typescript(input: &TsProbeInput<'_>) -> TsDecision {
    for (name, probe) in PROBES {
        if let Some(decision) = probe(input) {
            debug!(
                probe = name,
                enabled = decision.enabled,
                "typescript decision"
            );
            return decision;
        }
        debug!(probe = name, "typescript probe passed");
    }
    TsDecision {
        enabled: false,
        source: TsSource::CommandDefault,
    }
}

fn probe_cli_flag(input: &TsProbeInput<'_>) -> Option<TsDecision> {
    input.cli_flag.map(|enabled| TsDecision {
        enabled,
        source: TsSource::CliFlag,
    })
}

fn probe_legacy_flag(input: &TsProbeInput<'_>) -> Option<TsDecision> {
    match parse_bool_str(input.legacy_flag) {
        Some(enabled) => Some(TsDecision {
            enabled,
            source: TsSource::LegacyCliFlag,
        }),
        None => {
            if let Some(other) = input.legacy_flag {
                debug!(value = other, "ignoring unrecognized --ts value");
            }
            None
        }
    }
}

fn probe_env_var(input: &TsProbeInput<'_>) -> Option<TsDecision> {
    match parse_bool_str(input.env_value) {
        Some(enabled) => Some(TsDecision {
            enabled,
            source: TsSource::EnvVar,
        }),
        None => {
            if let Some(other) = input.env_value {
                debug!(value = other, "ignoring unrecognized typescript env toggle");
            }
            None
        }
    }
}

fn probe_manifest_field(input: &TsProbeInput<'_>) -> Option<TsDecision> {
    input.manifest.devbin.typescript.map(|enabled| TsDecision {
        enabled,
        source: TsSource::ManifestField,
    })
}

fn probe_manifest_dependency(input: &TsProbeInput<'_>) -> Option<TsDecision> {
    input
        .manifest
        .has_dependency("typescript")
        .then_some(TsDecision {
            enabled: true,
            source: TsSource::ManifestDependency,
        })
}

fn probe_tsconfig(input: &TsProbeInput<'_>) -> Option<TsDecision> {
    input.has_tsconfig.then_some(TsDecision {
        enabled: true,
        source: TsSource::TsConfig,
    })
}

fn probe_compiler_override(input: &TsProbeInput<'_>) -> Option<TsDecision> {
    input.compiler_override.then_some(TsDecision {
        enabled: true,
        source: TsSource::CompilerOverride,
    })
}

fn probe_command_default(input: &TsProbeInput<'_>) -> Option<TsDecision> {
    input.command_default.map(|enabled| TsDecision {
        enabled,
        source: TsSource::CommandDefault,
    })
}

/// Only the exact strings "true" and "false" are recognized.
fn parse_bool_str(value: Option<&str>) -> Option<bool> {
    match value {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}
