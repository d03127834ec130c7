//! Code generation options.
//!
//! [`CodegenOptions`] is built once, when the orchestrator is constructed,
//! and never changes afterwards. Hosts supply an [`OptionsOverrides`] record
//! which is merged over [`CodegenOptions::default`] one key at a time.

use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::error::DomainError;

pub const DEFAULT_GEN_WORKSPACE: &str = ".codegen";
pub const DEFAULT_PREBUILD_OUTPUT: &str = "out.sql";

/// Resolved, validated options for one orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    pub quiet: QuietLevel,
    /// Directory holding the intermediate artifact, relative to the project
    /// root unless absolute.
    pub gen_workspace: PathBuf,
    /// File name of the stage-1 artifact inside `gen_workspace`.
    pub prebuild_output: String,
    /// Files or directories handed to stage 1, in order.
    pub source_models: Vec<PathBuf>,
    /// Archetype templates handed to stage 2, in order.
    pub archetypes: Vec<PathBuf>,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            quiet: QuietLevel::default(),
            gen_workspace: PathBuf::from(DEFAULT_GEN_WORKSPACE),
            prebuild_output: DEFAULT_PREBUILD_OUTPUT.to_string(),
            source_models: Vec::new(),
            archetypes: Vec::new(),
        }
    }
}

impl CodegenOptions {
    /// Apply user overrides on top of `self`.
    ///
    /// The merge is shallow: every key present in `overrides` replaces the
    /// current value outright. Lists are replaced, never concatenated.
    pub fn merge(mut self, overrides: OptionsOverrides) -> Self {
        if let Some(quiet) = overrides.quiet {
            self.quiet = quiet;
        }
        if let Some(workspace) = overrides.gen_workspace {
            self.gen_workspace = workspace;
        }
        if let Some(output) = overrides.prebuild_output {
            self.prebuild_output = output;
        }
        if let Some(models) = overrides.source_models {
            self.source_models = models;
        }
        if let Some(archetypes) = overrides.archetypes {
            self.archetypes = archetypes;
        }
        self
    }

    /// Defaults merged with `overrides`, then validated.
    pub fn from_overrides(overrides: OptionsOverrides) -> Result<Self, DomainError> {
        let options = Self::default().merge(overrides);
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.gen_workspace.as_os_str().is_empty() {
            return Err(DomainError::EmptyField {
                field: "gen_workspace",
            });
        }

        if self.prebuild_output.is_empty() {
            return Err(DomainError::EmptyField {
                field: "prebuild_output",
            });
        }

        let is_bare_name = !self.prebuild_output.contains(['/', '\\'])
            && self.prebuild_output != "."
            && self.prebuild_output != "..";
        if !is_bare_name {
            return Err(DomainError::NotAFileName {
                field: "prebuild_output",
                value: self.prebuild_output.clone(),
            });
        }

        for (field, paths) in [
            ("source_models", &self.source_models),
            ("archetypes", &self.archetypes),
        ] {
            if let Some(index) = paths.iter().position(|p| p.as_os_str().is_empty()) {
                return Err(DomainError::EmptyPathEntry { field, index });
            }
        }

        Ok(())
    }
}

/// User-supplied options. Every key is optional.
///
/// Accepts both `snake_case` keys and the camelCase spellings
/// (`genWorkspace`, `prebuildOutput`, `sourceModels`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OptionsOverrides {
    pub quiet: Option<QuietLevel>,
    #[serde(alias = "genWorkspace")]
    pub gen_workspace: Option<PathBuf>,
    #[serde(alias = "prebuildOutput")]
    pub prebuild_output: Option<String>,
    #[serde(alias = "sourceModels")]
    pub source_models: Option<Vec<PathBuf>>,
    pub archetypes: Option<Vec<PathBuf>>,
}

/// How much toolchain output reaches the host's terminal.
///
/// | Level | stdout   | stderr   |
/// |-------|----------|----------|
/// | 0     | inherit  | inherit  |
/// | 1     | inherit  | suppress |
/// | 2+    | suppress | suppress |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct QuietLevel(pub u8);

impl Default for QuietLevel {
    /// stderr is suppressed by default.
    fn default() -> Self {
        Self(1)
    }
}

impl QuietLevel {
    pub fn stdio(self) -> StdioPlan {
        StdioPlan {
            stdin: StreamMode::Suppress,
            stdout: if self.0 > 1 {
                StreamMode::Suppress
            } else {
                StreamMode::Inherit
            },
            stderr: if self.0 > 0 {
                StreamMode::Suppress
            } else {
                StreamMode::Inherit
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    /// Share the orchestrator's own stream.
    Inherit,
    /// Connect to the null device.
    Suppress,
}

/// Disposition of the three standard streams of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdioPlan {
    pub stdin: StreamMode,
    pub stdout: StreamMode,
    pub stderr: StreamMode,
}
