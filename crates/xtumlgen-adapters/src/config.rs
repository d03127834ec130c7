//! Option loading.
//!
//! # Resolution order (highest priority first)
//!
//! 1. Environment variables prefixed `XTUMLGEN_` (lists comma-separated)
//! 2. Config file (`xtumlgen.toml` in the project root, or an explicit path)
//! 3. Built-in defaults ([`CodegenOptions::default`])
//!
//! Keys are `quiet`, `gen_workspace`, `prebuild_output`, `source_models` and
//! `archetypes`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use tracing::debug;
use xtumlgen_core::{
    domain::{CodegenOptions, OptionsOverrides},
    error::{CodegenError, CodegenResult},
};

pub const DEFAULT_CONFIG_FILE: &str = "xtumlgen.toml";
pub const ENV_PREFIX: &str = "XTUMLGEN";

const LIST_KEYS: [&str; 2] = ["source_models", "archetypes"];

/// Layered loader for [`CodegenOptions`].
#[derive(Debug, Clone)]
pub struct OptionsLoader {
    file: Option<(PathBuf, bool)>,
    env_prefix: String,
    env_vars: Option<HashMap<String, String>>,
}

impl Default for OptionsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl OptionsLoader {
    /// Defaults plus the process environment, no file.
    pub fn new() -> Self {
        Self {
            file: None,
            env_prefix: ENV_PREFIX.to_string(),
            env_vars: None,
        }
    }

    /// Also read `xtumlgen.toml` from `project_root` when it exists.
    pub fn for_project(project_root: &Path) -> Self {
        Self {
            file: Some((project_root.join(DEFAULT_CONFIG_FILE), false)),
            ..Self::new()
        }
    }

    /// Read `path`, which must exist. The format follows the extension.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some((path.into(), true));
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Read variables from `vars` instead of the process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// The merged user overrides, not yet applied to the defaults.
    pub fn load_overrides(&self) -> CodegenResult<OptionsOverrides> {
        let mut builder = Config::builder();

        if let Some((path, required)) = &self.file {
            debug!(path = %path.display(), required, "Adding config file");
            builder = builder.add_source(File::from(path.as_path()).required(*required));
        }

        let mut environment = Environment::with_prefix(&self.env_prefix)
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            environment = environment.with_list_parse_key(key);
        }
        builder = builder.add_source(environment.source(self.env_vars.clone()));

        builder
            .build()
            .and_then(|config| config.try_deserialize::<OptionsOverrides>())
            .map_err(|e| CodegenError::Configuration {
                message: e.to_string(),
            })
    }

    /// Defaults merged with every layer, then validated.
    pub fn load(&self) -> CodegenResult<CodegenOptions> {
        let overrides = self.load_overrides()?;
        let options = CodegenOptions::from_overrides(overrides)?;
        debug!(?options, "Options loaded");
        Ok(options)
    }
}
