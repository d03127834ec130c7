//! Toolchain runtime verification.
//!
//! Probes the interpreter, then each required package, then the schema file,
//! in order. The first missing piece is reported; nothing is ever installed.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::{debug, instrument, warn};
use xtumlgen_core::{
    application::{ApplicationError, ports::PreconditionChecker},
    domain::Toolchain,
    error::CodegenResult,
};

/// [`PreconditionChecker`] for a Python-hosted toolchain.
#[derive(Debug, Clone)]
pub struct PythonEnvironment {
    interpreter: OsString,
    packages: Vec<String>,
    schema: Option<PathBuf>,
}

impl PythonEnvironment {
    pub fn new<I, S>(interpreter: impl AsRef<OsStr>, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            interpreter: interpreter.as_ref().to_os_string(),
            packages: packages.into_iter().map(Into::into).collect(),
            schema: None,
        }
    }

    /// Check exactly what `toolchain` will need, its schema included.
    pub fn for_toolchain(toolchain: &Toolchain) -> Self {
        Self::new(&toolchain.interpreter, toolchain.required_packages.clone())
            .schema(&toolchain.schema)
    }

    /// Also require `path` to be an existing file.
    pub fn schema(mut self, path: impl Into<PathBuf>) -> Self {
        self.schema = Some(path.into());
        self
    }

    fn interpreter_name(&self) -> String {
        self.interpreter.to_string_lossy().into_owned()
    }

    /// Run the interpreter silently; `true` only on exit status 0.
    fn probe<I, S>(&self, args: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Command::new(&self.interpreter)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}

impl PreconditionChecker for PythonEnvironment {
    #[instrument(skip_all, fields(interpreter = %self.interpreter_name()))]
    fn check(&self) -> CodegenResult<()> {
        if !self.probe(["--version"]) {
            warn!("Interpreter not found");
            return Err(ApplicationError::InterpreterMissing {
                interpreter: self.interpreter_name(),
            }
            .into());
        }

        for package in &self.packages {
            if !self.probe(["-m", "pip", "show", package.as_str()]) {
                warn!(package = %package, "Required package not installed");
                return Err(ApplicationError::PackageMissing {
                    package: package.clone(),
                    install_hint: format!("pip install {}", package),
                }
                .into());
            }
            debug!(package = %package, "Package present");
        }

        if let Some(schema) = &self.schema {
            if !schema.is_file() {
                warn!(path = %schema.display(), "Schema file not found");
                return Err(ApplicationError::SchemaMissing {
                    path: schema.clone(),
                }
                .into());
            }
        }

        Ok(())
    }
}
