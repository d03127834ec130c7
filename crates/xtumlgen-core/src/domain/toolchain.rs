//! External toolchain invocation contracts.
//!
//! The toolchain is opaque: the orchestrator only builds argument vectors
//! and reacts to the exit status.
//!
//! ```text
//! stage 1: <interpreter> -m bridgepoint.prebuild -o <workspace>/<output> <model>...
//! stage 2: <interpreter> -m rsl.gen_erate -nopersist -import <schema>
//!              -import <workspace>/<output> -arch <archetype>...
//! ```

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::options::StdioPlan;

pub const DEFAULT_INTERPRETER: &str = "python";
pub const MODEL_SUFFIX: &str = ".xtuml";
pub const REQUIRED_PACKAGES: [&str; 2] = ["pyxtuml", "pyrsl"];

/// The two pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prebuild,
    Generate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prebuild => write!(f, "pre-build"),
            Self::Generate => write!(f, "code generation"),
        }
    }
}

/// Where the toolchain lives and how each stage is entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub interpreter: OsString,
    /// Arguments selecting the stage-1 program, before `-o`.
    pub prebuild_entry: Vec<OsString>,
    /// Arguments selecting the stage-2 program, before `-nopersist`.
    pub generate_entry: Vec<OsString>,
    /// Schema artifact shipped with the orchestrator, always imported first.
    pub schema: PathBuf,
    /// Files below a source-model directory are tracked only with this suffix.
    pub model_suffix: String,
    /// Packages the interpreter must be able to import.
    pub required_packages: Vec<String>,
}

impl Toolchain {
    /// The BridgePoint prebuilder plus the RSL generator, run by `python`.
    pub fn bridgepoint(schema: impl Into<PathBuf>) -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.into(),
            prebuild_entry: vec!["-m".into(), "bridgepoint.prebuild".into()],
            generate_entry: vec!["-m".into(), "rsl.gen_erate".into()],
            schema: schema.into(),
            model_suffix: MODEL_SUFFIX.to_string(),
            required_packages: REQUIRED_PACKAGES.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Whether a discovered file counts as a source model.
    pub fn is_model(&self, path: &Path) -> bool {
        path.as_os_str()
            .to_string_lossy()
            .ends_with(self.model_suffix.as_str())
    }

    /// Stage 1: compile the source models into `artifact`.
    pub fn prebuild(&self, artifact: &Path, models: &[PathBuf], stdio: StdioPlan) -> Invocation {
        let mut invocation = Invocation::new(&self.interpreter, stdio)
            .args(&self.prebuild_entry)
            .arg("-o")
            .arg(artifact);
        for model in models {
            invocation = invocation.arg(model);
        }
        invocation
    }

    /// Stage 2: run every archetype against the schema and `artifact`.
    pub fn generate(
        &self,
        artifact: &Path,
        archetypes: &[PathBuf],
        stdio: StdioPlan,
    ) -> Invocation {
        let mut invocation = Invocation::new(&self.interpreter, stdio)
            .args(&self.generate_entry)
            .arg("-nopersist")
            .arg("-import")
            .arg(&self.schema)
            .arg("-import")
            .arg(artifact);
        for archetype in archetypes {
            invocation = invocation.arg("-arch").arg(archetype);
        }
        invocation
    }
}

/// A fully specified external process launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub stdio: StdioPlan,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>, stdio: StdioPlan) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            stdio,
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}
