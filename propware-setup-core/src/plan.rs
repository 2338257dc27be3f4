//! Mutable state threaded through one installation run

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::deps::{Dependency, Tool};
use crate::host::Environment;
use crate::platform::PlatformProfile;
use crate::prompt::InstallChoices;

/// Variable naming the cross-compiler root
pub const PROPGCC_PREFIX: &str = "PROPGCC_PREFIX";
/// Variable naming the project root
pub const PROPWARE_PATH: &str = "PROPWARE_PATH";

/// Directory of build-system support files inside the project
pub const SUPPORT_FILES_DIR: &str = "CMakeModules";
/// Directory the source importer populates inside the project
pub const DOWNLOADS_DIR: &str = "downloads";

/// What was already on the machine before anything was changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub generator: Option<PathBuf>,
    pub compiler: Option<PathBuf>,
    pub missing_vars: Vec<&'static str>,
}

impl Detection {
    pub fn probe(env: &dyn Environment) -> Self {
        let missing_vars = [PROPGCC_PREFIX, PROPWARE_PATH]
            .into_iter()
            .filter(|name| env.var(name).is_none())
            .collect();

        Self {
            generator: env.find_executable(Tool::BuildGenerator.binary()),
            compiler: env.find_executable(Tool::CrossCompiler.binary()),
            missing_vars,
        }
    }
}

/// Result of the final build step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Built,
    GeneratorFailed,
    BuildFailed,
    /// Build tool missing, support files not in place, or disabled by the user
    Skipped,
}

#[derive(Debug, Clone)]
pub struct InstallationPlan {
    project_root: PathBuf,
    pub generator: Dependency,
    pub compiler: Dependency,
    pub make_available: bool,
    pub generator_configured: bool,
    pub system_env_consent: bool,
    pub skip_import: bool,
    pub skip_build: bool,
}

impl InstallationPlan {
    pub fn new(
        project_root: PathBuf,
        profile: &PlatformProfile,
        detection: Detection,
        choices: InstallChoices,
    ) -> Self {
        Self {
            project_root,
            generator: Dependency::new(
                Tool::BuildGenerator,
                profile.generator,
                choices.generator_parent,
                detection.generator,
            ),
            compiler: Dependency::new(
                Tool::CrossCompiler,
                profile.compiler,
                choices.compiler_parent,
                detection.compiler,
            ),
            make_available: false,
            generator_configured: false,
            system_env_consent: choices.system_env_consent,
            skip_import: false,
            skip_build: false,
        }
    }

    /// Fixed for the lifetime of the run
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn support_files_dir(&self) -> PathBuf {
        self.project_root.join(SUPPORT_FILES_DIR)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.project_root.join(DOWNLOADS_DIR)
    }

    /// Both readiness flags must hold before the build may run
    pub fn ready_to_build(&self) -> bool {
        self.make_available && self.generator_configured
    }
}

/// Find the project root from `start`: the directory itself when it holds
/// the support files, else its parent (setup is traditionally run from `util/`).
pub fn locate_project_root(start: &Path) -> Result<PathBuf> {
    let start = start
        .canonicalize()
        .with_context(|| format!("Cannot access {}", start.display()))?;

    for candidate in std::iter::once(start.as_path()).chain(start.parent()) {
        if candidate.join(SUPPORT_FILES_DIR).is_dir() {
            return Ok(candidate.to_path_buf());
        }
    }

    bail!(
        "{} is not inside a PropWare checkout: no {} directory found here or in the parent directory. \
         Run from the PropWare root or its util directory, or pass --root.",
        start.display(),
        SUPPORT_FILES_DIR
    )
}
