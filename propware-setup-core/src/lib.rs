use anyhow::{Context, Result};
use std::path::PathBuf;

// Internal modules (private)
mod deps;
mod installer;
mod plan;
mod platform;
mod prompt;
mod support_files;

pub mod host;

#[cfg(test)]
mod testing;

// Re-export public types
pub use deps::{Dependency, DependencySource, InstallLocation, Tool};
pub use host::{
    CommandRunner, CommandSpec, Downloader, Environment, Extractor, Host, SourceImporter,
};
pub use installer::{
    detect_shell, run_install, DebianInstaller, MacInstaller, PlatformInstaller, Shell,
    WindowsInstaller,
};
pub use plan::{
    locate_project_root, BuildOutcome, Detection, InstallationPlan, PROPGCC_PREFIX, PROPWARE_PATH,
};
pub use platform::{create_installer, OperatingSystem, PlatformProfile};
pub use prompt::{AcceptDefaults, InstallChoices, Prompter};

/// Options for one setup run
#[derive(Debug, Clone, Default)]
pub struct SetupConfig {
    /// Default parent directory for a PropGCC download (home directory when unset)
    pub compiler_parent: Option<PathBuf>,
    /// Default parent directory for a CMake download (home directory when unset)
    pub generator_parent: Option<PathBuf>,
    /// Directory to start the project root search from (current directory when unset)
    pub project_root: Option<PathBuf>,
    /// Accept every default without reading input
    pub assume_yes: bool,
    /// Stop after configuring the environment
    pub skip_build: bool,
    /// Do not fetch the third-party libraries
    pub skip_import: bool,
}

/// Detect what is installed and ask every question up front.
///
/// Nothing on disk is touched here: the returned plan is handed to
/// [`run_install`], which never prompts.
pub fn prepare_plan(
    config: &SetupConfig,
    installer: &dyn PlatformInstaller,
    env: &dyn Environment,
    prompter: &mut dyn Prompter,
) -> Result<InstallationPlan> {
    let start = match config.project_root {
        Some(ref dir) => dir.clone(),
        None => std::env::current_dir().context("Cannot determine the current directory")?,
    };
    let project_root = locate_project_root(&start)?;
    log::info!("PropWare root: {}", project_root.display());

    let detection = Detection::probe(env);
    let home = env.home_dir();
    let default_parent = |explicit: &Option<PathBuf>, tool: Tool| -> Result<PathBuf> {
        explicit
            .clone()
            .or_else(|| home.clone())
            .with_context(|| {
                format!(
                    "No home directory found; pass an install directory for {}",
                    tool.name()
                )
            })
    };

    let mut accept_defaults = AcceptDefaults;
    let prompter: &mut dyn Prompter = if config.assume_yes {
        &mut accept_defaults
    } else {
        prompter
    };

    let generator_parent = default_parent(&config.generator_parent, Tool::BuildGenerator)?;
    let generator_parent = if detection.generator.is_none() {
        prompt::prompt_for_directory(prompter, Tool::BuildGenerator, &generator_parent)?
    } else {
        generator_parent
    };

    let compiler_parent = default_parent(&config.compiler_parent, Tool::CrossCompiler)?;
    let compiler_parent = if detection.compiler.is_none() {
        prompt::prompt_for_directory(prompter, Tool::CrossCompiler, &compiler_parent)?
    } else {
        compiler_parent
    };

    let system_env_consent =
        if installer.asks_system_env_consent() && !detection.missing_vars.is_empty() {
            prompt::prompt_for_system_env(prompter)?
        } else {
            false
        };

    let choices = InstallChoices {
        generator_parent,
        compiler_parent,
        system_env_consent,
    };

    let mut plan = InstallationPlan::new(project_root, installer.profile(), detection, choices);
    plan.skip_build = config.skip_build;
    plan.skip_import = config.skip_import;
    Ok(plan)
}

/// Report which tools and variables are already in place.
/// Returns true when nothing needs to be installed or configured.
pub fn print_dependency_status(env: &dyn Environment) -> bool {
    println!("\n==================================================");
    println!("  PropWare Toolchain Status");
    println!("==================================================\n");

    let detection = Detection::probe(env);
    let tools = [
        (Tool::BuildGenerator, &detection.generator),
        (Tool::CrossCompiler, &detection.compiler),
    ];

    for (tool, found) in tools {
        match found {
            Some(path) => println!("✓ {} ({})", tool.name(), path.display()),
            None => println!("✗ {} (not found)", tool.name()),
        }
        println!("   {}", tool.description());
        println!();
    }

    let make = env.find_executable(installer::MAKE);
    match make {
        Some(ref path) => println!("✓ make ({})", path.display()),
        None => println!("✗ make (not found)"),
    }
    println!();

    for name in [PROPGCC_PREFIX, PROPWARE_PATH] {
        match env.var(name) {
            Some(value) => println!("✓ {}={}", name, value),
            None => println!("✗ {} is not set", name),
        }
    }

    println!("\n==================================================\n");

    let complete = detection.generator.is_some()
        && detection.compiler.is_some()
        && make.is_some()
        && detection.missing_vars.is_empty();
    if !complete {
        println!("Run 'propware-setup' to install and configure the missing pieces.\n");
    }
    complete
}
