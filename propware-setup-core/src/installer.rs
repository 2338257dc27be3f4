//! The installation sequence and the per-platform hooks it calls.
//!
//! `run_install` always walks the same five steps: confirm dependencies, copy
//! support files, set environment variables, import sources, build. Each
//! variant overrides the steps where its platform differs.

use anyhow::{Context, Result};
use std::io;
use std::path::Path;

use crate::deps;
use crate::host::{CommandSpec, Host};
use crate::plan::{BuildOutcome, InstallationPlan, PROPGCC_PREFIX, PROPWARE_PATH};
use crate::platform::PlatformProfile;
use crate::support_files;

mod debian;
mod macos;
mod unix;
mod windows;

pub use debian::DebianInstaller;
pub use macos::MacInstaller;
pub use unix::{detect_shell, Shell};
pub use windows::WindowsInstaller;

/// Build tool probed on the search path
pub const MAKE: &str = "make";

/// Behavior of one platform variant
pub trait PlatformInstaller {
    fn profile(&self) -> &'static PlatformProfile;

    /// Whether the prompt phase should ask to write variables system wide
    fn asks_system_env_consent(&self) -> bool {
        false
    }

    fn warn_missing_make(&self);

    fn check_for_make(&self, plan: &mut InstallationPlan, host: &mut Host) {
        plan.make_available = host.env.find_executable(MAKE).is_some();
        if !plan.make_available {
            self.warn_missing_make();
        }
    }

    /// Step 1: make sure the build tool, generator and compiler are available
    fn confirm_dependencies(&self, plan: &mut InstallationPlan, host: &mut Host) -> Result<()> {
        self.check_for_make(plan, host);
        deps::resolve(&mut plan.generator, host)?;
        deps::resolve(&mut plan.compiler, host)?;
        Ok(())
    }

    /// Step 2: copy support files into the generator, escalating on permission errors
    fn copy_generator_files(&self, plan: &mut InstallationPlan, host: &mut Host) -> Result<()> {
        let src = plan.support_files_dir();
        let dst = support_files::modules_dir(&plan.generator.location()?.root);

        let outcome = support_files::copy_support_files(&src, &dst);
        plan.generator_configured = settle_copy(self, outcome, &src, &dst, host);
        Ok(())
    }

    /// Copy `src` into `dst` with elevated rights; returns whether it worked
    fn elevated_copy(&self, src: &Path, dst: &Path, host: &mut Host) -> bool;

    /// Step 3: persist PATH additions and the toolchain variables
    fn configure_environment(&self, plan: &InstallationPlan, host: &mut Host) -> Result<()>;

    /// Step 5: run the generator, then the build tool, in the project root
    fn build_binaries(&self, plan: &InstallationPlan, host: &mut Host) -> Result<BuildOutcome> {
        build_with_make(self.profile(), plan, host)
    }
}

/// Turn the result of the unprivileged copy into the "generator configured" flag
pub fn settle_copy<P: PlatformInstaller + ?Sized>(
    installer: &P,
    outcome: io::Result<usize>,
    src: &Path,
    dst: &Path,
    host: &mut Host,
) -> bool {
    match outcome {
        Ok(count) => {
            log::info!("Copied {} support files into {}", count, dst.display());
            true
        }
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            log::info!("{} is write-protected, escalating", dst.display());
            let copied = installer.elevated_copy(src, dst, host);
            if !copied {
                eprintln!("WARNING: {}", manual_copy_instructions(src, dst));
            }
            copied
        }
        Err(e) => {
            eprintln!(
                "WARNING: Failed to copy support files from {} into {}: {}",
                src.display(),
                dst.display(),
                e
            );
            false
        }
    }
}

/// The single message shown when no variant could copy the support files
pub fn manual_copy_instructions(src: &Path, dst: &Path) -> String {
    format!(
        "Support files were not copied. Copy the contents of {} into {} before building, or use a CMake installed in a writable directory.",
        src.display(),
        dst.display()
    )
}

/// Generator then build tool with the toolchain variables set for both
pub fn build_with_make(
    profile: &PlatformProfile,
    plan: &InstallationPlan,
    host: &mut Host,
) -> Result<BuildOutcome> {
    let root = plan.project_root();
    let compiler_root = plan.compiler.location()?.root.clone();
    let generator_bin = plan
        .generator
        .location()?
        .bin_dir
        .join(format!("cmake{}", profile.exe_suffix));

    let with_env = |cmd: CommandSpec| {
        cmd.current_dir(root)
            .env(PROPGCC_PREFIX, compiler_root.to_string_lossy())
            .env(PROPWARE_PATH, root.to_string_lossy())
    };

    let generate = with_env(
        CommandSpec::new(generator_bin.to_string_lossy()).args(["-G", "Unix Makefiles", "."]),
    );
    if !host.commands.run(&generate) {
        eprintln!("WARNING: CMake failed; skipping make.");
        return Ok(BuildOutcome::GeneratorFailed);
    }

    if !host.commands.run(&with_env(CommandSpec::new(MAKE))) {
        eprintln!("WARNING: Building PropWare failed. See the output above.");
        return Ok(BuildOutcome::BuildFailed);
    }

    Ok(BuildOutcome::Built)
}

/// Manual instructions for variables this platform cannot persist itself
pub(crate) fn print_variable_instructions(plan: &InstallationPlan, host: &Host) -> Result<()> {
    let compiler_root = &plan.compiler.location()?.root;
    let values = [
        (PROPGCC_PREFIX, compiler_root.as_path()),
        (PROPWARE_PATH, plan.project_root()),
    ];

    let missing: Vec<_> = values
        .iter()
        .filter(|(name, _)| host.env.var(name).is_none())
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    println!("Please configure the following environment variables for your user:");
    for (name, value) in missing {
        println!("\tPlease set {} to \"{}\"", name, value.display());
    }
    Ok(())
}

/// Run every step in order. Only a failure to obtain a dependency aborts;
/// the build runs only when both readiness flags hold.
pub fn run_install<P: PlatformInstaller + ?Sized>(
    installer: &P,
    plan: &mut InstallationPlan,
    host: &mut Host,
) -> Result<BuildOutcome> {
    println!("\n==================================================");
    println!("  PropWare Setup ({})", installer.profile().name);
    println!("==================================================\n");

    installer
        .confirm_dependencies(plan, host)
        .context("Failed to confirm dependencies")?;

    if let Err(e) = installer.copy_generator_files(plan, host) {
        eprintln!("WARNING: {:#}", e);
        plan.generator_configured = false;
    }

    if let Err(e) = installer.configure_environment(plan, host) {
        eprintln!("WARNING: Failed to configure environment variables: {:#}", e);
    }

    import_sources(plan, host);

    if plan.skip_build {
        println!("Skipping build as requested.");
        return Ok(BuildOutcome::Skipped);
    }
    if !plan.ready_to_build() {
        println!("Skipping the initial build: the build tool or CMake support files are not ready.");
        return Ok(BuildOutcome::Skipped);
    }

    installer.build_binaries(plan, host)
}

/// Step 4: fetch third-party sources unless already present
fn import_sources(plan: &InstallationPlan, host: &mut Host) {
    let downloads = plan.downloads_dir();
    if plan.skip_import || downloads.exists() {
        log::debug!("Skipping source import for {}", downloads.display());
        return;
    }

    if let Err(e) = host.importer.import_all(&downloads) {
        eprintln!("WARNING: Failed to import third-party sources: {:#}", e);
    }
}
