//! Windows variant. There is no privilege escalation path: write-protected
//! CMake installs get manual copy instructions, and environment variables are
//! reported for the user to set.

use anyhow::Result;
use std::path::Path;

use super::{print_variable_instructions, PlatformInstaller};
use crate::host::Host;
use crate::plan::InstallationPlan;
use crate::platform::{PlatformProfile, WINDOWS_PROFILE};

#[derive(Debug, Default)]
pub struct WindowsInstaller;

impl WindowsInstaller {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformInstaller for WindowsInstaller {
    fn profile(&self) -> &'static PlatformProfile {
        &WINDOWS_PROFILE
    }

    fn warn_missing_make(&self) {
        eprintln!(
            "WARNING: Make was not detected on your system. Make is packaged with PropGCC so be sure to add PropGCC's bin folder to your system's PATH environment variable."
        );
    }

    /// No escalation path; the caller prints the manual copy instructions
    fn elevated_copy(&self, _src: &Path, dst: &Path, _host: &mut Host) -> bool {
        log::info!("{} is write-protected and cannot be elevated on Windows", dst.display());
        false
    }

    fn configure_environment(&self, plan: &InstallationPlan, host: &mut Host) -> Result<()> {
        let mut bin_dirs = Vec::new();
        for dep in [&plan.generator, &plan.compiler] {
            if dep.add_to_path {
                bin_dirs.push(dep.location()?.bin_dir.clone());
            }
        }
        if !bin_dirs.is_empty() {
            println!("Please add the following folders to your PATH environment variable:");
            for dir in &bin_dirs {
                println!("\t{}", dir.display());
            }
        }

        print_variable_instructions(plan, host)
    }
}
