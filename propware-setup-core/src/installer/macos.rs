//! macOS variant. Same Unix base; the toolchain variables are not persisted
//! automatically yet, so the user is told what to set.

use anyhow::Result;
use std::path::Path;

use super::{print_variable_instructions, unix, PlatformInstaller};
use crate::host::Host;
use crate::plan::InstallationPlan;
use crate::platform::{PlatformProfile, MAC_PROFILE};

#[derive(Debug, Default)]
pub struct MacInstaller;

impl MacInstaller {
    pub fn new() -> Self {
        Self
    }
}

impl PlatformInstaller for MacInstaller {
    fn profile(&self) -> &'static PlatformProfile {
        &MAC_PROFILE
    }

    fn warn_missing_make(&self) {
        eprintln!(
            "WARNING: Make was not detected on your system. You can install it by following these instructions:\n\thttp://stackoverflow.com/a/6767528"
        );
    }

    fn elevated_copy(&self, src: &Path, dst: &Path, host: &mut Host) -> bool {
        unix::sudo_copy(src, dst, host)
    }

    fn configure_environment(&self, plan: &InstallationPlan, host: &mut Host) -> Result<()> {
        unix::persist_path(plan, host)?;
        // TODO: write PROPGCC_PREFIX and PROPWARE_PATH to a launchd plist instead of asking
        print_variable_instructions(plan, host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deps::InstallLocation;
    use crate::host::Environment;
    use crate::plan::Detection;
    use crate::prompt::InstallChoices;
    use crate::testing::TestHost;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_configure_environment_only_touches_shell_profile() {
        let temp_dir = TempDir::new().unwrap();
        let mut test_host = TestHost::new(temp_dir.path());
        test_host.env.set_var("SHELL", "/bin/zsh");
        let home = test_host.env.home_dir().unwrap();

        let mut plan = InstallationPlan::new(
            PathBuf::from("/Users/dev/PropWare"),
            &MAC_PROFILE,
            Detection {
                generator: Some(PathBuf::from("/usr/local/bin/cmake")),
                compiler: None,
                missing_vars: vec![],
            },
            InstallChoices {
                generator_parent: home.clone(),
                compiler_parent: home.clone(),
                system_env_consent: true,
            },
        );
        let propgcc = home.join("propgcc");
        plan.compiler.location = Some(InstallLocation {
            bin_dir: propgcc.join("bin"),
            root: propgcc.clone(),
        });

        MacInstaller::new()
            .configure_environment(&plan, &mut test_host.host())
            .unwrap();

        assert_eq!(test_host.env.appended.len(), 1);
        assert_eq!(test_host.env.appended[0].0, home.join(".zshrc"));
        assert!(test_host.commands.runs.is_empty());
    }

    #[test]
    fn test_mac_generator_bin_is_inside_app_bundle() {
        assert_eq!(MAC_PROFILE.generator.bin_subdir, "CMake.app/Contents/bin");
    }
}
