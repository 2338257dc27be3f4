//! Debian-like Linux (Debian, Ubuntu, Mint)
//!
//! On top of the Unix base this variant installs make through apt-get, adds
//! the 32-bit C library PropGCC's binaries link against on 64-bit hosts, puts
//! the user in the group that owns the serial ports, and writes the toolchain
//! variables to `/etc/environment`.

use anyhow::Result;
use regex::Regex;
use std::path::Path;

use super::{unix, PlatformInstaller, MAKE};
use crate::deps;
use crate::host::{CommandSpec, Host};
use crate::plan::{InstallationPlan, PROPGCC_PREFIX, PROPWARE_PATH};
use crate::platform::{PlatformProfile, LINUX_PROFILE};

/// Group owning the serial devices used to program the board
pub const SERIAL_GROUP: &str = "dialout";

const SYSTEM_ENVIRONMENT_FILE: &str = "/etc/environment";

lazy_static::lazy_static! {
    static ref LIBC6_I386: Regex = Regex::new(r".*libc6(:|-)i386.*").unwrap();
}

#[derive(Debug, Default)]
pub struct DebianInstaller;

impl DebianInstaller {
    pub fn new() -> Self {
        Self
    }

    /// Whether a `dpkg-query -l` listing lacks any 32-bit libc6 package
    pub fn needs_libc6(package_list: &str) -> bool {
        !package_list.lines().any(|line| LIBC6_I386.is_match(line))
    }

    fn install_32bit_libc(&self, host: &mut Host) {
        let listing = match host
            .commands
            .query(&CommandSpec::new("dpkg-query").args(["-l", "libc6*"]))
        {
            Ok(listing) => listing,
            Err(e) => {
                log::warn!("Could not query installed packages: {:#}", e);
                String::new()
            }
        };

        if !Self::needs_libc6(&listing) {
            log::debug!("32-bit C libraries already installed");
            return;
        }

        let add_arch = CommandSpec::new("sudo").args(["dpkg", "--add-architecture", "i386"]);
        if !host.commands.run(&add_arch) {
            eprintln!("WARNING: Failed to enable the i386 architecture");
        }
        let install = CommandSpec::new("sudo").args(["apt-get", "install", "libc6:i386"]);
        if !host.commands.run(&install) {
            eprintln!("WARNING: Failed to install libc6:i386; PropGCC may not run on this system");
        }
    }

    fn join_serial_group(&self, host: &mut Host) {
        let Some(user) = host.env.var("USER") else {
            log::warn!("USER is not set; not checking {} membership", SERIAL_GROUP);
            return;
        };
        let Some(members) = host.env.group_members(SERIAL_GROUP) else {
            log::debug!("No {} group on this system", SERIAL_GROUP);
            return;
        };
        if members.iter().any(|m| m == &user) {
            return;
        }

        let cmd =
            CommandSpec::new("sudo").args(["usermod", "-a", "-G", SERIAL_GROUP, user.as_str()]);
        if host.commands.run(&cmd) {
            println!(
                "Added {} to the {} group. Log out and back in for it to take effect.",
                user, SERIAL_GROUP
            );
        } else {
            eprintln!(
                "WARNING: Could not add {} to the {} group; programming the board may require root.",
                user, SERIAL_GROUP
            );
        }
    }

    fn persist_system_variables(&self, plan: &InstallationPlan, host: &mut Host) -> Result<()> {
        let compiler_root = plan.compiler.location()?.root.display().to_string();
        let project_root = plan.project_root().display().to_string();

        let missing: Vec<(&str, String)> = [
            (PROPGCC_PREFIX, compiler_root),
            (PROPWARE_PATH, project_root),
        ]
        .into_iter()
        .filter(|(name, _)| host.env.var(name).is_none())
        .collect();
        if missing.is_empty() {
            return Ok(());
        }

        if !plan.system_env_consent {
            println!(
                "You have selected to configure the following environment variables for yourself:"
            );
            for (name, value) in &missing {
                println!("\tPlease set {} to \"{}\"", name, value);
            }
            return Ok(());
        }

        // the line travels on stdin so no shell ever sees the value
        for (name, value) in &missing {
            let cmd = CommandSpec::new("sudo")
                .args(["tee", "-a", SYSTEM_ENVIRONMENT_FILE])
                .stdin(format!("{}={}\n", name, value));
            if !host.commands.run(&cmd) {
                eprintln!(
                    "WARNING: Failed to write {} to {}; please set it to \"{}\" yourself.",
                    name, SYSTEM_ENVIRONMENT_FILE, value
                );
            }
        }
        Ok(())
    }
}

impl PlatformInstaller for DebianInstaller {
    fn profile(&self) -> &'static PlatformProfile {
        &LINUX_PROFILE
    }

    fn asks_system_env_consent(&self) -> bool {
        true
    }

    fn warn_missing_make(&self) {
        eprintln!(
            "WARNING: Make was not detected on your system. You can install it by executing \"sudo apt-get install make\"."
        );
    }

    fn check_for_make(&self, plan: &mut InstallationPlan, host: &mut Host) {
        if host.env.find_executable(MAKE).is_none() {
            host.commands
                .run(&CommandSpec::new("sudo").args(["apt-get", "install", MAKE]));
        }

        // re-probe after the install attempt
        plan.make_available = host.env.find_executable(MAKE).is_some();
        if !plan.make_available {
            self.warn_missing_make();
        }
    }

    fn confirm_dependencies(&self, plan: &mut InstallationPlan, host: &mut Host) -> Result<()> {
        self.check_for_make(plan, host);
        deps::resolve(&mut plan.generator, host)?;
        deps::resolve(&mut plan.compiler, host)?;

        if host.env.is_64_bit() {
            self.install_32bit_libc(host);
        }
        self.join_serial_group(host);
        Ok(())
    }

    fn elevated_copy(&self, src: &Path, dst: &Path, host: &mut Host) -> bool {
        unix::sudo_copy(src, dst, host)
    }

    fn configure_environment(&self, plan: &InstallationPlan, host: &mut Host) -> Result<()> {
        unix::persist_path(plan, host)?;
        self.persist_system_variables(plan, host)
    }
}
