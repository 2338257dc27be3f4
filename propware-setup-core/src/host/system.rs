//! Production implementations of the host capabilities

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use super::logger::InstallLogger;
use super::{CommandRunner, CommandSpec, Environment};

/// The real process environment and filesystem
#[derive(Debug, Default)]
pub struct SystemEnvironment;

impl SystemEnvironment {
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }

    /// Judged from the running kernel, not the architecture this binary targets
    #[cfg(unix)]
    fn is_64_bit(&self) -> bool {
        match nix::sys::utsname::uname() {
            Ok(info) => is_64_bit_machine(&info.machine().to_string_lossy()),
            Err(e) => {
                log::warn!("uname failed: {}", e);
                false
            }
        }
    }

    #[cfg(not(unix))]
    fn is_64_bit(&self) -> bool {
        // a 32-bit process on 64-bit Windows sees the native architecture here
        let arch = std::env::var("PROCESSOR_ARCHITEW6432")
            .or_else(|_| std::env::var("PROCESSOR_ARCHITECTURE"))
            .unwrap_or_default();
        matches!(arch.as_str(), "AMD64" | "ARM64" | "IA64")
    }

    #[cfg(unix)]
    fn group_members(&self, group: &str) -> Option<Vec<String>> {
        match nix::unistd::Group::from_name(group) {
            Ok(found) => found.map(|g| g.mem),
            Err(e) => {
                log::warn!("Failed to look up group {}: {}", group, e);
                None
            }
        }
    }

    #[cfg(not(unix))]
    fn group_members(&self, _group: &str) -> Option<Vec<String>> {
        None
    }

    fn append_line(&mut self, target: &Path, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(target)
            .with_context(|| format!("Failed to open {} for appending", target.display()))?;

        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write to {}", target.display()))?;
        Ok(())
    }
}

/// Whether a `uname -m` machine name denotes a 64-bit architecture
pub fn is_64_bit_machine(machine: &str) -> bool {
    matches!(
        machine,
        "x86_64" | "amd64" | "aarch64" | "arm64" | "ppc64" | "ppc64le" | "mips64" | "riscv64"
            | "s390x" | "sparc64" | "loongarch64"
    )
}

/// Spawns real processes and mirrors them into the install transcript
pub struct SystemCommands {
    logger: Option<InstallLogger>,
}

impl SystemCommands {
    pub fn new(logger: Option<InstallLogger>) -> Self {
        Self { logger }
    }

    fn build(command: &CommandSpec) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        if let Some(ref cwd) = command.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &command.env {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run with inherited output, feeding `stdin` when the command carries input
    fn execute(command: &CommandSpec) -> std::io::Result<ExitStatus> {
        let mut cmd = Self::build(command);
        let Some(ref input) = command.stdin else {
            return cmd.status();
        };

        let mut child = cmd.stdin(Stdio::piped()).spawn()?;
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(input.as_bytes())?;
        }
        child.wait()
    }

    pub fn logger(&self) -> Option<&InstallLogger> {
        self.logger.as_ref()
    }
}

impl CommandRunner for SystemCommands {
    fn run(&mut self, command: &CommandSpec) -> bool {
        println!("{}", command.display());
        if let Some(ref logger) = self.logger {
            logger.info(&format!("run: {}", command.display()));
        }

        match Self::execute(command) {
            Ok(status) => {
                if let Some(ref logger) = self.logger {
                    if status.success() {
                        logger.info(&format!("exit: {}", status));
                    } else {
                        logger.warn(&format!("{} failed: {}", command.program, status));
                    }
                }
                status.success()
            }
            Err(e) => {
                log::warn!("Failed to execute {}: {}", command.program, e);
                if let Some(ref logger) = self.logger {
                    logger.error(&format!("spawn failed: {}", e));
                }
                false
            }
        }
    }

    fn query(&mut self, command: &CommandSpec) -> Result<String> {
        log::debug!("query: {}", command.display());

        let output = Self::build(command)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute {}", command.display()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if let Some(ref logger) = self.logger {
            logger.info(&format!("query: {}", command.display()));
            logger.log_stdout(&stdout);
            logger.log_stderr(&String::from_utf8_lossy(&output.stderr));
        }

        Ok(stdout)
    }
}
