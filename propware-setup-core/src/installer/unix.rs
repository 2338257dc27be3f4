//! Behavior shared by the Unix-like variants: `sudo` copies and PATH exports
//! appended to the user's shell startup file

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::host::{CommandSpec, Environment, Host};
use crate::plan::InstallationPlan;

/// Interactive shells whose startup file the installer knows how to extend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shell {
    Bash,
    Zsh,
    Unknown(String),
}

impl Shell {
    /// Startup file read by interactive shells of this kind
    pub fn startup_file(&self, home: &Path) -> Option<PathBuf> {
        match self {
            Shell::Bash => Some(home.join(".bashrc")),
            Shell::Zsh => Some(home.join(".zshrc")),
            Shell::Unknown(_) => None,
        }
    }
}

/// Classify the user's login shell from `$SHELL`
pub fn detect_shell(env: &dyn Environment) -> Shell {
    let shell = env.var("SHELL").unwrap_or_default();
    match shell.rsplit('/').next().unwrap_or("") {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        _ => Shell::Unknown(shell),
    }
}

/// Quoted, install paths may contain spaces
pub fn path_export_line(bin_dir: &Path) -> String {
    format!("\nexport PATH=\"{}:$PATH\"", bin_dir.display())
}

/// Copy `src` into `dst` through `sudo cp`
pub fn sudo_copy(src: &Path, dst: &Path, host: &mut Host) -> bool {
    println!(
        "Your CMake installation directory is write-protected. Please provide root level permissions \
         (normally, your standard system password) to copy necessary files into CMake."
    );

    let cmd = CommandSpec::new("sudo").args([
        "cp".to_string(),
        "-r".to_string(),
        format!("{}/.", src.display()),
        dst.display().to_string(),
    ]);
    host.commands.run(&cmd)
}

/// Append a PATH export for every freshly installed dependency.
/// Unknown shells get manual instructions and nothing is written.
pub fn persist_path(plan: &InstallationPlan, host: &mut Host) -> Result<()> {
    let mut bin_dirs = Vec::new();
    for dep in [&plan.generator, &plan.compiler] {
        if dep.add_to_path {
            bin_dirs.push(dep.location()?.bin_dir.clone());
        }
    }
    if bin_dirs.is_empty() {
        log::debug!("Nothing to add to PATH");
        return Ok(());
    }

    let shell = detect_shell(&*host.env);
    let target = host
        .env
        .home_dir()
        .and_then(|home| shell.startup_file(&home));
    let Some(target) = target else {
        log::info!("Not modifying startup files for shell {:?}", shell);
        let dirs: Vec<String> = bin_dirs
            .iter()
            .map(|d| format!("'{}'", d.display()))
            .collect();
        println!(
            "Unknown shell is used. It is recommended that you add {} to the PATH variable for your user's environment.",
            dirs.join(" and ")
        );
        return Ok(());
    };

    for bin_dir in &bin_dirs {
        let line = path_export_line(bin_dir);
        println!("Adding {} to PATH in {}", bin_dir.display(), target.display());
        host.env.append_line(&target, &line)?;
    }
    Ok(())
}
