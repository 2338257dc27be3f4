//! The two managed dependencies and the detect-or-acquire resolver

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::host::Host;

/// A tool the installer manages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    BuildGenerator,
    CrossCompiler,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::BuildGenerator => "CMake",
            Tool::CrossCompiler => "PropGCC",
        }
    }

    /// Executable probed on the search path
    pub fn binary(&self) -> &'static str {
        match self {
            Tool::BuildGenerator => "cmake",
            Tool::CrossCompiler => "propeller-elf-gcc",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tool::BuildGenerator => "Generates the makefiles for PropWare and its examples",
            Tool::CrossCompiler => "GCC toolchain targeting the Parallax Propeller",
        }
    }
}

/// Where a dependency is downloaded from and how its archive is laid out.
///
/// `root_dir_name` must match the archive's top-level directory exactly; every
/// path derived after extraction hangs off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencySource {
    pub url: &'static str,
    pub root_dir_name: &'static str,
    pub bin_subdir: &'static str,
    /// Expected SHA-256 of the archive, hex encoded
    pub sha256: Option<&'static str>,
}

/// Final location of a dependency, detected or freshly installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLocation {
    pub root: PathBuf,
    pub bin_dir: PathBuf,
}

/// One managed dependency and its resolution state
#[derive(Debug, Clone)]
pub struct Dependency {
    pub tool: Tool,
    pub source: DependencySource,
    /// Directory the archive is extracted into when a download is needed
    pub parent: PathBuf,
    /// Binary found on the search path before anything was installed
    pub existing_binary: Option<PathBuf>,
    /// Only fresh installs are added to PATH
    pub add_to_path: bool,
    pub location: Option<InstallLocation>,
}

impl Dependency {
    pub fn new(
        tool: Tool,
        source: DependencySource,
        parent: PathBuf,
        existing_binary: Option<PathBuf>,
    ) -> Self {
        let add_to_path = existing_binary.is_none();
        Self {
            tool,
            source,
            parent,
            existing_binary,
            add_to_path,
            location: None,
        }
    }

    pub fn location(&self) -> Result<&InstallLocation> {
        self.location
            .as_ref()
            .with_context(|| format!("{} has not been resolved yet", self.tool.name()))
    }

    /// Root the archive unpacks to under `parent`
    pub fn fresh_root(&self) -> PathBuf {
        self.parent.join(self.source.root_dir_name)
    }
}

/// Install root implied by a binary found on the search path (`<root>/bin/<tool>`)
pub fn root_from_binary(binary: &Path) -> PathBuf {
    let bin_dir = binary.parent().unwrap_or_else(|| Path::new(""));
    match bin_dir.parent() {
        Some(root) => root.to_path_buf(),
        None => bin_dir.join(".."),
    }
}

/// Use an existing installation if one was detected, otherwise download and extract
pub fn resolve(dep: &mut Dependency, host: &mut Host) -> Result<()> {
    if let Some(ref binary) = dep.existing_binary {
        let location = InstallLocation {
            root: root_from_binary(binary),
            bin_dir: binary
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        log::info!(
            "{} found at {}, using install root {}",
            dep.tool.name(),
            binary.display(),
            location.root.display()
        );
        dep.location = Some(location);
        return Ok(());
    }

    acquire(dep, host)
}

/// Download, verify and extract a dependency into its parent directory
pub fn acquire(dep: &mut Dependency, host: &mut Host) -> Result<()> {
    match std::fs::create_dir_all(&dep.parent) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to create {}", dep.parent.display()))
        }
    }

    let archive = host
        .downloader
        .download(dep.source.url, &std::env::temp_dir())
        .with_context(|| format!("Failed to download {}", dep.tool.name()))?;

    match dep.source.sha256 {
        Some(expected) => {
            if let Err(e) = verify_sha256(&archive, expected) {
                let _ = std::fs::remove_file(&archive);
                return Err(e);
            }
        }
        None => log::warn!(
            "{} archive {} has no published checksum; extracting unverified",
            dep.tool.name(),
            archive.display()
        ),
    }

    host.extractor
        .extract(&archive, &dep.parent)
        .with_context(|| format!("Failed to extract {}", dep.tool.name()))?;
    if let Err(e) = std::fs::remove_file(&archive) {
        log::debug!("Could not remove {}: {}", archive.display(), e);
    }

    let root = dep.fresh_root();
    let bin_dir = root.join(dep.source.bin_subdir);
    println!("{} installed to {}", dep.tool.name(), root.display());

    dep.location = Some(InstallLocation { root, bin_dir });
    dep.add_to_path = true;
    Ok(())
}

/// Hex SHA-256 of a file
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(hex::encode(hasher.finalize()))
}

pub fn verify_sha256(path: &Path, expected: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        bail!(
            "Checksum mismatch for {}: expected {}, got {}",
            path.display(),
            expected,
            actual
        );
    }
    log::debug!("Checksum verified for {}", path.display());
    Ok(())
}
