//! Host OS detection, per-platform download tables and the installer factory

use anyhow::{bail, Result};
use std::fmt;

use crate::deps::DependencySource;
use crate::installer::{DebianInstaller, MacInstaller, PlatformInstaller, WindowsInstaller};

/// Operating systems the installer distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatingSystem {
    Linux,
    MacOs,
    Windows,
    Unsupported(String),
}

impl OperatingSystem {
    /// Classify the OS this binary was built for
    pub fn detect() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(name: &str) -> Self {
        match name {
            "linux" => OperatingSystem::Linux,
            "macos" => OperatingSystem::MacOs,
            "windows" => OperatingSystem::Windows,
            other => OperatingSystem::Unsupported(other.to_string()),
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingSystem::Linux => write!(f, "Linux"),
            OperatingSystem::MacOs => write!(f, "macOS"),
            OperatingSystem::Windows => write!(f, "Windows"),
            OperatingSystem::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

/// Everything about a platform that is data rather than behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    pub name: &'static str,
    pub generator: DependencySource,
    pub compiler: DependencySource,
    /// Suffix of executables built for this platform
    pub exe_suffix: &'static str,
}

const PROPGCC_DIR_NAME: &str = "propgcc";

pub const LINUX_PROFILE: PlatformProfile = PlatformProfile {
    name: "Linux",
    generator: DependencySource {
        url: "http://www.cmake.org/files/v3.0/cmake-3.0.1-Linux-i386.tar.gz",
        root_dir_name: "cmake-3.0.1-Linux-i386",
        bin_subdir: "bin",
        sha256: None,
    },
    compiler: DependencySource {
        url: "http://david.zemon.name/downloads/PropGCC-linux_v1_0_0.tar.gz",
        root_dir_name: PROPGCC_DIR_NAME,
        bin_subdir: "bin",
        sha256: None,
    },
    exe_suffix: "",
};

pub const MAC_PROFILE: PlatformProfile = PlatformProfile {
    name: "macOS",
    generator: DependencySource {
        url: "http://www.cmake.org/files/v3.0/cmake-3.0.1-Darwin-universal.tar.gz",
        root_dir_name: "cmake-3.0.1-Darwin64-universal",
        // the Darwin archive unpacks to an application bundle
        bin_subdir: "CMake.app/Contents/bin",
        sha256: None,
    },
    compiler: DependencySource {
        url: "http://david.zemon.name/downloads/PropGCC-osx_10.6.8_v1_0_0.tar.gz",
        root_dir_name: PROPGCC_DIR_NAME,
        bin_subdir: "bin",
        sha256: None,
    },
    exe_suffix: "",
};

pub const WINDOWS_PROFILE: PlatformProfile = PlatformProfile {
    name: "Windows",
    generator: DependencySource {
        url: "http://www.cmake.org/files/v3.0/cmake-3.0.1-win32-x86.zip",
        root_dir_name: "cmake-3.0.1-win32-x86",
        bin_subdir: "bin",
        sha256: None,
    },
    compiler: DependencySource {
        url: "http://david.zemon.name/downloads/PropGCC-win_v1_0_0.zip",
        root_dir_name: PROPGCC_DIR_NAME,
        bin_subdir: "bin",
        sha256: None,
    },
    exe_suffix: ".exe",
};

/// Instantiate the installer variant for `os`.
///
/// There is no generic fallback: download URLs and archive layouts are
/// platform specific.
pub fn create_installer(os: &OperatingSystem) -> Result<Box<dyn PlatformInstaller>> {
    match os {
        OperatingSystem::Linux => Ok(Box::new(DebianInstaller::new())),
        OperatingSystem::MacOs => Ok(Box::new(MacInstaller::new())),
        OperatingSystem::Windows => Ok(Box::new(WindowsInstaller::new())),
        OperatingSystem::Unsupported(name) => bail!(
            "Your operating system ({}) is not supported. Supported systems are Debian-like Linux, macOS and Windows.",
            name
        ),
    }
}
