use clap::Parser;
use std::path::PathBuf;

use propware_setup_core::SetupConfig;

/// Installs CMake and PropGCC for PropWare, configures the environment and
/// runs a first build
#[derive(Parser, Debug)]
#[command(name = "propware-setup")]
#[command(author = "David Zemon")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bootstraps a PropWare development environment", long_about = None)]
pub struct Args {
    /// Directory to install PropGCC into when it is not already installed
    #[arg(short = 'p', long = "propgcc-path", value_name = "DIR")]
    pub propgcc_path: Option<PathBuf>,

    /// Directory to install CMake into when it is not already installed
    #[arg(short = 'c', long = "cmake-path", value_name = "DIR")]
    pub cmake_path: Option<PathBuf>,

    /// PropWare checkout (defaults to the current directory or its parent)
    #[arg(long = "root", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Accept every default without prompting
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// Skip the initial build of PropWare
    #[arg(long = "no-build")]
    pub no_build: bool,

    /// Skip downloading libpropeller and the Simple libraries
    #[arg(long = "no-import")]
    pub no_import: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Report toolchain status without installing anything
    #[arg(long = "check")]
    pub check: bool,
}

impl Args {
    pub fn to_config(&self) -> SetupConfig {
        SetupConfig {
            compiler_parent: self.propgcc_path.clone(),
            generator_parent: self.cmake_path.clone(),
            project_root: self.root.clone(),
            assume_yes: self.yes,
            skip_build: self.no_build,
            skip_import: self.no_import,
        }
    }
}

/// Parses command-line arguments
pub fn parse_args() -> Args {
    Args::parse()
}
