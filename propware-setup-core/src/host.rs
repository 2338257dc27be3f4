//! Capabilities the installer needs from the machine it runs on.
//!
//! Every side effect the orchestrator performs outside the project tree goes
//! through one of these traits, so an installation can be driven against
//! fakes in tests and against the real machine from the CLI.

use anyhow::Result;
use std::path::{Path, PathBuf};

pub mod extract;
pub mod importer;
pub mod logger;
pub mod system;
pub mod transfer;

/// Process environment, search path and user-level persistence targets
pub trait Environment {
    /// Read an environment variable of the running process
    fn var(&self, key: &str) -> Option<String>;

    /// Home directory of the invoking user
    fn home_dir(&self) -> Option<PathBuf>;

    /// Locate an executable on the search path
    fn find_executable(&self, name: &str) -> Option<PathBuf>;

    /// Whether the host runs a 64-bit operating system
    fn is_64_bit(&self) -> bool;

    /// Members of a named system group, `None` if the group does not exist
    fn group_members(&self, group: &str) -> Option<Vec<String>>;

    /// Append a line to a persistence target such as a shell startup file
    fn append_line(&mut self, target: &Path, line: &str) -> Result<()>;
}

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    /// Text written to the program's standard input
    pub stdin: Option<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            stdin: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Shell-like rendering used when echoing a command to the user
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Runs external programs, blocking until they finish
pub trait CommandRunner {
    /// Run with inherited stdio and report whether it exited successfully.
    /// A program that cannot be spawned counts as a failure.
    fn run(&mut self, command: &CommandSpec) -> bool;

    /// Run a query and capture its standard output
    fn query(&mut self, command: &CommandSpec) -> Result<String>;
}

/// Fetches a remote file into a local directory
pub trait Downloader {
    /// Returns the path of the downloaded file
    fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf>;
}

/// Unpacks an archive in place
pub trait Extractor {
    /// Format is inferred from the archive's file name
    fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()>;
}

/// Populates the project's third-party source directory
pub trait SourceImporter {
    fn import_all(&self, downloads_dir: &Path) -> Result<()>;
}

/// All capabilities handed to one installation run
pub struct Host<'a> {
    pub env: &'a mut dyn Environment,
    pub commands: &'a mut dyn CommandRunner,
    pub downloader: &'a dyn Downloader,
    pub extractor: &'a dyn Extractor,
    pub importer: &'a dyn SourceImporter,
}
