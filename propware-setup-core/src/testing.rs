//! In-memory host capabilities for driving installations in unit tests

use anyhow::{bail, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::host::transfer::file_name_from_url;
use crate::host::{
    CommandRunner, CommandSpec, Downloader, Environment, Extractor, Host, SourceImporter,
};
use crate::prompt::Prompter;

pub struct FakeEnvironment {
    vars: HashMap<String, String>,
    home: Option<PathBuf>,
    executables: HashMap<String, PathBuf>,
    groups: HashMap<String, Vec<String>>,
    sixty_four_bit: bool,
    pub appended: Vec<(PathBuf, String)>,
}

impl FakeEnvironment {
    pub fn new(home: &Path) -> Self {
        Self {
            vars: HashMap::new(),
            home: Some(home.to_path_buf()),
            executables: HashMap::new(),
            groups: HashMap::new(),
            sixty_four_bit: false,
            appended: Vec::new(),
        }
    }

    pub fn set_var(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    pub fn add_executable(&mut self, name: &str, path: impl Into<PathBuf>) {
        self.executables.insert(name.to_string(), path.into());
    }

    pub fn add_group(&mut self, name: &str, members: &[&str]) {
        self.groups
            .insert(name.to_string(), members.iter().map(|m| m.to_string()).collect());
    }

    pub fn set_64_bit(&mut self, value: bool) {
        self.sixty_four_bit = value;
    }
}

impl Environment for FakeEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        self.executables.get(name).cloned()
    }

    fn is_64_bit(&self) -> bool {
        self.sixty_four_bit
    }

    fn group_members(&self, group: &str) -> Option<Vec<String>> {
        self.groups.get(group).cloned()
    }

    fn append_line(&mut self, target: &Path, line: &str) -> Result<()> {
        self.appended.push((target.to_path_buf(), line.to_string()));
        Ok(())
    }
}

/// Records every command; all succeed unless their rendering starts with a
/// registered failure prefix
#[derive(Default)]
pub struct RecordingCommands {
    pub runs: Vec<CommandSpec>,
    pub queries: Vec<CommandSpec>,
    failing: Vec<String>,
    query_output: HashMap<String, String>,
}

impl RecordingCommands {
    pub fn fail_when(&mut self, prefix: &str) {
        self.failing.push(prefix.to_string());
    }

    pub fn respond(&mut self, program: &str, stdout: &str) {
        self.query_output.insert(program.to_string(), stdout.to_string());
    }

    pub fn run_lines(&self) -> Vec<String> {
        self.runs.iter().map(CommandSpec::display).collect()
    }
}

impl CommandRunner for RecordingCommands {
    fn run(&mut self, command: &CommandSpec) -> bool {
        self.runs.push(command.clone());
        let line = command.display();
        !self.failing.iter().any(|prefix| line.starts_with(prefix))
    }

    fn query(&mut self, command: &CommandSpec) -> Result<String> {
        self.queries.push(command.clone());
        Ok(self
            .query_output
            .get(&command.program)
            .cloned()
            .unwrap_or_default())
    }
}

/// Records downloads; returns paths inside its own scratch directory
pub struct FakeDownloader {
    scratch: PathBuf,
    calls: RefCell<Vec<(String, PathBuf)>>,
    failure: Option<String>,
    contents: Option<Vec<u8>>,
}

impl FakeDownloader {
    pub fn new(scratch: &Path) -> Self {
        Self {
            scratch: scratch.to_path_buf(),
            calls: RefCell::new(Vec::new()),
            failure: None,
            contents: None,
        }
    }

    pub fn fail_with(&mut self, message: &str) {
        self.failure = Some(message.to_string());
    }

    /// Write `bytes` as the downloaded file instead of leaving it virtual
    pub fn write_contents(&mut self, bytes: &[u8]) {
        self.contents = Some(bytes.to_vec());
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.borrow().clone()
    }
}

impl Downloader for FakeDownloader {
    fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        self.calls
            .borrow_mut()
            .push((url.to_string(), dest_dir.to_path_buf()));
        if let Some(ref message) = self.failure {
            bail!("{}", message);
        }
        let path = self.scratch.join(file_name_from_url(url)?);
        if let Some(ref bytes) = self.contents {
            std::fs::write(&path, bytes)?;
        }
        Ok(path)
    }
}

/// Records extractions and creates a fixed set of directories under the destination
#[derive(Default)]
pub struct FakeExtractor {
    calls: RefCell<Vec<(PathBuf, PathBuf)>>,
    layout: Vec<PathBuf>,
}

impl FakeExtractor {
    pub fn with_layout(dirs: &[&str]) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            layout: dirs.iter().map(PathBuf::from).collect(),
        }
    }

    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.borrow().clone()
    }
}

impl Extractor for FakeExtractor {
    fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((archive.to_path_buf(), dest_dir.to_path_buf()));
        for dir in &self.layout {
            std::fs::create_dir_all(dest_dir.join(dir))?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeImporter {
    calls: RefCell<Vec<PathBuf>>,
}

impl FakeImporter {
    pub fn calls(&self) -> Vec<PathBuf> {
        self.calls.borrow().clone()
    }
}

impl SourceImporter for FakeImporter {
    fn import_all(&self, downloads_dir: &Path) -> Result<()> {
        self.calls.borrow_mut().push(downloads_dir.to_path_buf());
        std::fs::create_dir_all(downloads_dir)?;
        Ok(())
    }
}

/// Answers prompts from a script; an exhausted script answers with empty input
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Vec<String>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().rev().map(|a| a.to_string()).collect(),
            asked: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        Ok(self.answers.pop().unwrap_or_default())
    }
}

/// Bundle of fakes rooted in a scratch directory
pub struct TestHost {
    pub env: FakeEnvironment,
    pub commands: RecordingCommands,
    pub downloader: FakeDownloader,
    pub extractor: FakeExtractor,
    pub importer: FakeImporter,
}

impl TestHost {
    /// `scratch/home` becomes the home directory
    pub fn new(scratch: &Path) -> Self {
        let home = scratch.join("home");
        std::fs::create_dir_all(&home).expect("create fake home");
        Self {
            env: FakeEnvironment::new(&home),
            commands: RecordingCommands::default(),
            downloader: FakeDownloader::new(scratch),
            extractor: FakeExtractor::default(),
            importer: FakeImporter::default(),
        }
    }

    pub fn host(&mut self) -> Host<'_> {
        Host {
            env: &mut self.env,
            commands: &mut self.commands,
            downloader: &self.downloader,
            extractor: &self.extractor,
            importer: &self.importer,
        }
    }
}
