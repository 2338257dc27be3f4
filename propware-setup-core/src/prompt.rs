//! User input, gathered up front before any download, copy or build

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::deps::Tool;

/// Source of interactive answers
pub trait Prompter {
    /// Show `prompt` and return one line of input with the line ending removed.
    /// End of input is returned as an empty answer.
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// Answers every question with its default
#[derive(Debug, Default)]
pub struct AcceptDefaults;

impl Prompter for AcceptDefaults {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        log::debug!("Accepting default for: {}", prompt.trim_end());
        Ok(String::new())
    }
}

/// Answers collected before the orchestration starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallChoices {
    pub generator_parent: PathBuf,
    pub compiler_parent: PathBuf,
    /// Consent to write the toolchain variables into the system-wide environment
    pub system_env_consent: bool,
}

/// Ask where to install `tool`. Empty input keeps `default`; anything else must
/// be an existing directory or the question is repeated.
pub fn prompt_for_directory(
    prompter: &mut dyn Prompter,
    tool: Tool,
    default: &Path,
) -> Result<PathBuf> {
    let question = format!(
        "{} will be installed to {}. Press enter to continue or type another existing path to download to a new directory.\n>>> ",
        tool.name(),
        default.display()
    );

    loop {
        let answer = prompter.ask(&question)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(default.to_path_buf());
        }

        let candidate = PathBuf::from(answer);
        if candidate.is_dir() {
            return Ok(candidate);
        }
        eprintln!("'{}' does not exist or is not a directory.", answer);
    }
}

/// Ask whether the toolchain variables may be written system wide.
/// Enter means yes, `no` means the user will configure them.
pub fn prompt_for_system_env(prompter: &mut dyn Prompter) -> Result<bool> {
    println!("Environment variables will now be configured for the root environment.");
    let question = "Press \"enter\" to continue or \"no\" to configure them yourself.\n>>> ";

    loop {
        let answer = prompter.ask(question)?;
        match answer.trim().to_ascii_lowercase().as_str() {
            "" => return Ok(true),
            "no" | "n" => return Ok(false),
            other => eprintln!("Unrecognized answer '{}'.", other),
        }
    }
}
