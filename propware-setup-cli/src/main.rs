use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};

use propware_setup_core::host::extract::ArchiveExtractor;
use propware_setup_core::host::importer::LibraryImporter;
use propware_setup_core::host::logger::InstallLogger;
use propware_setup_core::host::system::{SystemCommands, SystemEnvironment};
use propware_setup_core::host::transfer::HttpDownloader;
use propware_setup_core::{
    create_installer, prepare_plan, print_dependency_status, run_install, BuildOutcome, Host,
    OperatingSystem, Prompter,
};

mod cli;

/// Transcripts kept in the temp directory
const KEEP_LOGS: usize = 5;

/// Reads answers from the terminal
struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("Failed to read from stdin")?;
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Toolchains and shell profiles belong to the invoking user; sudo is used per step
    #[cfg(unix)]
    {
        if unsafe { libc::geteuid() } == 0 {
            eprintln!("ERROR: propware-setup refuses to run as root.");
            eprintln!("It would install into root's home directory and edit root's shell profile.");
            eprintln!("Please run as a regular user; you will be asked for your password when needed.");
            std::process::exit(1);
        }
    }

    let args = cli::parse_args();

    // Initialize logger with appropriate level based on verbose flag
    if std::env::var("RUST_LOG").is_err() {
        if args.verbose {
            std::env::set_var("RUST_LOG", "debug");
        } else {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let mut env = SystemEnvironment::new();

    if args.check {
        if !print_dependency_status(&env) {
            std::process::exit(1);
        }
        return Ok(());
    }

    let installer = create_installer(&OperatingSystem::detect())?;
    let config = args.to_config();

    let mut plan = prepare_plan(&config, installer.as_ref(), &env, &mut StdinPrompter)?;

    let temp_dir = std::env::temp_dir();
    if let Err(e) = InstallLogger::cleanup_old_logs(&temp_dir, KEEP_LOGS) {
        log::warn!("Failed to clean up old setup logs: {}", e);
    }
    let logger = match InstallLogger::new() {
        Ok(logger) => {
            log::info!("Writing setup transcript to {}", logger.log_path().display());
            Some(logger)
        }
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    };

    let mut commands = SystemCommands::new(logger);
    let downloader = HttpDownloader::new()?;
    let extractor = ArchiveExtractor::new();
    let importer = LibraryImporter::new(HttpDownloader::new()?, ArchiveExtractor::new());

    let mut host = Host {
        env: &mut env,
        commands: &mut commands,
        downloader: &downloader,
        extractor: &extractor,
        importer: &importer,
    };

    let outcome = run_install(installer.as_ref(), &mut plan, &mut host)?;

    if let Some(logger) = commands.logger() {
        logger.info(&format!("Build outcome: {:?}", outcome));
        logger.finalize();
    }

    println!();
    match outcome {
        BuildOutcome::Built => println!("PropWare is set up and built. Happy hacking!"),
        BuildOutcome::Skipped => println!("PropWare setup finished without building."),
        BuildOutcome::GeneratorFailed | BuildOutcome::BuildFailed => {
            println!("PropWare setup finished, but the initial build failed. See the output above.")
        }
    }
    println!("Open a new terminal so the updated environment takes effect.");

    Ok(())
}
