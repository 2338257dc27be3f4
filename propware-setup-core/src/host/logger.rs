//! Installation transcript
//!
//! Every external command the installer runs, with its output, is written to a
//! timestamped file in the temp directory so a failed setup can be diagnosed
//! after the console has scrolled away.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const LOG_PREFIX: &str = "propware-setup-";
const LOG_SUFFIX: &str = ".log";

/// Writes an append-only transcript of one setup run
pub struct InstallLogger {
    log_file: File,
    log_path: PathBuf,
}

impl InstallLogger {
    /// Create a transcript in the system temp directory
    pub fn new() -> Result<Self, String> {
        Self::in_dir(&std::env::temp_dir())
    }

    /// Create a transcript in `dir`
    pub fn in_dir(dir: &Path) -> Result<Self, String> {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_path = dir.join(format!("{}{}{}", LOG_PREFIX, timestamp, LOG_SUFFIX));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(|e| format!("Failed to create log file at {:?}: {}", log_path, e))?;

        let logger = Self {
            log_file: file,
            log_path,
        };

        logger.info("=== PropWare Setup Log ===");
        logger.info(&format!("Version: {}", env!("CARGO_PKG_VERSION")));
        logger.info(&format!(
            "Started: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        logger.info("");

        Ok(logger)
    }

    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }

    pub fn info(&self, message: &str) {
        self.log_message("INFO", message);
    }

    pub fn warn(&self, message: &str) {
        self.log_message("WARN", message);
    }

    pub fn error(&self, message: &str) {
        self.log_message("ERROR", message);
    }

    fn log_message(&self, level: &str, message: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let formatted = if level.is_empty() {
            format!("[{}] {}", timestamp, message)
        } else {
            format!("[{}] [{}] {}", timestamp, level, message)
        };

        // File is unbuffered, each line reaches disk as it is written
        let _ = writeln!(&self.log_file, "{}", formatted);
    }

    pub fn log_stdout(&self, output: &str) {
        for line in output.lines() {
            self.log_message("", &format!("  stdout: {}", line));
        }
    }

    pub fn log_stderr(&self, output: &str) {
        for line in output.lines() {
            self.log_message("", &format!("  stderr: {}", line));
        }
    }

    /// Keep only the `keep_count` most recent transcripts in `dir`
    pub fn cleanup_old_logs(dir: &Path, keep_count: usize) -> Result<(), String> {
        let mut log_files: Vec<PathBuf> = std::fs::read_dir(dir)
            .map_err(|e| format!("Failed to read log directory: {}", e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|n| n.starts_with(LOG_PREFIX) && n.ends_with(LOG_SUFFIX))
                    .unwrap_or(false)
            })
            .collect();

        // oldest first; names embed the timestamp so they break ties
        log_files.sort_by_key(|path| {
            (
                std::fs::metadata(path).and_then(|m| m.modified()).ok(),
                path.clone(),
            )
        });

        if log_files.len() > keep_count {
            let to_remove = log_files.len() - keep_count;
            for path in log_files.iter().take(to_remove) {
                let _ = std::fs::remove_file(path);
            }
        }

        Ok(())
    }

    pub fn finalize(&self) {
        self.info("");
        self.info(&format!(
            "Finished: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logger_writes_header_and_lines() {
        let temp_dir = TempDir::new().unwrap();
        let logger = InstallLogger::in_dir(temp_dir.path()).unwrap();

        logger.warn("make missing");
        logger.log_stdout("ii  libc6:i386\nii  libc6-dev");
        logger.finalize();

        let contents = std::fs::read_to_string(logger.log_path()).unwrap();
        assert!(contents.contains("=== PropWare Setup Log ==="));
        assert!(contents.contains("[WARN] make missing"));
        assert!(contents.contains("  stdout: ii  libc6:i386"));
        assert!(contents.contains("  stdout: ii  libc6-dev"));
        assert!(contents.contains("Finished:"));
    }

    #[test]
    fn test_cleanup_keeps_most_recent() {
        let temp_dir = TempDir::new().unwrap();
        for stamp in ["20240101_000000", "20240102_000000", "20240103_000000"] {
            let name = format!("{}{}{}", LOG_PREFIX, stamp, LOG_SUFFIX);
            std::fs::write(temp_dir.path().join(name), "x").unwrap();
        }
        std::fs::write(temp_dir.path().join("unrelated.log"), "x").unwrap();

        InstallLogger::cleanup_old_logs(temp_dir.path(), 2).unwrap();

        let mut remaining: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        remaining.sort();

        assert_eq!(remaining.len(), 3);
        assert!(remaining.contains(&"unrelated.log".to_string()));
        assert!(!remaining.contains(&format!("{}20240101_000000{}", LOG_PREFIX, LOG_SUFFIX)));
    }
}
