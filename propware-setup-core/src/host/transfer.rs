//! HTTP downloads

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use super::Downloader;

/// Downloads with a blocking reqwest client
pub struct HttpDownloader {
    client: reqwest::blocking::Client,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("propware-setup/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, dest_dir: &Path) -> Result<PathBuf> {
        let file_name = file_name_from_url(url)?;
        let dest = dest_dir.join(file_name);

        println!("Downloading {}...", url);

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to download {}", url))?;

        if !response.status().is_success() {
            bail!("Download of {} failed (HTTP {})", url, response.status());
        }

        let content = response
            .bytes()
            .with_context(|| format!("Failed to read response from {}", url))?;

        std::fs::write(&dest, &content)
            .with_context(|| format!("Failed to write {}", dest.display()))?;

        log::info!("Downloaded {} bytes to {}", content.len(), dest.display());
        Ok(dest)
    }
}

/// Last path segment of a URL, without query or fragment
pub fn file_name_from_url(url: &str) -> Result<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => bail!("Cannot determine a file name from URL {}", url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url("http://www.cmake.org/files/v3.0/cmake-3.0.1-Linux-i386.tar.gz")
                .unwrap(),
            "cmake-3.0.1-Linux-i386.tar.gz"
        );
        assert_eq!(
            file_name_from_url("https://example.com/a/PropGCC-win_v1_0_0.zip?token=1").unwrap(),
            "PropGCC-win_v1_0_0.zip"
        );
    }

    #[test]
    fn test_file_name_from_url_rejects_directory() {
        assert!(file_name_from_url("https://example.com/downloads/").is_err());
    }
}
