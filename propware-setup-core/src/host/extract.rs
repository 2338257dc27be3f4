//! Archive extraction for downloaded toolchains and libraries.
//!
//! `.zip` archives are handled by the `zip` crate, `.tar.gz`/`.tgz` by
//! `flate2` + `tar`. Entries that would land outside the destination are
//! skipped.

use anyhow::{bail, Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Component, Path};

use super::Extractor;

/// Archive formats the installer knows how to unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

impl ArchiveFormat {
    /// Infer the format from a file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".zip") {
            Some(ArchiveFormat::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveFormat::TarGz)
        } else {
            None
        }
    }
}

/// Extracts archives on the local filesystem
#[derive(Debug, Default)]
pub struct ArchiveExtractor;

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for ArchiveExtractor {
    fn extract(&self, archive: &Path, dest_dir: &Path) -> Result<()> {
        let format = ArchiveFormat::from_path(archive)
            .with_context(|| format!("Unsupported archive format: {}", archive.display()))?;

        println!("Extracting {} to {}...", archive.display(), dest_dir.display());

        fs::create_dir_all(dest_dir)
            .with_context(|| format!("Failed to create directory: {}", dest_dir.display()))?;

        match format {
            ArchiveFormat::Zip => extract_zip(archive, dest_dir),
            ArchiveFormat::TarGz => extract_tar_gz(archive, dest_dir),
        }
    }
}

fn is_safe_relative(path: &Path) -> bool {
    !path.is_absolute()
        && path
            .components()
            .all(|c| !matches!(c, Component::ParentDir | Component::Prefix(_)))
}

fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open zip: {}", archive_path.display()))?;

    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read zip: {}", archive_path.display()))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let entry_path = match entry.enclosed_name() {
            Some(path) => path.to_owned(),
            None => {
                log::warn!("Skipping unsafe path in zip: {}", entry.name());
                continue;
            }
        };

        let dest_path = dest_dir.join(&entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&dest_path)?;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut outfile = File::create(&dest_path)
            .with_context(|| format!("Failed to create: {}", dest_path.display()))?;
        io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode & 0o7777))?;
        }
    }

    log::debug!("ZIP extraction complete");
    Ok(())
}

fn extract_tar_gz(archive_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("Failed to open tar.gz: {}", archive_path.display()))?;

    let decoder = flate2::read::GzDecoder::new(BufReader::new(file));
    extract_tar(decoder, dest_dir)
}

fn extract_tar<R: Read>(reader: R, dest_dir: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_permissions(true);

    for entry_result in archive.entries()? {
        let mut entry = entry_result?;
        let path = entry.path()?.into_owned();

        if !is_safe_relative(&path) {
            log::warn!("Skipping unsafe path in tar: {}", path.display());
            continue;
        }

        // unpack_in refuses to write through symlinks that escape dest_dir
        if !entry.unpack_in(dest_dir)? {
            bail!("Refused to unpack {} outside {}", path.display(), dest_dir.display());
        }
    }

    log::debug!("TAR extraction complete");
    Ok(())
}
