//! Third-party library import into `<project root>/downloads`

use anyhow::{Context, Result};
use std::path::Path;

use super::{Downloader, Extractor, SourceImporter};

/// A third-party source library fetched on first setup
#[derive(Debug, Clone, Copy)]
pub struct SourceLibrary {
    pub name: &'static str,
    pub url: &'static str,
}

pub const LIBRARIES: &[SourceLibrary] = &[
    SourceLibrary {
        name: "libpropeller",
        url: "https://github.com/libpropeller/libpropeller/archive/master.zip",
    },
    SourceLibrary {
        name: "Simple",
        url: "https://github.com/parallaxinc/propsideworkspace/archive/master.zip",
    },
];

/// Downloads each library archive and unpacks it under the downloads directory.
///
/// Work happens in a `<downloads>.partial` staging directory that is renamed
/// into place only when every library succeeded, so an interrupted import is
/// retried on the next run instead of being mistaken for a finished one.
pub struct LibraryImporter<D, E> {
    downloader: D,
    extractor: E,
    libraries: &'static [SourceLibrary],
}

impl<D: Downloader, E: Extractor> LibraryImporter<D, E> {
    pub fn new(downloader: D, extractor: E) -> Self {
        Self::with_libraries(downloader, extractor, LIBRARIES)
    }

    pub fn with_libraries(
        downloader: D,
        extractor: E,
        libraries: &'static [SourceLibrary],
    ) -> Self {
        Self {
            downloader,
            extractor,
            libraries,
        }
    }
}

impl<D: Downloader, E: Extractor> SourceImporter for LibraryImporter<D, E> {
    fn import_all(&self, downloads_dir: &Path) -> Result<()> {
        let staging = downloads_dir.with_extension("partial");
        if staging.exists() {
            std::fs::remove_dir_all(&staging)
                .with_context(|| format!("Failed to clear {}", staging.display()))?;
        }
        std::fs::create_dir_all(&staging)
            .with_context(|| format!("Failed to create {}", staging.display()))?;

        let temp_dir = std::env::temp_dir();
        for library in self.libraries {
            println!("Importing {}...", library.name);
            let archive = self
                .downloader
                .download(library.url, &temp_dir)
                .with_context(|| format!("Failed to download {}", library.name))?;
            self.extractor
                .extract(&archive, &staging)
                .with_context(|| format!("Failed to extract {}", library.name))?;
            let _ = std::fs::remove_file(&archive);
        }

        std::fs::rename(&staging, downloads_dir).with_context(|| {
            format!(
                "Failed to move {} to {}",
                staging.display(),
                downloads_dir.display()
            )
        })?;

        log::info!("Imported {} libraries", self.libraries.len());
        Ok(())
    }
}
