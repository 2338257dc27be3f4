//! Locating the generator's modules directory and copying PropWare's
//! support files into it

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Subdirectory of the support files holding the platform definitions
pub const PLATFORM_SUBDIR: &str = "Platform";

/// Modules directory of a CMake installation rooted at `root`.
///
/// Linux and Windows archives keep it under `share/cmake-<ver>/Modules`, the
/// macOS bundle under `CMake.app/Contents/share/cmake-<ver>/Modules`.
pub fn modules_dir(root: &Path) -> PathBuf {
    let share_dirs = [
        root.join("share"),
        root.join("CMake.app").join("Contents").join("share"),
    ];

    for share in &share_dirs {
        let Ok(entries) = fs::read_dir(share) else {
            continue;
        };
        let newest = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let version = cmake_version(&e.file_name().to_string_lossy())?;
                Some((version, e.path().join("Modules")))
            })
            .filter(|(_, modules)| modules.is_dir())
            .max_by(|a, b| a.0.cmp(&b.0));
        if let Some((_, modules)) = newest {
            return modules;
        }
    }

    root.join("share").join("cmake-3.0").join("Modules")
}

/// Numeric components of a `cmake-<major>.<minor>[.<patch>]` directory name
fn cmake_version(dir_name: &str) -> Option<Vec<u32>> {
    dir_name
        .strip_prefix("cmake-")?
        .split('.')
        .map(|part| part.parse().ok())
        .collect()
}

/// Regular files directly inside `dir`
fn files_in(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

fn copy_flat(src: &Path, dst: &Path) -> io::Result<usize> {
    let files = files_in(src)?;
    for file in &files {
        if let Some(name) = file.file_name() {
            fs::copy(file, dst.join(name))?;
        }
    }
    Ok(files.len())
}

/// Copy the files of `src` into `dst`, and those of `src/Platform` into
/// `dst/Platform`. Returns the number of files copied.
///
/// The destination modules directory must already exist; a missing one means
/// the install root does not match the archive layout.
pub fn copy_support_files(src: &Path, dst: &Path) -> io::Result<usize> {
    if !dst.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("modules directory {} does not exist", dst.display()),
        ));
    }

    let mut copied = copy_flat(src, dst)?;

    let platform_src = src.join(PLATFORM_SUBDIR);
    if platform_src.is_dir() {
        let platform_dst = dst.join(PLATFORM_SUBDIR);
        fs::create_dir_all(&platform_dst)?;
        copied += copy_flat(&platform_src, &platform_dst)?;
    }

    log::debug!("Copied {} support files into {}", copied, dst.display());
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn support_tree(root: &Path) -> PathBuf {
        let src = root.join("CMakeModules");
        fs::create_dir_all(src.join(PLATFORM_SUBDIR)).unwrap();
        fs::write(src.join("CMakePropellerInformation.cmake"), "info").unwrap();
        fs::write(src.join("CMakeCOGCompiler.cmake.in"), "cog").unwrap();
        fs::write(src.join(PLATFORM_SUBDIR).join("Propeller.cmake"), "platform").unwrap();
        src
    }

    #[test]
    fn test_modules_dir_linux_layout() {
        let temp_dir = TempDir::new().unwrap();
        let modules = temp_dir.path().join("share/cmake-3.0/Modules");
        fs::create_dir_all(&modules).unwrap();

        assert_eq!(modules_dir(temp_dir.path()), modules);
    }

    #[test]
    fn test_modules_dir_mac_bundle_layout() {
        let temp_dir = TempDir::new().unwrap();
        let modules = temp_dir
            .path()
            .join("CMake.app/Contents/share/cmake-3.0/Modules");
        fs::create_dir_all(&modules).unwrap();

        assert_eq!(modules_dir(temp_dir.path()), modules);
    }

    #[test]
    fn test_modules_dir_picks_newest_version() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("share/cmake-3.0/Modules")).unwrap();
        fs::create_dir_all(temp_dir.path().join("share/cmake-3.5/Modules")).unwrap();

        assert_eq!(
            modules_dir(temp_dir.path()),
            temp_dir.path().join("share/cmake-3.5/Modules")
        );
    }

    #[test]
    fn test_modules_dir_compares_versions_numerically() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("share/cmake-3.9/Modules")).unwrap();
        fs::create_dir_all(temp_dir.path().join("share/cmake-3.10/Modules")).unwrap();
        fs::create_dir_all(temp_dir.path().join("share/cmake-data")).unwrap();

        assert_eq!(
            modules_dir(temp_dir.path()),
            temp_dir.path().join("share/cmake-3.10/Modules")
        );
    }

    #[test]
    fn test_cmake_version() {
        assert_eq!(cmake_version("cmake-3.10"), Some(vec![3, 10]));
        assert_eq!(cmake_version("cmake-3.0.1"), Some(vec![3, 0, 1]));
        assert_eq!(cmake_version("cmake-data"), None);
        assert_eq!(cmake_version("doc"), None);
    }

    #[test]
    fn test_modules_dir_fallback() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(
            modules_dir(temp_dir.path()),
            temp_dir.path().join("share/cmake-3.0/Modules")
        );
    }

    #[test]
    fn test_copy_support_files() {
        let temp_dir = TempDir::new().unwrap();
        let src = support_tree(temp_dir.path());
        let dst = temp_dir.path().join("Modules");
        fs::create_dir_all(&dst).unwrap();

        let copied = copy_support_files(&src, &dst).unwrap();

        assert_eq!(copied, 3);
        assert!(dst.join("CMakePropellerInformation.cmake").is_file());
        assert!(dst.join("CMakeCOGCompiler.cmake.in").is_file());
        assert!(dst.join(PLATFORM_SUBDIR).join("Propeller.cmake").is_file());
    }

    #[test]
    fn test_copy_into_missing_modules_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let src = support_tree(temp_dir.path());

        let err = copy_support_files(&src, &temp_dir.path().join("absent")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
