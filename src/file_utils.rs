use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

// @module: File and directory utilities for uploaded projects

/// Directory created by macOS archivers next to the real content
const MACOS_METADATA_DIR: &str = "__MACOSX";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    /// Remove a directory tree, ignoring paths that do not exist
    pub fn remove_dir_if_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
        let path = path.as_ref();
        if !Self::dir_exists(path) {
            return Ok(false);
        }
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {:?}", path))?;
        Ok(true)
    }

    /// Whether a path component is hidden or archiver metadata
    pub fn is_ignored_name(name: &str) -> bool {
        name.starts_with('.') || name == MACOS_METADATA_DIR
    }

    fn is_ignored_entry(entry: &DirEntry) -> bool {
        entry.depth() > 0 && Self::is_ignored_name(&entry.file_name().to_string_lossy())
    }

    /// Find source files whose extension is in `extensions`, skipping hidden
    /// and metadata path components
    ///
    /// # Returns
    /// * `Result<Vec<PathBuf>>` - Matching files, sorted by path
    pub fn find_source_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref())
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !Self::is_ignored_entry(e))
        {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if !entry.file_type().is_file() {
                continue;
            }

            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy();
                if extensions.iter().any(|e| e.eq_ignore_ascii_case(&ext)) {
                    result.push(path.to_path_buf());
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Remove `__MACOSX` directories and `._*` resource-fork files
    ///
    /// # Returns
    /// * `Result<usize>` - Number of entries removed
    pub fn clean_source_directory<P: AsRef<Path>>(dir: P) -> Result<usize> {
        let mut doomed: Vec<(PathBuf, bool)> = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(false) {
            let entry = entry.context("Failed to read directory entry")?;
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() && name == MACOS_METADATA_DIR {
                doomed.push((entry.path().to_path_buf(), true));
            } else if entry.file_type().is_file() && name.starts_with("._") {
                doomed.push((entry.path().to_path_buf(), false));
            }
        }

        let mut removed = 0;
        for (path, is_dir) in doomed {
            // Files inside an already removed metadata dir are gone
            if !path.exists() {
                continue;
            }
            let outcome = if is_dir {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            outcome.with_context(|| format!("Failed to remove {:?}", path))?;
            debug!("Removed archiver metadata {:?}", path);
            removed += 1;
        }

        Ok(removed)
    }

    /// Descend through wrapper directories: while a directory holds exactly one
    /// visible entry and that entry is a directory, step into it
    pub fn descend_single_dir<P: AsRef<Path>>(dir: P) -> Result<PathBuf> {
        let mut current = dir.as_ref().to_path_buf();

        loop {
            let mut visible = Vec::new();
            for entry in fs::read_dir(&current)
                .with_context(|| format!("Failed to list directory: {:?}", current))?
            {
                let entry = entry?;
                if !Self::is_ignored_name(&entry.file_name().to_string_lossy()) {
                    visible.push(entry.path());
                }
            }

            match visible.as_slice() {
                [only] if only.is_dir() => current = only.clone(),
                _ => return Ok(current),
            }
        }
    }

    /// Path of `path` relative to `base`, with `/` separators
    pub fn relative_slash_path<P1: AsRef<Path>, P2: AsRef<Path>>(path: P1, base: P2) -> Result<String> {
        let relative = path.as_ref().strip_prefix(base.as_ref()).with_context(|| {
            format!("{:?} is not inside {:?}", path.as_ref(), base.as_ref())
        })?;

        Ok(relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect::<Vec<_>>()
            .join("/"))
    }

    /// Read a source file as text: UTF-8 when valid, Latin-1 otherwise
    pub fn read_source<P: AsRef<Path>>(path: P) -> Result<String> {
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))?;

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(err) => {
                debug!("{:?} is not valid UTF-8, decoding as Latin-1", path.as_ref());
                Ok(err.into_bytes().iter().map(|&b| b as char).collect())
            }
        }
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_readSource_withLatin1Bytes_shouldDecode() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.c");
        fs::write(&path, [b'/', b'/', b' ', 0xE9, b'\n']).unwrap();
        assert_eq!(FileManager::read_source(&path).unwrap(), "// é\n");
    }

    #[test]
    fn test_relativeSlashPath_shouldUseForwardSlashes() {
        let base = Path::new("/tmp/project");
        let path = base.join("src").join("main.c");
        assert_eq!(FileManager::relative_slash_path(&path, base).unwrap(), "src/main.c");
    }

    #[test]
    fn test_isIgnoredName_shouldMatchHiddenAndMetadata() {
        assert!(FileManager::is_ignored_name(".git"));
        assert!(FileManager::is_ignored_name("__MACOSX"));
        assert!(!FileManager::is_ignored_name("src"));
    }
}
