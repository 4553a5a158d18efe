/*!
 * Zip archive creation and extraction.
 *
 * Archives are written to a temporary file next to the destination and
 * persisted once complete, so a download never sees a half-written zip.
 * Extraction rejects entries that would land outside the destination
 * directory and stops once the unpacked size passes the configured ceiling.
 */

use anyhow::{Context, Result};
use log::debug;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::errors::UploadError;
use crate::file_utils::FileManager;

/// Zip every file under `dir` into `dest`
///
/// Entry names are relative to `dir` and `/` separated.
///
/// # Returns
/// * `Result<usize>` - Number of files stored
pub fn create_zip(dir: &Path, dest: &Path) -> Result<usize> {
    let parent = dest
        .parent()
        .with_context(|| format!("Archive path has no parent directory: {:?}", dest))?;
    FileManager::ensure_dir(parent)?;

    let temp = NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary archive in {:?}", parent))?;
    let mut writer = ZipWriter::new(temp);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0;
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.context("Failed to read directory entry")?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = FileManager::relative_slash_path(entry.path(), dir)?;
        writer
            .start_file(name.as_str(), options)
            .with_context(|| format!("Failed to add {} to archive", name))?;
        let mut source = File::open(entry.path())
            .with_context(|| format!("Failed to open {:?}", entry.path()))?;
        io::copy(&mut source, &mut writer)
            .with_context(|| format!("Failed to compress {}", name))?;
        count += 1;
    }

    let temp = writer.finish().context("Failed to finalize archive")?;
    temp.persist(dest)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to store archive at {:?}", dest))?;

    debug!("Archived {} file(s) into {:?}", count, dest);
    Ok(count)
}

/// Unpack `archive` into `dest`
///
/// # Returns
/// * `Result<usize, UploadError>` - Number of files extracted
pub fn extract_zip(archive: &Path, dest: &Path, max_bytes: u64) -> Result<usize, UploadError> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|e| UploadError::InvalidArchive(e.to_string()))?;
    fs::create_dir_all(dest)?;

    let mut total: u64 = 0;
    let mut count = 0;

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| UploadError::InvalidArchive(e.to_string()))?;

        let relative = entry
            .enclosed_name()
            .ok_or_else(|| UploadError::UnsafeEntry(entry.name().to_string()))?;
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let remaining = max_bytes.saturating_sub(total);
        let mut out = File::create(&out_path)?;
        let written = io::copy(&mut (&mut entry).take(remaining.saturating_add(1)), &mut out)?;
        total += written;

        if total > max_bytes {
            return Err(UploadError::ExtractedTooLarge { limit: max_bytes });
        }
        count += 1;
    }

    debug!("Extracted {} file(s), {} bytes into {:?}", count, total, dest);
    Ok(count)
}

/// Names of the file entries of an archive, in archive order
pub fn list_entries(archive: &Path) -> Result<Vec<String>> {
    let file = File::open(archive).with_context(|| format!("Failed to open {:?}", archive))?;
    let mut zip = ZipArchive::new(file).context("Failed to read archive")?;

    let mut names = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let entry = zip.by_index(index).context("Failed to read archive entry")?;
        if entry.is_file() {
            names.push(entry.name().to_string());
        }
    }
    Ok(names)
}
