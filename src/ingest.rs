//! Upload storage and active-dataset selection.
//!
//! The upload directory may hold any number of files, but exactly one is
//! ever active: the newest by creation stamp. This newest-file-wins policy
//! is the documented contract of the ingestion boundary — older uploads are
//! retained on disk and never searched.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::Result;
use crate::models::SourceIdentity;

/// Select the active dataset: the newest regular file in the upload
/// directory, by creation stamp. Returns `None` when the directory is
/// missing or holds no files.
pub fn newest_upload(dir: &Path) -> Result<Option<SourceIdentity>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut newest: Option<SourceIdentity> = None;
    for entry in entries {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        let stamp = file_stamp(&metadata);
        let replace = match &newest {
            Some(current) => stamp > current.stamp,
            None => true,
        };
        if replace {
            newest = Some(SourceIdentity {
                path: entry.path(),
                stamp,
            });
        }
    }

    Ok(newest)
}

/// Creation time where the filesystem records it, modification time
/// otherwise. Only compared for equality and ordering, never interpreted.
fn file_stamp(metadata: &fs::Metadata) -> SystemTime {
    metadata
        .created()
        .or_else(|_| metadata.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Persist a raw upload under its sanitized base name. Creates the upload
/// directory on first use. I/O failures are reported to the caller and do
/// not touch the cache.
pub fn save_upload(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;

    // Strip any path components a client may have smuggled into the name.
    let base = Path::new(file_name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty() && n != "." && n != "..")
        .unwrap_or_else(|| "upload.csv".to_string());

    let path = dir.join(base);
    fs::write(&path, bytes)?;
    tracing::info!("saved upload to {}", path.display());
    Ok(path)
}

/// Remove leftover files from a previous run. Invoked once at server
/// startup; the in-memory cache does not survive restarts, so stale uploads
/// must not either.
pub fn clean_uploads(dir: &Path) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let mut removed = 0usize;
    for entry in entries {
        let entry = entry?;
        if entry.metadata()?.is_file() {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    if removed > 0 {
        tracing::info!("cleaned {} leftover upload(s) from {}", removed, dir.display());
    }
    Ok(())
}
