use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::PrepError;

pub(crate) const WAV_EXTENSION: &str = "wav";

/// A class directory directly below a dataset root.
#[derive(Debug, Clone)]
pub(crate) struct ClassDir {
    pub label: String,
    pub path: PathBuf,
}

/// List the class directories directly inside `root`, sorted by label.
pub(crate) fn class_dirs(root: &Path) -> Result<Vec<ClassDir>, PrepError> {
    if !root.is_dir() {
        return Err(PrepError::MissingDirectory(root.to_path_buf()));
    }

    let mut classes = Vec::new();
    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path();
        let label = entry
            .file_name()
            .into_string()
            .map_err(|_| PrepError::InvalidName(path.clone()))?;
        classes.push(ClassDir { label, path });
    }
    classes.sort_by(|a, b| a.label.cmp(&b.label));
    Ok(classes)
}

/// List the `*.wav` files directly inside `dir`, sorted by file name.
///
/// Matching follows shell glob rules: the extension must be exactly `wav` and
/// names starting with `.` are not matched.
pub(crate) fn wav_files(dir: &Path) -> Result<Vec<PathBuf>, PrepError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if is_hidden(&path) || !is_wav(&path) {
            continue;
        }
        if entry.file_type()?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// List every regular file directly inside `dir` whose name ends in `.wav`,
/// sorted by file name.
///
/// Unlike [`wav_files`] this keeps dot-files, so stray `._name.wav` resource
/// forks reach the decoder and are reported instead of silently ignored.
pub(crate) fn recordings(dir: &Path) -> Result<Vec<PathBuf>, PrepError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let has_suffix = entry.file_name().as_encoded_bytes().ends_with(b".wav");
        if has_suffix && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

pub(crate) fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.as_encoded_bytes().starts_with(b"."))
        .unwrap_or(false)
}

pub(crate) fn is_wav(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some(WAV_EXTENSION)
}

/// Move `file` into `dest_dir`, keeping its file name.
///
/// Refuses to replace an existing destination. Falls back to copy and remove
/// when a plain rename fails, e.g. across filesystems.
pub(crate) fn move_into(file: &Path, dest_dir: &Path) -> Result<PathBuf, PrepError> {
    let name = file
        .file_name()
        .ok_or_else(|| PrepError::InvalidName(file.to_path_buf()))?;
    let dest = dest_dir.join(name);
    if dest.exists() {
        return Err(PrepError::DestinationExists(dest));
    }

    if let Err(err) = fs::rename(file, &dest) {
        debug!(
            "rename of '{}' failed ({err}), falling back to copy",
            file.display()
        );
        fs::copy(file, &dest)?;
        fs::remove_file(file)?;
    }

    Ok(dest)
}
