//! Canonical `<class>_<NNN>.<ext>` file names for class directories.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use walkdir::WalkDir;

use crate::dataset::is_hidden;
use crate::progress::{NoProgress, ProgressReporter};
use crate::PrepError;

/// Configuration for [`standardize_filenames`].
#[derive(Clone, Debug)]
pub struct StandardizeConfig {
    /// Directory whose descendants are treated as class directories.
    pub root: PathBuf,
    /// Plan and report the renames without touching the filesystem.
    pub dry_run: bool,
}

impl StandardizeConfig {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self {
            root: root.into(),
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// A single file rename inside one class directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rename {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StandardizeReport {
    /// Number of class directories visited.
    pub directories: usize,
    /// Renames performed, or planned when running dry.
    pub renames: Vec<Rename>,
}

/// Rename the files of every directory below `config.root` to
/// `<directory name>_<NNN>.<ext>`.
///
/// Each directory is planned and checked for collisions before any of its
/// files is renamed; a collision aborts the run with
/// [`PrepError::RenameCollision`].
pub fn standardize_filenames(config: &StandardizeConfig) -> Result<StandardizeReport, PrepError> {
    standardize_filenames_with_progress(config, &mut NoProgress)
}

pub fn standardize_filenames_with_progress(
    config: &StandardizeConfig,
    progress: &mut dyn ProgressReporter,
) -> Result<StandardizeReport, PrepError> {
    if !config.root.is_dir() {
        return Err(PrepError::MissingDirectory(config.root.clone()));
    }

    let mut dirs = Vec::new();
    for entry in WalkDir::new(&config.root)
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_dir() {
            dirs.push(entry.into_path());
        }
    }
    progress.start(dirs.len());

    let mut report = StandardizeReport::default();
    for dir in dirs {
        let plan = plan_renames(&dir)?;
        for rename in &plan {
            info!(
                "renaming: {} -> {}",
                rename.from.display(),
                rename.to.display()
            );
            if !config.dry_run {
                fs::rename(&rename.from, &rename.to)?;
            }
        }
        report.directories += 1;
        report.renames.extend(plan);
        progress.advance(&dir);
    }

    progress.finish();
    Ok(report)
}

/// Compute the renames that standardise the files directly inside `dir`.
///
/// Files are visited in lexicographic order and names starting with `.` are
/// skipped without consuming an index. Files already carrying their target
/// name produce no entry.
pub fn plan_renames(dir: &Path) -> Result<Vec<Rename>, PrepError> {
    let label = dir
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| PrepError::InvalidName(dir.to_path_buf()))?;

    let mut occupied = HashSet::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        if !entry.file_type()?.is_dir() {
            files.push(name.clone());
        }
        occupied.insert(name);
    }
    files.sort();

    let mut plan = Vec::new();
    let mut index = 1usize;
    for file_name in files {
        let from = dir.join(&file_name);
        if is_hidden(&from) {
            continue;
        }
        let name = file_name
            .to_str()
            .ok_or_else(|| PrepError::InvalidName(from.clone()))?;
        let target = standard_name(label, index, extension(name));
        index += 1;

        if target == name {
            continue;
        }
        let target = OsString::from(target);
        let to = dir.join(&target);
        if occupied.contains(&target) {
            return Err(PrepError::RenameCollision { from, to });
        }
        occupied.remove(&file_name);
        occupied.insert(target);
        plan.push(Rename { from, to });
    }

    Ok(plan)
}

fn standard_name(label: &str, index: usize, extension: &str) -> String {
    format!("{label}_{index:03}.{extension}")
}

/// Substring after the last `.`, or empty when the name has none.
fn extension(name: &str) -> &str {
    name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_name_pads_to_three_digits() {
        assert_eq!(standard_name("siren", 7, "wav"), "siren_007.wav");
        assert_eq!(standard_name("siren", 42, "wav"), "siren_042.wav");
        assert_eq!(standard_name("siren", 1234, "wav"), "siren_1234.wav");
    }

    #[test]
    fn extension_uses_last_dot() {
        assert_eq!(extension("clip.take2.wav"), "wav");
        assert_eq!(extension("README"), "");
        assert_eq!(extension("trailing."), "");
    }
}
