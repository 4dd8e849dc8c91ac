//! Stratified random splits of a class-labelled dataset.
//!
//! Both splitters discover the class directories directly below the raw root,
//! work on each class independently and move files rather than copying them,
//! so running them twice draws from the pool left behind by the first run.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::dataset::{class_dirs, move_into, wav_files};
use crate::progress::{NoProgress, ProgressReporter};
use crate::PrepError;

/// Configuration for [`split_test_set`].
#[derive(Clone, Debug)]
pub struct TestSplitConfig {
    /// Root holding one directory per class; files are moved out of it.
    pub raw_root: PathBuf,
    /// Root receiving the sampled files, one directory per class.
    pub test_root: PathBuf,
    /// Fraction of every class moved to the test root.
    pub test_ratio: f64,
    /// Seed for a reproducible selection; entropy is used when absent.
    pub seed: Option<u64>,
}

impl TestSplitConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        raw_root: P,
        test_root: Q,
        test_ratio: f64,
    ) -> Result<Self, PrepError> {
        Ok(Self {
            raw_root: raw_root.into(),
            test_root: test_root.into(),
            test_ratio: validate_ratio(test_ratio)?,
            seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Configuration for [`split_train_test`].
#[derive(Clone, Debug)]
pub struct TrainTestSplitConfig {
    /// Root holding one directory per class; emptied of `.wav` files by a run.
    pub raw_root: PathBuf,
    /// Root receiving the train share, one directory per class.
    pub train_root: PathBuf,
    /// Root receiving the remainder, one directory per class.
    pub test_root: PathBuf,
    /// Fraction of every class moved to the train root.
    pub train_ratio: f64,
    /// Seed for a reproducible shuffle; entropy is used when absent.
    pub seed: Option<u64>,
}

impl TrainTestSplitConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>, R: Into<PathBuf>>(
        raw_root: P,
        train_root: Q,
        test_root: R,
        train_ratio: f64,
    ) -> Result<Self, PrepError> {
        Ok(Self {
            raw_root: raw_root.into(),
            train_root: train_root.into(),
            test_root: test_root.into(),
            train_ratio: validate_ratio(train_ratio)?,
            seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Outcome of a split for a single class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassSplit {
    pub class: String,
    /// Number of `.wav` files found in the raw class directory.
    pub original: usize,
    pub moved_to_train: usize,
    pub moved_to_test: usize,
    /// Files left behind in the raw class directory.
    pub remaining: usize,
}

/// Per-class outcome of a split run, ordered by class label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub classes: Vec<ClassSplit>,
}

impl SplitReport {
    pub fn class(&self, label: &str) -> Option<&ClassSplit> {
        self.classes.iter().find(|c| c.class == label)
    }

    pub fn total_moved(&self) -> usize {
        self.classes
            .iter()
            .map(|c| c.moved_to_train + c.moved_to_test)
            .sum()
    }
}

/// Move a random `floor(count × test_ratio)` files of every class into the
/// test root, leaving the rest where they are.
pub fn split_test_set(config: &TestSplitConfig) -> Result<SplitReport, PrepError> {
    split_test_set_with_progress(config, &mut NoProgress)
}

pub fn split_test_set_with_progress(
    config: &TestSplitConfig,
    progress: &mut dyn ProgressReporter,
) -> Result<SplitReport, PrepError> {
    let mut rng = make_rng(config.seed);
    let classes = class_dirs(&config.raw_root)?;
    progress.start(classes.len());

    let mut report = SplitReport::default();
    for class in classes {
        let test_dir = config.test_root.join(&class.label);
        fs::create_dir_all(&test_dir)?;

        let files = wav_files(&class.path)?;
        let n_test = share(files.len(), config.test_ratio);
        let selected: Vec<&PathBuf> = files.choose_multiple(&mut rng, n_test).collect();
        move_all(selected, &test_dir)?;

        info!(
            "class '{}': moved {n_test} of {} file(s) to '{}'",
            class.label,
            files.len(),
            test_dir.display()
        );
        report.classes.push(ClassSplit {
            class: class.label,
            original: files.len(),
            moved_to_train: 0,
            moved_to_test: n_test,
            remaining: files.len() - n_test,
        });
        progress.advance(&class.path);
    }

    progress.finish();
    Ok(report)
}

/// Shuffle every class and move the first `floor(count × train_ratio)` files
/// into the train root and the rest into the test root.
pub fn split_train_test(config: &TrainTestSplitConfig) -> Result<SplitReport, PrepError> {
    split_train_test_with_progress(config, &mut NoProgress)
}

pub fn split_train_test_with_progress(
    config: &TrainTestSplitConfig,
    progress: &mut dyn ProgressReporter,
) -> Result<SplitReport, PrepError> {
    let mut rng = make_rng(config.seed);
    let classes = class_dirs(&config.raw_root)?;
    progress.start(classes.len());

    let mut report = SplitReport::default();
    for class in classes {
        let train_dir = config.train_root.join(&class.label);
        let test_dir = config.test_root.join(&class.label);
        fs::create_dir_all(&train_dir)?;
        fs::create_dir_all(&test_dir)?;

        let mut files = wav_files(&class.path)?;
        files.shuffle(&mut rng);
        let n_train = share(files.len(), config.train_ratio);
        let (train, test) = files.split_at(n_train);
        move_all(train, &train_dir)?;
        move_all(test, &test_dir)?;

        info!(
            "class '{}': {} file(s) to train, {} file(s) to test",
            class.label,
            train.len(),
            test.len()
        );
        report.classes.push(ClassSplit {
            class: class.label,
            original: files.len(),
            moved_to_train: train.len(),
            moved_to_test: test.len(),
            remaining: 0,
        });
        progress.advance(&class.path);
    }

    progress.finish();
    Ok(report)
}

fn validate_ratio(ratio: f64) -> Result<f64, PrepError> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(PrepError::InvalidRatio(ratio))
    }
}

/// `floor(count × ratio)`, the truncating share used by both splitters.
fn share(count: usize, ratio: f64) -> usize {
    ((count as f64 * ratio).floor() as usize).min(count)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn move_all<I, P>(files: I, dest_dir: &Path) -> Result<(), PrepError>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    for file in files {
        let dest = move_into(file.as_ref(), dest_dir)?;
        debug!("moved '{}' -> '{}'", file.as_ref().display(), dest.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn share_truncates_towards_zero() {
        assert_eq!(share(10, 0.1), 1);
        assert_eq!(share(9, 0.1), 0);
        assert_eq!(share(10, 0.8), 8);
        assert_eq!(share(7, 0.8), 5);
        assert_eq!(share(0, 0.5), 0);
        assert_eq!(share(3, 1.0), 3);
    }

    #[test]
    fn ratios_outside_unit_interval_are_rejected() {
        assert!(matches!(
            TestSplitConfig::new("raw", "test", 1.5),
            Err(PrepError::InvalidRatio(_))
        ));
        assert!(matches!(
            TrainTestSplitConfig::new("raw", "train", "test", -0.1),
            Err(PrepError::InvalidRatio(_))
        ));
        assert!(TrainTestSplitConfig::new("raw", "train", "test", f64::NAN).is_err());
    }
}
