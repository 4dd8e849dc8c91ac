//! Preparation utilities for audio classification datasets laid out as
//! `<root>/<class_label>/<file>`.
//!
//! The crate offers four independent operations:
//!
//! * [`split_test_set`] moves a random share of each class into a test tree.
//! * [`split_train_test`] partitions each class into train and test trees.
//! * [`standardize_filenames`] renames files to `<class>_<NNN>.<ext>`.
//! * [`chunk_directory`] cuts long WAV recordings into fixed-length chunks.

use std::path::PathBuf;

use thiserror::Error;

pub mod chunk;
mod dataset;
pub mod progress;
pub mod split;
pub mod standardize;
mod wav;

pub use chunk::{
    chunk_directory, chunk_directory_with_progress, plan_chunks, plan_directory, ChunkConfig,
    ChunkConfigBuilder, ChunkFailure, ChunkPlan, ChunkReport, ChunkSpan, PlannedOutput,
};
pub use progress::{NoProgress, ProgressReporter};
pub use split::{
    split_test_set, split_test_set_with_progress, split_train_test,
    split_train_test_with_progress, ClassSplit, SplitReport, TestSplitConfig,
    TrainTestSplitConfig,
};
pub use standardize::{
    plan_renames, standardize_filenames, standardize_filenames_with_progress, Rename,
    StandardizeConfig, StandardizeReport,
};

/// Errors that can occur while preparing a dataset.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Wrapper around IO errors encountered while reading, moving or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper around errors produced while reading or writing WAV data.
    #[error(transparent)]
    Wav(#[from] hound::Error),

    /// Wrapper around errors produced by the Symphonia probing library.
    #[error(transparent)]
    Probe(#[from] symphonia::core::errors::Error),

    /// Error returned when a split ratio lies outside `[0, 1]`.
    #[error("split ratio must be between 0 and 1, got {0}")]
    InvalidRatio(f64),

    /// Error returned when the chunk length is zero.
    #[error("chunk length must be greater than zero milliseconds")]
    InvalidChunkLength,

    /// Error returned when the chunk output directory name would not create a
    /// fresh subdirectory of the source directory.
    #[error("output directory name must be a single path component other than '.' or '..', got '{0}'")]
    InvalidOutputName(String),

    /// Error returned when a directory the operation reads from does not exist.
    #[error("directory does not exist: {}", .0.display())]
    MissingDirectory(PathBuf),

    /// Error produced when a class label or file name is not valid UTF-8.
    #[error("cannot derive a name from '{}'", .0.display())]
    InvalidName(PathBuf),

    /// Error returned when a move would overwrite an existing file.
    #[error("destination path already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// Error returned when a standardised name is already taken by another file.
    #[error("cannot rename '{}' to '{}': target is occupied by another file", .from.display(), .to.display())]
    RenameCollision { from: PathBuf, to: PathBuf },

    /// Error returned when a WAV header does not advertise a sample rate.
    #[error("input stream does not advertise a sample rate")]
    MissingSampleRate,

    /// Error returned when the container does not expose any default track.
    #[error("input stream does not provide a default track")]
    MissingDefaultTrack,

    /// Error returned when the header does not state the number of frames.
    #[error("input stream does not advertise its length")]
    UnknownDuration,
}
