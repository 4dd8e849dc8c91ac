//! Fixed-length chunking of WAV recordings.
//!
//! Every `.wav` file directly inside the source directory, dot-files included,
//! is either cut into consecutive chunks of the configured length or, when it
//! is not longer than one chunk, re-exported unchanged. Outputs land in a sibling directory
//! (`chunked` by default) below the source directory; sources are never
//! modified. A file that fails to decode or write is reported and skipped.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{error, info, warn};

use crate::dataset::recordings;
use crate::progress::{NoProgress, ProgressReporter};
use crate::wav::{ms_to_frame, probe_duration_ms, Recording};
use crate::PrepError;

pub const DEFAULT_CHUNK_LENGTH: Duration = Duration::from_secs(30);
pub const DEFAULT_MIN_TAIL: Duration = Duration::from_millis(1_000);
pub const DEFAULT_OUTPUT_DIR: &str = "chunked";

/// Configuration for [`chunk_directory`].
#[derive(Clone, Debug)]
pub struct ChunkConfig {
    /// Directory scanned (non-recursively) for `.wav` files.
    pub source_dir: PathBuf,
    /// Name of the output directory created below `source_dir`.
    pub output_dir_name: String,
    /// Length of every chunk but the last.
    pub chunk_length: Duration,
    /// A final chunk shorter than this is dropped.
    pub min_tail: Duration,
}

impl ChunkConfig {
    pub fn new<P: Into<PathBuf>>(
        source_dir: P,
        chunk_length: Duration,
    ) -> Result<Self, PrepError> {
        Self::builder(source_dir, chunk_length).build()
    }

    pub fn builder<P: Into<PathBuf>>(
        source_dir: P,
        chunk_length: Duration,
    ) -> ChunkConfigBuilder {
        ChunkConfigBuilder {
            source_dir: source_dir.into(),
            output_dir_name: DEFAULT_OUTPUT_DIR.to_owned(),
            chunk_length,
            min_tail: DEFAULT_MIN_TAIL,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.source_dir.join(&self.output_dir_name)
    }

    fn chunk_ms(&self) -> u64 {
        duration_to_millis(self.chunk_length)
    }

    fn min_tail_ms(&self) -> u64 {
        duration_to_millis(self.min_tail)
    }
}

/// Builder for [`ChunkConfig`].
#[derive(Clone, Debug)]
pub struct ChunkConfigBuilder {
    source_dir: PathBuf,
    output_dir_name: String,
    chunk_length: Duration,
    min_tail: Duration,
}

impl ChunkConfigBuilder {
    pub fn output_dir_name<S: Into<String>>(mut self, name: S) -> Self {
        self.output_dir_name = name.into();
        self
    }

    pub fn min_tail(mut self, min_tail: Duration) -> Self {
        self.min_tail = min_tail;
        self
    }

    pub fn build(self) -> Result<ChunkConfig, PrepError> {
        if duration_to_millis(self.chunk_length) == 0 {
            return Err(PrepError::InvalidChunkLength);
        }
        if !is_plain_dir_name(&self.output_dir_name) {
            return Err(PrepError::InvalidOutputName(self.output_dir_name));
        }

        Ok(ChunkConfig {
            source_dir: self.source_dir,
            output_dir_name: self.output_dir_name,
            chunk_length: self.chunk_length,
            min_tail: self.min_tail,
        })
    }
}

/// One slice `[start_ms, end_ms)` of a recording.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Zero-based position of the chunk along the timeline.
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
    /// `false` for a final chunk shorter than the short-tail floor.
    pub kept: bool,
}

impl ChunkSpan {
    pub fn len_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }

    /// One-based number used in the chunk's file name.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// Lay out `ceil(duration_ms / chunk_ms)` consecutive spans covering
/// `[0, duration_ms)`.
///
/// Every span is `chunk_ms` long except the last, which ends at
/// `duration_ms` and is marked as not kept when shorter than `min_tail_ms`.
pub fn plan_chunks(duration_ms: u64, chunk_ms: u64, min_tail_ms: u64) -> Vec<ChunkSpan> {
    if chunk_ms == 0 {
        return Vec::new();
    }

    let count = duration_ms.div_ceil(chunk_ms) as usize;
    (0..count)
        .map(|index| {
            let start_ms = index as u64 * chunk_ms;
            let end_ms = (start_ms + chunk_ms).min(duration_ms);
            let is_last = index + 1 == count;
            ChunkSpan {
                index,
                start_ms,
                end_ms,
                kept: !(is_last && end_ms - start_ms < min_tail_ms),
            }
        })
        .collect()
}

/// A source file that could not be processed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Summary of a [`chunk_directory`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkReport {
    /// Sources longer than one chunk.
    pub chunked: usize,
    /// Sources re-exported unchanged.
    pub copied: usize,
    /// Every file written to the output directory, in write order.
    pub written: Vec<PathBuf>,
    /// Final chunks dropped by the short-tail rule.
    pub dropped_tails: usize,
    pub failures: Vec<ChunkFailure>,
}

/// Files a chunk run would write for one source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannedOutput {
    pub source: PathBuf,
    pub duration_ms: u64,
    pub outputs: Vec<PathBuf>,
}

/// Result of [`plan_directory`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChunkPlan {
    pub files: Vec<PlannedOutput>,
    pub failures: Vec<ChunkFailure>,
}

enum Outcome {
    Chunked { written: Vec<PathBuf>, dropped_tail: bool },
    Copied(PathBuf),
}

/// Chunk every `.wav` file in `config.source_dir`.
pub fn chunk_directory(config: &ChunkConfig) -> Result<ChunkReport, PrepError> {
    chunk_directory_with_progress(config, &mut NoProgress)
}

pub fn chunk_directory_with_progress(
    config: &ChunkConfig,
    progress: &mut dyn ProgressReporter,
) -> Result<ChunkReport, PrepError> {
    if !config.source_dir.is_dir() {
        return Err(PrepError::MissingDirectory(config.source_dir.clone()));
    }

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir)?;

    let files = recordings(&config.source_dir)?;
    progress.start(files.len());

    let mut report = ChunkReport::default();
    for path in files {
        match chunk_file(config, &path, &output_dir) {
            Ok(Outcome::Chunked {
                written,
                dropped_tail,
            }) => {
                report.chunked += 1;
                report.written.extend(written);
                if dropped_tail {
                    report.dropped_tails += 1;
                }
            }
            Ok(Outcome::Copied(dest)) => {
                report.copied += 1;
                report.written.push(dest);
            }
            Err(err) => {
                error!("failed to process '{}': {err}", display_name(&path));
                report.failures.push(ChunkFailure {
                    path: path.clone(),
                    message: err.to_string(),
                });
            }
        }
        progress.advance(&path);
    }

    progress.finish();
    info!(
        "chunked {} file(s), copied {} file(s), {} failure(s); output in '{}'",
        report.chunked,
        report.copied,
        report.failures.len(),
        output_dir.display()
    );
    Ok(report)
}

/// List what [`chunk_directory`] would write, reading only WAV headers.
///
/// Nothing is created on disk. Files whose header cannot be probed are
/// reported as failures.
pub fn plan_directory(config: &ChunkConfig) -> Result<ChunkPlan, PrepError> {
    if !config.source_dir.is_dir() {
        return Err(PrepError::MissingDirectory(config.source_dir.clone()));
    }

    let output_dir = config.output_dir();
    let mut plan = ChunkPlan::default();
    for path in recordings(&config.source_dir)? {
        let planned = probe_duration_ms(&path).and_then(|duration_ms| {
            let outputs = output_names(config, &path, duration_ms)?
                .into_iter()
                .map(|name| output_dir.join(name))
                .collect();
            Ok(PlannedOutput {
                source: path.clone(),
                duration_ms,
                outputs,
            })
        });
        match planned {
            Ok(planned) => plan.files.push(planned),
            Err(err) => {
                error!("failed to probe '{}': {err}", display_name(&path));
                plan.failures.push(ChunkFailure {
                    path,
                    message: err.to_string(),
                });
            }
        }
    }

    Ok(plan)
}

fn chunk_file(config: &ChunkConfig, path: &Path, output_dir: &Path) -> Result<Outcome, PrepError> {
    let recording = Recording::open(path)?;
    let duration_ms = recording.duration_ms();
    let chunk_ms = config.chunk_ms();
    let name = display_name(path);

    if duration_ms <= chunk_ms {
        let dest = output_dir.join(file_name(path)?);
        recording.write_all(&dest)?;
        info!(
            "'{name}' ({:.1}s) fits in one chunk, copied unchanged",
            duration_ms as f64 / 1_000.0
        );
        return Ok(Outcome::Copied(dest));
    }

    let spans = plan_chunks(duration_ms, chunk_ms, config.min_tail_ms());
    info!(
        "'{name}' ({:.1}s) is split into {} chunk(s)",
        duration_ms as f64 / 1_000.0,
        spans.len()
    );

    let stem = file_stem(path)?;
    let rate = recording.sample_rate();
    let last = spans.len() - 1;
    let mut written = Vec::with_capacity(spans.len());
    let mut dropped_tail = false;
    for span in spans {
        if !span.kept {
            warn!(
                "dropping chunk {} of '{name}': {} ms is below the {} ms floor",
                span.number(),
                span.len_ms(),
                config.min_tail_ms()
            );
            dropped_tail = true;
            continue;
        }

        let start = ms_to_frame(span.start_ms, rate);
        let end = if span.index == last {
            recording.frames()
        } else {
            ms_to_frame(span.end_ms, rate)
        };
        let dest = output_dir.join(chunk_file_name(stem, span.number()));
        recording.write_frames(&dest, start..end)?;
        written.push(dest);
    }

    Ok(Outcome::Chunked {
        written,
        dropped_tail,
    })
}

fn output_names(
    config: &ChunkConfig,
    path: &Path,
    duration_ms: u64,
) -> Result<Vec<String>, PrepError> {
    let chunk_ms = config.chunk_ms();
    if duration_ms <= chunk_ms {
        return Ok(vec![file_name(path)?.to_owned()]);
    }

    let stem = file_stem(path)?;
    Ok(plan_chunks(duration_ms, chunk_ms, config.min_tail_ms())
        .into_iter()
        .filter(|span| span.kept)
        .map(|span| chunk_file_name(stem, span.number()))
        .collect())
}

fn chunk_file_name(stem: &str, number: usize) -> String {
    format!("{stem}_chunk_{number}.wav")
}

fn file_name(path: &Path) -> Result<&str, PrepError> {
    path.file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PrepError::InvalidName(path.to_path_buf()))
}

fn file_stem(path: &Path) -> Result<&str, PrepError> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| PrepError::InvalidName(path.to_path_buf()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// The output directory must be a single new component below the source,
/// never the source itself or its parent.
fn is_plain_dir_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.chars().any(std::path::is_separator)
}

fn duration_to_millis(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lengths(spans: &[ChunkSpan]) -> Vec<u64> {
        spans.iter().map(ChunkSpan::len_ms).collect()
    }

    #[test]
    fn seventy_five_seconds_keeps_short_final_chunk() {
        let spans = plan_chunks(75_000, 30_000, 1_000);
        assert_eq!(lengths(&spans), [30_000, 30_000, 15_000]);
        assert!(spans.iter().all(|span| span.kept));
    }

    #[test]
    fn tail_below_floor_is_not_kept() {
        let spans = plan_chunks(30_050, 30_000, 1_000);
        assert_eq!(lengths(&spans), [30_000, 50]);
        assert!(spans[0].kept);
        assert!(!spans[1].kept);
    }

    #[test]
    fn tail_exactly_at_floor_is_kept() {
        let spans = plan_chunks(31_000, 30_000, 1_000);
        assert_eq!(lengths(&spans), [30_000, 1_000]);
        assert!(spans[1].kept);
    }

    #[test]
    fn spans_are_contiguous_and_cover_duration() {
        for duration in [1u64, 999, 30_000, 30_001, 61_234, 600_000] {
            let spans = plan_chunks(duration, 30_000, 1_000);
            assert_eq!(spans.len() as u64, duration.div_ceil(30_000));
            assert_eq!(spans.first().map(|s| s.start_ms), Some(0));
            for pair in spans.windows(2) {
                assert_eq!(pair[0].end_ms, pair[1].start_ms);
            }
            assert_eq!(lengths(&spans).iter().sum::<u64>(), duration);
        }
    }

    #[test]
    fn only_the_final_span_can_be_dropped() {
        let spans = plan_chunks(90_500, 30_000, 1_000);
        let dropped: Vec<_> = spans.iter().filter(|s| !s.kept).map(|s| s.index).collect();
        assert_eq!(dropped, [3]);
    }

    #[test]
    fn chunk_file_names_are_one_based() {
        let spans = plan_chunks(61_000, 30_000, 1_000);
        let names: Vec<_> = spans
            .iter()
            .map(|span| chunk_file_name("dog_bark_001", span.number()))
            .collect();
        assert_eq!(
            names,
            [
                "dog_bark_001_chunk_1.wav",
                "dog_bark_001_chunk_2.wav",
                "dog_bark_001_chunk_3.wav"
            ]
        );
    }

    #[test]
    fn builder_rejects_zero_chunk_length() {
        let err = ChunkConfig::new("raw", Duration::from_micros(500)).unwrap_err();
        assert!(matches!(err, PrepError::InvalidChunkLength));
    }

    #[test]
    fn builder_rejects_output_names_outside_the_source() {
        for name in ["", ".", "..", "a/b", "../chunked"] {
            let err = ChunkConfig::builder("raw", DEFAULT_CHUNK_LENGTH)
                .output_dir_name(name)
                .build()
                .unwrap_err();
            assert!(
                matches!(&err, PrepError::InvalidOutputName(n) if n == name),
                "accepted {name:?}"
            );
        }
        assert!(ChunkConfig::builder("raw", DEFAULT_CHUNK_LENGTH)
            .output_dir_name("..chunks")
            .build()
            .is_ok());
    }

    #[test]
    fn builder_applies_defaults() {
        let config = ChunkConfig::new("raw", DEFAULT_CHUNK_LENGTH).unwrap();
        assert_eq!(config.output_dir(), Path::new("raw").join("chunked"));
        assert_eq!(config.min_tail, DEFAULT_MIN_TAIL);
    }
}
