#![allow(dead_code)]

use std::error::Error;
use std::f32::consts::TAU;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use audioprep_core::ProgressReporter;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

pub const SAMPLE_RATE: u32 = 8_000;

pub fn mono_16bit() -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Synthesise a 440 Hz tone so no binary fixtures need to live in the repo.
pub fn write_tone<P: AsRef<Path>>(
    path: P,
    spec: WavSpec,
    duration_ms: u64,
) -> Result<(), Box<dyn Error>> {
    let frames = u64::from(spec.sample_rate) * duration_ms / 1_000;
    let mut writer = WavWriter::create(path, spec)?;

    for n in 0..frames {
        let value = (n as f32 / spec.sample_rate as f32 * TAU * 440.0).sin() * 0.5;
        for _ in 0..spec.channels {
            match spec.sample_format {
                SampleFormat::Float => writer.write_sample(value)?,
                SampleFormat::Int => {
                    let max = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
                    writer.write_sample((value * max) as i32)?;
                }
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

/// Duration of a WAV file in milliseconds, computed from its frame count.
pub fn wav_duration_ms<P: AsRef<Path>>(path: P) -> Result<u64, Box<dyn Error>> {
    let reader = WavReader::open(path)?;
    let rate = u64::from(reader.spec().sample_rate);
    Ok(u64::from(reader.duration()) * 1_000 / rate)
}

/// Create empty placeholder files; the splitters never look inside them.
pub fn touch_all(dir: &Path, names: &[&str]) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(dir)?;
    for name in names {
        File::create(dir.join(name))?;
    }
    Ok(())
}

pub fn numbered_wavs(prefix: &str, count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("{prefix}_{n:02}.wav")).collect()
}

/// Sorted file names directly inside `dir`; empty when `dir` does not exist.
pub fn file_names(dir: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names: Vec<String> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<_, _>>()?;
    names.sort();
    Ok(names)
}

/// Reporter that keeps every notification for later assertions.
#[derive(Default)]
pub struct RecordingProgress {
    pub total: Option<usize>,
    pub items: Vec<PathBuf>,
    pub finished: bool,
}

impl ProgressReporter for RecordingProgress {
    fn start(&mut self, total: usize) {
        self.total = Some(total);
    }

    fn advance(&mut self, item: &Path) {
        self.items.push(item.to_path_buf());
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}
