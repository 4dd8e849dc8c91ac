use std::fs::File;
use std::ops::Range;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::get_probe;

use crate::PrepError;

/// Decoded PCM payload, kept in the widest type of its sample format so it can
/// be written back with the source's bit depth.
enum Samples {
    Int(Vec<i32>),
    Float(Vec<f32>),
}

/// A WAV recording held in memory.
pub(crate) struct Recording {
    spec: WavSpec,
    samples: Samples,
}

impl Recording {
    pub fn open(path: &Path) -> Result<Self, PrepError> {
        let reader = WavReader::open(path)?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(PrepError::MissingSampleRate);
        }

        let samples = match spec.sample_format {
            SampleFormat::Int => {
                Samples::Int(reader.into_samples::<i32>().collect::<Result<_, _>>()?)
            }
            SampleFormat::Float => {
                Samples::Float(reader.into_samples::<f32>().collect::<Result<_, _>>()?)
            }
        };

        Ok(Self { spec, samples })
    }

    pub fn sample_rate(&self) -> u32 {
        self.spec.sample_rate
    }

    pub fn frames(&self) -> u64 {
        let channels = usize::from(self.spec.channels.max(1));
        let len = match &self.samples {
            Samples::Int(samples) => samples.len(),
            Samples::Float(samples) => samples.len(),
        };
        (len / channels) as u64
    }

    pub fn duration_ms(&self) -> u64 {
        frames_to_ms(self.frames(), self.spec.sample_rate)
    }

    /// Write the frames in `frames` to `path` with the source's format.
    pub fn write_frames(&self, path: &Path, frames: Range<u64>) -> Result<(), PrepError> {
        let channels = u64::from(self.spec.channels);
        let end = frames.end.min(self.frames());
        let start = (frames.start.min(end) * channels) as usize;
        let end = (end * channels) as usize;

        let mut writer = WavWriter::create(path, self.spec)?;
        match &self.samples {
            Samples::Int(samples) => {
                for &sample in &samples[start..end] {
                    writer.write_sample(sample)?;
                }
            }
            Samples::Float(samples) => {
                for &sample in &samples[start..end] {
                    writer.write_sample(sample)?;
                }
            }
        }
        writer.finalize()?;
        Ok(())
    }

    pub fn write_all(&self, path: &Path) -> Result<(), PrepError> {
        self.write_frames(path, 0..self.frames())
    }
}

/// Read the duration of a WAV file from its header without decoding samples.
pub(crate) fn probe_duration_ms(path: &Path) -> Result<u64, PrepError> {
    let mut hint = Hint::new();
    hint.with_extension("wav");

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let track = probed
        .format
        .default_track()
        .ok_or(PrepError::MissingDefaultTrack)?;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(PrepError::MissingSampleRate)?;
    let frames = track
        .codec_params
        .n_frames
        .ok_or(PrepError::UnknownDuration)?;

    Ok(frames_to_ms(frames, sample_rate))
}

/// Duration of `frames` at `sample_rate` in milliseconds, rounded to the
/// nearest value with ties going to the even one.
pub(crate) fn frames_to_ms(frames: u64, sample_rate: u32) -> u64 {
    let rate = u64::from(sample_rate);
    let scaled = frames * 1_000;
    let (ms, rem) = (scaled / rate, scaled % rate);
    if 2 * rem > rate || (2 * rem == rate && ms % 2 == 1) {
        ms + 1
    } else {
        ms
    }
}

/// Index of the frame at `ms` milliseconds, truncated.
pub(crate) fn ms_to_frame(ms: u64, sample_rate: u32) -> u64 {
    ms * u64::from(sample_rate) / 1_000
}
