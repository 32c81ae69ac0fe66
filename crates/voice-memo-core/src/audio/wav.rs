use crate::{CoreResult, MemoError, audio::QualityProfile};

use std::{fs::File, io::BufWriter, panic::Location, path::Path};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, info};

/// Decoded payload mixed down to mono.
#[derive(Debug, Clone)]
pub(crate) struct MonoClip {
    pub(crate) samples: Vec<f32>,
    pub(crate) sample_rate: u32,
}

impl MonoClip {
    pub(crate) fn duration_ms(&self) -> u64 {
        frames_to_ms(self.samples.len() as u64, self.sample_rate)
    }
}

pub(crate) fn frames_to_ms(frames: u64, sample_rate: u32) -> u64 {
    if sample_rate == 0 {
        return 0;
    }
    frames * 1000 / u64::from(sample_rate)
}

/// Read a WAV file and average its channels into one.
#[track_caller]
pub(crate) fn read_mono(path: &Path) -> CoreResult<MonoClip> {
    let reader = WavReader::open(path).map_err(|e| MemoError::ResourceAcquireFailed {
        reason: format!("Failed to open {}: {}", path.display(), e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>(),
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
        }
    }
    .map_err(|e| MemoError::ResourceAcquireFailed {
        reason: format!("Failed to decode {}: {}", path.display(), e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    let channels = usize::from(spec.channels.max(1));
    let samples: Vec<f32> = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    info!(
        path = %path.display(),
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        frames = samples.len(),
        "Payload decoded"
    );

    Ok(MonoClip {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Streaming WAV writer for one capture.
pub(crate) struct PayloadWriter {
    writer: WavWriter<BufWriter<File>>,
    profile: QualityProfile,
    channels: usize,
    frames: u64,
}

impl PayloadWriter {
    /// Create the payload file for a device producing `channels` at `sample_rate`.
    #[track_caller]
    pub(crate) fn create(
        path: &Path,
        profile: QualityProfile,
        sample_rate: u32,
        channels: u16,
    ) -> CoreResult<Self> {
        let spec = match profile {
            QualityProfile::High => WavSpec {
                channels,
                sample_rate,
                bits_per_sample: 32,
                sample_format: SampleFormat::Float,
            },
            QualityProfile::Minimal => WavSpec {
                channels: 1,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
        };

        let writer = WavWriter::create(path, spec).map_err(|e| MemoError::ResourceAcquireFailed {
            reason: format!("Failed to create {}: {}", path.display(), e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(path = %path.display(), ?profile, "Payload file created");

        Ok(Self {
            writer,
            profile,
            channels: usize::from(channels.max(1)),
            frames: 0,
        })
    }

    /// Append a block of interleaved device samples.
    pub(crate) fn write_block(&mut self, block: &[f32]) -> Result<(), hound::Error> {
        match self.profile {
            QualityProfile::High => {
                for &sample in block {
                    self.writer.write_sample(sample)?;
                }
            }
            QualityProfile::Minimal => {
                for frame in block.chunks(self.channels) {
                    let mono = frame.iter().sum::<f32>() / frame.len() as f32;
                    let value = (mono.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                    self.writer.write_sample(value)?;
                }
            }
        }
        self.frames += (block.len() / self.channels) as u64;
        Ok(())
    }

    /// Write the header and close the file. Returns the frame count.
    pub(crate) fn finish(self) -> Result<u64, hound::Error> {
        let frames = self.frames;
        self.writer.finalize()?;
        Ok(frames)
    }
}
