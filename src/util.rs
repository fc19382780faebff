//! WAV file input and output for the command line tool
//!
//! Uses hound for RIFF parsing. Only 16-bit integer PCM is accepted, which
//! is the only sample format the codec consumes.

use std::fmt;
use std::path::Path;

/// Error type for utility operations
#[derive(Debug)]
pub enum UtilError {
    /// I/O or RIFF parsing failed
    Wav(hound::Error),
    /// Validation error
    ValidationError(String),
}

impl fmt::Display for UtilError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtilError::Wav(err) => write!(f, "WAV error: {}", err),
            UtilError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for UtilError {}

impl From<hound::Error> for UtilError {
    fn from(err: hound::Error) -> Self {
        UtilError::Wav(err)
    }
}

/// Result type for utility operations
pub type UtilResult<T> = std::result::Result<T, UtilError>;

/// Interleaved PCM read from a WAV file
#[derive(Debug, Clone)]
pub struct WavData {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Read a 16-bit PCM WAV file
pub fn read_wav_file<P: AsRef<Path>>(file_path: P) -> UtilResult<WavData> {
    let mut reader = hound::WavReader::open(file_path)?;

    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(UtilError::ValidationError(format!(
            "Unsupported sample format: {:?} {} bit (expected 16-bit integer PCM)",
            spec.sample_format, spec.bits_per_sample
        )));
    }

    let samples = reader.samples::<i16>().collect::<Result<Vec<i16>, _>>()?;
    if samples.is_empty() {
        return Err(UtilError::ValidationError(
            "No audio data found in WAV file".to_string(),
        ));
    }

    Ok(WavData {
        samples,
        sample_rate: spec.sample_rate,
        channels: spec.channels,
    })
}

/// Write interleaved 16-bit PCM to a WAV file
pub fn write_wav_file<P: AsRef<Path>>(
    file_path: P,
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
) -> UtilResult<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(file_path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}
