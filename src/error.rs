//! Error types for the SBC codec
//!
//! This module defines all error types used by the encoder and decoder.
//! Every failure is local to one frame: callers drop the frame and carry on
//! with the next one.

use thiserror::Error;

use crate::frame::ChannelMode;

/// Main error type for the SBC codec
#[derive(Debug, Error)]
pub enum SbcError {
    /// Frame descriptor or configuration rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// PCM input rejected by the encoder
    #[error("Input data error: {0}")]
    InputData(#[from] InputDataError),

    /// Encoded frame rejected by the decoder
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// The bitstream ran past its buffer
    #[error("Bitstream overrun: {bits} bits needed, buffer holds {capacity} bits")]
    BitstreamOverrun { bits: usize, capacity: usize },
}

/// Coarse classification of codec failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedHeader,
    BufferTooShort,
    ChecksumMismatch,
    InvalidConfiguration,
}

impl SbcError {
    /// Map this error onto one of the four failure kinds.
    ///
    /// Encoder-side input problems and write overruns count as invalid
    /// configuration; a reader overrun means the buffer was too short.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SbcError::Config(_) | SbcError::InputData(_) => ErrorKind::InvalidConfiguration,
            SbcError::Frame(FrameError::BufferTooShort { .. }) => ErrorKind::BufferTooShort,
            SbcError::Frame(FrameError::ChecksumMismatch { .. }) => ErrorKind::ChecksumMismatch,
            SbcError::Frame(_) => ErrorKind::MalformedHeader,
            SbcError::BitstreamOverrun { .. } => ErrorKind::BufferTooShort,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Sample rate has no SBC frequency code
    #[error("Unsupported sample rate: {0} Hz")]
    UnsupportedSampleRate(u32),

    /// Block count outside 4/8/12/16
    #[error("Invalid block count: {0} (expected 4, 8, 12 or 16)")]
    InvalidBlocks(u8),

    /// Subband count outside 4/8
    #[error("Invalid subband count: {0} (expected 4 or 8)")]
    InvalidSubbands(u8),

    /// Bitpool larger than the frame can carry
    #[error("Bitpool {bitpool} exceeds maximum {max} for this frame layout")]
    BitpoolTooLarge { bitpool: u8, max: u32 },

    /// Channel count incompatible with the channel mode
    #[error("Channel mode {mode:?} cannot carry {channels} channels")]
    InvalidChannels { mode: ChannelMode, channels: u16 },
}

/// PCM input validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputDataError {
    /// Not enough samples for one frame
    #[error("Invalid PCM data length: expected {expected} samples, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Two-channel mode without right channel samples
    #[error("Channel mode {0:?} requires a right channel")]
    MissingRightChannel(ChannelMode),
}

/// Encoded frame validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Buffer shorter than the header or the declared frame size
    #[error("Buffer too short: expected {expected} bytes, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },

    /// Unknown syncword
    #[error("Invalid syncword 0x{0:02X}")]
    InvalidSyncword(u8),

    /// mSBC reserved field was not zero
    #[error("Non-zero mSBC reserved bits")]
    ReservedBits,

    /// Header decoded to a descriptor that fails validation
    #[error("Malformed header: {0}")]
    MalformedHeader(#[from] ConfigError),

    /// CRC byte does not match the recomputed checksum
    #[error("Checksum mismatch: header carries 0x{expected:02X}, computed 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },
}

/// Specialized result types for different modules
pub type Result<T> = std::result::Result<T, SbcError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type InputResult<T> = std::result::Result<T, InputDataError>;
pub type FrameResult<T> = std::result::Result<T, FrameError>;
