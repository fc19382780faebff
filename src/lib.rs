//! # Rust SBC Codec
//!
//! A pure Rust, fixed-point implementation of the Sub-Band Codec used by
//! Bluetooth A2DP, including the mSBC wideband speech profile of HFP.
//! Encoding and decoding work one frame at a time; filter history persists in
//! the [`Encoder`] and [`Decoder`] instances between calls.
//!

pub mod allocation;
pub mod analysis;
pub mod bitstream;
pub mod config;
pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod pcm_utils;
pub mod synthesis;
pub mod tables;
pub mod util;

#[cfg(feature = "diagnostics")]
pub mod diagnostics;

#[cfg(test)]
mod tests;

pub use config::{CodecConfig, SUPPORTED_SAMPLE_RATES};
pub use decoder::{DecodedFrame, Decoder, FrameInfo};
pub use encoder::Encoder;
pub use error::{
    ConfigError, ErrorKind, FrameError, InputDataError, Result, SbcError,
};
pub use frame::{AllocationMethod, ChannelMode, FrameDescriptor, FrameScanner, Frequency};
