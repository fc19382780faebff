//! Caller-facing codec configuration
//!
//! [`CodecConfig`] describes a stream in the terms a caller knows (sample
//! rate in Hz, channel count, bitpool) and produces a checked
//! [`FrameDescriptor`]. It also carries the A2DP recommended presets.

use crate::error::{ConfigError, ConfigResult};
use crate::frame::{AllocationMethod, ChannelMode, FrameDescriptor, Frequency};

/// Sample rates with an SBC frequency code
pub const SUPPORTED_SAMPLE_RATES: [u32; 4] = [16_000, 32_000, 44_100, 48_000];

/// Configuration of an SBC stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Channel coding mode
    pub channel_mode: ChannelMode,
    /// Bit allocation method
    pub allocation: AllocationMethod,
    /// Blocks per frame
    pub blocks: u8,
    /// Subbands per block
    pub subbands: u8,
    /// Bit budget per frame
    pub bitpool: u8,
    /// Use the fixed mSBC profile
    pub msbc: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::a2dp_high_quality(44_100, 2)
    }
}

impl CodecConfig {
    /// A2DP high quality: 16 blocks, 8 subbands, loudness, joint stereo for
    /// two channels
    pub fn a2dp_high_quality(sample_rate: u32, channels: u16) -> Self {
        let bitpool = match (sample_rate, channels) {
            (48_000, 1) => 29,
            (_, 1) => 31,
            (48_000, _) => 51,
            _ => 53,
        };
        Self::a2dp(sample_rate, channels, bitpool)
    }

    /// A2DP middle quality
    pub fn a2dp_middle_quality(sample_rate: u32, channels: u16) -> Self {
        let bitpool = match (sample_rate, channels) {
            (48_000, 1) => 18,
            (_, 1) => 19,
            (48_000, _) => 33,
            _ => 35,
        };
        Self::a2dp(sample_rate, channels, bitpool)
    }

    fn a2dp(sample_rate: u32, channels: u16, bitpool: u8) -> Self {
        let channel_mode = if channels == 1 {
            ChannelMode::Mono
        } else {
            ChannelMode::JointStereo
        };
        Self {
            sample_rate,
            channel_mode,
            allocation: AllocationMethod::Loudness,
            blocks: 16,
            subbands: 8,
            bitpool,
            msbc: false,
        }
    }

    /// Wideband speech profile
    pub fn msbc() -> Self {
        let desc = FrameDescriptor::msbc();
        Self {
            sample_rate: desc.sample_rate(),
            channel_mode: desc.mode,
            allocation: desc.allocation,
            blocks: desc.blocks,
            subbands: desc.subbands,
            bitpool: desc.bitpool,
            msbc: true,
        }
    }

    pub fn with_channel_mode(mut self, mode: ChannelMode) -> Self {
        self.channel_mode = mode;
        self
    }

    pub fn with_allocation(mut self, allocation: AllocationMethod) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn with_blocks(mut self, blocks: u8) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn with_subbands(mut self, subbands: u8) -> Self {
        self.subbands = subbands;
        self
    }

    pub fn with_bitpool(mut self, bitpool: u8) -> Self {
        self.bitpool = bitpool;
        self
    }

    /// Number of PCM channels the configuration expects
    pub fn channels(&self) -> u16 {
        self.channel_mode.channels() as u16
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        self.descriptor().map(|_| ())
    }

    /// Check that a PCM source with `channels` channels fits this configuration
    pub fn validate_channels(&self, channels: u16) -> ConfigResult<()> {
        if channels as usize != self.channel_mode.channels() {
            return Err(ConfigError::InvalidChannels {
                mode: self.channel_mode,
                channels,
            });
        }
        Ok(())
    }

    /// Build the frame descriptor, reporting the first rule that fails
    pub fn descriptor(&self) -> ConfigResult<FrameDescriptor> {
        if self.msbc {
            return Ok(FrameDescriptor::msbc());
        }
        let frequency = Frequency::from_hz(self.sample_rate)
            .ok_or(ConfigError::UnsupportedSampleRate(self.sample_rate))?;
        let desc = FrameDescriptor {
            msbc: false,
            frequency,
            mode: self.channel_mode,
            allocation: self.allocation,
            blocks: self.blocks,
            subbands: self.subbands,
            bitpool: self.bitpool,
        };
        desc.validate()?;
        Ok(desc)
    }
}
