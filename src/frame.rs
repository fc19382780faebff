//! Frame descriptor and header codec
//!
//! A [`FrameDescriptor`] carries everything the 4-byte SBC header encodes,
//! plus the mSBC flag. It owns the validity rules, the maximum bitpool and
//! the exact frame size formula shared by encoder and decoder.

use log::{debug, warn};

use crate::bitstream::{BitReader, BitWriter};
use crate::error::{ConfigError, ConfigResult, FrameError, FrameResult};
use crate::tables::{HEADER_SIZE, MSBC_SYNCWORD, SBC_SYNCWORD};

/// Sampling frequency, in header code order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Freq16k = 0,
    Freq32k = 1,
    Freq44k1 = 2,
    Freq48k = 3,
}

impl Frequency {
    /// Decode the 2-bit header field
    pub fn from_code(code: u8) -> Self {
        match code & 0x3 {
            0 => Frequency::Freq16k,
            1 => Frequency::Freq32k,
            2 => Frequency::Freq44k1,
            _ => Frequency::Freq48k,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Sample rate in Hz
    pub fn hz(self) -> u32 {
        match self {
            Frequency::Freq16k => 16_000,
            Frequency::Freq32k => 32_000,
            Frequency::Freq44k1 => 44_100,
            Frequency::Freq48k => 48_000,
        }
    }

    pub fn from_hz(hz: u32) -> Option<Self> {
        match hz {
            16_000 => Some(Frequency::Freq16k),
            32_000 => Some(Frequency::Freq32k),
            44_100 => Some(Frequency::Freq44k1),
            48_000 => Some(Frequency::Freq48k),
            _ => None,
        }
    }
}

/// Channel mode, in header code order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelMode {
    Mono = 0,
    DualChannel = 1,
    Stereo = 2,
    JointStereo = 3,
}

impl ChannelMode {
    /// Decode the 2-bit header field
    pub fn from_code(code: u8) -> Self {
        match code & 0x3 {
            0 => ChannelMode::Mono,
            1 => ChannelMode::DualChannel,
            2 => ChannelMode::Stereo,
            _ => ChannelMode::JointStereo,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Number of coded channels (1 or 2)
    pub fn channels(self) -> usize {
        if self == ChannelMode::Mono {
            1
        } else {
            2
        }
    }

    pub fn is_joint(self) -> bool {
        self == ChannelMode::JointStereo
    }

    pub fn is_dual(self) -> bool {
        self == ChannelMode::DualChannel
    }

    /// Stereo or joint stereo: both channels share one allocation
    pub fn is_stereo(self) -> bool {
        matches!(self, ChannelMode::Stereo | ChannelMode::JointStereo)
    }
}

/// Bit allocation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationMethod {
    Loudness = 0,
    Snr = 1,
}

impl AllocationMethod {
    pub fn from_code(code: u8) -> Self {
        if code & 1 == 0 {
            AllocationMethod::Loudness
        } else {
            AllocationMethod::Snr
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Configuration of one SBC frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameDescriptor {
    /// Fixed wideband speech profile; overrides every other field
    pub msbc: bool,
    pub frequency: Frequency,
    pub mode: ChannelMode,
    pub allocation: AllocationMethod,
    /// 4, 8, 12 or 16 (15 for mSBC)
    pub blocks: u8,
    /// 4 or 8
    pub subbands: u8,
    pub bitpool: u8,
}

impl Default for FrameDescriptor {
    /// A2DP high quality joint stereo at 44.1 kHz
    fn default() -> Self {
        Self {
            msbc: false,
            frequency: Frequency::Freq44k1,
            mode: ChannelMode::JointStereo,
            allocation: AllocationMethod::Loudness,
            blocks: 16,
            subbands: 8,
            bitpool: 53,
        }
    }
}

impl FrameDescriptor {
    /// The fixed mSBC descriptor: mono, 16 kHz, loudness, 8 subbands,
    /// 15 blocks, bitpool 26
    pub const fn msbc() -> Self {
        Self {
            msbc: true,
            frequency: Frequency::Freq16k,
            mode: ChannelMode::Mono,
            allocation: AllocationMethod::Loudness,
            blocks: 15,
            subbands: 8,
            bitpool: 26,
        }
    }

    /// Replace every field with the mSBC profile when the flag is set
    pub fn normalized(&self) -> Self {
        if self.msbc {
            Self::msbc()
        } else {
            *self
        }
    }

    pub fn channels(&self) -> usize {
        self.normalized().mode.channels()
    }

    pub fn sample_rate(&self) -> u32 {
        self.normalized().frequency.hz()
    }

    /// PCM samples per channel carried by one frame
    pub fn samples_per_frame(&self) -> usize {
        let desc = self.normalized();
        desc.blocks as usize * desc.subbands as usize
    }

    /// Largest bitpool this layout can carry
    pub fn max_bitpool(&self) -> u32 {
        let desc = self.normalized();
        let subbands = desc.subbands as u32;
        let blocks = desc.blocks as u32;
        let two = (desc.mode != ChannelMode::Mono) as u32;
        let dual = desc.mode.is_dual() as u32;
        let stereo = desc.mode.is_stereo() as u32;
        let joint = if desc.mode.is_joint() { subbands } else { 0 };

        let max_bits = ((16 * subbands * blocks) << two)
            .saturating_sub(HEADER_SIZE as u32 * 8)
            .saturating_sub((4 * subbands) << two)
            .saturating_sub(joint);
        let by_size = match blocks << dual {
            0 => 0,
            per_block => max_bits / per_block,
        };
        by_size.min((16 << stereo) * subbands)
    }

    /// Check every field, reporting the first rule that fails.
    ///
    /// An mSBC descriptor is checked as the fixed profile it encodes to.
    pub fn validate(&self) -> ConfigResult<()> {
        let desc = self.normalized();
        let blocks_ok = if desc.msbc {
            desc.blocks == 15
        } else {
            (4..=16).contains(&desc.blocks) && desc.blocks % 4 == 0
        };
        if !blocks_ok {
            return Err(ConfigError::InvalidBlocks(desc.blocks));
        }
        if desc.subbands != 4 && desc.subbands != 8 {
            return Err(ConfigError::InvalidSubbands(desc.subbands));
        }
        let max = desc.max_bitpool();
        if desc.bitpool as u32 > max {
            return Err(ConfigError::BitpoolTooLarge {
                bitpool: desc.bitpool,
                max,
            });
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Exact encoded size in bytes, header included
    pub fn frame_size(&self) -> usize {
        let desc = self.normalized();
        let subbands = desc.subbands as usize;
        let two = (desc.mode != ChannelMode::Mono) as u32;
        let dual = desc.mode.is_dual() as u32;
        let joint = if desc.mode.is_joint() { subbands } else { 0 };

        let nbits = ((4 * subbands) << two)
            + ((desc.blocks as usize * desc.bitpool as usize) << dual)
            + joint;
        HEADER_SIZE + nbits.div_ceil(8)
    }

    /// Bits per second at this layout
    pub fn bitrate(&self) -> u32 {
        let samples = self.samples_per_frame() as u64;
        if samples == 0 {
            return 0;
        }
        (8 * self.frame_size() as u64 * self.sample_rate() as u64 / samples) as u32
    }

    /// Parse a header without looking at the payload
    pub fn probe(bytes: &[u8]) -> Option<Self> {
        Self::read_header(bytes).ok()
    }

    /// Parse and validate the header fields of a frame
    pub fn read_header(bytes: &[u8]) -> FrameResult<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(FrameError::BufferTooShort {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let mut reader = BitReader::new(bytes);
        let syncword = reader.get_bits(8) as u8;
        let desc = match syncword {
            MSBC_SYNCWORD => {
                reader.get_fixed_bits(16, 0);
                if reader.has_error() {
                    return Err(FrameError::ReservedBits);
                }
                Self::msbc()
            }
            SBC_SYNCWORD => {
                let frequency = Frequency::from_code(reader.get_bits(2) as u8);
                let blocks = ((1 + reader.get_bits(2)) << 2) as u8;
                let mode = ChannelMode::from_code(reader.get_bits(2) as u8);
                let allocation = AllocationMethod::from_code(reader.get_bits(1) as u8);
                let subbands = ((1 + reader.get_bits(1)) << 2) as u8;
                let bitpool = reader.get_bits(8) as u8;
                Self {
                    msbc: false,
                    frequency,
                    mode,
                    allocation,
                    blocks,
                    subbands,
                    bitpool,
                }
            }
            other => return Err(FrameError::InvalidSyncword(other)),
        };

        desc.validate()?;
        Ok(desc)
    }

    /// Write the 4 header bytes with a zero CRC placeholder.
    ///
    /// The descriptor must have passed [`FrameDescriptor::validate`].
    pub(crate) fn write_header(&self, writer: &mut BitWriter) {
        if self.msbc {
            writer.put_bits(MSBC_SYNCWORD as u32, 8);
            writer.put_bits(0, 16);
        } else {
            writer.put_bits(SBC_SYNCWORD as u32, 8);
            writer.put_bits(self.frequency.code() as u32, 2);
            writer.put_bits((self.blocks as u32 >> 2) - 1, 2);
            writer.put_bits(self.mode.code() as u32, 2);
            writer.put_bits(self.allocation.code() as u32, 1);
            writer.put_bits((self.subbands as u32 >> 2) - 1, 1);
            writer.put_bits(self.bitpool as u32, 8);
        }
        writer.put_bits(0, 8);
    }
}

/// Iterator over the frames found in a byte slice.
///
/// Bytes that do not start a complete, valid frame are skipped one at a
/// time until the scanner resynchronises.
pub struct FrameScanner<'a> {
    data: &'a [u8],
    offset: usize,
    skipped: usize,
}

impl<'a> FrameScanner<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            skipped: 0,
        }
    }

    /// Total bytes skipped while resynchronising
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a> Iterator for FrameScanner<'a> {
    type Item = (usize, FrameDescriptor, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let mut run = 0usize;
        while self.data.len().saturating_sub(self.offset) >= HEADER_SIZE {
            let rest = &self.data[self.offset..];
            if let Some(desc) = FrameDescriptor::probe(rest) {
                let size = desc.frame_size();
                if size <= rest.len() {
                    if run > 0 {
                        warn!("Skipped {} bytes before frame at offset {}", run, self.offset);
                    }
                    let start = self.offset;
                    self.offset += size;
                    debug!("Frame at offset {}: {:?}, {} bytes", start, desc, size);
                    return Some((start, desc, &rest[..size]));
                }
            }
            self.offset += 1;
            self.skipped += 1;
            run += 1;
        }
        if run > 0 {
            warn!("Skipped {} trailing bytes", run);
        }
        None
    }
}
