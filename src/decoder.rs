//! SBC frame decoder
//!
//! Parses one encoded frame per call, validates its header and CRC, and runs
//! the synthesis filter bank. A rejected frame leaves the filter history
//! untouched, so the caller can drop it and continue with the next one.

use log::{debug, warn};

use crate::allocation::{allocate_bits, ChannelBands, MAX_CHANNELS, MAX_SUBBANDS};
use crate::bitstream::BitReader;
use crate::crc::frame_crc;
use crate::encoder::SubbandSamples;
use crate::error::{FrameError, Result, SbcError};
use crate::frame::FrameDescriptor;
use crate::synthesis::SynthesisState;
use crate::tables::{HEADER_SIZE, RANGE_SCALE};

/// Fractional bits of [`RANGE_SCALE`]
const RANGE_SCALE_BITS: u32 = 28;

/// PCM recovered from one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub left: Vec<i16>,
    /// Present for every mode except mono
    pub right: Option<Vec<i16>>,
    pub descriptor: FrameDescriptor,
}

/// Side information of one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameInfo {
    pub descriptor: FrameDescriptor,
    pub frame_size: usize,
    pub crc: u8,
    /// Bit `sb` set when subband `sb` is mid/side coded
    pub joint_mask: u8,
    pub scale_factors: ChannelBands<u8>,
    pub bits: ChannelBands<u8>,
    /// Extra fractional bits carried by each channel's subband samples
    pub sb_scale: [i32; MAX_CHANNELS],
}

/// SBC decoder with persistent filter history
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    states: [SynthesisState; MAX_CHANNELS],
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all history, as before an unrelated stream
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
    }

    /// Parse only the header of `bytes`.
    ///
    /// Returns `None` on a bad syncword or invalid fields. The payload and CRC
    /// are not examined.
    pub fn probe(bytes: &[u8]) -> Option<FrameDescriptor> {
        FrameDescriptor::probe(bytes)
    }

    /// Validate a frame and return its side information without decoding PCM
    pub fn inspect(bytes: &[u8]) -> Result<FrameInfo> {
        parse_frame(bytes).map(|(info, _)| info)
    }

    /// Decode one frame into PCM
    pub fn decode(&mut self, bytes: &[u8]) -> Result<DecodedFrame> {
        let (info, samples) = parse_frame(bytes).map_err(|e| {
            warn!("Rejected frame of {} bytes: {}", bytes.len(), e);
            e
        })?;

        let desc = info.descriptor;
        let subbands = desc.subbands as usize;
        let blocks = desc.blocks as usize;
        let channels = desc.channels();

        debug!(
            "Decoding frame: {:?}, joint mask 0b{:b}, sb_scale {:?}",
            desc,
            info.joint_mask,
            &info.sb_scale[..channels]
        );

        let mut pcm = [vec![0i16; blocks * subbands], Vec::new()];
        if channels == 2 {
            pcm[1] = vec![0i16; blocks * subbands];
        }
        for ch in 0..channels {
            for blk in 0..blocks {
                let start = blk * subbands;
                self.states[ch].process_block(
                    &samples[ch][start..start + subbands],
                    subbands,
                    info.sb_scale[ch],
                    &mut pcm[ch][start..start + subbands],
                );
            }
        }

        let [left, right] = pcm;
        Ok(DecodedFrame {
            left,
            right: (channels == 2).then_some(right),
            descriptor: desc,
        })
    }
}

/// Inverse of the encoder's quantizer
#[inline]
pub(crate) fn dequantize(raw: u32, nbits: u8, scale_factor: u8, sb_scale: i32) -> i32 {
    let expanded = ((raw as i64) << 1 | 1) * RANGE_SCALE[nbits as usize - 1] as i64;
    let shift = (RANGE_SCALE_BITS as i32 - (scale_factor as i32 + 1 + sb_scale)).clamp(0, 62);
    ((expanded - (1i64 << RANGE_SCALE_BITS)) >> shift) as i32
}

/// Header, CRC, side information and dequantized subband samples
fn parse_frame(bytes: &[u8]) -> Result<(FrameInfo, SubbandSamples)> {
    let desc = FrameDescriptor::read_header(bytes)?;
    let frame_size = desc.frame_size();
    if bytes.len() < frame_size {
        return Err(FrameError::BufferTooShort {
            expected: frame_size,
            actual: bytes.len(),
        }
        .into());
    }

    let crc = bytes[3];
    let computed = frame_crc(&desc, bytes);
    if crc != computed {
        return Err(FrameError::ChecksumMismatch {
            expected: crc,
            actual: computed,
        }
        .into());
    }

    let subbands = desc.subbands as usize;
    let blocks = desc.blocks as usize;
    let channels = desc.channels();
    let mut reader = BitReader::at_byte(&bytes[..frame_size], HEADER_SIZE);

    let mut joint_mask = 0u8;
    if desc.mode.is_joint() {
        let mask = reader.get_bits(subbands as u32);
        for sb in 0..subbands {
            joint_mask |= (((mask >> (subbands - 1 - sb)) & 1) as u8) << sb;
        }
        joint_mask &= !(1u8 << (subbands - 1));
    }

    let mut scale_factors = [[0u8; MAX_SUBBANDS]; MAX_CHANNELS];
    for scf in &mut scale_factors[..channels] {
        for s in &mut scf[..subbands] {
            *s = reader.get_bits(4) as u8;
        }
    }

    let bits = allocate_bits(&desc, &scale_factors);

    let mut sb_scale = [0i32; MAX_CHANNELS];
    for ch in 0..channels {
        let max = (0..subbands)
            .map(|sb| scale_factors[ch][sb] as i32 + ((joint_mask >> sb) & 1) as i32)
            .max()
            .unwrap_or(0);
        sb_scale[ch] = (15 - max) - 1;
    }
    if desc.mode.is_joint() {
        let shared = sb_scale[0].min(sb_scale[1]);
        sb_scale = [shared; MAX_CHANNELS];
    }

    let mut samples: SubbandSamples = [[0; 16 * MAX_SUBBANDS]; MAX_CHANNELS];
    for blk in 0..blocks {
        for ch in 0..channels {
            for sb in 0..subbands {
                let nbits = bits[ch][sb];
                if nbits == 0 {
                    continue;
                }
                let raw = reader.get_bits(nbits as u32);
                samples[ch][blk * subbands + sb] =
                    dequantize(raw, nbits, scale_factors[ch][sb], sb_scale[ch]);
            }
        }
    }

    if reader.has_error() {
        return Err(SbcError::BitstreamOverrun {
            bits: reader.bit_position(),
            capacity: frame_size * 8,
        });
    }

    for sb in 0..subbands {
        if (joint_mask >> sb) & 1 == 0 {
            continue;
        }
        for blk in 0..blocks {
            let i = blk * subbands + sb;
            let (mid, side) = (samples[0][i], samples[1][i]);
            samples[0][i] = mid + side;
            samples[1][i] = mid - side;
        }
    }

    let info = FrameInfo {
        descriptor: desc,
        frame_size,
        crc,
        joint_mask,
        scale_factors,
        bits,
        sb_scale,
    };
    Ok((info, samples))
}
