//! SBC frame encoder
//!
//! The encoder owns one analysis filter state per channel and turns one
//! frame's worth of PCM into one encoded frame per call. Frames must be fed
//! in stream order; use one encoder per independent stream.

use log::debug;

use crate::allocation::{allocate_bits, ChannelBands, MAX_CHANNELS, MAX_SUBBANDS};
use crate::analysis::AnalysisState;
use crate::bitstream::BitWriter;
use crate::crc::frame_crc;
use crate::error::{InputDataError, Result, SbcError};
use crate::frame::FrameDescriptor;
use crate::tables::{magnitude, scale_factor};

/// Subband samples of one frame, `[channel][block * subbands + subband]`
pub(crate) type SubbandSamples = [[i32; 16 * MAX_SUBBANDS]; MAX_CHANNELS];

/// SBC encoder with persistent filter history
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    states: [AnalysisState; MAX_CHANNELS],
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all history, as before an unrelated stream
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
    }

    /// Encode one frame.
    ///
    /// Consumes `desc.samples_per_frame()` samples from each channel.
    /// `right` is required for every mode except mono and ignored in mono.
    /// An mSBC descriptor always encodes with the fixed mSBC parameters.
    pub fn encode(
        &mut self,
        left: &[i16],
        right: Option<&[i16]>,
        desc: &FrameDescriptor,
    ) -> Result<Vec<u8>> {
        let desc = desc.normalized();
        desc.validate()?;

        let subbands = desc.subbands as usize;
        let blocks = desc.blocks as usize;
        let channels = desc.channels();
        let needed = desc.samples_per_frame();

        let mut pcm: [&[i16]; MAX_CHANNELS] = [left, &[]];
        if channels == 2 {
            pcm[1] = right.ok_or(InputDataError::MissingRightChannel(desc.mode))?;
        }
        for input in &pcm[..channels] {
            if input.len() < needed {
                return Err(InputDataError::InvalidLength {
                    expected: needed,
                    actual: input.len(),
                }
                .into());
            }
        }

        let mut samples: SubbandSamples = [[0; 16 * MAX_SUBBANDS]; MAX_CHANNELS];
        let mut block_out = [0i16; MAX_SUBBANDS];
        for ch in 0..channels {
            for blk in 0..blocks {
                let start = blk * subbands;
                self.states[ch].process_block(
                    &pcm[ch][start..start + subbands],
                    subbands,
                    &mut block_out,
                );
                for (dst, &s) in samples[ch][start..start + subbands]
                    .iter_mut()
                    .zip(&block_out[..subbands])
                {
                    *dst = s as i32;
                }
            }
        }

        let mut scale_factors = compute_scale_factors(&desc, &samples);
        let joint = if desc.mode.is_joint() {
            apply_joint_stereo(&desc, &mut samples, &mut scale_factors)
        } else {
            0
        };
        let bits = allocate_bits(&desc, &scale_factors);

        debug!(
            "Encoding frame: {:?}, joint mask 0b{:b}, scale factors {:?}",
            desc,
            joint,
            &scale_factors[..channels]
        );

        write_frame(&desc, joint, &scale_factors, &bits, &samples)
    }
}

/// Highest set bit of each subband's largest magnitude across all blocks
fn compute_scale_factors(desc: &FrameDescriptor, samples: &SubbandSamples) -> ChannelBands<u8> {
    let subbands = desc.subbands as usize;
    let blocks = desc.blocks as usize;
    let mut scale_factors = [[0u8; MAX_SUBBANDS]; MAX_CHANNELS];

    for ch in 0..desc.channels() {
        for sb in 0..subbands {
            let mask = (0..blocks).fold(0u32, |m, blk| m | magnitude(samples[ch][blk * subbands + sb]));
            scale_factors[ch][sb] = scale_factor(mask);
        }
    }
    scale_factors
}

/// Decide joint coding per subband and convert chosen subbands to mid/side.
///
/// Returns the joint mask with bit `sb` set for each coupled subband. The
/// highest subband is never coupled.
fn apply_joint_stereo(
    desc: &FrameDescriptor,
    samples: &mut SubbandSamples,
    scale_factors: &mut ChannelBands<u8>,
) -> u8 {
    let subbands = desc.subbands as usize;
    let blocks = desc.blocks as usize;
    let mut joint = 0u8;

    for sb in 0..subbands - 1 {
        let mut mid_mask = 0u32;
        let mut side_mask = 0u32;
        for blk in 0..blocks {
            let l = samples[0][blk * subbands + sb];
            let r = samples[1][blk * subbands + sb];
            mid_mask |= magnitude((l + r) >> 1);
            side_mask |= magnitude((l - r) >> 1);
        }
        let mid_scf = scale_factor(mid_mask);
        let side_scf = scale_factor(side_mask);

        if mid_scf + side_scf < scale_factors[0][sb] + scale_factors[1][sb] {
            joint |= 1 << sb;
            scale_factors[0][sb] = mid_scf;
            scale_factors[1][sb] = side_scf;
            for blk in 0..blocks {
                let i = blk * subbands + sb;
                let (l, r) = (samples[0][i], samples[1][i]);
                samples[0][i] = (l + r) >> 1;
                samples[1][i] = (l - r) >> 1;
            }
        }
    }
    joint
}

/// Quantize a subband sample to `nbits` with the standard rounding bias
#[inline]
pub(crate) fn quantize(sample: i32, scale_factor: u8, nbits: u8) -> u32 {
    let range = (1i64 << nbits) - 1;
    ((((sample as i64 * range) >> (scale_factor + 1)) + range) >> 1) as u32
}

fn write_frame(
    desc: &FrameDescriptor,
    joint: u8,
    scale_factors: &ChannelBands<u8>,
    bits: &ChannelBands<u8>,
    samples: &SubbandSamples,
) -> Result<Vec<u8>> {
    let subbands = desc.subbands as usize;
    let blocks = desc.blocks as usize;
    let channels = desc.channels();

    let mut writer = BitWriter::new(desc.frame_size());
    desc.write_header(&mut writer);

    if desc.mode.is_joint() {
        let mut mask = 0u32;
        for sb in 0..subbands {
            mask |= (((joint >> sb) & 1) as u32) << (subbands - 1 - sb);
        }
        writer.put_bits(mask, subbands as u32);
    }

    for scf in &scale_factors[..channels] {
        for &s in &scf[..subbands] {
            writer.put_bits(s as u32, 4);
        }
    }

    for blk in 0..blocks {
        for ch in 0..channels {
            for sb in 0..subbands {
                let nbits = bits[ch][sb];
                if nbits == 0 {
                    continue;
                }
                let q = quantize(samples[ch][blk * subbands + sb], scale_factors[ch][sb], nbits);
                writer.put_bits(q, nbits as u32);
            }
        }
    }
    writer.flush();

    if writer.has_error() {
        return Err(SbcError::BitstreamOverrun {
            bits: writer.bit_position(),
            capacity: writer.capacity_bits(),
        });
    }

    let crc = frame_crc(desc, writer.data());
    writer.set_byte(3, crc);
    Ok(writer.into_bytes())
}
