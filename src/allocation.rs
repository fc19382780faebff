//! Bit allocation shared by the encoder and the decoder
//!
//! Turns per-subband scale factors into per-subband bit counts under the
//! frame's bitpool. Both sides must run exactly this procedure or the
//! payload cannot be parsed.

use log::trace;

use crate::frame::{AllocationMethod, FrameDescriptor};
use crate::tables::{LOUDNESS_OFFSET_4, LOUDNESS_OFFSET_8};

/// Up to two coded channels
pub const MAX_CHANNELS: usize = 2;

/// Up to eight subbands
pub const MAX_SUBBANDS: usize = 8;

/// Largest bit count a single subband sample can receive
pub const MAX_SUBBAND_BITS: u8 = 16;

/// Bit need of a silent subband under loudness allocation
const MIN_BITNEED: i32 = -5;

/// Per-channel, per-subband values
pub type ChannelBands<T> = [[T; MAX_SUBBANDS]; MAX_CHANNELS];

/// Compute the bit allocation for every coded channel.
///
/// Dual channel allocates each channel on its own against the full bitpool.
/// Stereo and joint stereo share one allocation across both channels.
/// A descriptor that fails [`FrameDescriptor::validate`] gets no bits.
pub fn allocate_bits(desc: &FrameDescriptor, scale_factors: &ChannelBands<u8>) -> ChannelBands<u8> {
    let mut bits = [[0u8; MAX_SUBBANDS]; MAX_CHANNELS];
    let desc = &desc.normalized();
    if let Err(e) = desc.validate() {
        trace!("No bits for invalid layout: {}", e);
        return bits;
    }
    let channels = desc.channels();

    if desc.mode.is_dual() {
        for ch in 0..channels {
            allocate_channels(
                desc,
                &scale_factors[ch..ch + 1],
                &mut bits[ch..ch + 1],
            );
        }
    } else {
        allocate_channels(desc, &scale_factors[..channels], &mut bits[..channels]);
    }

    trace!("Bit allocation: {:?}", &bits[..channels]);
    bits
}

/// Bit need of each subband before the bitpool is applied
fn bitneed(desc: &FrameDescriptor, scale_factors: &[[u8; MAX_SUBBANDS]]) -> ChannelBands<i32> {
    let subbands = desc.subbands as usize;
    let offsets: &[i8] = if subbands == 4 {
        &LOUDNESS_OFFSET_4[desc.frequency.code() as usize]
    } else {
        &LOUDNESS_OFFSET_8[desc.frequency.code() as usize]
    };

    let mut need = [[0i32; MAX_SUBBANDS]; MAX_CHANNELS];
    for (ch, scf) in scale_factors.iter().enumerate() {
        for sb in 0..subbands {
            let scf = scf[sb] as i32;
            need[ch][sb] = match desc.allocation {
                AllocationMethod::Snr => scf,
                AllocationMethod::Loudness => {
                    if scf == 0 {
                        MIN_BITNEED
                    } else {
                        let n = scf - offsets[sb] as i32;
                        if n > 0 {
                            n >> 1
                        } else {
                            n
                        }
                    }
                }
            };
        }
    }
    need
}

fn allocate_channels(
    desc: &FrameDescriptor,
    scale_factors: &[[u8; MAX_SUBBANDS]],
    bits: &mut [[u8; MAX_SUBBANDS]],
) {
    let subbands = desc.subbands as usize;
    let channels = scale_factors.len();
    let bitpool = desc.bitpool as i32;
    let need = bitneed(desc, scale_factors);

    let max_bitneed = need[..channels]
        .iter()
        .flat_map(|row| row[..subbands].iter().copied())
        .max()
        .unwrap_or(0)
        .max(0);

    // Lower the slice until the next step would reach the bitpool.
    let mut bitslice = max_bitneed + 1;
    let mut bitcount = 0i32;
    let mut slicecount = 0i32;
    loop {
        bitslice -= 1;
        bitcount += slicecount;
        slicecount = 0;
        for row in &need[..channels] {
            for &n in &row[..subbands] {
                if n > bitslice + 1 && n < bitslice + 16 {
                    slicecount += 1;
                } else if n == bitslice + 1 {
                    slicecount += 2;
                }
            }
        }
        if bitcount + slicecount >= bitpool {
            break;
        }
        // Every subband has left the slice window; nothing more to hand out.
        if slicecount == 0 && bitslice < MIN_BITNEED - 16 {
            break;
        }
    }
    if bitcount + slicecount == bitpool {
        bitcount += slicecount;
        bitslice -= 1;
    }

    for ch in 0..channels {
        for sb in 0..subbands {
            let n = need[ch][sb] - bitslice;
            bits[ch][sb] = if n < 2 {
                0
            } else {
                n.min(MAX_SUBBAND_BITS as i32) as u8
            };
        }
    }

    // Leftover bits, subbands outer and channels inner.
    'first: for sb in 0..subbands {
        for ch in 0..channels {
            if bitcount >= bitpool {
                break 'first;
            }
            let b = &mut bits[ch][sb];
            if *b >= 2 && *b < MAX_SUBBAND_BITS {
                *b += 1;
                bitcount += 1;
            } else if need[ch][sb] == bitslice + 1 && bitpool > bitcount + 1 {
                *b = 2;
                bitcount += 2;
            }
        }
    }

    'second: for sb in 0..subbands {
        for ch in 0..channels {
            if bitcount >= bitpool {
                break 'second;
            }
            let b = &mut bits[ch][sb];
            if *b < MAX_SUBBAND_BITS {
                *b += 1;
                bitcount += 1;
            }
        }
    }
}
