//! PCM audio data processing utilities
//!
//! Helpers for moving between interleaved PCM and the per-channel slices the
//! codec works on, and for cutting a long signal into whole frames.

/// De-interleave PCM data into left and optional right channel buffers
///
/// Takes PCM data in format [L0, R0, L1, R1, ..., LN, RN] for two channels
/// or [S0, S1, ..., SN] for one. Channels beyond the second are dropped.
pub fn deinterleave(pcm_data: &[i16], channels: usize) -> (Vec<i16>, Option<Vec<i16>>) {
    match channels {
        0 | 1 => (pcm_data.to_vec(), None),
        _ => {
            let frames = pcm_data.len() / channels;
            let mut left = Vec::with_capacity(frames);
            let mut right = Vec::with_capacity(frames);
            for frame in pcm_data.chunks_exact(channels) {
                left.push(frame[0]);
                right.push(frame[1]);
            }
            (left, Some(right))
        }
    }
}

/// Interleave a left and optional right channel
///
/// The output length follows the shorter channel when both are present.
pub fn interleave(left: &[i16], right: Option<&[i16]>) -> Vec<i16> {
    match right {
        None => left.to_vec(),
        Some(right) => left
            .iter()
            .zip(right)
            .flat_map(|(&l, &r)| [l, r])
            .collect(),
    }
}

/// Number of frames needed to cover `total` samples per channel
pub fn frames_needed(total: usize, samples_per_frame: usize) -> usize {
    if samples_per_frame == 0 {
        return 0;
    }
    total.div_ceil(samples_per_frame)
}

/// Extend `samples` with zeros up to a whole multiple of `samples_per_frame`
pub fn pad_to(samples: &mut Vec<i16>, samples_per_frame: usize) {
    let target = frames_needed(samples.len(), samples_per_frame) * samples_per_frame;
    samples.resize(target, 0);
}

/// Mix two channels down to one by averaging
pub fn downmix(left: &[i16], right: &[i16]) -> Vec<i16> {
    left.iter()
        .zip(right)
        .map(|(&l, &r)| ((l as i32 + r as i32) >> 1) as i16)
        .collect()
}
