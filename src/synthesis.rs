//! Synthesis filter bank for SBC decoding
//!
//! Rebuilds PCM from subband samples: a cosine matrix produces `2M` values
//! per block which enter a 10-block history, then the polyphase window sums
//! the history into `M` output samples.
//!
//! The per-frame dequantizer scale is folded into the matrix stage, so the
//! history always holds PCM-scaled values and stays consistent when the
//! scale changes between frames.

use crate::tables::{
    log2_subbands, round_shift, saturate16, window, SYNTHESIS_COS_4, SYNTHESIS_COS_8,
    SYNTHESIS_WINDOW_SHIFT,
};

const TAPS: usize = 10;

/// Right shift of the matrix stage before the frame scale is applied
const MATRIX_SHIFT: i32 = 16;

/// Per-channel synthesis history
#[derive(Debug, Clone)]
pub struct SynthesisState {
    /// Block counter modulo 10
    index: usize,
    /// History indexed `[half][subband][tap]`
    history: [[[i16; TAPS]; 8]; 2],
}

impl Default for SynthesisState {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisState {
    pub fn new() -> Self {
        Self {
            index: 0,
            history: [[[0; TAPS]; 8]; 2],
        }
    }

    /// Zero the history before an unrelated stream
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Current block counter (0..9)
    pub fn index(&self) -> usize {
        self.index
    }

    /// Synthesize one block of `subbands` samples.
    ///
    /// `scale` is the frame's `sb_scale` for this channel: the subband samples
    /// carry `scale` extra fractional bits.
    pub fn process_block(&mut self, samples: &[i32], subbands: usize, scale: i32, out: &mut [i16]) {
        let slot = if self.index == 0 { 0 } else { TAPS - self.index };
        let shift = (MATRIX_SHIFT + scale - log2_subbands(subbands) as i32).max(1) as u32;

        for k in 0..2 * subbands {
            let acc: i64 = if subbands == 4 {
                matrix(&SYNTHESIS_COS_4[k], samples)
            } else {
                matrix(&SYNTHESIS_COS_8[k], samples)
            };
            let v = saturate16(round_shift(acc, shift));
            if k < subbands {
                self.history[0][k][slot] = v;
            } else {
                self.history[1][k - subbands][slot] = v;
            }
        }

        let win = window(subbands);
        for (j, pcm) in out.iter_mut().take(subbands).enumerate() {
            let mut acc = 0i64;
            for a in 0..TAPS / 2 {
                let even = self.history[0][j][(slot + 2 * a) % TAPS];
                let odd = self.history[1][j][(slot + 2 * a + 1) % TAPS];
                acc -= win[j + 2 * a * subbands] as i64 * even as i64;
                acc -= win[j + (2 * a + 1) * subbands] as i64 * odd as i64;
            }
            *pcm = saturate16(round_shift(acc, SYNTHESIS_WINDOW_SHIFT));
        }

        self.index = (self.index + 1) % TAPS;
    }
}

#[inline]
fn matrix(row: &[i16], input: &[i32]) -> i64 {
    row.iter().zip(input).map(|(&c, &s)| c as i64 * s as i64).sum()
}
