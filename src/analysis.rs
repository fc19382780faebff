//! Analysis filter bank for SBC encoding
//!
//! Splits PCM into 4 or 8 subbands with a windowed polyphase filter followed
//! by a cosine matrix. The 10-block delay line is kept as two 5-tap halves,
//! one per block parity, so no history is ever shifted.

use crate::tables::{
    log2_subbands, round_shift, saturate16, window, ANALYSIS_COS_4, ANALYSIS_COS_8,
    ANALYSIS_COS_BITS, WINDOW_BITS,
};

const TAPS: usize = 5;
const PERIOD: usize = 2 * TAPS;

/// Per-channel analysis history
#[derive(Debug, Clone)]
pub struct AnalysisState {
    /// Block counter modulo 10
    index: usize,
    /// History indexed `[parity][subband][tap]`
    history: [[[i16; TAPS]; 8]; 2],
}

impl Default for AnalysisState {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisState {
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

    /// Filter one block of `subbands` PCM samples into `out`.
    pub fn process_block(&mut self, pcm: &[i16], subbands: usize, out: &mut [i16]) {
        let odd = self.index & 1;
        let slot = self.index >> 1;

        for (n, &sample) in pcm.iter().take(subbands).enumerate() {
            self.history[odd][subbands - 1 - n][slot] = sample;
        }

        // Slot of the newest block of the other parity.
        let other = if odd == 1 { slot } else { (slot + TAPS - 1) % TAPS };

        let win = window(subbands);
        let shift = WINDOW_BITS + log2_subbands(subbands);
        let mut windowed = [0i64; 16];
        for (i, y) in windowed.iter_mut().take(2 * subbands).enumerate() {
            let (taps, start) = if i < subbands {
                (&self.history[odd][i], slot)
            } else {
                (&self.history[odd ^ 1][i - subbands], other)
            };
            let acc: i64 = (0..TAPS)
                .map(|j| win[i + 2 * subbands * j] as i64 * taps[(start + TAPS - j) % TAPS] as i64)
                .sum();
            *y = round_shift(acc, shift);
        }

        for (k, s) in out.iter_mut().take(subbands).enumerate() {
            let acc: i64 = if subbands == 4 {
                matrix(&ANALYSIS_COS_4[k], &windowed)
            } else {
                matrix(&ANALYSIS_COS_8[k], &windowed)
            };
            *s = saturate16(round_shift(acc, ANALYSIS_COS_BITS));
        }

        self.index = (self.index + 1) % PERIOD;
    }
}

#[inline]
fn matrix(row: &[i16], input: &[i64]) -> i64 {
    row.iter().zip(input).map(|(&c, &y)| c as i64 * y).sum()
}
