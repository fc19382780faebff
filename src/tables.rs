//! Lookup tables and fixed-point helpers for SBC
//!
//! This module contains the constant data shared by the encoder and decoder:
//! polyphase window coefficients, matrixing cosine tables for 4 and 8
//! subbands, loudness offsets, the dequantizer range scale, and the CRC-8
//! table. All tables are integer fixed-point and built at compile time.

/// Syncword of a regular SBC frame
pub const SBC_SYNCWORD: u8 = 0x9C;

/// Syncword of an mSBC frame
pub const MSBC_SYNCWORD: u8 = 0xAD;

/// Header bytes preceding the payload of every frame
pub const HEADER_SIZE: usize = 4;

/// Fractional bits of the window coefficients
pub const WINDOW_BITS: u32 = 14;

/// Fractional bits of the analysis cosine coefficients
pub const ANALYSIS_COS_BITS: u32 = 15;

/// Right shift of the synthesis window accumulation
pub const SYNTHESIS_WINDOW_SHIFT: u32 = 13;

/// Prototype filter for 4 subbands, scaled by `4 * 2^14`
pub const WINDOW_4: [i16; 40] = [
    0, 35, 98, 179, 251, 255, 122, -201, 715, 1339,
    1892, 2110, 1696, 402, -1889, -5089, 8886, 12779, 16164, 18470,
    19288, 18470, 16164, 12779, -8886, -5089, -1889, 402, 1696, 2110,
    1892, 1339, -715, -201, 122, 255, 251, 179, 98, 35,
];

/// Prototype filter for 8 subbands, scaled by `8 * 2^14`
pub const WINDOW_8: [i16; 80] = [
    0, 21, 45, 73, 108, 149, 194, 234, 264, 276,
    261, 212, 118, -23, -216, -458, 742, 1052, 1371, 1671,
    1921, 2085, 2126, 2008, 1696, 1161, 383, -644, -1919, -3422,
    -5122, -6971, 8913, 10877, 12789, 14575, 16157, 17467, 18449, 19057,
    19262, 19057, 18449, 17467, 16157, 14575, 12789, 10877, -8913, -6971,
    -5122, -3422, -1919, -644, 383, 1161, 1696, 2008, 2126, 2085,
    1921, 1671, 1371, 1052, -742, -458, -216, -23, 118, 212,
    261, 276, 264, 234, 194, 149, 108, 73, 45, 21,
];

/// Analysis matrix `cos((k + 1/2)(i - 2) pi / 4)` in Q15, indexed `[k][i]`
pub const ANALYSIS_COS_4: [[i16; 8]; 4] = [
    [23170, 30274, 32767, 30274, 23170, 12540, 0, -12540],
    [-23170, 12540, 32767, 12540, -23170, -30274, 0, 30274],
    [-23170, -12540, 32767, -12540, -23170, 30274, 0, -30274],
    [23170, -30274, 32767, -30274, 23170, -12540, 0, 12540],
];

/// Analysis matrix `cos((k + 1/2)(i - 4) pi / 8)` in Q15, indexed `[k][i]`
pub const ANALYSIS_COS_8: [[i16; 16]; 8] = [
    [23170, 27246, 30274, 32138, 32767, 32138, 30274, 27246, 23170, 18205, 12540, 6393, 0, -6393, -12540, -18205],
    [-23170, -6393, 12540, 27246, 32767, 27246, 12540, -6393, -23170, -32138, -30274, -18205, 0, 18205, 30274, 32138],
    [-23170, -32138, -12540, 18205, 32767, 18205, -12540, -32138, -23170, 6393, 30274, 27246, 0, -27246, -30274, -6393],
    [23170, -18205, -30274, 6393, 32767, 6393, -30274, -18205, 23170, 27246, -12540, -32138, 0, 32138, 12540, -27246],
    [23170, 18205, -30274, -6393, 32767, -6393, -30274, 18205, 23170, -27246, -12540, 32138, 0, -32138, 12540, 27246],
    [-23170, 32138, -12540, -18205, 32767, -18205, -12540, 32138, -23170, -6393, 30274, -27246, 0, 27246, -30274, 6393],
    [-23170, 6393, 12540, -27246, 32767, -27246, 12540, 6393, -23170, 32138, -30274, 18205, 0, -18205, 30274, -32138],
    [23170, -27246, 30274, -32138, 32767, -32138, 30274, -27246, 23170, -18205, 12540, -6393, 0, 6393, -12540, 18205],
];

/// Synthesis matrix `cos((i + 1/2)(k + 2) pi / 4) / 4` in Q15, indexed `[k][i]`
pub const SYNTHESIS_COS_4: [[i16; 4]; 8] = [
    [5793, -5793, -5793, 5793],
    [3135, -7568, 7568, -3135],
    [0, 0, 0, 0],
    [-3135, 7568, -7568, 3135],
    [-5793, 5793, 5793, -5793],
    [-7568, -3135, 3135, 7568],
    [-8192, -8192, -8192, -8192],
    [-7568, -3135, 3135, 7568],
];

/// Synthesis matrix `cos((i + 1/2)(k + 4) pi / 8) / 8` in Q15, indexed `[k][i]`
pub const SYNTHESIS_COS_8: [[i16; 8]; 16] = [
    [2896, -2896, -2896, 2896, 2896, -2896, -2896, 2896],
    [2276, -4017, 799, 3406, -3406, -799, 4017, -2276],
    [1567, -3784, 3784, -1567, -1567, 3784, -3784, 1567],
    [799, -2276, 3406, -4017, 4017, -3406, 2276, -799],
    [0, 0, 0, 0, 0, 0, 0, 0],
    [-799, 2276, -3406, 4017, -4017, 3406, -2276, 799],
    [-1567, 3784, -3784, 1567, 1567, -3784, 3784, -1567],
    [-2276, 4017, -799, -3406, 3406, 799, -4017, 2276],
    [-2896, 2896, 2896, -2896, -2896, 2896, 2896, -2896],
    [-3406, 799, 4017, 2276, -2276, -4017, -799, 3406],
    [-3784, -1567, 1567, 3784, 3784, 1567, -1567, -3784],
    [-4017, -3406, -2276, -799, 799, 2276, 3406, 4017],
    [-4096, -4096, -4096, -4096, -4096, -4096, -4096, -4096],
    [-4017, -3406, -2276, -799, 799, 2276, 3406, 4017],
    [-3784, -1567, 1567, 3784, 3784, 1567, -1567, -3784],
    [-3406, 799, 4017, 2276, -2276, -4017, -799, 3406],
];

/// Loudness offsets for 4 subbands, indexed by frequency code
pub const LOUDNESS_OFFSET_4: [[i8; 4]; 4] = [
    [-1, 0, 0, 0], // 16 kHz
    [-2, 0, 0, 1], // 32 kHz
    [-2, 0, 0, 1], // 44.1 kHz
    [-2, 0, 0, 1], // 48 kHz
];

/// Loudness offsets for 8 subbands, indexed by frequency code
pub const LOUDNESS_OFFSET_8: [[i8; 8]; 4] = [
    [-2, 0, 0, 0, 0, 0, 0, 1], // 16 kHz
    [-3, 0, 0, 0, 0, 0, 1, 2], // 32 kHz
    [-4, 0, 0, 0, 0, 0, 1, 2], // 44.1 kHz
    [-4, 0, 0, 0, 0, 0, 1, 2], // 48 kHz
];

/// Inverse quantizer step `2^28 / (2^n - 1)`, indexed by `n - 1`
pub const RANGE_SCALE: [i32; 16] = [
    0x0FFF_FFFF, 0x0555_5556, 0x0249_2492, 0x0111_1111,
    0x0084_2108, 0x0041_0410, 0x0020_4081, 0x0010_1010,
    0x0008_0402, 0x0004_0100, 0x0002_0040, 0x0001_0010,
    0x0000_8004, 0x0000_4001, 0x0000_2000, 0x0000_1000,
];

/// CRC-8 generator polynomial `x^8 + x^4 + x^3 + x^2 + 1`
pub const CRC8_POLY: u8 = 0x1D;

/// Byte-wise CRC-8 table for [`CRC8_POLY`]
pub const CRC8_TABLE: [u8; 256] = crc8_table(CRC8_POLY);

const fn crc8_table(poly: u8) -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < table.len() {
        let mut value = i as u8;
        let mut bit = 0;
        while bit < 8 {
            value = (value << 1) ^ (((value >> 7) & 1) * poly);
            bit += 1;
        }
        table[i] = value;
        i += 1;
    }
    table
}

/// Window coefficients for the given subband count.
#[inline]
pub fn window(subbands: usize) -> &'static [i16] {
    if subbands == 4 {
        &WINDOW_4
    } else {
        &WINDOW_8
    }
}

/// Rounding right shift: `(x + 2^(shift-1)) >> shift`.
#[inline(always)]
pub fn round_shift(x: i64, shift: u32) -> i64 {
    (x + (1i64 << (shift - 1))) >> shift
}

/// Saturate to the signed 16-bit range.
#[inline(always)]
pub fn saturate16(x: i64) -> i16 {
    x.clamp(i16::MIN as i64, i16::MAX as i64) as i16
}

/// Magnitude used for scale factors; negative values map to their one's complement.
#[inline(always)]
pub fn magnitude(sample: i32) -> u32 {
    if sample < 0 {
        !sample as u32
    } else {
        sample as u32
    }
}

/// Position of the highest set bit, 0 for an empty mask.
#[inline(always)]
pub fn scale_factor(mask: u32) -> u8 {
    if mask == 0 {
        0
    } else {
        (31 - mask.leading_zeros()) as u8
    }
}

/// `log2` of the subband count (2 or 3).
#[inline(always)]
pub fn log2_subbands(subbands: usize) -> u32 {
    subbands.trailing_zeros()
}
