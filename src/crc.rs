//! CRC-8 protection of SBC frame headers
//!
//! The checksum covers the second and third header bytes followed by the
//! joint-stereo mask and the scale factors. The syncword and the CRC byte
//! itself are skipped. A trailing partial byte contributes only its upper
//! nibble, which is all the scale-factor layout can leave over.

use crate::frame::FrameDescriptor;
use crate::tables::{CRC8_TABLE, HEADER_SIZE};

/// Initial value of the SBC CRC register
pub const CRC8_INIT: u8 = 0x0F;

/// Feed one byte into the CRC register
#[inline(always)]
pub fn crc8_byte(crc: u8, byte: u8) -> u8 {
    CRC8_TABLE[(crc ^ byte) as usize]
}

/// Feed the upper 4 bits of `byte` into the CRC register
#[inline(always)]
pub fn crc8_nibble(crc: u8, byte: u8) -> u8 {
    (crc << 4) ^ CRC8_TABLE[((crc >> 4) ^ (byte >> 4)) as usize]
}

/// Number of payload bits covered by the CRC for this layout
pub fn protected_bits(desc: &FrameDescriptor) -> usize {
    let subbands = desc.subbands as usize;
    let joint = if desc.mode.is_joint() { subbands } else { 0 };
    desc.channels() * subbands * 4 + joint
}

/// Compute the CRC of a frame buffer.
///
/// `data` must hold at least the header and the scale factors; missing
/// bytes read as zero.
pub fn frame_crc(desc: &FrameDescriptor, data: &[u8]) -> u8 {
    let byte_at = |i: usize| data.get(i).copied().unwrap_or(0);
    let nbits = protected_bits(desc);

    let mut crc = CRC8_INIT;
    crc = crc8_byte(crc, byte_at(1));
    crc = crc8_byte(crc, byte_at(2));

    let end = HEADER_SIZE * 8 + nbits;
    let mut bit = HEADER_SIZE * 8;
    while bit + 8 <= end {
        crc = crc8_byte(crc, byte_at(bit >> 3));
        bit += 8;
    }
    if nbits % 8 != 0 {
        crc = crc8_nibble(crc, byte_at(bit >> 3));
    }
    crc
}
