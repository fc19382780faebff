//! Serializable per-frame reports
//!
//! Walks an encoded stream, inspects every frame's side information and
//! collects it into structures that serialize to JSON for offline analysis.
//!
//! This module is only available when the "diagnostics" feature is enabled.

use serde::{Deserialize, Serialize};

use crate::decoder::{Decoder, FrameInfo};
use crate::frame::FrameScanner;

/// Side information of one frame in a stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameReport {
    /// Frame number (1-based)
    pub frame_number: usize,
    /// Byte offset in the stream
    pub offset: usize,
    /// Frame size in bytes
    pub frame_size: usize,
    pub msbc: bool,
    pub sample_rate: u32,
    pub mode: String,
    pub allocation: String,
    pub blocks: u8,
    pub subbands: u8,
    pub bitpool: u8,
    /// Bits per second at this layout
    pub bitrate: u32,
    pub crc: u8,
    /// False when the frame failed CRC or payload checks
    pub valid: bool,
    pub joint_mask: u8,
    /// Scale factors per coded channel
    pub scale_factors: Vec<Vec<u8>>,
    /// Allocated bits per coded channel
    pub bits: Vec<Vec<u8>>,
    pub sb_scale: Vec<i32>,
}

impl FrameReport {
    fn from_info(frame_number: usize, offset: usize, info: &FrameInfo) -> Self {
        let desc = &info.descriptor;
        let channels = desc.channels();
        let subbands = desc.subbands as usize;
        Self {
            frame_number,
            offset,
            frame_size: info.frame_size,
            msbc: desc.msbc,
            sample_rate: desc.sample_rate(),
            mode: format!("{:?}", desc.mode),
            allocation: format!("{:?}", desc.allocation),
            blocks: desc.blocks,
            subbands: desc.subbands,
            bitpool: desc.bitpool,
            bitrate: desc.bitrate(),
            crc: info.crc,
            valid: true,
            joint_mask: info.joint_mask,
            scale_factors: info.scale_factors[..channels]
                .iter()
                .map(|row| row[..subbands].to_vec())
                .collect(),
            bits: info.bits[..channels]
                .iter()
                .map(|row| row[..subbands].to_vec())
                .collect(),
            sb_scale: info.sb_scale[..channels].to_vec(),
        }
    }
}

/// Report every frame the scanner finds in `data`.
///
/// Frames whose header parses but whose CRC or payload is rejected are kept
/// with `valid == false` and empty side information.
pub fn report_stream(data: &[u8]) -> Vec<FrameReport> {
    FrameScanner::new(data)
        .enumerate()
        .map(|(i, (offset, desc, bytes))| match Decoder::inspect(bytes) {
            Ok(info) => FrameReport::from_info(i + 1, offset, &info),
            Err(err) => {
                log::info!("Frame {} at offset {} rejected: {}", i + 1, offset, err);
                FrameReport {
                    frame_number: i + 1,
                    offset,
                    frame_size: desc.frame_size(),
                    msbc: desc.msbc,
                    sample_rate: desc.sample_rate(),
                    mode: format!("{:?}", desc.mode),
                    allocation: format!("{:?}", desc.allocation),
                    blocks: desc.blocks,
                    subbands: desc.subbands,
                    bitpool: desc.bitpool,
                    bitrate: desc.bitrate(),
                    crc: bytes.get(3).copied().unwrap_or(0),
                    valid: false,
                    joint_mask: 0,
                    scale_factors: Vec::new(),
                    bits: Vec::new(),
                    sb_scale: Vec::new(),
                }
            }
        })
        .collect()
}

/// Serialize reports as pretty-printed JSON
pub fn to_json(reports: &[FrameReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}
