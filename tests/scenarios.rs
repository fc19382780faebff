//! End-to-end behaviour of the public API on the reference scenarios

use sbc_rs::{
    AllocationMethod, ChannelMode, CodecConfig, Decoder, Encoder, ErrorKind, FrameDescriptor,
    Frequency,
};

fn correlated_tone(len: usize) -> Vec<i16> {
    (0..len)
        .map(|n| (9000.0 * (2.0 * std::f64::consts::PI * 0.017 * n as f64).sin()) as i16)
        .collect()
}

#[test]
fn test_msbc_silence() {
    let desc = CodecConfig::msbc().descriptor().unwrap();
    let mut encoder = Encoder::new();
    let frame = encoder.encode(&[0; 120], None, &desc).unwrap();
    assert_eq!(frame.len(), 57);

    let decoded = Decoder::new().decode(&frame).unwrap();
    assert_eq!(decoded.descriptor.subbands, 8);
    assert_eq!(decoded.descriptor.blocks, 15);
    assert_eq!(decoded.descriptor.bitpool, 26);
    assert_eq!(decoded.left, vec![0; 120]);
}

#[test]
fn test_frame_size_formula() {
    let desc = FrameDescriptor {
        msbc: false,
        frequency: Frequency::Freq44k1,
        mode: ChannelMode::Stereo,
        allocation: AllocationMethod::Loudness,
        blocks: 12,
        subbands: 8,
        bitpool: 53,
    };
    assert_eq!(desc.frame_size(), 4 + (4 * 8 * 2 + 12 * 53 + 7) / 8);
    assert_eq!(desc.frame_size(), 92);
}

#[test]
fn test_decode_tiny_buffer() {
    let mut decoder = Decoder::new();
    for len in 0..4 {
        let err = decoder.decode(&vec![0x9C; len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferTooShort);
    }
}

#[test]
fn test_probe_rejects_zero_syncword() {
    let mut frame = Encoder::new()
        .encode(&[0; 120], None, &FrameDescriptor::msbc())
        .unwrap();
    assert!(Decoder::probe(&frame).is_some());
    frame[0] = 0x00;
    assert!(Decoder::probe(&frame).is_none());
}

#[test]
fn test_joint_stereo_identical_channels() {
    let desc = CodecConfig::default().descriptor().unwrap();
    let n = desc.samples_per_frame();
    let pcm = correlated_tone(n * 6);
    let mut encoder = Encoder::new();
    let mut decoder = Decoder::new();

    for chunk in pcm.chunks_exact(n) {
        let frame = encoder.encode(chunk, Some(chunk), &desc).unwrap();
        let info = Decoder::inspect(&frame).unwrap();
        assert_ne!(info.joint_mask, 0);

        let decoded = decoder.decode(&frame).unwrap();
        let right = decoded.right.expect("two channels");
        for (&l, &r) in decoded.left.iter().zip(&right) {
            assert!((l as i32 - r as i32).abs() <= 8, "left {} right {}", l, r);
        }
    }
}

#[test]
fn test_flipped_crc_rejected() {
    let desc = CodecConfig::default().descriptor().unwrap();
    let pcm = correlated_tone(desc.samples_per_frame());
    let mut frame = Encoder::new().encode(&pcm, Some(&pcm), &desc).unwrap();
    assert!(Decoder::new().decode(&frame).is_ok());

    for bit in 0..8 {
        frame[3] ^= 1 << bit;
        let err = Decoder::new().decode(&frame).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ChecksumMismatch);
        frame[3] ^= 1 << bit;
    }
}
