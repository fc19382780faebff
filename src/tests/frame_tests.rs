//! Unit tests for the frame descriptor and header codec
//!
//! Tests validity rules, maximum bitpool, frame size, header
//! serialization, probing and frame scanning.

use crate::bitstream::BitWriter;
use crate::error::{ConfigError, FrameError};
use crate::frame::*;

fn descriptor(
    frequency: Frequency,
    blocks: u8,
    mode: ChannelMode,
    allocation: AllocationMethod,
    subbands: u8,
    bitpool: u8,
) -> FrameDescriptor {
    FrameDescriptor {
        msbc: false,
        frequency,
        mode,
        allocation,
        blocks,
        subbands,
        bitpool,
    }
}

fn header_bytes(desc: &FrameDescriptor) -> Vec<u8> {
    let mut writer = BitWriter::new(4);
    desc.write_header(&mut writer);
    writer.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_msbc_descriptor() {
        let desc = FrameDescriptor::msbc();

        assert!(desc.msbc);
        assert_eq!(desc.frequency, Frequency::Freq16k);
        assert_eq!(desc.mode, ChannelMode::Mono);
        assert_eq!(desc.allocation, AllocationMethod::Loudness);
        assert_eq!(desc.subbands, 8);
        assert_eq!(desc.blocks, 15);
        assert_eq!(desc.bitpool, 26);
        assert!(desc.is_valid());
        assert_eq!(desc.frame_size(), 57);
        assert_eq!(desc.samples_per_frame(), 120);
        assert_eq!(desc.bitrate(), 60_800);
    }

    #[test]
    fn test_msbc_overrides_fields() {
        let mut desc = FrameDescriptor::default();
        desc.msbc = true;
        desc.bitpool = 200;
        desc.blocks = 4;

        let normalized = desc.normalized();
        assert_eq!(normalized, FrameDescriptor::msbc());
        assert_eq!(normalized.frame_size(), 57);

        let plain = FrameDescriptor::default();
        assert_eq!(plain.normalized(), plain);
    }

    #[test]
    fn test_msbc_getters_match_encoded_frame() {
        let desc = FrameDescriptor {
            blocks: 16,
            bitpool: 250,
            mode: ChannelMode::Stereo,
            ..FrameDescriptor::msbc()
        };

        assert!(desc.is_valid());
        assert_eq!(desc.channels(), 1);
        assert_eq!(desc.sample_rate(), 16_000);
        assert_eq!(desc.samples_per_frame(), 120);
        assert_eq!(desc.max_bitpool(), 123);
        assert_eq!(desc.frame_size(), 57);
        assert_eq!(desc.bitrate(), 60_800);

        let frame = crate::Encoder::new()
            .encode(&[0; 120], None, &desc)
            .unwrap();
        assert_eq!(frame.len(), desc.frame_size());
    }

    #[test]
    fn test_frame_size_formula() {
        // 4 + ceil((4 * 8 * 2 + 12 * 53) / 8)
        let desc = descriptor(
            Frequency::Freq44k1,
            12,
            ChannelMode::Stereo,
            AllocationMethod::Loudness,
            8,
            53,
        );
        assert_eq!(desc.frame_size(), 4 + (4 * 8 * 2 + 12 * 53 + 7) / 8);
        assert_eq!(desc.frame_size(), 92);

        let hq = FrameDescriptor::default();
        assert_eq!(hq.frame_size(), 119);
        assert_eq!(hq.bitrate(), 327_993);

        let dual = descriptor(
            Frequency::Freq48k,
            8,
            ChannelMode::DualChannel,
            AllocationMethod::Snr,
            4,
            20,
        );
        // 32 scale factor bits + 2 * 8 * 20 sample bits
        assert_eq!(dual.frame_size(), 4 + (32 + 320) / 8);

        let mono = descriptor(
            Frequency::Freq16k,
            4,
            ChannelMode::Mono,
            AllocationMethod::Snr,
            4,
            2,
        );
        assert_eq!(mono.frame_size(), 7);
    }

    #[test]
    fn test_max_bitpool() {
        use AllocationMethod::*;
        use ChannelMode::*;
        use Frequency::*;

        let cases = [
            (Freq44k1, 16, Mono, Loudness, 8, 124),
            (Freq44k1, 16, DualChannel, Loudness, 8, 125),
            (Freq44k1, 16, Stereo, Loudness, 8, 250),
            (Freq44k1, 16, JointStereo, Loudness, 8, 249),
            (Freq16k, 4, Mono, Loudness, 4, 52),
            (Freq16k, 4, JointStereo, Loudness, 4, 111),
            (Freq48k, 8, DualChannel, Snr, 4, 60),
            (Freq32k, 12, Stereo, Loudness, 4, 122),
        ];
        for (frequency, blocks, mode, allocation, subbands, max) in cases {
            let mut desc = descriptor(frequency, blocks, mode, allocation, subbands, 0);
            assert_eq!(desc.max_bitpool(), max, "{:?}", desc);

            desc.bitpool = max as u8;
            assert!(desc.is_valid());
            desc.bitpool = max as u8 + 1;
            assert!(!desc.is_valid());
            assert_eq!(
                desc.validate(),
                Err(ConfigError::BitpoolTooLarge {
                    bitpool: max as u8 + 1,
                    max
                })
            );
        }

        assert_eq!(FrameDescriptor::msbc().max_bitpool(), 123);
    }

    #[test]
    fn test_invalid_blocks_and_subbands() {
        let mut desc = FrameDescriptor::default();

        for blocks in [0u8, 3, 5, 15, 17, 20] {
            desc.blocks = blocks;
            assert_eq!(desc.validate(), Err(ConfigError::InvalidBlocks(blocks)));
        }

        desc.blocks = 16;
        for subbands in [0u8, 2, 6, 16] {
            desc.subbands = subbands;
            assert_eq!(desc.validate(), Err(ConfigError::InvalidSubbands(subbands)));
        }

        // 15 blocks is only allowed for mSBC
        let msbc = FrameDescriptor::msbc();
        assert!(msbc.is_valid());
    }

    #[test]
    fn test_header_layout() {
        let desc = FrameDescriptor::default();
        assert_eq!(header_bytes(&desc), vec![0x9C, 0xBD, 53, 0x00]);

        let desc = descriptor(
            Frequency::Freq44k1,
            12,
            ChannelMode::Stereo,
            AllocationMethod::Loudness,
            8,
            53,
        );
        assert_eq!(header_bytes(&desc), vec![0x9C, 0xA9, 53, 0x00]);

        let desc = descriptor(
            Frequency::Freq16k,
            4,
            ChannelMode::Mono,
            AllocationMethod::Snr,
            4,
            12,
        );
        assert_eq!(header_bytes(&desc), vec![0x9C, 0x02, 12, 0x00]);

        assert_eq!(
            header_bytes(&FrameDescriptor::msbc()),
            vec![0xAD, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_read_header_round_trip() {
        use AllocationMethod::*;
        use ChannelMode::*;
        use Frequency::*;

        for frequency in [Freq16k, Freq32k, Freq44k1, Freq48k] {
            for mode in [Mono, DualChannel, Stereo, JointStereo] {
                for allocation in [Loudness, Snr] {
                    for blocks in [4u8, 8, 12, 16] {
                        for subbands in [4u8, 8] {
                            let mut desc =
                                descriptor(frequency, blocks, mode, allocation, subbands, 0);
                            desc.bitpool = desc.max_bitpool().min(255) as u8;

                            let bytes = header_bytes(&desc);
                            assert_eq!(FrameDescriptor::read_header(&bytes), Ok(desc));
                            assert_eq!(FrameDescriptor::probe(&bytes), Some(desc));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_read_header_errors() {
        assert_eq!(
            FrameDescriptor::read_header(&[0x9C, 0xBD, 53]),
            Err(FrameError::BufferTooShort {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            FrameDescriptor::read_header(&[0x00, 0xBD, 53, 0]),
            Err(FrameError::InvalidSyncword(0x00))
        );
        assert_eq!(
            FrameDescriptor::read_header(&[0xAD, 0x00, 0x01, 0]),
            Err(FrameError::ReservedBits)
        );

        // Mono 8 blocks 4 subbands carries at most bitpool 58
        assert_eq!(
            FrameDescriptor::read_header(&[0x9C, 0x10, 255, 0]),
            Err(FrameError::MalformedHeader(ConfigError::BitpoolTooLarge {
                bitpool: 255,
                max: 58,
            }))
        );
    }

    #[test]
    fn test_probe() {
        assert_eq!(FrameDescriptor::probe(&[]), None);
        assert_eq!(FrameDescriptor::probe(&[0x9C, 0xBD]), None);
        assert_eq!(FrameDescriptor::probe(&[0x00, 0xBD, 53, 0]), None);
        assert_eq!(
            FrameDescriptor::probe(&[0xAD, 0, 0, 0xFF]),
            Some(FrameDescriptor::msbc())
        );
        assert_eq!(
            FrameDescriptor::probe(&[0x9C, 0xBD, 53, 0x12]),
            Some(FrameDescriptor::default())
        );
    }

    #[test]
    fn test_frequency_conversions() {
        for code in 0..4u8 {
            let frequency = Frequency::from_code(code);
            assert_eq!(frequency.code(), code);
            assert_eq!(Frequency::from_hz(frequency.hz()), Some(frequency));
        }
        assert_eq!(Frequency::from_hz(22_050), None);
        assert_eq!(Frequency::Freq44k1.hz(), 44_100);
    }

    #[test]
    fn test_channel_mode_properties() {
        assert_eq!(ChannelMode::Mono.channels(), 1);
        assert_eq!(ChannelMode::DualChannel.channels(), 2);
        assert!(ChannelMode::JointStereo.is_joint());
        assert!(ChannelMode::JointStereo.is_stereo());
        assert!(ChannelMode::Stereo.is_stereo());
        assert!(!ChannelMode::DualChannel.is_stereo());
        assert!(ChannelMode::DualChannel.is_dual());
        for code in 0..4u8 {
            assert_eq!(ChannelMode::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_scanner_splits_frames() {
        let hq = FrameDescriptor::default();
        let mut stream = Vec::new();
        for _ in 0..3 {
            let mut frame = header_bytes(&hq);
            frame.resize(hq.frame_size(), 0);
            stream.extend_from_slice(&frame);
        }

        let frames: Vec<_> = FrameScanner::new(&stream).collect();
        assert_eq!(frames.len(), 3);
        for (i, (offset, desc, bytes)) in frames.iter().enumerate() {
            assert_eq!(*offset, i * 119);
            assert_eq!(*desc, hq);
            assert_eq!(bytes.len(), 119);
        }
    }

    #[test]
    fn test_scanner_resynchronises() {
        let msbc = FrameDescriptor::msbc();
        let mut frame = header_bytes(&msbc);
        frame.resize(57, 0);

        let mut stream = vec![0x01, 0x02, 0x03];
        stream.extend_from_slice(&frame);
        stream.extend_from_slice(&[0x55; 5]);
        stream.extend_from_slice(&frame);
        // Truncated trailing frame
        stream.extend_from_slice(&frame[..20]);

        let mut scanner = FrameScanner::new(&stream);
        let offsets: Vec<usize> = scanner.by_ref().map(|(offset, _, _)| offset).collect();
        assert_eq!(offsets, vec![3, 65]);
        assert_eq!(scanner.skipped(), 3 + 5 + 17);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 200,
            verbose: 0,
            max_shrink_iters: 0,
            failure_persistence: None,
            ..ProptestConfig::default()
        })]

        #[test]
        fn test_probe_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..8)) {
            if let Some(desc) = FrameDescriptor::probe(&bytes) {
                prop_assert!(desc.is_valid());
                prop_assert!(bytes[0] == 0x9C || bytes[0] == 0xAD);
            }
        }

        #[test]
        fn test_valid_descriptor_sizes(
            frequency in 0u8..4,
            blocks_code in 0u8..4,
            mode in 0u8..4,
            allocation in 0u8..2,
            subbands_code in 0u8..2,
            bitpool in any::<u8>(),
        ) {
            let desc = FrameDescriptor {
                msbc: false,
                frequency: Frequency::from_code(frequency),
                mode: ChannelMode::from_code(mode),
                allocation: AllocationMethod::from_code(allocation),
                blocks: (blocks_code + 1) * 4,
                subbands: (subbands_code + 1) * 4,
                bitpool,
            };

            prop_assert_eq!(desc.is_valid(), bitpool as u32 <= desc.max_bitpool());
            if desc.is_valid() {
                // Payload always fits within the 16-bit-per-sample ceiling
                let pcm_bits = 16 * desc.samples_per_frame() * desc.channels();
                prop_assert!(desc.frame_size() * 8 <= pcm_bits + 8);
                prop_assert_eq!(FrameDescriptor::probe(&header_bytes(&desc)), Some(desc));
            }
        }

        #[test]
        fn test_msbc_size_ignores_fields(
            frequency in 0u8..4,
            mode in 0u8..4,
            allocation in 0u8..2,
            blocks in any::<u8>(),
            subbands in any::<u8>(),
            bitpool in any::<u8>(),
        ) {
            let desc = FrameDescriptor {
                msbc: true,
                frequency: Frequency::from_code(frequency),
                mode: ChannelMode::from_code(mode),
                allocation: AllocationMethod::from_code(allocation),
                blocks,
                subbands,
                bitpool,
            };

            prop_assert!(desc.is_valid());
            let frame = crate::Encoder::new().encode(&[0; 120], None, &desc).unwrap();
            prop_assert_eq!(frame.len(), desc.frame_size());
            prop_assert_eq!(FrameDescriptor::probe(&frame), Some(FrameDescriptor::msbc()));
        }
    }
}
