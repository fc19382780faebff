//! SBC command line tool
//!
//! Encodes 16-bit WAV files to raw SBC or mSBC frame streams, decodes them
//! back to WAV, and prints per-frame side information.

use sbc_rs::pcm_utils::{deinterleave, downmix, interleave, pad_to};
use sbc_rs::util::{read_wav_file, write_wav_file};
use sbc_rs::{
    AllocationMethod, ChannelMode, CodecConfig, Decoder, Encoder, FrameDescriptor, FrameScanner,
};
use std::env;
use std::fs;
use std::process;

/// Subcommand selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Encode,
    Decode,
    Info,
}

/// Command line arguments structure
struct Args {
    command: Command,
    input_file: String,
    output_file: Option<String>,
    bitpool: Option<u8>,
    blocks: Option<u8>,
    subbands: Option<u8>,
    mode: Option<ChannelMode>,
    allocation: Option<AllocationMethod>,
    msbc: bool,
    json: bool,
    quiet: bool,
    verbose: bool,
}

impl Args {
    /// Parse command line arguments
    fn parse() -> Result<Self, String> {
        let args: Vec<String> = env::args().collect();

        if args.len() < 3 {
            return Err("".to_string()); // Empty error triggers usage display
        }

        let command = match args[1].as_str() {
            "encode" => Command::Encode,
            "decode" => Command::Decode,
            "info" => Command::Info,
            "-h" | "--help" => return Err("".to_string()),
            other => return Err(format!("Unknown command: {}", other)),
        };

        let mut parsed = Args {
            command,
            input_file: String::new(),
            output_file: None,
            bitpool: None,
            blocks: None,
            subbands: None,
            mode: None,
            allocation: None,
            msbc: false,
            json: false,
            quiet: false,
            verbose: false,
        };

        let mut files = Vec::new();
        let mut i = 2;
        while i < args.len() {
            let arg = args[i].as_str();
            match arg {
                "-p" | "-b" | "-s" | "-m" | "-a" => {
                    i += 1;
                    let value = args
                        .get(i)
                        .ok_or_else(|| format!("Option {} requires a value", arg))?;
                    parsed.apply_option(arg, value)?;
                }
                "--msbc" => parsed.msbc = true,
                "--json" => parsed.json = true,
                "-q" => {
                    parsed.quiet = true;
                    parsed.verbose = false;
                }
                "-v" => {
                    parsed.verbose = true;
                    parsed.quiet = false;
                }
                "-h" => return Err("".to_string()),
                _ if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
                _ => files.push(args[i].clone()),
            }
            i += 1;
        }

        let expected = if command == Command::Info { 1 } else { 2 };
        if files.len() != expected {
            return Err("".to_string());
        }
        parsed.input_file = files[0].clone();
        parsed.output_file = files.get(1).cloned();

        Ok(parsed)
    }

    fn apply_option(&mut self, option: &str, value: &str) -> Result<(), String> {
        let number = || {
            value
                .parse::<u8>()
                .map_err(|_| format!("Invalid value for {}: {}", option, value))
        };
        match option {
            "-p" => self.bitpool = Some(number()?),
            "-b" => self.blocks = Some(number()?),
            "-s" => self.subbands = Some(number()?),
            "-m" => {
                self.mode = Some(match value {
                    "mono" => ChannelMode::Mono,
                    "dual" => ChannelMode::DualChannel,
                    "stereo" => ChannelMode::Stereo,
                    "joint" => ChannelMode::JointStereo,
                    _ => return Err(format!("Unknown channel mode: {}", value)),
                })
            }
            "-a" => {
                self.allocation = Some(match value {
                    "loudness" => AllocationMethod::Loudness,
                    "snr" => AllocationMethod::Snr,
                    _ => return Err(format!("Unknown allocation method: {}", value)),
                })
            }
            _ => return Err(format!("Unknown option: {}", option)),
        }
        Ok(())
    }
}

/// Print usage information
fn print_usage() {
    println!("Usage: sbc encode [options] <infile.wav> <outfile.sbc>");
    println!("       sbc decode [-q] [-v] <infile.sbc> <outfile.wav>");
    println!("       sbc info [--json] <infile.sbc>");
    println!();
    println!("Encoder options:");
    println!(" -p <bitpool>  bits per frame budget, default A2DP high quality");
    println!(" -b <blocks>   4, 8, 12 or 16, default 16");
    println!(" -s <subbands> 4 or 8, default 8");
    println!(" -m <mode>     mono, dual, stereo or joint, default joint for stereo input");
    println!(" -a <method>   loudness or snr, default loudness");
    println!(" --msbc        encode wideband speech (16 kHz mono) frames");
    println!();
    println!("Common options:");
    println!(" -h            this help message");
    println!(" -q            quiet mode");
    println!(" -v            verbose mode");
    println!(" --json        JSON frame report (info, requires the diagnostics feature)");
}

fn encoder_config(args: &Args, sample_rate: u32, channels: u16) -> CodecConfig {
    if args.msbc {
        return CodecConfig::msbc();
    }
    let mut config = CodecConfig::a2dp_high_quality(sample_rate, channels);
    if let Some(mode) = args.mode {
        config = config.with_channel_mode(mode);
    }
    if let Some(allocation) = args.allocation {
        config = config.with_allocation(allocation);
    }
    if let Some(blocks) = args.blocks {
        config = config.with_blocks(blocks);
    }
    if let Some(subbands) = args.subbands {
        config = config.with_subbands(subbands);
    }
    if let Some(bitpool) = args.bitpool {
        config = config.with_bitpool(bitpool);
    }
    config
}

/// Convert a WAV file into concatenated SBC frames
fn encode_file(args: &Args, output_file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let wav = read_wav_file(&args.input_file)
        .map_err(|e| format!("Could not open WAVE file: {}", e))?;

    let config = encoder_config(args, wav.sample_rate, wav.channels);
    let desc = config.descriptor()?;
    if desc.sample_rate() != wav.sample_rate {
        return Err(format!(
            "Input is {} Hz but the frame layout requires {} Hz",
            wav.sample_rate,
            desc.sample_rate()
        )
        .into());
    }

    let (mut left, right) = deinterleave(&wav.samples, wav.channels as usize);
    let mut right = match (desc.channels(), right) {
        (1, Some(right)) => {
            left = downmix(&left, &right);
            None
        }
        (1, None) => None,
        (_, Some(right)) => Some(right),
        (_, None) => {
            config.validate_channels(wav.channels)?;
            None
        }
    };

    let samples_per_frame = desc.samples_per_frame();
    let total = left.len();
    pad_to(&mut left, samples_per_frame);
    if let Some(right) = right.as_mut() {
        pad_to(right, samples_per_frame);
    }

    if !args.quiet {
        println!(
            "WAVE PCM Data, {} channel(s) {}Hz 16bit, {} samples",
            wav.channels, wav.sample_rate, total
        );
        println!(
            "{}{:?}, {} blocks, {} subbands, {:?}, bitpool {}, {} bytes/frame, {:.1} kbps",
            if desc.msbc { "mSBC " } else { "" },
            desc.mode,
            desc.blocks,
            desc.subbands,
            desc.allocation,
            desc.bitpool,
            desc.frame_size(),
            desc.bitrate() as f64 / 1000.0
        );
    }

    let mut encoder = Encoder::new();
    let mut output = Vec::with_capacity(left.len() / samples_per_frame * desc.frame_size());
    for (frame, start) in (0..left.len()).step_by(samples_per_frame).enumerate() {
        let end = start + samples_per_frame;
        let r = right.as_ref().map(|r| &r[start..end]);
        let bytes = encoder.encode(&left[start..end], r, &desc)?;
        if args.verbose {
            println!(
                "[Frame {}] PCM {}-{}, {} bytes @ 0x{:06X}, CRC 0x{:02X}",
                frame + 1,
                start,
                end - 1,
                bytes.len(),
                output.len(),
                bytes[3]
            );
        }
        output.extend_from_slice(&bytes);
    }

    fs::write(output_file, &output)?;
    if !args.quiet {
        println!("Wrote {} bytes to \"{}\"", output.len(), output_file);
    }
    Ok(())
}

/// Decode concatenated SBC frames into a WAV file
fn decode_file(args: &Args, output_file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(&args.input_file)?;

    let mut decoder = Decoder::new();
    let mut layout: Option<FrameDescriptor> = None;
    let mut pcm = Vec::new();
    let mut decoded = 0usize;
    let mut rejected = 0usize;

    for (offset, desc, bytes) in FrameScanner::new(&data) {
        if let Some(first) = layout {
            if first.channels() != desc.channels() || first.sample_rate() != desc.sample_rate() {
                log::warn!("Frame at offset {} changes the stream layout, skipped", offset);
                rejected += 1;
                continue;
            }
        }
        match decoder.decode(bytes) {
            Ok(frame) => {
                layout.get_or_insert(frame.descriptor);
                pcm.extend(interleave(&frame.left, frame.right.as_deref()));
                decoded += 1;
                if args.verbose {
                    println!(
                        "[Frame {}] {} bytes @ 0x{:06X}, {} samples",
                        decoded,
                        bytes.len(),
                        offset,
                        frame.left.len()
                    );
                }
            }
            Err(err) => {
                log::warn!("Frame at offset {} dropped: {}", offset, err);
                rejected += 1;
            }
        }
    }

    let layout = layout.ok_or("No decodable SBC frames found")?;
    write_wav_file(
        output_file,
        &pcm,
        layout.sample_rate(),
        layout.channels() as u16,
    )?;

    if !args.quiet {
        println!(
            "Decoded {} frames ({} rejected) to \"{}\", {} channel(s) {}Hz",
            decoded,
            rejected,
            output_file,
            layout.channels(),
            layout.sample_rate()
        );
    }
    Ok(())
}

/// Print side information of every frame
fn info_file(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(&args.input_file)?;

    if args.json {
        #[cfg(feature = "diagnostics")]
        {
            let reports = sbc_rs::diagnostics::report_stream(&data);
            println!("{}", sbc_rs::diagnostics::to_json(&reports)?);
            return Ok(());
        }
        #[cfg(not(feature = "diagnostics"))]
        return Err("JSON reports require the diagnostics feature".into());
    }

    for (n, (offset, desc, bytes)) in FrameScanner::new(&data).enumerate() {
        let status = match Decoder::inspect(bytes) {
            Ok(info) => format!("CRC 0x{:02X} ok, joint mask 0b{:b}", info.crc, info.joint_mask),
            Err(err) => format!("rejected: {}", err),
        };
        println!(
            "[Frame {}] @ 0x{:06X} {}{:?} {}Hz {}x{} {:?} bitpool {} ({} bytes), {}",
            n + 1,
            offset,
            if desc.msbc { "mSBC " } else { "" },
            desc.mode,
            desc.sample_rate(),
            desc.blocks,
            desc.subbands,
            desc.allocation,
            desc.bitpool,
            desc.frame_size(),
            status
        );
    }
    Ok(())
}

fn main() {
    // Parse command line arguments
    let args = match Args::parse() {
        Ok(args) => args,
        Err(err) => {
            if err.is_empty() {
                // Empty error means show usage
                print_usage();
            } else {
                eprintln!("Error: {}", err);
            }
            process::exit(1);
        }
    };

    // Initialize logger with minimal output (only errors by default)
    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Error
        })
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let result = match (args.command, args.output_file.as_deref()) {
        (Command::Encode, Some(output)) => encode_file(&args, output),
        (Command::Decode, Some(output)) => decode_file(&args, output),
        (Command::Info, _) => info_file(&args),
        _ => {
            print_usage();
            process::exit(1);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}
