use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{info, warn};
use std::path::{Path, PathBuf};

use jdspfx::settings::Settings;
use jdspfx::{AudioFormat, BufferFlags, Jdspfx, PassthroughEngine, Transform};

#[derive(Parser, Debug)]
#[command(name = "jdspfx")]
#[command(version)]
#[command(about = "Offline host for the jdspfx effect element.")]
struct Args {
    #[arg(long, env = "JDSPFX_SETTINGS", global = true, help = "Settings file")]
    settings: Option<PathBuf>,

    #[arg(long = "set", value_name = "NAME=VALUE", global = true, help = "Override a property")]
    overrides: Vec<String>,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Stream a stereo WAV file through the element
    Process {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, help = "Frames per buffer (defaults to the settings value)")]
        block_frames: Option<usize>,
    },
    /// Print the commands the engine receives when it is configured
    Commands {
        #[arg(long, help = "Sample rate (defaults to the settings value)")]
        sample_rate: Option<u32>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    info!("jdspfx v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = match &args.settings {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    for arg in &args.overrides {
        let (name, value) = Settings::parse_override(arg)?;
        settings.properties.insert(name, value);
    }

    match args.command {
        Mode::Process {
            input,
            output,
            block_frames,
        } => {
            let fx = Jdspfx::new(PassthroughEngine::new());
            let rejected = settings.apply(&fx);
            if rejected > 0 {
                warn!("{rejected} setting(s) rejected, previous values kept");
            }
            process_file(
                &fx,
                &input,
                &output,
                block_frames.unwrap_or(settings.block_frames),
            )
        }
        Mode::Commands { sample_rate } => {
            for cmd in settings.engine_commands(sample_rate)? {
                println!("{cmd}");
            }
            Ok(())
        }
    }
}

fn process_file(fx: &Jdspfx, input: &Path, output: &Path, block_frames: usize) -> Result<()> {
    if block_frames == 0 {
        bail!("block size must be at least one frame");
    }

    let reader = WavReader::open(input)
        .with_context(|| format!("Failed to open WAV file {}", input.display()))?;
    let spec = reader.spec();
    if spec.channels != 2 {
        bail!("expected a stereo file, got {} channels", spec.channels);
    }

    let mut samples: Vec<f32> = if spec.sample_format == SampleFormat::Float {
        reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read float samples")?
    } else {
        let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
        reader
            .into_samples::<i32>()
            .map(|s| s.map(|v| v as f32 / max_val))
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read integer samples")?
    };

    let rate = i32::try_from(spec.sample_rate).context("sample rate out of range")?;
    fx.setup(&AudioFormat::stereo_f32(rate))
        .context("element rejected the stream format")?;

    let mut stream = fx.stream();
    let mut processed = 0usize;
    for block in samples.chunks_mut(block_frames * 2) {
        if let Transform::Processed { frames } = stream.transform_samples(block, BufferFlags::NONE)? {
            processed += frames;
        }
    }
    fx.stop()?;

    info!(
        "Processed {processed} of {} frames at {} Hz",
        samples.len() / 2,
        spec.sample_rate
    );

    let out_spec = WavSpec {
        channels: 2,
        sample_rate: spec.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(output, out_spec)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    for s in &samples {
        writer.write_sample(*s)?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;

    Ok(())
}
