use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tdpsola::{ShiftConfig, io, pitch_shift, pitch_shift_traced};

#[derive(Parser)]
#[command(name = "tdpsola", about = "TD-PSOLA pitch shifter for WAV files")]
struct Cli {
    /// Input WAV file
    input: PathBuf,
    /// Output WAV file (16-bit PCM)
    output: PathBuf,
    /// Frequency ratio to shift by (2.0 = one octave up)
    #[arg(short, long, conflicts_with = "semitones")]
    ratio: Option<f32>,
    /// Shift in semitones (may be negative)
    #[arg(short, long, allow_negative_numbers = true)]
    semitones: Option<f32>,
    /// Export grain telemetry next to the output file (folds input to mono)
    #[arg(long)]
    export_grains: bool,
    /// Highest detectable fundamental in Hz
    #[arg(long, default_value_t = 1700.0)]
    max_hz: f32,
    /// Lowest detectable fundamental in Hz
    #[arg(long, default_value_t = 75.0)]
    min_hz: f32,
    /// Period-analysis window length in milliseconds
    #[arg(long, default_value_t = 40.0)]
    window_ms: f32,
    /// Width multiplier for the second detection pass
    #[arg(long, default_value_t = 2.2)]
    deviation_scalar: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let f_ratio = match (cli.ratio, cli.semitones) {
        (Some(ratio), _) => ratio,
        (None, Some(semitones)) => 2f32.powf(semitones / 12.0),
        (None, None) => bail!("specify a shift with --ratio or --semitones"),
    };

    let config = ShiftConfig {
        max_hz: cli.max_hz,
        min_hz: cli.min_hz,
        analysis_window_ms: cli.window_ms,
        deviation_scalar: cli.deviation_scalar,
    };

    let input = io::load_wav(&cli.input)?;
    info!(
        path = ?cli.input,
        sample_rate = input.sample_rate(),
        channels = input.channel_count(),
        n_samples = input.len(),
        "Loaded input"
    );

    let output = if cli.export_grains {
        let mono = input.to_mono();
        let (shifted, trace) = pitch_shift_traced(&mono, f_ratio, &config)?;
        let stem = cli.output.with_extension("");
        trace.export(&stem)?;
        info!(grains = trace.grains.len(), stem = ?stem, "Exported grain telemetry");
        shifted
    } else {
        pitch_shift(&input, f_ratio, &config)?
    };

    io::save_wav(&output, &cli.output)?;
    info!(path = ?cli.output, f_ratio, "Wrote pitch-shifted audio");
    Ok(())
}
