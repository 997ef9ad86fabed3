//! Example: Analyze a single audio file
//!
//! Usage:
//!   cargo run --release --example analyze_file -- <input> [-o DIR] [-s HZ] [--config FILE] [--no-plot]
//!
//! `--sample-rate` overrides the config file; without either the rate is 22050 Hz.
//!
//! Prints the summary box and, unless `--no-plot` is given, writes every
//! feature matrix to `<DIR>/<stem>_analysis.json` for an external plotter.

use clap::Parser;
use sonance_dsp::io::decoder::decode_file;
use sonance_dsp::{AnalysisConfig, AnalysisContext};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "analyze_file",
    about = "Extract tempo, beats and spectral features from an audio file"
)]
struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG, AAC)
    input: PathBuf,

    /// Directory for the JSON feature dump
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Analysis sample rate; the file is resampled to it
    #[arg(short, long)]
    sample_rate: Option<u32>,

    /// Skip writing the feature dump
    #[arg(long)]
    no_plot: bool,

    /// TOML file overriding analysis parameters
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Config file values, then command-line overrides
fn resolve_config(cli: &Cli) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_toml_str(&std::fs::read_to_string(path)?)?,
        None => AnalysisConfig::default(),
    };
    if let Some(sample_rate) = cli.sample_rate {
        config.sample_rate = sample_rate;
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let audio = decode_file(&cli.input, config.sample_rate)?;
    let context = AnalysisContext::new(config)?;
    let result = context.analyze(&audio.samples)?;
    let summary = &result.summary;

    println!("┌──────────────────────────────────────────────┐");
    println!("│ {:<44} │", cli.input.file_name().and_then(|n| n.to_str()).unwrap_or("audio"));
    println!("├──────────────────────────────────────────────┤");
    println!(
        "│ Tempo:              {:>8.2} BPM (conf {:.2}) │",
        result.tempo.bpm, result.tempo.confidence
    );
    println!("│ Beats:              {:>8}                 │", result.beats.len());
    println!("│ Average volume:     {:>8.4}                 │", summary.average_volume);
    println!("│ Average brightness: {:>8.1} Hz              │", summary.average_brightness);
    println!("│ Complexity:         {:>8.4}                 │", summary.complexity);
    println!("│ Zero-crossing rate: {:>8.4}                 │", summary.average_zero_crossing_rate);
    println!("│ Duration:           {:>8.2} s               │", result.metadata.duration_seconds);
    println!("│ Processing time:    {:>8.1} ms              │", result.metadata.processing_time_ms);
    println!("└──────────────────────────────────────────────┘");

    if !cli.no_plot {
        let stem = cli
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        std::fs::create_dir_all(&cli.output)?;
        let path = cli.output.join(format!("{}_analysis.json", stem));
        std::fs::write(&path, serde_json::to_string(&result)?)?;
        println!("Features written to {}", path.display());
    }

    Ok(())
}
