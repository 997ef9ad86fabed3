//! Example: Analyze multiple audio files in parallel
//!
//! Usage:
//!   cargo run --release --example analyze_batch -- [--jobs N] [--json] <file1> <file2> ...
//!
//! Notes:
//! - Parallelism is across files; one `AnalysisContext` is shared by every worker.
//! - Default workers: (available CPU threads - 1), keeping one core free for the system.

use rayon::prelude::*;
use serde::Serialize;
use sonance_dsp::io::decoder::decode_file;
use sonance_dsp::{AnalysisConfig, AnalysisContext, FeatureSummary};
use std::env;
use std::time::Instant;

#[derive(Serialize)]
struct ItemOut {
    file: String,
    #[serde(flatten)]
    summary: Option<FeatureSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    beats: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    processing_time_ms: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn default_jobs() -> usize {
    let n = std::thread::available_parallelism().map(|v| v.get()).unwrap_or(1);
    std::cmp::max(1, n.saturating_sub(1))
}

fn percentile(mut xs: Vec<f32>, p: f32) -> Option<f32> {
    if xs.is_empty() {
        return None;
    }
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((xs.len() - 1) as f32 * p.clamp(0.0, 1.0)).round() as usize;
    Some(xs[idx.min(xs.len() - 1)])
}

fn analyze_one(context: &AnalysisContext, path: &str) -> ItemOut {
    let outcome = decode_file(path, context.config().sample_rate)
        .map_err(|e| format!("decode failed: {e}"))
        .and_then(|audio| {
            context
                .analyze(&audio.samples)
                .map_err(|e| format!("analysis failed: {e}"))
        });

    match outcome {
        Ok(result) => ItemOut {
            file: path.to_string(),
            beats: Some(result.beats.len()),
            processing_time_ms: Some(result.metadata.processing_time_ms),
            summary: Some(result.summary),
            error: None,
        },
        Err(e) => ItemOut {
            file: path.to_string(),
            summary: None,
            beats: None,
            processing_time_ms: None,
            error: Some(e),
        },
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut json = false;
    let mut jobs: Option<usize> = None;
    let mut paths: Vec<String> = Vec::new();

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--jobs" => {
                let v = args
                    .first()
                    .ok_or("--jobs requires a value")?
                    .parse::<usize>()?;
                args.remove(0);
                jobs = Some(std::cmp::max(1, v));
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_batch [--jobs N] [--json] <file1> <file2> ...\n\
                     \n\
                     --jobs N   Parallel workers (default: CPU-1)\n\
                     --json     Emit one JSON object per line (JSONL)\n"
                );
                return Ok(());
            }
            _ => paths.push(a),
        }
    }

    if paths.is_empty() {
        eprintln!("ERROR: Provide at least one audio file path. Use --help for usage.");
        std::process::exit(2);
    }

    let jobs = jobs.unwrap_or_else(default_jobs);
    eprintln!("Batch: {} files, jobs={}", paths.len(), jobs);

    let context = AnalysisContext::new(AnalysisConfig::default())?;

    let t0 = Instant::now();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

    let outs: Vec<ItemOut> =
        pool.install(|| paths.par_iter().map(|path| analyze_one(&context, path)).collect());

    for (idx, o) in outs.iter().enumerate() {
        if json {
            println!("{}", serde_json::to_string(o)?);
        } else if let Some(summary) = &o.summary {
            println!(
                "[{}/{}] {}: tempo={:.2} BPM (conf={:.3}) beats={} complexity={:.4} time={:.2}ms",
                idx + 1,
                outs.len(),
                o.file,
                summary.tempo_bpm.unwrap_or(0.0),
                summary.tempo_confidence.unwrap_or(0.0),
                o.beats.unwrap_or(0),
                summary.complexity,
                o.processing_time_ms.unwrap_or(0.0)
            );
        } else {
            println!(
                "[{}/{}] {}: ERROR: {}",
                idx + 1,
                outs.len(),
                o.file,
                o.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    let ok_times: Vec<f32> = outs.iter().filter_map(|o| o.processing_time_ms).collect();
    let wall_ms = t0.elapsed().as_secs_f64() * 1000.0;

    eprintln!(
        "Done: ok={}/{} wall={:.0}ms",
        ok_times.len(),
        outs.len(),
        wall_ms
    );
    if !ok_times.is_empty() {
        let mean = ok_times.iter().sum::<f32>() / ok_times.len() as f32;
        let p50 = percentile(ok_times.clone(), 0.50).unwrap_or(mean);
        let p90 = percentile(ok_times.clone(), 0.90).unwrap_or(mean);
        let min = ok_times.iter().cloned().fold(f32::INFINITY, f32::min);
        let max = ok_times.iter().cloned().fold(0.0, f32::max);
        eprintln!(
            "processing_time_ms: mean={:.2} p50={:.2} p90={:.2} min={:.2} max={:.2}",
            mean, p50, p90, min, max
        );
    }

    Ok(())
}
