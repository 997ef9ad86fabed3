//! Performance benchmarks for feature extraction

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sonance_dsp::features::spectrum::stft::StftEngine;
use sonance_dsp::features::spectrum::window::WindowFunction;
use sonance_dsp::{analyze_audio, AnalysisConfig, AnalysisContext};

/// 30 seconds at 22.05 kHz: a 440 Hz tone with a 120 BPM pulse on top
fn synthetic_track() -> Vec<f32> {
    let sample_rate = 22050.0;
    (0..22050 * 30)
        .map(|i| {
            let t = i as f32 / sample_rate;
            let tone = (t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
            let phase = t % 0.5;
            let pulse = if phase < 0.01 { (1.0 - phase / 0.01) * 0.6 } else { 0.0 };
            tone + pulse
        })
        .collect()
}

fn bench_analyze_audio(c: &mut Criterion) {
    let samples = synthetic_track();
    let config = AnalysisConfig::default();

    c.bench_function("analyze_audio_30s", |b| {
        b.iter(|| {
            let _ = analyze_audio(black_box(&samples), black_box(config.clone()));
        });
    });

    let context = AnalysisContext::new(config).expect("default config is valid");
    c.bench_function("context_analyze_30s", |b| {
        b.iter(|| {
            let _ = context.analyze(black_box(&samples));
        });
    });
}

fn bench_stft(c: &mut Criterion) {
    let samples = synthetic_track();
    let engine = StftEngine::new(2048, 512, WindowFunction::Hann).expect("valid STFT");

    c.bench_function("stft_30s", |b| {
        b.iter(|| {
            let _ = engine.process(black_box(&samples), 22050);
        });
    });
}

criterion_group!(benches, bench_analyze_audio, bench_stft);
criterion_main!(benches);
