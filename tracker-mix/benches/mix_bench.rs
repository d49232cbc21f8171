//! Benchmarks for tracker-mix
//!
//! Measures row flattening, sampler mix-in, rendering and quantization.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracker_mix::tracker_volume::{BitDepth, ChannelMatrix, Position, SpeakerLayout, Volume};
use tracker_mix::{
    pan_mixer, ChannelData, MatrixStream, MixBuffer, Mixer, MixerConfig, SamplePos,
    StreamSampler,
};

const TICKS: usize = 4096;

fn random_frames(rng: &mut StdRng, len: usize) -> Vec<ChannelMatrix> {
    (0..len)
        .map(|_| ChannelMatrix::mono(Volume(rng.gen_range(-1.0..1.0))))
        .collect()
}

fn random_segments(rng: &mut StdRng, segments: usize) -> Vec<(Vec<ChannelMatrix>, Position)> {
    (0..segments)
        .map(|_| {
            let pan = Position::new(rng.gen_range(0.0..std::f32::consts::FRAC_PI_2), 1.0);
            (random_frames(rng, TICKS), pan)
        })
        .collect()
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");
    let mixer = Mixer::new(MixerConfig::default()).unwrap();
    let pan = pan_mixer(mixer.channels()).unwrap();

    for segment_count in [1, 8, 32].iter() {
        let mut rng = StdRng::seed_from_u64(*segment_count as u64);
        let segments = random_segments(&mut rng, *segment_count);

        group.bench_with_input(
            BenchmarkId::from_parameter(segment_count),
            segment_count,
            |b, _| {
                b.iter(|| {
                    let mut row: Vec<ChannelData> = segments
                        .iter()
                        .map(|(frames, position)| {
                            ChannelData::from_frames(frames.clone())
                                .with_pan(*position)
                                .with_volume(Volume(0.25))
                        })
                        .collect();
                    black_box(mixer.flatten(pan, TICKS, &mut row, Volume::UNITY));
                });
            },
        );
    }

    group.finish();
}

fn bench_sampler_mix_in(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let frames = random_frames(&mut rng, TICKS * 2);
    let gain = ChannelMatrix::stereo(Volume(0.7), Volume(0.7));

    c.bench_function("sampler_half_speed", |b| {
        b.iter(|| {
            let mut buffer = MixBuffer::new(TICKS);
            let mut sampler =
                StreamSampler::new(MatrixStream::new(frames.clone()), SamplePos::default(), 0.5);
            buffer.accumulate_sampler(0, &mut sampler, TICKS, &gain);
            black_box(buffer);
        });
    });
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_bytes");
    let mut rng = StdRng::seed_from_u64(42);
    let mut buffer = MixBuffer::new(TICKS);
    let gain = ChannelMatrix::quad(Volume(1.5), Volume(0.5), Volume(0.25), Volume(-1.5));
    buffer.accumulate_segment(0, &random_frames(&mut rng, TICKS), &gain);

    for depth in [BitDepth::Bits8, BitDepth::Bits16, BitDepth::Bits24, BitDepth::Bits32].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(depth), depth, |b, depth| {
            b.iter(|| {
                black_box(buffer.render_bytes(TICKS, *depth, SpeakerLayout::Quad, Volume::UNITY));
            });
        });
    }

    group.finish();
}

fn bench_quantize(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    // a fifth of the values are past full scale
    let volumes: Vec<Volume> = (0..TICKS * 4).map(|_| Volume(rng.gen_range(-1.25..1.25))).collect();

    c.bench_function("quantize_16", |b| {
        b.iter(|| {
            let total: i64 = volumes
                .iter()
                .map(|v| v.quantize_int32(BitDepth::Bits16) as i64)
                .sum();
            black_box(total);
        });
    });
}

criterion_group!(
    benches,
    bench_flatten,
    bench_sampler_mix_in,
    bench_render,
    bench_quantize
);
criterion_main!(benches);
