use criterion::{criterion_group, criterion_main, Criterion};

use bitveil_core::{hide, unveil, EncoderSettings, PixelBuffer, PixelFormat};

fn carrier_512() -> PixelBuffer {
    let len = (512 * 512 * 4) as usize;
    let data = (0..len).map(|i| (i * 7 + 13) as u8).collect();
    PixelBuffer::from_raw(512, 512, PixelFormat::RGBA8, data).unwrap()
}

fn payload_8k() -> Vec<u8> {
    (0..8192).map(|i| (i % 251) as u8).collect()
}

fn hide_benchmark(c: &mut Criterion) {
    c.bench_function("hide 8 KiB in 512x512 rgba", |b| {
        let carrier = carrier_512();
        let payload = payload_8k();
        let settings = EncoderSettings::default();

        b.iter(|| {
            let mut buffer = carrier.clone();
            hide(&mut buffer, &payload, &settings).unwrap();
            buffer
        })
    });
}

fn unveil_benchmark(c: &mut Criterion) {
    c.bench_function("unveil 8 KiB from 512x512 rgba", |b| {
        let mut carrier = carrier_512();
        hide(&mut carrier, &payload_8k(), &EncoderSettings::default()).unwrap();

        b.iter(|| unveil(&carrier, None).unwrap())
    });
}

criterion_group!(benches, hide_benchmark, unveil_benchmark);
criterion_main!(benches);
