use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use page_sequencer::{FileDescriptor, FilenameParser, PageSequencer};

fn synthetic_batch(size: usize) -> Vec<FileDescriptor> {
    (0..size)
        .map(|i| {
            let name = match i % 6 {
                0 => format!("baron{:03} {}.png", i / 25 + 1, i % 25),
                1 => format!("page_{:04}.jpg", i),
                2 => format!("IMG_20240101_{:04}.jpg", i),
                3 => format!("ch{}p{}.png", i / 30 + 1, i % 30 + 1),
                4 => format!("{:05}.tif", i),
                _ => format!("untitled copy {}.png", i),
            };
            FileDescriptor::new(i.to_string(), name)
        })
        .rev()
        .collect()
}

fn bench_parse(c: &mut Criterion) {
    let parser = FilenameParser::default();
    let names = [
        "baron001 24.png",
        "IMG_20240101_001.jpg",
        "chapter2_page5.png",
        "no_numbers_here.png",
    ];

    let mut group = c.benchmark_group("parse");
    for name in names {
        group.bench_with_input(BenchmarkId::from_parameter(name), name, |b, name| {
            b.iter(|| parser.parse(black_box(name)))
        });
    }
    group.finish();
}

fn bench_order(c: &mut Criterion) {
    let sequencer = PageSequencer::default();

    let mut group = c.benchmark_group("order");
    for size in [100usize, 1_000, 10_000] {
        let batch = synthetic_batch(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &batch, |b, batch| {
            b.iter(|| sequencer.order(black_box(batch.clone())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_order);
criterion_main!(benches);
