//! Markup pipeline benchmark: Measure escape + colorize throughput.
//!
//! Log servers can burst hundreds of lines per second; the pipeline
//! must stay comfortably below the arrival rate.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use taillight::render::markup::to_markup;

/// Build a batch of representative log lines.
fn test_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 4 {
            0 => format!("2026-01-01T00:00:{:02}Z GET /api/items -> 200 in 12ms\n", i % 60),
            1 => format!("\x1b[33mwarn\x1b[0m queue depth {} > threshold\n", i * 3),
            2 => "\x1b[31merror\x1b[0m upstream said: <unavailable> & retrying\n".to_string(),
            _ => format!("worker-{i} heartbeat ok\n"),
        })
        .collect()
}

fn markup_plain_lines(c: &mut Criterion) {
    let lines = test_lines(1_000);
    let bytes: usize = lines.iter().map(String::len).sum();

    let mut group = c.benchmark_group("markup");
    group.throughput(Throughput::Bytes(bytes as u64));
    group.bench_function("pipeline_1000_lines", |b| {
        b.iter(|| {
            for line in &lines {
                black_box(to_markup(black_box(line)));
            }
        })
    });
    group.finish();
}

fn markup_color_heavy(c: &mut Criterion) {
    let line = "\x1b[32mok\x1b[0m \x1b[31mfail\x1b[0m \x1b[36mnote\x1b[0m <tag> & more\n";

    c.bench_function("pipeline_color_heavy_line", |b| {
        b.iter(|| black_box(to_markup(black_box(line))))
    });
}

criterion_group!(benches, markup_plain_lines, markup_color_heavy);
criterion_main!(benches);
