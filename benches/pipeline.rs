use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use halofp::{
    Codebase, DirectoryConfig, FingerprintSchema, PerceptualConfig,
    compute_codebase_directory_fingerprints_with, fingerprint_text, tokenize,
};

fn source_text(lines: usize) -> String {
    (0..lines)
        .map(|i| format!("    let value_{i} = compute(input_{}, {});\n", i % 17, i % 5))
        .collect()
}

/// `fanout` top-level directories, each with `files` files and one nested
/// directory holding `files` more.
fn synthetic_codebase(fanout: usize, files: usize) -> Codebase {
    let mut cb = Codebase::new("bench", FingerprintSchema::Dedicated);
    let root = cb.root();
    for d in 0..fanout {
        let Ok(dir) = cb.add_directory(root, &format!("dir{d}")) else {
            continue;
        };
        let Ok(nested) = cb.add_directory(dir, "nested") else {
            continue;
        };
        for f in 0..files {
            let size = Some((d * 997 + f * 31 + 1) as u64);
            let _ = cb.add_file(dir, &format!("f{f}.rs"), size, Some(format!("{d:08x}{f:032x}")));
            let _ = cb.add_file(nested, &format!("g{f}.rs"), size, Some(format!("{f:08x}{d:032x}")));
        }
    }
    cb
}

fn tokenize_bench(c: &mut Criterion) {
    let text = source_text(2_000);
    c.bench_function("tokenize_source", |b| {
        b.iter(|| black_box(tokenize(black_box(&text))));
    });
}

fn file_fingerprint_bench(c: &mut Criterion) {
    let text = source_text(2_000);
    let sequential = PerceptualConfig::default();
    let parallel = PerceptualConfig::default().with_parallel(true);

    c.bench_function("fingerprint_text_sequential", |b| {
        b.iter(|| black_box(fingerprint_text(black_box(&text), &sequential)));
    });
    c.bench_function("fingerprint_text_parallel", |b| {
        b.iter(|| black_box(fingerprint_text(black_box(&text), &parallel)));
    });
}

fn directory_bench(c: &mut Criterion) {
    for (name, cfg) in [
        ("directory_pass_sequential", DirectoryConfig::new()),
        ("directory_pass_parallel", DirectoryConfig::new().with_parallel(true)),
    ] {
        c.bench_function(name, |b| {
            b.iter_batched(
                || synthetic_codebase(64, 16),
                |mut cb| black_box(compute_codebase_directory_fingerprints_with(&mut cb, &cfg)),
                criterion::BatchSize::LargeInput,
            );
        });
    }
}

criterion_group!(
    benches,
    tokenize_bench,
    file_fingerprint_bench,
    directory_bench
);
criterion_main!(benches);
