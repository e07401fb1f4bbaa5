use criterion::{Criterion, black_box, criterion_group, criterion_main};
use fwt_fs::checksum::{files_identical, prefix_key, sha256_key};
use std::fs;
use tempfile::tempdir;

fn prefix_key_benchmark(c: &mut Criterion) {
    c.bench_function("checksum::prefix_key (1 MiB file)", |b| {
        let dir = tempdir().unwrap();
        let path = dir.path().join("asset.png");
        fs::write(&path, vec![42u8; 1 << 20]).unwrap();

        b.iter(|| {
            let _ = prefix_key(black_box(&path), sha256_key).unwrap();
        })
    });
}

fn files_identical_benchmark(c: &mut Criterion) {
    c.bench_function("checksum::files_identical (1 MiB equal)", |b| {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.png");
        let other = dir.path().join("b.png");
        fs::write(&a, vec![7u8; 1 << 20]).unwrap();
        fs::write(&other, vec![7u8; 1 << 20]).unwrap();

        b.iter(|| {
            let _ = files_identical(black_box(&a), black_box(&other)).unwrap();
        })
    });
}

criterion_group!(benches, prefix_key_benchmark, files_identical_benchmark);
criterion_main!(benches);
