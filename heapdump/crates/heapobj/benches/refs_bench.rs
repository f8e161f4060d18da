//! heapobj Benchmarks
//!
//! Run with: `cargo bench --package heapobj`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use heapobj::{DumpConfig, MemObject, ObjectTable, RefList};

fn bench_ref_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("ref_list");

    for len in [0usize, 4, 64] {
        let addresses: Vec<u64> = (0..len as u64).map(|i| 0x7f00_0000 + i * 8).collect();
        group.throughput(Throughput::Elements(len as u64));

        group.bench_function(format!("encode_{}", len), |b| {
            b.iter(|| black_box(RefList::encode(black_box(&addresses)).unwrap()))
        });

        let list = RefList::encode(&addresses).unwrap();
        group.bench_function(format!("decode_{}", len), |b| {
            b.iter(|| black_box(list.decode()))
        });
    }

    group.finish();
}

fn bench_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("object_table");
    let types = ["dict", "str", "tuple", "list", "int"];

    group.bench_function("insert_and_compute_referrers_10k", |b| {
        b.iter(|| {
            let mut table = ObjectTable::new(DumpConfig::default()).unwrap();
            for i in 1..=10_000u64 {
                let refs = [i % 97 + 1, i % 1013 + 1];
                let obj = MemObject::new(i, types[(i % 5) as usize], 64, &refs).unwrap();
                table.insert(obj).unwrap();
            }
            table.compute_referrers().unwrap();
            black_box(table.len())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_ref_list, bench_table);
criterion_main!(benches);
