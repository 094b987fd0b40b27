use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rinspect_engine::{vector, walk, Heap, Protected};

fn bench_linear(c: &mut Criterion) {
    let heap = Heap::new();
    let mut group = c.benchmark_group("linear");

    for len in [16usize, 1024, 65536] {
        let values: Vec<i32> = (0..len as i32).collect();
        let v = Protected::new(&heap, heap.alloc_integer(&values));
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("get_integer", len), &len, |b, &len| {
            b.iter(|| {
                let mut sum = 0i64;
                for i in 0..len {
                    sum += vector::get_integer(&heap, black_box(v.get()), i).unwrap() as i64;
                }
                sum
            });
        });

        group.bench_with_input(BenchmarkId::new("get_integer_opt", len), &len, |b, &len| {
            b.iter(|| {
                (0..len)
                    .filter_map(|i| vector::get_integer_opt(&heap, black_box(v.get()), i).unwrap())
                    .count()
            });
        });
    }

    group.finish();
}

fn bench_matrix(c: &mut Criterion) {
    let heap = Heap::new();
    let (nrow, ncol) = (64usize, 64usize);
    let values: Vec<f64> = (0..nrow * ncol).map(|k| k as f64).collect();
    let m = Protected::new(&heap, heap.alloc_real(&values));
    heap.set_dim(m.get(), nrow, ncol).unwrap();

    c.bench_function("get_real_2d_64x64", |b| {
        b.iter(|| {
            let mut sum = 0.0;
            for column in 0..ncol {
                for row in 0..nrow {
                    sum += vector::get_real_2d(&heap, black_box(m.get()), row, column).unwrap();
                }
            }
            sum
        });
    });
}

fn bench_strings(c: &mut Criterion) {
    let heap = Heap::new();
    let words: Vec<Option<&str>> = (0..256)
        .map(|i| if i % 16 == 0 { None } else { Some("element") })
        .collect();
    let v = Protected::new(&heap, heap.alloc_string(&words));

    c.bench_function("get_string_opt_256", |b| {
        b.iter(|| {
            (0..words.len())
                .filter_map(|i| vector::get_string_opt(&heap, black_box(v.get()), i).unwrap())
                .count()
        });
    });
}

fn bench_pairlist(c: &mut Criterion) {
    let heap = Heap::new();
    let value = heap.protect(heap.alloc_integer(&[1]));
    let items: Vec<(Option<&str>, _)> = (0..128).map(|_| (Some("x"), value)).collect();
    let list = Protected::new(&heap, heap.pairlist(&items));
    heap.unprotect(1);

    c.bench_function("pairlist_walk_128", |b| {
        b.iter(|| walk::pairlist(&heap, black_box(list.get())).count());
    });
}

criterion_group!(benches, bench_linear, bench_matrix, bench_strings, bench_pairlist);
criterion_main!(benches);
