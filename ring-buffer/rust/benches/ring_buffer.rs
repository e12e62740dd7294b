use std::collections::VecDeque;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ringbuf::storage::{ArrayStorage, HashStorage, Storage};
use ringbuf::RingBuffer;

fn do_rb<S: Storage<usize>>(rb: &mut RingBuffer<usize, S>, n: usize) -> usize {
    for i in 1..n {
        rb.append(i);
    }

    let mut v: usize = 0;
    for _ in 1..n {
        v += rb.pop_first().unwrap();
    }

    v
}

fn do_vd(vd: &mut VecDeque<usize>, n: usize) -> usize {
    for i in 1..n {
        vd.push_back(i);
    }

    let mut v: usize = 0;
    for _ in 1..n {
        v += vd.pop_front().unwrap();
    }

    v
}

fn do_overwrite<S: Storage<usize>>(rb: &mut RingBuffer<usize, S>, n: usize) -> usize {
    for i in 0..n * 4 {
        rb.append(i);
    }

    *rb.first().unwrap()
}

fn filled<S: Storage<usize>>(n: usize) -> RingBuffer<usize, S> {
    RingBuffer::from_elements(n, 0..n).unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    const N: usize = 64;

    let mut group = c.benchmark_group("RingBuffers");

    group.bench_function("ringbuf::RingBuffer array 64", |b| {
        let mut rb = RingBuffer::<usize, ArrayStorage<usize>>::with_capacity(N).unwrap();

        b.iter(|| do_rb(&mut rb, N))
    });

    group.bench_function("ringbuf::RingBuffer hash 64", |b| {
        let mut rb = RingBuffer::<usize, HashStorage<usize>>::with_capacity(N).unwrap();

        b.iter(|| do_rb(&mut rb, N))
    });

    group.bench_function("std::collections::VecDeque 64", |b| {
        let mut vd = VecDeque::<usize>::with_capacity(N);

        b.iter(|| do_vd(&mut vd, N))
    });

    group.finish();

    let mut group = c.benchmark_group("Overwrite");

    group.bench_function("array 64", |b| {
        let mut rb = RingBuffer::<usize, ArrayStorage<usize>>::with_capacity(N).unwrap();

        b.iter(|| do_overwrite(&mut rb, N))
    });

    group.bench_function("hash 64", |b| {
        let mut rb = RingBuffer::<usize, HashStorage<usize>>::with_capacity(N).unwrap();

        b.iter(|| do_overwrite(&mut rb, N))
    });

    group.finish();

    let mut group = c.benchmark_group("Rebuild");

    group.bench_function("resize array 1024 -> 512", |b| {
        b.iter_batched(
            || filled::<ArrayStorage<usize>>(1024),
            |mut rb| {
                rb.resize(black_box(512)).unwrap();
                rb
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("remove_entry array 1024", |b| {
        b.iter_batched(
            || filled::<ArrayStorage<usize>>(1024),
            |mut rb| {
                rb.remove_entry(black_box(&512), false);
                rb
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
