//! Benchmarks for XMSS.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pqsigs_xmss::{
    hash::HashFunction, verify, wots::derive_leaf, AddrFormat, XmssBasic, XmssFast, XmssSigner,
};

const SEED: [u8; 48] = [0x5A; 48];
const HASH_FUNCTIONS: [HashFunction; 3] = [
    HashFunction::Sha2_256,
    HashFunction::Shake128,
    HashFunction::Shake256,
];

/// Benchmark a single leaf derivation (WOTS+ key generation and L-tree).
fn bench_leaf(c: &mut Criterion) {
    let mut group = c.benchmark_group("leaf");
    let sk_seed = [1u8; 32];
    let pub_seed = [2u8; 32];

    for hash_fn in HASH_FUNCTIONS {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", hash_fn)),
            &hash_fn,
            |bencher, &hash_fn| {
                bencher.iter(|| derive_leaf(hash_fn, &sk_seed, &pub_seed, black_box(7)))
            },
        );
    }

    group.finish();
}

/// Benchmark tree construction.
fn bench_keygen(c: &mut Criterion) {
    let mut group = c.benchmark_group("keygen");
    group.sample_size(10);

    for height in [4u8, 8] {
        group.bench_with_input(BenchmarkId::new("fast", height), &height, |bencher, &h| {
            bencher.iter(|| {
                XmssFast::new(black_box(&SEED), h, HashFunction::Shake128, AddrFormat::Sha256_2x)
            })
        });
    }

    group.finish();
}

/// Benchmark signing with both flavors.
fn bench_sign(c: &mut Criterion) {
    let mut group = c.benchmark_group("sign");
    group.sample_size(10);
    let msg = b"benchmark message for signing";

    // Height 10 leaves enough leaves for the sample
    let mut fast = XmssFast::new(&SEED, 10, HashFunction::Shake128, AddrFormat::Sha256_2x).unwrap();
    group.bench_function("fast_h10", |bencher| {
        bencher.iter(|| {
            if fast.remaining_signatures() == 0 {
                fast = XmssFast::new(&SEED, 10, HashFunction::Shake128, AddrFormat::Sha256_2x)
                    .unwrap();
            }
            fast.sign(black_box(msg)).unwrap()
        })
    });

    let mut basic = XmssBasic::new(&SEED, 6, HashFunction::Shake128, AddrFormat::Sha256_2x).unwrap();
    group.bench_function("basic_h6", |bencher| {
        bencher.iter(|| {
            if basic.remaining_signatures() == 0 {
                basic = XmssBasic::new(&SEED, 6, HashFunction::Shake128, AddrFormat::Sha256_2x)
                    .unwrap();
            }
            basic.sign(black_box(msg)).unwrap()
        })
    });

    group.finish();
}

/// Benchmark verification.
fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    let msg = b"benchmark message for verification";

    for hash_fn in HASH_FUNCTIONS {
        let mut xmss = XmssFast::new(&SEED, 10, hash_fn, AddrFormat::Sha256_2x).unwrap();
        let pk = xmss.public_key();
        let sig = xmss.sign(msg).unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", hash_fn)),
            &sig,
            |bencher, sig| bencher.iter(|| verify(black_box(msg), black_box(sig), &pk)),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_leaf, bench_keygen, bench_sign, bench_verify);
criterion_main!(benches);
